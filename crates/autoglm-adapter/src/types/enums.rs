/*
[INPUT]:  Protocol tag values (msg_type, data_agent.action) and gesture results
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for protocol communication
[UPDATE]: When the service adds message types or agent actions
*/

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified kind of an inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// `server_init`: connection acknowledged
    Init,
    /// `server_session`: VM/session status
    Session,
    /// `server_task`: agent progress and actions
    TaskProgress,
    /// `client_test`: echo of the submitted task
    ClientEcho,
    /// Transport error surfaced as an event
    Error,
    /// Frame that was not a JSON object
    Raw,
    Unknown,
}

impl MessageKind {
    pub fn from_msg_type(msg_type: &str) -> Self {
        match msg_type {
            "server_init" => MessageKind::Init,
            "server_session" => MessageKind::Session,
            "server_task" => MessageKind::TaskProgress,
            "client_test" => MessageKind::ClientEcho,
            _ => MessageKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Init => "init",
            MessageKind::Session => "session",
            MessageKind::TaskProgress => "task_progress",
            MessageKind::ClientEcho => "client_echo",
            MessageKind::Error => "error",
            MessageKind::Raw => "raw",
            MessageKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action reported in `data.data_agent.action`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Launch,
    Tap,
    Type,
    Swipe,
    Back,
    CallApi,
    TakeOver,
    Finish,
    #[serde(other)]
    Other,
}

impl ActionKind {
    pub fn parse(action: &str) -> Self {
        match action {
            "launch" => ActionKind::Launch,
            "tap" => ActionKind::Tap,
            "type" => ActionKind::Type,
            "swipe" => ActionKind::Swipe,
            "back" => ActionKind::Back,
            "call_api" => ActionKind::CallApi,
            "take_over" => ActionKind::TakeOver,
            "finish" => ActionKind::Finish,
            _ => ActionKind::Other,
        }
    }
}

/// Dominant direction of a swipe gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
    Unknown,
}

impl SwipeDirection {
    pub fn label(&self) -> &'static str {
        match self {
            SwipeDirection::Up => "swipe up",
            SwipeDirection::Down => "swipe down",
            SwipeDirection::Left => "swipe left",
            SwipeDirection::Right => "swipe right",
            SwipeDirection::Unknown => "unknown direction",
        }
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
