/*
[INPUT]:  Decoded inbound frames (JSON objects or raw text)
[OUTPUT]: InboundEvent plus typed views of session and agent-action payloads
[POS]:    Data layer - type definitions for protocol communication
[UPDATE]: When inbound payload fields change or new views are needed
*/

use serde::Serialize;
use serde_json::Value;

use super::enums::{ActionKind, MessageKind};

/// Body of an inbound event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    Json(Value),
    Raw(String),
}

/// One classified inbound frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InboundEvent {
    pub kind: MessageKind,
    pub payload: EventPayload,
    /// Set on swipe actions only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swipe_direction: Option<String>,
}

impl InboundEvent {
    pub fn json(kind: MessageKind, value: Value) -> Self {
        Self {
            kind,
            payload: EventPayload::Json(value),
            swipe_direction: None,
        }
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Raw,
            payload: EventPayload::Raw(text.into()),
            swipe_direction: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::json(
            MessageKind::Error,
            serde_json::json!({ "error": message.into() }),
        )
    }

    pub fn as_json(&self) -> Option<&Value> {
        match &self.payload {
            EventPayload::Json(value) => Some(value),
            EventPayload::Raw(_) => None,
        }
    }

    pub fn raw_text(&self) -> Option<&str> {
        match &self.payload {
            EventPayload::Raw(text) => Some(text),
            EventPayload::Json(_) => None,
        }
    }

    pub fn msg_type(&self) -> Option<&str> {
        self.as_json()?.get("msg_type")?.as_str()
    }

    /// The envelope's `data` object
    pub fn data(&self) -> Option<&Value> {
        self.as_json()?.get("data")
    }

    pub fn biz_type(&self) -> Option<&str> {
        self.data()?.get("biz_type")?.as_str()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.as_json()?.get("error")?.as_str()
    }

    pub fn session(&self) -> Option<SessionInfo> {
        match self.kind {
            MessageKind::Session => self.data().map(SessionInfo::from_value),
            _ => None,
        }
    }

    /// `data.data_agent` of a task-progress event
    pub fn agent_action(&self) -> Option<AgentAction> {
        match self.kind {
            MessageKind::TaskProgress => self
                .data()?
                .get("data_agent")
                .map(AgentAction::from_value),
            _ => None,
        }
    }
}

/// View over `server_session` data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionInfo {
    pub biz_type: Option<String>,
    pub vm_state: Option<String>,
    pub vm_id: Option<String>,
    pub uid: Option<String>,
}

impl SessionInfo {
    pub fn from_value(data: &Value) -> Self {
        Self {
            biz_type: string_field(data, "biz_type"),
            vm_state: string_field(data, "vm_state"),
            vm_id: string_field(data, "vm_id"),
            uid: string_field(data, "uid"),
        }
    }
}

/// View over `data.data_agent` of a `server_task` frame.
///
/// Fields are read leniently: missing or mistyped values become `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentAction {
    /// Action name exactly as sent
    pub action: String,
    pub round: Option<i64>,
    pub message: Option<String>,
    pub app_name: Option<String>,
    pub package_name: Option<String>,
    pub center_point: Option<Value>,
    pub argument: Option<String>,
    pub start2end: Option<Value>,
}

impl AgentAction {
    pub fn from_value(agent: &Value) -> Self {
        Self {
            action: string_field(agent, "action").unwrap_or_default(),
            round: agent.get("round").and_then(Value::as_i64),
            message: string_field(agent, "message"),
            app_name: string_field(agent, "app_name"),
            package_name: string_field(agent, "package_name"),
            center_point: agent.get("center_point").cloned(),
            argument: string_field(agent, "argument"),
            start2end: agent.get("start2end").cloned(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        ActionKind::parse(&self.action)
    }

    /// Round number, 1 when the service omits it
    pub fn round_or_default(&self) -> i64 {
        self.round.unwrap_or(1)
    }

    pub fn message_or_empty(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_string)
}
