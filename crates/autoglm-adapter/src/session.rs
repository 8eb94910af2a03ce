/*
[INPUT]:  Connection/send outcomes, classified InboundEvents, resume and cancel signals
[OUTPUT]: Validated RunState transitions and the final task result
[POS]:    Session domain logic - state machine governing the task run loop
[UPDATE]: When completion/takeover rules or run-state transitions change
*/

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::types::{ActionKind, InboundEvent, MessageKind};

/// `data.biz_type` value that also signals manual intervention
pub const TAKE_OVER_BIZ_TYPE: &str = "take_over";

/// Lifecycle of one task invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Connecting,
    AwaitingResponse,
    PausedForTakeover,
    Completed,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Connecting => "connecting",
            RunState::AwaitingResponse => "awaiting_response",
            RunState::PausedForTakeover => "paused_for_takeover",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Signals that drive transitions outside of inbound events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    /// Connected and the task request was sent
    Submitted,
    /// Connect or send failed
    TransportFailed(String),
    /// Operator finished the manual step
    Resume,
    Cancel,
}

/// Errors occurring during state transitions
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid transition: {from:?} -> {signal:?}")]
    InvalidTransition {
        from: RunState,
        signal: SessionSignal,
    },
}

/// Effect of feeding one inbound event to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Event arrived outside `AwaitingResponse` and was not processed
    Ignored,
    Continue,
    TakeoverRequested,
    /// Carries the final user-visible message
    Completed(String),
}

/// State machine for a single task run
#[derive(Debug)]
pub struct TaskSession {
    state: RunState,
    final_message: Option<String>,
    failure: Option<String>,
}

impl TaskSession {
    pub fn new() -> Self {
        Self {
            state: RunState::Connecting,
            final_message: None,
            failure: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn final_message(&self) -> Option<&str> {
        self.final_message.as_deref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn can_apply(&self, signal: &SessionSignal) -> bool {
        match (self.state, signal) {
            (RunState::Connecting, SessionSignal::Submitted) => true,
            (RunState::Connecting, SessionSignal::TransportFailed(_)) => true,
            (RunState::AwaitingResponse, SessionSignal::TransportFailed(_)) => true,
            (RunState::PausedForTakeover, SessionSignal::Resume) => true,
            (state, SessionSignal::Cancel) => !state.is_terminal(),
            _ => false,
        }
    }

    /// Apply an external signal
    pub fn apply(&mut self, signal: SessionSignal) -> Result<RunState, SessionError> {
        if !self.can_apply(&signal) {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                signal,
            });
        }

        let next = match signal {
            SessionSignal::Submitted | SessionSignal::Resume => RunState::AwaitingResponse,
            SessionSignal::TransportFailed(reason) => {
                self.failure = Some(reason);
                RunState::Failed
            }
            SessionSignal::Cancel => {
                self.failure = Some("cancelled".to_string());
                RunState::Failed
            }
        };

        debug!(from = %self.state, to = %next, "session transition");
        self.state = next;
        Ok(next)
    }

    /// Feed one inbound event.
    ///
    /// Only task-progress events change state: `finish` completes the task,
    /// `take_over` (action or business type) pauses it.
    pub fn observe(&mut self, event: &InboundEvent) -> Observation {
        if self.state != RunState::AwaitingResponse {
            return Observation::Ignored;
        }
        if event.kind != MessageKind::TaskProgress {
            return Observation::Continue;
        }

        let action = event.agent_action();
        let action_kind = action.as_ref().map(|action| action.kind());

        if action_kind == Some(ActionKind::Finish) {
            let message = action
                .map(|action| action.message.unwrap_or_default())
                .unwrap_or_default();
            info!(result = %message, "task finished");
            self.final_message = Some(message.clone());
            self.state = RunState::Completed;
            return Observation::Completed(message);
        }

        if action_kind == Some(ActionKind::TakeOver) || event.biz_type() == Some(TAKE_OVER_BIZ_TYPE) {
            info!("takeover requested");
            self.state = RunState::PausedForTakeover;
            return Observation::TakeoverRequested;
        }

        Observation::Continue
    }
}

impl Default for TaskSession {
    fn default() -> Self {
        Self::new()
    }
}
