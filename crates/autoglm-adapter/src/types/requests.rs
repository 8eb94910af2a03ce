/*
[INPUT]:  Task instruction and optional conversation context
[OUTPUT]: Outbound task-submission envelope ready for serialization
[POS]:    Data layer - request types for protocol communication
[UPDATE]: When the outbound envelope or its fixed tags change
*/

use serde::{Deserialize, Serialize};

pub const CLIENT_MSG_TYPE: &str = "client_test";
pub const TASK_BIZ_TYPE: &str = "test_agent";

/// Envelope submitting one task to the remote agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Epoch milliseconds at build time
    pub timestamp: i64,
    /// Empty string means no prior context
    pub conversation_id: String,
    pub msg_type: String,
    pub msg_id: String,
    pub data: TaskRequestData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequestData {
    pub biz_type: String,
    pub instruction: String,
}

impl TaskRequest {
    /// Build an envelope stamped with the current time.
    ///
    /// The instruction is forwarded verbatim; empty strings are accepted.
    pub fn new(instruction: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self::with_timestamp(
            instruction,
            conversation_id,
            chrono::Utc::now().timestamp_millis(),
        )
    }

    pub fn with_timestamp(
        instruction: impl Into<String>,
        conversation_id: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            timestamp,
            conversation_id: conversation_id.into(),
            msg_type: CLIENT_MSG_TYPE.to_string(),
            msg_id: String::new(),
            data: TaskRequestData {
                biz_type: TASK_BIZ_TYPE.to_string(),
                instruction: instruction.into(),
            },
        }
    }

    pub fn instruction(&self) -> &str {
        &self.data.instruction
    }
}
