/*
[INPUT]:  Outbound task requests and classified inbound events
[OUTPUT]: Per-task JSON transcript under the log directory
[POS]:    Persistence layer - best-effort append-only audit log
[UPDATE]: When the transcript layout or file naming changes
*/

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

use autoglm_adapter::{EventPayload, InboundEvent, TaskRequest};

const INSTRUCTION_PREFIX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Request,
    Response,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub data: Value,
}

/// On-disk transcript document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditDocument {
    pub run_id: String,
    pub timestamp: String,
    pub task_instruction: String,
    pub messages: Vec<AuditEntry>,
}

/// JSON transcript of one task run, rewritten after every entry
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    document: AuditDocument,
}

impl AuditLog {
    pub async fn create(dir: &Path, instruction: &str, run_id: &str) -> Result<Self> {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("create log directory {}", dir.display()))?;

        let now = Local::now();
        let file_name = format!(
            "{}_{}.json",
            now.format("%Y%m%d_%H%M%S"),
            sanitize_instruction(instruction)
        );

        let log = Self {
            path: dir.join(file_name),
            document: AuditDocument {
                run_id: run_id.to_string(),
                timestamp: now.to_rfc3339(),
                task_instruction: instruction.to_string(),
                messages: Vec::new(),
            },
        };
        log.save().await?;
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &AuditDocument {
        &self.document
    }

    pub async fn log_request(&mut self, request: &TaskRequest) -> Result<()> {
        let data = serde_json::to_value(request).context("serialize task request")?;
        self.append(EntryKind::Request, data).await
    }

    pub async fn log_response(&mut self, event: &InboundEvent) -> Result<()> {
        self.append(EntryKind::Response, event_log_value(event)).await
    }

    async fn append(&mut self, kind: EntryKind, data: Value) -> Result<()> {
        self.document.messages.push(AuditEntry {
            timestamp: Local::now().to_rfc3339(),
            kind,
            data,
        });
        self.save().await
    }

    async fn save(&self) -> Result<()> {
        let content =
            serde_json::to_string_pretty(&self.document).context("serialize audit log")?;
        fs::write(&self.path, content)
            .await
            .with_context(|| format!("write audit log {}", self.path.display()))?;
        Ok(())
    }
}

/// Keep alphanumerics, space, `-` and `_` from the first 50 characters.
pub fn sanitize_instruction(instruction: &str) -> String {
    let kept: String = instruction
        .chars()
        .take(INSTRUCTION_PREFIX_CHARS)
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    kept.trim().replace(' ', "_")
}

/// Shape an inbound event the way it is written to the transcript
pub fn event_log_value(event: &InboundEvent) -> Value {
    match &event.payload {
        EventPayload::Raw(text) => serde_json::json!({ "raw_message": text }),
        EventPayload::Json(value) => {
            let mut value = value.clone();
            if let (Some(direction), Some(object)) =
                (event.swipe_direction.as_ref(), value.as_object_mut())
            {
                object.insert(
                    "swipe_direction_info".to_string(),
                    Value::String(direction.clone()),
                );
            }
            value
        }
    }
}
