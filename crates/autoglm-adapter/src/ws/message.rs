/*
[INPUT]:  Raw WebSocket text frames and socket errors
[OUTPUT]: Classified InboundEvent values (with swipe enrichment)
[POS]:    WebSocket layer - message parsing and classification
[UPDATE]: When adding new message types or changing enrichment rules
*/

use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;
use tracing::{debug, info};

use crate::gesture::describe_swipe;
use crate::types::{InboundEvent, MessageKind};

const UNKNOWN_LOG_LIMIT: usize = 3;
const PARSE_FAIL_LOG_LIMIT: usize = 3;
const RAW_LOG_MAX_BYTES: usize = 1024;

static UNKNOWN_LOG_COUNT: AtomicUsize = AtomicUsize::new(0);
static PARSE_FAIL_LOG_COUNT: AtomicUsize = AtomicUsize::new(0);

/// Classify one text frame. Never fails: undecodable input becomes a raw event.
pub fn classify_text(text: &str) -> InboundEvent {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => {
            log_parse_fail_once(&"frame is not a JSON object", text);
            return InboundEvent::raw(text);
        }
        Err(err) => {
            log_parse_fail_once(&err, text);
            return InboundEvent::raw(text);
        }
    };

    let kind = value
        .get("msg_type")
        .and_then(Value::as_str)
        .map(MessageKind::from_msg_type)
        .unwrap_or(MessageKind::Unknown);

    if kind == MessageKind::Unknown {
        log_unknown_once(text);
    }

    let swipe_direction = swipe_enrichment(&value);
    let mut event = InboundEvent::json(kind, value);
    event.swipe_direction = swipe_direction;
    event
}

/// Socket-level failures are surfaced as events rather than raised.
pub fn classify_error(err: impl std::fmt::Display) -> InboundEvent {
    InboundEvent::error(err.to_string())
}

fn swipe_enrichment(value: &Value) -> Option<String> {
    let data = value.get("data")?;
    if data.get("data_type").and_then(Value::as_str) != Some("data_agent") {
        return None;
    }

    let agent = data.get("data_agent")?;
    if agent.get("action").and_then(Value::as_str) != Some("swipe") {
        return None;
    }

    Some(describe_swipe(agent.get("start2end")))
}

fn log_unknown_once(raw: &str) {
    let count = UNKNOWN_LOG_COUNT.fetch_add(1, Ordering::Relaxed);
    if count < UNKNOWN_LOG_LIMIT {
        info!(
            sample_index = count + 1,
            sample_limit = UNKNOWN_LOG_LIMIT,
            bytes = raw.len(),
            "ws message type unrecognized"
        );
        let preview = truncate_for_log(raw, RAW_LOG_MAX_BYTES);
        debug!(
            sample_index = count + 1,
            sample_limit = UNKNOWN_LOG_LIMIT,
            message = %preview,
            "ws message type unrecognized"
        );
    }
}

fn log_parse_fail_once(err: &dyn std::fmt::Display, raw: &str) {
    let count = PARSE_FAIL_LOG_COUNT.fetch_add(1, Ordering::Relaxed);
    if count < PARSE_FAIL_LOG_LIMIT {
        info!(
            sample_index = count + 1,
            sample_limit = PARSE_FAIL_LOG_LIMIT,
            error = %err,
            bytes = raw.len(),
            "ws message parse failed"
        );
        let preview = truncate_for_log(raw, RAW_LOG_MAX_BYTES);
        debug!(
            sample_index = count + 1,
            sample_limit = PARSE_FAIL_LOG_LIMIT,
            error = %err,
            message = %preview,
            "ws message parse failed"
        );
    }
}

pub(crate) fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut cut = max_len;
    while !value.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut out = String::with_capacity(cut + 3);
    out.push_str(&value[..cut]);
    out.push_str("...");
    out
}
