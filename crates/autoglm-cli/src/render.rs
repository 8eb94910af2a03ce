/*
[INPUT]:  Classified InboundEvent values (with swipe enrichment)
[OUTPUT]: One human-readable transcript line per event
[POS]:    Presentation layer - console formatting (no protocol decisions)
[UPDATE]: When new message types or agent actions need their own line
*/

use serde_json::Value;

use autoglm_adapter::{ActionKind, AgentAction, InboundEvent, MessageKind};

const VM_ID_PREVIEW_CHARS: usize = 12;
const SESSION_ID_PREVIEW_CHARS: usize = 16;
const API_MESSAGE_PREVIEW_CHARS: usize = 100;

/// Render one inbound event. A top-level `error` string wins over `msg_type`.
pub fn render(event: &InboundEvent) -> String {
    if let Some(message) = event.error_message() {
        return format!("❌ Error: {message}");
    }

    match event.kind {
        MessageKind::Error => "❌ Error: unknown error".to_string(),
        MessageKind::Raw => format!("📨 Raw message: {}", event.raw_text().unwrap_or_default()),
        MessageKind::Init => "✅ Connected to AutoGLM".to_string(),
        MessageKind::Session => render_session(event),
        MessageKind::ClientEcho => render_client_echo(event),
        MessageKind::TaskProgress => render_task(event),
        MessageKind::Unknown => render_unknown(event),
    }
}

fn render_session(event: &InboundEvent) -> String {
    let session = event.session().unwrap_or_default();
    let vm_state = session.vm_state.as_deref().unwrap_or("unknown");
    let vm_id = session.vm_id.as_deref().unwrap_or("unknown");

    match session.biz_type.as_deref() {
        Some("init_vm") => format!("🔧 VM initializing: {vm_state}"),
        Some("init_session") => format!(
            "🖥️  VM {vm_state} (ID: {})",
            preview(vm_id, VM_ID_PREVIEW_CHARS)
        ),
        _ => format!("🖥️  VM {vm_state} (ID: {vm_id})"),
    }
}

fn render_client_echo(event: &InboundEvent) -> String {
    let data = event.data();
    let field = |key: &str| {
        data.and_then(|data| data.get(key))
            .and_then(Value::as_str)
            .unwrap_or("")
    };
    let instruction = field("instruction");
    let session_id = field("session_id");

    if session_id.is_empty() {
        format!("📋 Task: {instruction}")
    } else {
        format!(
            "📋 Task: {instruction} (session: {})",
            preview(session_id, SESSION_ID_PREVIEW_CHARS)
        )
    }
}

fn render_task(event: &InboundEvent) -> String {
    let action = event.agent_action().unwrap_or_else(|| AgentAction::from_value(&Value::Null));
    let round = action.round_or_default();
    let message = action.message_or_empty();

    match event.biz_type() {
        Some("take_over") => return format!("⏸️  Round {round}: manual action needed - {message}"),
        Some("notify_task") => return format!("📢 Round {round}: notice - {message}"),
        _ => {}
    }

    match action.kind() {
        ActionKind::Launch => {
            let app_name = action.app_name.as_deref().unwrap_or("");
            match action.package_name.as_deref().filter(|name| !name.is_empty()) {
                Some(package) => format!("🚀 Round {round}: launch {app_name} ({package})"),
                None => format!("🚀 Round {round}: launch {app_name}"),
            }
        }
        ActionKind::Tap => {
            let point = action
                .center_point
                .as_ref()
                .map(Value::to_string)
                .unwrap_or_else(|| "[0,0]".to_string());
            format!("👆 Round {round}: tap {point}")
        }
        ActionKind::Type => format!(
            "⌨️ Round {round}: type '{}'",
            action.argument.as_deref().unwrap_or("")
        ),
        ActionKind::Swipe => match event.swipe_direction.as_deref() {
            Some(direction) => format!("👋 Round {round}: {direction}"),
            None => format!("👋 Round {round}: swipe gesture"),
        },
        ActionKind::Back => format!("⬅️  Round {round}: navigate back"),
        ActionKind::CallApi => format!(
            "🔗 Round {round}: API call - {}",
            preview(message, API_MESSAGE_PREVIEW_CHARS)
        ),
        ActionKind::TakeOver => format!("⏸️  Round {round}: manual action needed - {message}"),
        ActionKind::Finish => format!("✅ Round {round}: {message}"),
        ActionKind::Other => {
            let name = if action.action.is_empty() {
                "unknown"
            } else {
                action.action.as_str()
            };
            format!("🔄 Round {round}: {name} - {message}")
        }
    }
}

fn render_unknown(event: &InboundEvent) -> String {
    let msg_type = event.msg_type().unwrap_or("unknown");
    let body = event
        .as_json()
        .map(Value::to_string)
        .unwrap_or_default();
    format!("📨 {msg_type}: {body}")
}

/// First `max_chars` characters, with "..." when cut
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
