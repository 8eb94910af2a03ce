/*
[INPUT]:  `task` subcommand arguments and the shutdown token
[OUTPUT]: Console transcript, JSON audit log, exit code for the task run
[POS]:    CLI layer - task command wiring (settings -> client -> run loop)
[UPDATE]: When task flags, console output, or audit logging change
*/

use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use console::style;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info_span, warn};
use uuid::Uuid;

use autoglm_adapter::{AutoglmWebSocket, InboundEvent, RunState, TaskRequest};
use autoglm_cli::{
    AuditLog, EventSink, FailureReason, FileSettings, Overrides, RunOutcome, TaskRunner,
    TaskSettings, render,
};

use super::prompt::OperatorPrompt;

const SEPARATOR_WIDTH: usize = 60;

#[derive(Args, Debug)]
pub struct TaskArgs {
    /// Task instruction to send
    pub instruction: String,
    /// AutoGLM API key
    #[arg(long, env = "AUTOGLM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// Conversation ID (for context)
    #[arg(long, default_value = "")]
    pub conversation_id: String,
    /// WebSocket endpoint
    #[arg(long, env = "AUTOGLM_ENDPOINT")]
    pub endpoint: Option<String>,
    /// Directory for JSON audit logs
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
    /// Do not write a JSON audit log
    #[arg(long)]
    pub no_audit_log: bool,
    /// Seconds to wait for the connection handshake
    #[arg(long, value_name = "SECS")]
    pub connect_timeout: Option<u64>,
    /// YAML settings file
    #[arg(long = "config", value_name = "PATH")]
    pub config_path: Option<PathBuf>,
}

pub async fn run_task(args: TaskArgs, shutdown: CancellationToken) -> Result<i32> {
    let file = match &args.config_path {
        Some(path) => FileSettings::from_file(path)?,
        None => FileSettings::default(),
    };
    let settings = TaskSettings::resolve(
        args.instruction,
        args.conversation_id,
        !args.no_audit_log,
        Overrides {
            api_key: args.api_key,
            endpoint: args.endpoint,
            log_dir: args.log_dir,
            connect_timeout_secs: args.connect_timeout,
        },
        file,
    )?;

    let run_id = Uuid::new_v4().to_string();
    let span = info_span!("task", run_id = %run_id);

    let audit = if settings.audit_log {
        match AuditLog::create(&settings.log_dir, &settings.instruction, &run_id).await {
            Ok(log) => {
                println!("📝 Logging to: {}", log.path().display());
                Some(log)
            }
            Err(err) => {
                warn!(error = %err, "audit log disabled");
                None
            }
        }
    } else {
        None
    };

    println!("🔗 Connecting to AutoGLM...");
    let client = AutoglmWebSocket::new(settings.client_config());
    let mut runner = TaskRunner::new(
        client,
        ConsoleSink::new(audit),
        OperatorPrompt::default(),
        shutdown,
    );
    let request = TaskRequest::new(settings.instruction.clone(), settings.conversation_id.clone());
    let outcome = runner.run(request).instrument(span).await;

    report_outcome(&outcome);
    if let Some(audit) = runner.into_sink().audit {
        println!(
            "📝 {} messages saved to {}",
            audit.document().messages.len(),
            audit.path().display()
        );
    }
    Ok(outcome.exit_code())
}

fn report_outcome(outcome: &RunOutcome) {
    match (&outcome.state, &outcome.failure) {
        (RunState::Completed, _) => {
            println!("{}", separator());
            println!("{}", style("✅ Task complete").green().bold());
        }
        (_, Some(FailureReason::ConnectTimeout(waited))) => {
            println!(
                "{} after {}s",
                style("❌ Timed out connecting to AutoGLM").red(),
                waited.as_secs_f32()
            );
        }
        (_, Some(FailureReason::Connect(reason))) => {
            println!("{} ({reason})", style("❌ Failed to connect to AutoGLM").red());
        }
        (_, Some(FailureReason::Send(reason))) => {
            println!("{} ({reason})", style("❌ Failed to send task").red());
        }
        (_, Some(FailureReason::Cancelled)) => {
            println!("\n{}", style("🛑 Task interrupted by user").yellow());
        }
        (_, Some(FailureReason::ConnectionLost)) | (_, None) => {
            println!(
                "{}",
                style("❌ Connection closed before the task finished").red()
            );
        }
    }
}

fn separator() -> String {
    "─".repeat(SEPARATOR_WIDTH)
}

/// Prints each event and mirrors it into the audit log
struct ConsoleSink {
    audit: Option<AuditLog>,
}

impl ConsoleSink {
    fn new(audit: Option<AuditLog>) -> Self {
        Self { audit }
    }
}

#[async_trait]
impl EventSink for ConsoleSink {
    async fn on_request(&mut self, request: &TaskRequest) {
        if let Some(audit) = self.audit.as_mut()
            && let Err(err) = audit.log_request(request).await
        {
            warn!(error = %err, "failed to write request to audit log");
        }
        println!("📤 Sending task: {}", request.instruction());
        println!("⏳ Waiting for response...");
        println!("{}", separator());
    }

    async fn on_event(&mut self, event: &InboundEvent) {
        if let Some(audit) = self.audit.as_mut()
            && let Err(err) = audit.log_response(event).await
        {
            warn!(error = %err, "failed to write event to audit log");
        }
        println!("{}", render(event));
    }

    async fn on_takeover(&mut self) {
        println!();
        println!("{}", style("📱 Manual action needed on the device!").yellow().bold());
        println!("💡 Complete the required step in the AutoGLM app");
        println!("⏭️  Press ENTER once you are done...");
    }

    async fn on_resume(&mut self) {
        println!("▶️  Resuming automation...");
        println!("{}", separator());
    }
}
