/*
[INPUT]:  Task runs against an in-process mock agent
[OUTPUT]: Run loop, takeover, cancellation, and audit log verification
[POS]:    Integration test layer - end-to-end task flow
[UPDATE]: When run loop semantics or the audit transcript change
*/

mod common;

use std::time::{Duration, Instant};

use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::time::timeout;
use tokio_test::assert_ok;
use tokio_util::sync::CancellationToken;

use autoglm_adapter::{ActionKind, MessageKind, RunState, TaskRequest};
use autoglm_cli::{AuditLog, EventSink, FailureReason, TaskRunner, render};
use common::{
    ImmediateResume, NeverResume, Recorded, RecordingSink, agent_frame, client_for,
    session_frame, spawn_agent, spawn_agent_with, spawn_mute_agent,
};

const RUN_LIMIT: Duration = Duration::from_secs(10);

#[tokio::test]
async fn test_open_maps_completes() {
    let script = vec![
        session_frame(),
        agent_frame(json!({
            "action": "launch", "round": 1, "app_name": "Maps", "package_name": "com.maps"
        })),
        agent_frame(json!({"action": "finish", "round": 2, "message": "Done"})),
    ];
    let (url, mut frames) = spawn_agent(script).await;
    let mut runner = TaskRunner::new(
        client_for(&url, Duration::from_secs(5)),
        RecordingSink::default(),
        ImmediateResume::default(),
        CancellationToken::new(),
    );

    let outcome = timeout(RUN_LIMIT, runner.run(TaskRequest::new("open maps", "")))
        .await
        .expect("run finished");

    assert_eq!(outcome.state, RunState::Completed);
    assert_eq!(outcome.final_message.as_deref(), Some("Done"));
    assert_eq!(outcome.failure, None);
    assert_eq!(outcome.exit_code(), 0);

    let sent: Value = serde_json::from_str(&frames.recv().await.expect("task frame"))
        .expect("task frame is JSON");
    assert_eq!(sent["msg_type"], "client_test");
    assert_eq!(sent["conversation_id"], "");
    assert_eq!(sent["data"]["instruction"], "open maps");

    let sink = runner.into_sink();
    assert_eq!(sink.calls[0], Recorded::Request("open maps".to_string()));
    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].kind, MessageKind::Session);
    let launch = events[1].agent_action().expect("launch action");
    assert_eq!(launch.kind(), ActionKind::Launch);
    assert_eq!(render(events[1]), "🚀 Round 1: launch Maps (com.maps)");
    assert_eq!(
        events[2].agent_action().expect("finish action").kind(),
        ActionKind::Finish
    );
}

#[tokio::test]
async fn test_takeover_pauses_until_operator_resumes() {
    let script = vec![
        agent_frame(json!({"action": "take_over", "round": 1, "message": "Log in please"})),
        agent_frame(json!({"action": "swipe", "round": 2, "start2end": [500, 800, 500, 200]})),
        agent_frame(json!({"action": "finish", "round": 3, "message": "Logged in"})),
    ];
    let (url, _frames) = spawn_agent(script).await;
    let mut runner = TaskRunner::new(
        client_for(&url, Duration::from_secs(5)),
        RecordingSink::default(),
        ImmediateResume::default(),
        CancellationToken::new(),
    );

    let outcome = timeout(RUN_LIMIT, runner.run(TaskRequest::new("log in", "conv-1")))
        .await
        .expect("run finished");
    assert_eq!(outcome.state, RunState::Completed);
    assert_eq!(outcome.final_message.as_deref(), Some("Logged in"));

    let calls = &runner.sink().calls;
    let takeover_at = calls
        .iter()
        .position(|call| *call == Recorded::Takeover)
        .expect("takeover recorded");
    assert_eq!(calls[takeover_at + 1], Recorded::Resume);
    assert!(matches!(&calls[takeover_at + 2], Recorded::Event(event)
        if event.swipe_direction.as_deref() == Some("swipe up")));
}

#[tokio::test]
async fn test_connect_timeout_fails_without_sending() {
    let url = spawn_mute_agent().await;
    let mut runner = TaskRunner::new(
        client_for(&url, Duration::from_millis(300)),
        RecordingSink::default(),
        ImmediateResume::default(),
        CancellationToken::new(),
    );

    let started = Instant::now();
    let outcome = timeout(RUN_LIMIT, runner.run(TaskRequest::new("open maps", "")))
        .await
        .expect("run finished");

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(outcome.state, RunState::Failed);
    assert_eq!(
        outcome.failure,
        Some(FailureReason::ConnectTimeout(Duration::from_millis(300)))
    );
    assert_eq!(outcome.exit_code(), 1);
    assert!(runner.sink().calls.is_empty());
}

#[tokio::test]
async fn test_dropped_connection_fails_run() {
    let (url, _frames) = spawn_agent_with(vec![session_frame()], true).await;
    let mut runner = TaskRunner::new(
        client_for(&url, Duration::from_secs(5)),
        RecordingSink::default(),
        ImmediateResume::default(),
        CancellationToken::new(),
    );

    let outcome = timeout(RUN_LIMIT, runner.run(TaskRequest::new("open maps", "")))
        .await
        .expect("run finished");

    assert_eq!(outcome.state, RunState::Failed);
    assert_eq!(outcome.failure, Some(FailureReason::ConnectionLost));
    assert_eq!(outcome.final_message, None);
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(runner.sink().events()[0].kind, MessageKind::Session);
}

#[tokio::test]
async fn test_cancel_while_paused_fails_run() {
    let script = vec![agent_frame(json!({"action": "take_over", "round": 1}))];
    let (url, _frames) = spawn_agent(script).await;
    let shutdown = CancellationToken::new();
    let mut runner = TaskRunner::new(
        client_for(&url, Duration::from_secs(5)),
        RecordingSink::default(),
        NeverResume,
        shutdown.clone(),
    );

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        shutdown.cancel();
    });

    let outcome = timeout(RUN_LIMIT, runner.run(TaskRequest::new("log in", "")))
        .await
        .expect("run finished");
    let _ = canceller.await;

    assert_eq!(outcome.state, RunState::Failed);
    assert_eq!(outcome.failure, Some(FailureReason::Cancelled));
    assert_eq!(outcome.exit_code(), 1);
    assert!(runner.sink().calls.contains(&Recorded::Takeover));
    assert!(!runner.sink().calls.contains(&Recorded::Resume));
}

#[tokio::test]
async fn test_cancel_before_connect_sends_nothing() {
    let url = spawn_mute_agent().await;
    let shutdown = CancellationToken::new();
    shutdown.cancel();
    let mut runner = TaskRunner::new(
        client_for(&url, Duration::from_secs(5)),
        RecordingSink::default(),
        ImmediateResume::default(),
        shutdown,
    );

    let outcome = timeout(RUN_LIMIT, runner.run(TaskRequest::new("open maps", "")))
        .await
        .expect("run finished");

    assert_eq!(outcome.failure, Some(FailureReason::Cancelled));
    assert!(runner.sink().calls.is_empty());
}

/// Sink that only writes the audit transcript
struct AuditSink(AuditLog);

#[async_trait::async_trait]
impl EventSink for AuditSink {
    async fn on_request(&mut self, request: &TaskRequest) {
        assert_ok!(self.0.log_request(request).await);
    }

    async fn on_event(&mut self, event: &autoglm_adapter::InboundEvent) {
        assert_ok!(self.0.log_response(event).await);
    }
}

#[tokio::test]
async fn test_audit_log_records_full_transcript() {
    let dir = TempDir::new().expect("temp dir");
    let script = vec![
        "not json".to_string(),
        agent_frame(json!({"action": "swipe", "round": 1, "start2end": [100, 100, 600, 120]})),
        agent_frame(json!({"action": "finish", "round": 2, "message": "Done"})),
    ];
    let (url, _frames) = spawn_agent(script).await;
    let audit = assert_ok!(AuditLog::create(dir.path(), "scroll the feed!", "run-1").await);
    let path = audit.path().to_path_buf();
    let mut runner = TaskRunner::new(
        client_for(&url, Duration::from_secs(5)),
        AuditSink(audit),
        ImmediateResume::default(),
        CancellationToken::new(),
    );

    let outcome = timeout(RUN_LIMIT, runner.run(TaskRequest::new("scroll the feed!", "")))
        .await
        .expect("run finished");
    assert_eq!(outcome.state, RunState::Completed);
    assert_eq!(runner.into_sink().0.document().messages.len(), 4);

    let file_name = path.file_name().and_then(|n| n.to_str()).expect("file name");
    assert!(file_name.ends_with("_scroll_the_feed.json"));

    let content = std::fs::read_to_string(&path).expect("read audit log");
    let document: Value = serde_json::from_str(&content).expect("audit log is JSON");
    assert_eq!(document["run_id"], "run-1");
    assert_eq!(document["task_instruction"], "scroll the feed!");

    let messages = document["messages"].as_array().expect("messages");
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["type"], "request");
    assert_eq!(messages[0]["data"]["data"]["instruction"], "scroll the feed!");
    assert_eq!(messages[1]["type"], "response");
    assert_eq!(messages[2]["data"]["swipe_direction_info"], "swipe right");
    assert_eq!(messages[3]["data"]["data"]["data_agent"]["action"], "finish");
}
