/*
[INPUT]:  Scripted agent frames and recorded run-loop callbacks
[OUTPUT]: Mock agent endpoint, recording sink, scripted operator prompt
[POS]:    Test infrastructure - shared across CLI integration tests
[UPDATE]: When EventSink/TakeoverPrompt or the server script pattern change
*/

#![allow(dead_code)]

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use autoglm_adapter::{AutoglmWebSocket, ClientConfig, InboundEvent, TaskRequest};
use autoglm_cli::{EventSink, TakeoverPrompt};

pub const TEST_API_KEY: &str = "test-api-key";

/// Serve one client: record its text frames and answer the first with `script`.
pub async fn spawn_agent(script: Vec<String>) -> (String, mpsc::UnboundedReceiver<String>) {
    spawn_agent_with(script, false).await
}

/// Like [`spawn_agent`], closing the socket right after the script when `hang_up` is set.
pub async fn spawn_agent_with(
    script: Vec<String>,
    hang_up: bool,
) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock agent");
    let url = format!("ws://{}/", listener.local_addr().expect("local addr"));
    let (frames_tx, frames_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(ws) = accept_async(stream).await else {
            return;
        };
        let (mut write, mut read) = ws.split();
        let mut pending = Some(script);

        while let Some(Ok(message)) = read.next().await {
            match message {
                Message::Text(text) => {
                    let _ = frames_tx.send(text.to_string());
                    let Some(frames) = pending.take() else {
                        continue;
                    };
                    for frame in frames {
                        if write.send(Message::Text(frame.into())).await.is_err() {
                            return;
                        }
                    }
                    if hang_up {
                        let _ = write.close().await;
                        return;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    (url, frames_rx)
}

/// Accepts the TCP connection and then stays silent
pub async fn spawn_mute_agent() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mute agent");
    let url = format!("ws://{}/", listener.local_addr().expect("local addr"));
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(stream);
        }
    });
    url
}

pub fn client_for(url: &str, connect_timeout: Duration) -> AutoglmWebSocket {
    AutoglmWebSocket::new(
        ClientConfig::new(TEST_API_KEY)
            .with_endpoint(url)
            .with_connect_timeout(connect_timeout),
    )
}

pub fn session_frame() -> String {
    json!({
        "msg_type": "server_session",
        "data": {"biz_type": "init_session", "vm_state": "running", "vm_id": "vm-0001"}
    })
    .to_string()
}

pub fn agent_frame(action: Value) -> String {
    json!({
        "msg_type": "server_task",
        "data": {"biz_type": "test_agent", "data_type": "data_agent", "data_agent": action}
    })
    .to_string()
}

/// Sink callback, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Request(String),
    Event(InboundEvent),
    Takeover,
    Resume,
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<Recorded>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<&InboundEvent> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Recorded::Event(event) => Some(event),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn on_request(&mut self, request: &TaskRequest) {
        self.calls.push(Recorded::Request(request.instruction().to_string()));
    }

    async fn on_event(&mut self, event: &InboundEvent) {
        self.calls.push(Recorded::Event(event.clone()));
    }

    async fn on_takeover(&mut self) {
        self.calls.push(Recorded::Takeover);
    }

    async fn on_resume(&mut self) {
        self.calls.push(Recorded::Resume);
    }
}

/// Resumes immediately, counting how often it was asked
#[derive(Debug, Default)]
pub struct ImmediateResume {
    pub prompts: usize,
}

#[async_trait]
impl TakeoverPrompt for ImmediateResume {
    async fn wait_for_operator(&mut self) -> anyhow::Result<()> {
        self.prompts += 1;
        Ok(())
    }
}

/// Never resumes; a paused run only ends through cancellation
pub struct NeverResume;

#[async_trait]
impl TakeoverPrompt for NeverResume {
    async fn wait_for_operator(&mut self) -> anyhow::Result<()> {
        std::future::pending::<()>().await;
        Ok(())
    }
}
