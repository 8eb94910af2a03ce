/*
[INPUT]:  Scripted server frames for a test scenario
[OUTPUT]: In-process WebSocket server capturing handshake headers and client frames
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for autoglm-adapter tests

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

/// Handle to a single-connection mock agent server
pub struct MockAgentServer {
    pub url: String,
    pub authorization: oneshot::Receiver<Option<String>>,
    pub received: mpsc::UnboundedReceiver<String>,
}

/// Accept one client, wait for its first text frame, then play `script`.
pub async fn spawn_agent_server(script: Vec<String>) -> MockAgentServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock server");
    let url = format!("ws://{}/ws", listener.local_addr().expect("local addr"));
    let (auth_tx, auth_rx) = oneshot::channel();
    let (received_tx, received_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let callback = move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            let header = request
                .headers()
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let _ = auth_tx.send(header);
            Ok(response)
        };
        let Ok(ws) = accept_hdr_async(stream, callback).await else {
            return;
        };
        let (mut write, mut read) = ws.split();

        let mut script = Some(script);
        while let Some(Ok(message)) = read.next().await {
            match message {
                Message::Text(text) => {
                    let _ = received_tx.send(text.to_string());
                    if let Some(frames) = script.take() {
                        for frame in frames {
                            if write.send(Message::Text(frame.into())).await.is_err() {
                                return;
                            }
                        }
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    MockAgentServer {
        url,
        authorization: auth_rx,
        received: received_rx,
    }
}

/// Listener that accepts TCP but never answers the WebSocket handshake
pub async fn spawn_silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind silent server");
    let url = format!("ws://{}/ws", listener.local_addr().expect("local addr"));
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(stream);
        }
    });
    url
}

/// Address with nothing listening on it
pub async fn unused_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind probe");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("ws://{addr}/ws")
}

pub fn mock_api_key() -> String {
    "test-api-key".to_string()
}
