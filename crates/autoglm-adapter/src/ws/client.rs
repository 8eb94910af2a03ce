/*
[INPUT]:  ClientConfig (endpoint, bearer API key, timeouts)
[OUTPUT]: Classified inbound events via a bounded channel; outbound task frames
[POS]:    WebSocket layer - connection lifecycle and frame pumping
[UPDATE]: When changing handshake, send or close semantics
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{AutoglmError, Result};
use crate::types::InboundEvent;
use crate::ws::message::{classify_error, classify_text};

/// WebSocket client for the AutoGLM agent service.
///
/// One instance owns at most one connection. Inbound frames are classified on
/// the background task and delivered in arrival order through the receiver
/// returned by [`AutoglmWebSocket::take_receiver`].
#[derive(Debug)]
pub struct AutoglmWebSocket {
    config: ClientConfig,
    connected: Arc<AtomicBool>,
    event_tx: Option<mpsc::Sender<InboundEvent>>,
    event_rx: Option<mpsc::Receiver<InboundEvent>>,
    outbound_tx: Option<mpsc::Sender<WsMessage>>,
    worker: Option<JoinHandle<()>>,
}

impl AutoglmWebSocket {
    pub fn new(config: ClientConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        Self {
            config,
            connected: Arc::new(AtomicBool::new(false)),
            event_tx: Some(tx),
            event_rx: Some(rx),
            outbound_tx: None,
            worker: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the event receiver (available once)
    pub fn take_receiver(&mut self) -> Option<mpsc::Receiver<InboundEvent>> {
        self.event_rx.take()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Open the connection and start the receive task.
    ///
    /// Waits at most `connect_timeout` for the handshake. There is no retry.
    pub async fn connect(&mut self) -> Result<()> {
        if self.worker.is_some() || self.event_tx.is_none() {
            return Err(AutoglmError::AlreadyConnected);
        }

        let request = self.handshake_request()?;
        let timeout = self.config.connect_timeout;
        info!(endpoint = %self.config.endpoint, ?timeout, "ws connecting");

        let ws_stream = match tokio::time::timeout(timeout, connect_async(request)).await {
            Ok(Ok((ws_stream, response))) => {
                debug!(status = %response.status(), "ws handshake complete");
                ws_stream
            }
            Ok(Err(err)) => {
                warn!(error = %err, "ws handshake failed");
                return Err(AutoglmError::WebSocket(err.to_string()));
            }
            Err(_) => {
                warn!(?timeout, "ws handshake timed out");
                return Err(AutoglmError::ConnectTimeout { duration: timeout });
            }
        };

        let Some(event_tx) = self.event_tx.take() else {
            return Err(AutoglmError::AlreadyConnected);
        };
        let (write, read) = ws_stream.split();
        let (outbound_tx, outbound_rx) = mpsc::channel(16);

        self.connected.store(true, Ordering::Release);
        self.outbound_tx = Some(outbound_tx);
        self.worker = Some(tokio::spawn(pump_frames(
            write,
            read,
            outbound_rx,
            event_tx,
            self.connected.clone(),
        )));

        info!("ws connected");
        Ok(())
    }

    /// Serialize `payload` and write it as a text frame.
    pub async fn send<T: Serialize + ?Sized>(&self, payload: &T) -> Result<()> {
        if !self.is_connected() {
            return Err(AutoglmError::NotConnected);
        }
        let sender = self.outbound_tx.as_ref().ok_or(AutoglmError::NotConnected)?;
        let body = serde_json::to_string(payload)?;
        let bytes = body.len();

        sender
            .send(WsMessage::Text(body.into()))
            .await
            .map_err(|_| AutoglmError::WebSocket("WebSocket send channel closed".to_string()))?;

        debug!(bytes, "ws frame queued");
        Ok(())
    }

    /// Close the connection and join the receive task. Safe to call repeatedly.
    pub async fn close(&mut self) {
        self.connected.store(false, Ordering::Release);
        // Dropping the outbound sender makes the task send a close frame and exit.
        self.outbound_tx = None;

        let Some(mut worker) = self.worker.take() else {
            return;
        };

        match tokio::time::timeout(self.config.close_timeout, &mut worker).await {
            Ok(Ok(())) => debug!("ws receive task joined"),
            Ok(Err(err)) => warn!(error = %err, "ws receive task ended abnormally"),
            Err(_) => {
                warn!(timeout = ?self.config.close_timeout, "ws receive task did not stop; aborting");
                worker.abort();
            }
        }
        info!("ws closed");
    }

    fn handshake_request(&self) -> Result<Request> {
        let url = self.config.endpoint_url()?;
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|err| AutoglmError::WebSocket(err.to_string()))?;

        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
            .map_err(|err| AutoglmError::InvalidHeader(err.to_string()))?;
        request.headers_mut().insert(AUTHORIZATION, bearer);
        Ok(request)
    }
}

impl Drop for AutoglmWebSocket {
    fn drop(&mut self) {
        self.connected.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

async fn pump_frames<W, R>(
    mut write: W,
    mut read: R,
    mut outbound_rx: mpsc::Receiver<WsMessage>,
    event_tx: mpsc::Sender<InboundEvent>,
    connected: Arc<AtomicBool>,
) where
    W: futures_util::Sink<WsMessage> + Unpin,
    R: futures_util::Stream<
            Item = std::result::Result<WsMessage, tokio_tungstenite::tungstenite::Error>,
        > + Unpin,
{
    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(message) => {
                        if write.send(message).await.is_err() {
                            let _ = event_tx.send(classify_error("failed to write frame")).await;
                            break;
                        }
                    }
                    None => {
                        let _ = write.send(WsMessage::Close(None)).await;
                        break;
                    }
                }
            }
            incoming = read.next() => {
                match incoming {
                    Some(Ok(WsMessage::Close(frame))) => {
                        debug!(?frame, "ws close frame received");
                        let _ = write.send(WsMessage::Close(None)).await;
                        break;
                    }
                    Some(Ok(WsMessage::Ping(_))) | Some(Ok(WsMessage::Pong(_))) => {}
                    Some(Ok(message)) => {
                        if let Some(event) = classify_frame(message)
                            && event_tx.send(event).await.is_err()
                        {
                            break;
                        }
                    }
                    Some(Err(err)) => {
                        warn!(error = %err, "ws receive failed");
                        let _ = event_tx.send(classify_error(&err)).await;
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    connected.store(false, Ordering::Release);
    debug!("ws receive task finished");
}

fn classify_frame(message: WsMessage) -> Option<InboundEvent> {
    match message {
        WsMessage::Text(text) => Some(classify_text(text.as_str())),
        WsMessage::Binary(bytes) => match std::str::from_utf8(&bytes) {
            Ok(text) => Some(classify_text(text)),
            Err(_) => {
                debug!(bytes = bytes.len(), "ws binary frame is not utf-8; ignored");
                None
            }
        },
        _ => None,
    }
}
