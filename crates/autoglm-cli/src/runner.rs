/*
[INPUT]:  Connected-to-be WebSocket client, task request, operator prompt, shutdown token
[OUTPUT]: RunOutcome (final RunState, result message, exit code)
[POS]:    Orchestration layer - foreground run loop driving the session state machine
[UPDATE]: When changing wait/resume/cancel semantics or collaborator hooks
*/

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use autoglm_adapter::{
    AutoglmError, AutoglmWebSocket, InboundEvent, Observation, RunState, SessionSignal,
    TaskRequest, TaskSession,
};

/// Receives everything the run loop sees, for display and logging
#[async_trait]
pub trait EventSink: Send {
    async fn on_request(&mut self, request: &TaskRequest);

    async fn on_event(&mut self, event: &InboundEvent);

    async fn on_takeover(&mut self) {}

    async fn on_resume(&mut self) {}
}

/// Source of the operator's "manual step done" signal
#[async_trait]
pub trait TakeoverPrompt: Send {
    async fn wait_for_operator(&mut self) -> anyhow::Result<()>;
}

/// Where a failed run gave up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Handshake did not finish within the configured wait
    ConnectTimeout(Duration),
    Connect(String),
    Send(String),
    ConnectionLost,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub state: RunState,
    pub final_message: Option<String>,
    pub failure: Option<FailureReason>,
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self.state {
            RunState::Completed => 0,
            _ => 1,
        }
    }
}

/// Drives one task from connect to a terminal state
pub struct TaskRunner<S, P> {
    client: AutoglmWebSocket,
    sink: S,
    prompt: P,
    shutdown: CancellationToken,
}

impl<S: EventSink, P: TakeoverPrompt> TaskRunner<S, P> {
    pub fn new(client: AutoglmWebSocket, sink: S, prompt: P, shutdown: CancellationToken) -> Self {
        Self {
            client,
            sink,
            prompt,
            shutdown,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Connect, submit `request`, and drain events until the task finishes,
    /// fails, or is cancelled. The connection is closed on every path.
    pub async fn run(&mut self, request: TaskRequest) -> RunOutcome {
        let mut session = TaskSession::new();
        let outcome = self.drive(&mut session, request).await;
        self.client.close().await;
        info!(state = %outcome.state, "task run finished");
        outcome
    }

    async fn drive(&mut self, session: &mut TaskSession, request: TaskRequest) -> RunOutcome {
        let Some(mut events) = self.client.take_receiver() else {
            let reason = "event receiver already taken".to_string();
            transition(session, SessionSignal::TransportFailed(reason.clone()));
            return fail(session, FailureReason::Connect(reason));
        };

        info!(endpoint = %self.client.config().endpoint, "connecting");
        let connected = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(AutoglmError::Cancelled),
            result = self.client.connect() => result,
        };
        match connected {
            Ok(()) => {}
            Err(AutoglmError::Cancelled) => {
                transition(session, SessionSignal::Cancel);
                return fail(session, FailureReason::Cancelled);
            }
            Err(err) => {
                warn!(error = %err, open_failure = err.is_open_failure(), "connect failed");
                transition(session, SessionSignal::TransportFailed(err.to_string()));
                let reason = if err.is_timeout() {
                    FailureReason::ConnectTimeout(self.client.config().connect_timeout)
                } else {
                    FailureReason::Connect(err.to_string())
                };
                return fail(session, reason);
            }
        }

        self.sink.on_request(&request).await;
        if let Err(err) = self.client.send(&request).await {
            warn!(error = %err, "task submission failed");
            transition(session, SessionSignal::TransportFailed(err.to_string()));
            return fail(session, FailureReason::Send(err.to_string()));
        }
        transition(session, SessionSignal::Submitted);
        info!(instruction = %request.instruction(), "task submitted");

        loop {
            match session.state() {
                RunState::AwaitingResponse => {
                    tokio::select! {
                        biased;
                        _ = self.shutdown.cancelled() => {
                            transition(session, SessionSignal::Cancel);
                            return fail(session, FailureReason::Cancelled);
                        }
                        next = events.recv() => {
                            let Some(event) = next else {
                                warn!("event stream closed before the task finished");
                                transition(
                                    session,
                                    SessionSignal::TransportFailed("connection closed".to_string()),
                                );
                                return fail(session, FailureReason::ConnectionLost);
                            };
                            self.sink.on_event(&event).await;
                            if session.observe(&event) == Observation::TakeoverRequested {
                                self.sink.on_takeover().await;
                            }
                        }
                    }
                }
                RunState::PausedForTakeover => {
                    tokio::select! {
                        biased;
                        _ = self.shutdown.cancelled() => {
                            transition(session, SessionSignal::Cancel);
                            return fail(session, FailureReason::Cancelled);
                        }
                        resumed = self.prompt.wait_for_operator() => {
                            if let Err(err) = resumed {
                                warn!(error = %err, "operator prompt failed");
                                transition(session, SessionSignal::Cancel);
                                return fail(session, FailureReason::Cancelled);
                            }
                            transition(session, SessionSignal::Resume);
                            self.sink.on_resume().await;
                        }
                    }
                }
                RunState::Completed => {
                    return RunOutcome {
                        state: RunState::Completed,
                        final_message: session.final_message().map(str::to_string),
                        failure: None,
                    };
                }
                state @ (RunState::Connecting | RunState::Failed) => {
                    warn!(%state, "run loop reached an unexpected state");
                    return fail(session, FailureReason::ConnectionLost);
                }
            }
        }
    }
}

fn transition(session: &mut TaskSession, signal: SessionSignal) {
    if let Err(err) = session.apply(signal) {
        warn!(error = %err, "ignored session signal");
    }
}

fn fail(session: &TaskSession, reason: FailureReason) -> RunOutcome {
    RunOutcome {
        state: session.state(),
        final_message: None,
        failure: Some(reason),
    }
}
