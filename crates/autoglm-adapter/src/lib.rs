/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public AutoGLM adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod config;
pub mod error;
pub mod gesture;
pub mod session;
pub mod types;
pub mod ws;

pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use error::{AutoglmError, Result};

pub use gesture::{describe_swipe, resolve_direction, resolve_json};

pub use session::{Observation, RunState, SessionError, SessionSignal, TaskSession};

// Re-export all types
pub use types::*;

pub use ws::{AutoglmWebSocket, classify_error, classify_text};
