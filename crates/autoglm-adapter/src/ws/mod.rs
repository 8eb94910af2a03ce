/*
[INPUT]:  WebSocket configuration and inbound frames
[OUTPUT]: Classified task/session events and outbound task submission
[POS]:    WebSocket layer - real-time agent event stream
[UPDATE]: When adding new message types or changing connection logic
*/

pub mod client;
pub mod message;

pub use client::AutoglmWebSocket;
pub use message::{classify_error, classify_text};
