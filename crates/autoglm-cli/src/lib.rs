/*
[INPUT]:  Public API exports for autoglm-cli crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod audit;
pub mod config;
pub mod render;
pub mod runner;

// Re-export main types for convenience
pub use audit::AuditLog;
pub use config::{FileSettings, Overrides, TaskSettings};
pub use render::render;
pub use runner::{EventSink, FailureReason, RunOutcome, TakeoverPrompt, TaskRunner};
