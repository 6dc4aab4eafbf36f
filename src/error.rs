//! Error types for the event system

/// Errors surfaced by [`Emitter`](crate::Emitter) operations.
///
/// Both variants are local contract violations raised immediately to the
/// caller. Panics raised by a subscriber's callback are never caught or
/// wrapped; they unwind through `emit` untouched.
#[derive(Debug, thiserror::Error)]
pub enum EmitterError {
    /// `subscribe` or `once` was called without a usable callback
    #[error("invalid callback: {0}")]
    InvalidCallback(String),

    /// `emit` was called with an event descriptor carrying no event type
    #[error("invalid event: {0}")]
    InvalidEvent(String),
}
