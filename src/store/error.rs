//! Normalized store error shape.

use std::fmt;
use std::time::Duration;

/// Classification of a failed store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// An existence-gated write found the key already present.
    AlreadyExists,
    /// A presence-gated operation found no record for the key.
    NotFound,
    /// The call exceeded its deadline and was cancelled.
    Timeout,
    /// The request never produced a usable response (connection, dispatch).
    Transport,
    /// Anything else the store reported.
    Unknown,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StoreErrorKind::AlreadyExists => "already exists",
            StoreErrorKind::NotFound => "not found",
            StoreErrorKind::Timeout => "timeout",
            StoreErrorKind::Transport => "transport",
            StoreErrorKind::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Uniform failure shape for every store call.
///
/// Carries the classification, a human-readable message, and opaque
/// diagnostics for logging. Callers branch on the kind via the `is_*`
/// helpers; they never inspect transport-specific detail.
#[derive(Debug, Clone, thiserror::Error)]
#[error("store {kind}: {message}")]
pub struct StoreError {
    /// Error classification.
    pub kind: StoreErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Remote request id, when the store returned one.
    pub request_id: Option<String>,
    /// Attempts consumed by the transport, when known.
    pub attempts: Option<u32>,
}

impl StoreError {
    /// Create an error with the given kind and message.
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            request_id: None,
            attempts: None,
        }
    }

    /// Create a timeout error for `op` after `deadline` expired.
    pub fn timeout(op: &str, deadline: Duration) -> Self {
        Self::new(
            StoreErrorKind::Timeout,
            format!("{} timed out after {}ms", op, deadline.as_millis()),
        )
    }

    /// Attach the remote request id.
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns true for an existence-gated write that lost to a prior record.
    pub fn is_already_exists(&self) -> bool {
        self.kind == StoreErrorKind::AlreadyExists
    }

    /// Returns true for a presence-gated operation on an absent key.
    pub fn is_not_found(&self) -> bool {
        self.kind == StoreErrorKind::NotFound
    }

    /// Returns true when the call was cancelled at its deadline.
    pub fn is_timeout(&self) -> bool {
        self.kind == StoreErrorKind::Timeout
    }
}
