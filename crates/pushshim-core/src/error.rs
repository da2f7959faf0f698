// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for pushshim.

use thiserror::Error;

/// Top-level error type for all pushshim operations.
#[derive(Debug, Error)]
pub enum ShimError {
    // -- Configuration errors (SDK wiring mistakes, fail at initialisation) --
    #[error("unknown event name: {0}")]
    UnknownEvent(String),

    #[error("a handler is already registered for selector {0}")]
    DuplicateHandler(String),

    #[error("delegate registry is frozen; handlers can only be registered before install")]
    RegistryFrozen,

    #[error("the interception proxy cannot be its own original delegate")]
    SelfForwarding,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Schema violations (rejected at the event bus boundary) --
    #[error("event {event} does not declare payload key {key}")]
    UndeclaredKey { event: String, key: String },

    #[error("event {event} requires payload key {key}")]
    MissingKey { event: String, key: String },

    #[error("payload key {key} of event {event} must be {expected}")]
    KindMismatch {
        event: String,
        key: String,
        expected: &'static str,
    },

    // -- Payload parsing --
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    // -- Dispatch --
    #[error("no async runtime available to drive dispatch queue")]
    NoRuntime,

    #[error("dispatch queue {0} is closed")]
    QueueClosed(String),

    // -- Collaborators --
    #[error("messaging backend error: {0}")]
    Backend(String),

    // -- Storage / serialisation --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ShimError {
    /// Whether this error is a schema violation raised by payload validation.
    pub fn is_schema_violation(&self) -> bool {
        matches!(
            self,
            Self::UndeclaredKey { .. } | Self::MissingKey { .. } | Self::KindMismatch { .. }
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ShimError>;
