// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Messaging backend: the SDK session, token storage and message handling
// that intercepted callbacks hand work to. Network traffic lives behind this
// trait and outside the shim.

pub mod memory;

pub use memory::InMemoryBackend;

use pushshim_core::config::SessionOptions;
use pushshim_core::error::Result;
use pushshim_core::types::Message;

/// Collaborator invoked by the SDK handlers.
pub trait MessagingBackend: Send + Sync {
    /// Start (or resume) the SDK session for the configured application,
    /// registering its alert styles and interactive categories.
    fn start(&self, session: &SessionOptions) -> Result<()>;

    /// Durably record the hex-encoded device token.
    fn persist_device_token(&self, token: &str) -> Result<()>;

    /// Process an incoming message (delivery report, storage).
    fn handle_message(&self, message: &Message) -> Result<()>;
}
