// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process backend that records what the handlers asked of it. Used when
// the host wires no real backend, and by tests.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use pushshim_core::config::SessionOptions;
use pushshim_core::error::{Result, ShimError};
use pushshim_core::types::Message;

use super::MessagingBackend;

#[derive(Debug, Default)]
struct BackendState {
    session: Option<SessionOptions>,
    start_count: usize,
    device_token: Option<String>,
    handled_messages: Vec<String>,
    reject_messages: bool,
}

/// Recording backend.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
    state: Arc<Mutex<BackendState>>,
}

impl InMemoryBackend {
    /// Backend with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Make `handle_message` fail, as a backend outage would.
    pub fn set_reject_messages(&self, reject: bool) {
        self.state().reject_messages = reject;
    }

    /// Application code of the last `start`.
    pub fn started_with(&self) -> Option<String> {
        self.state()
            .session
            .as_ref()
            .map(|s| s.application_code.clone())
    }

    /// Options of the last `start`.
    pub fn session(&self) -> Option<SessionOptions> {
        self.state().session.clone()
    }

    /// Number of successful `start` calls.
    pub fn start_count(&self) -> usize {
        self.state().start_count
    }

    /// Last stored device token.
    pub fn device_token(&self) -> Option<String> {
        self.state().device_token.clone()
    }

    /// Ids of handled messages, oldest first.
    pub fn handled_messages(&self) -> Vec<String> {
        self.state().handled_messages.clone()
    }
}

impl MessagingBackend for InMemoryBackend {
    fn start(&self, session: &SessionOptions) -> Result<()> {
        if session.application_code.trim().is_empty() {
            return Err(ShimError::InvalidConfig(
                "application_code must not be empty".into(),
            ));
        }
        let mut state = self.state();
        state.session = Some(session.clone());
        state.start_count += 1;
        info!(
            application_code = %session.application_code,
            app_group = session.app_group_id.as_deref().unwrap_or("-"),
            notification_types = ?session.notification_types,
            categories = session.categories.len(),
            "messaging session started"
        );
        Ok(())
    }

    fn persist_device_token(&self, token: &str) -> Result<()> {
        self.state().device_token = Some(token.to_owned());
        debug!(token_len = token.len(), "device token stored");
        Ok(())
    }

    fn handle_message(&self, message: &Message) -> Result<()> {
        let mut state = self.state();
        if state.reject_messages {
            return Err(ShimError::Backend(format!(
                "message {} rejected",
                message.message_id
            )));
        }
        state.handled_messages.push(message.message_id.clone());
        debug!(message_id = %message.message_id, "message handled");
        Ok(())
    }
}
