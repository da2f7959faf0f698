// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Completion tokens: single-owner wrappers around platform completion
// callbacks. A token may be cloned and handed to both the SDK and the host,
// but only the first `complete` call reaches the platform.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{trace, warn};

type Callback<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Exactly-once completion handle.
pub struct CompletionToken<T> {
    label: &'static str,
    /// `None` for detached tokens.
    slot: Option<Arc<Mutex<Option<Callback<T>>>>>,
}

impl<T> Clone for CompletionToken<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label,
            slot: self.slot.clone(),
        }
    }
}

impl<T> fmt::Debug for CompletionToken<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionToken")
            .field("label", &self.label)
            .field("detached", &self.is_detached())
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// Two tokens are equal when they guard the same platform callback.
impl<T> PartialEq for CompletionToken<T> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.slot, &other.slot) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T> CompletionToken<T> {
    /// Wrap a platform callback. `label` names it in logs.
    pub fn new<F>(label: &'static str, callback: F) -> Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        Self {
            label,
            slot: Some(Arc::new(Mutex::new(Some(Box::new(callback))))),
        }
    }

    /// A token that is not connected to any platform callback. Completing it
    /// does nothing; handed to the SDK when the host owns the real one.
    pub fn detached(label: &'static str) -> Self {
        Self { label, slot: None }
    }

    /// Name used in logs.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// True for tokens made with [`CompletionToken::detached`].
    pub fn is_detached(&self) -> bool {
        self.slot.is_none()
    }

    /// True while the platform callback has not been invoked.
    pub fn is_pending(&self) -> bool {
        self.slot.as_ref().is_some_and(|slot| {
            slot.lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .is_some()
        })
    }

    fn take(&self) -> Option<Callback<T>> {
        let slot = self.slot.as_ref()?;
        slot.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    /// Invoke the platform callback. Returns `false` (and logs) when it was
    /// already consumed; detached tokens return `false` silently.
    pub fn complete(&self, value: T) -> bool {
        if self.is_detached() {
            trace!(completion = self.label, "detached completion ignored");
            return false;
        }
        match self.take() {
            Some(callback) => {
                callback(value);
                true
            }
            None => {
                warn!(
                    completion = self.label,
                    "completion invoked more than once; ignoring"
                );
                false
            }
        }
    }

    /// Complete only if nobody has yet. Never logs a duplicate.
    pub fn complete_if_pending(&self, value: T) -> bool {
        match self.take() {
            Some(callback) => {
                callback(value);
                true
            }
            None => false,
        }
    }
}
