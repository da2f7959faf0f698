// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability traits at the seam between the shim and the host application.
//
// The platform runtime never calls a method blindly: it first asks the
// delegate whether it responds to a selector, then invokes it with typed
// arguments. Hosts implement `ApplicationDelegate`; the platform side is
// modelled by `Application`.

use std::sync::Arc;

use thiserror::Error;

use crate::invocation::{Invocation, Reply};
use crate::selector::Selector;

/// Raised by a delegate asked to perform a selector it does not implement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DelegateError {
    #[error("delegate does not implement {0}")]
    Unrecognized(Selector),
}

/// An application lifecycle delegate.
pub trait ApplicationDelegate: Send + Sync {
    /// Introspection: will `invoke` accept this selector?
    fn responds_to(&self, selector: Selector) -> bool;

    /// Perform the callback. Implementations return
    /// `DelegateError::Unrecognized` for selectors they do not implement.
    fn invoke(&self, invocation: Invocation) -> Result<Reply, DelegateError>;

    /// True only for the shim's own delegates; they are never captured as
    /// the original delegate.
    fn is_interception_proxy(&self) -> bool {
        false
    }
}

/// The host application object owning the active delegate slot.
///
/// The platform does not retain the original delegate on the shim's behalf:
/// once replaced, the host keeps it alive or it goes away.
pub trait Application: Send + Sync {
    fn delegate(&self) -> Option<Arc<dyn ApplicationDelegate>>;

    fn set_delegate(&self, delegate: Arc<dyn ApplicationDelegate>);
}

/// SDK-internal handler bound to an intercepted selector.
pub trait SelectorHandler: Send + Sync {
    fn handle(&self, invocation: Invocation) -> Reply;
}

impl<F> SelectorHandler for F
where
    F: Fn(Invocation) -> Reply + Send + Sync,
{
    fn handle(&self, invocation: Invocation) -> Reply {
        self(invocation)
    }
}
