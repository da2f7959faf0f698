// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interception proxy: the delegate the platform actually talks to.
//
// Intercepted selectors run the SDK handler and are then forwarded to the
// original delegate when it implements them. Everything else is forwarded
// verbatim. Completion ownership:
//   * original delegate implements the selector -> host owns the completion,
//     the SDK handler sees a detached token;
//   * otherwise -> the SDK handler owns it;
//   * a host that claimed the selector but rejects it leaves the completion
//     to the proxy, which settles it with the neutral value.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use crate::invocation::{Invocation, Reply};
use crate::registry::DelegateRegistry;
use crate::selector::Selector;
use crate::traits::{ApplicationDelegate, DelegateError, SelectorHandler};

/// Delegate installed in place of the host's; routes every lifecycle call.
pub struct InterceptionProxy {
    registry: Arc<DelegateRegistry>,
    forward_unhandled: bool,
}

impl std::fmt::Debug for InterceptionProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptionProxy")
            .field("registry", &self.registry)
            .field("forward_unhandled", &self.forward_unhandled)
            .finish()
    }
}

impl InterceptionProxy {
    /// Proxy over a frozen `registry`. With `forward_unhandled` off the
    /// original delegate is never called.
    pub fn new(registry: Arc<DelegateRegistry>, forward_unhandled: bool) -> Self {
        Self {
            registry,
            forward_unhandled,
        }
    }

    /// Table this proxy routes by.
    pub fn registry(&self) -> &Arc<DelegateRegistry> {
        &self.registry
    }

    /// The original delegate, when forwarding is enabled and it implements
    /// `selector`.
    fn forward_target(&self, selector: Selector) -> Option<Arc<dyn ApplicationDelegate>> {
        if !self.forward_unhandled {
            return None;
        }
        self.registry
            .original_delegate()
            .filter(|original| original.responds_to(selector))
    }

    /// Route one platform callback. Never fails and never unwinds.
    #[instrument(skip_all, fields(selector = %invocation.selector()))]
    pub fn dispatch(&self, invocation: Invocation) -> Reply {
        let selector = invocation.selector();
        let host = self.forward_target(selector);

        match (self.registry.handler_for(selector), host) {
            (Some(handler), Some(host)) => {
                debug!("intercepted; forwarding to original delegate afterwards");
                let sdk = run_handler(&*handler, invocation.with_detached_completion());
                let forwarded = forward(&*host, invocation);
                combine(sdk, forwarded)
            }
            (Some(handler), None) => {
                debug!("intercepted");
                let settle = invocation.clone();
                let reply = run_handler(&*handler, invocation);
                if settle.completion_pending() {
                    warn!("SDK handler left the completion pending; settling it");
                    settle.complete_neutral();
                }
                reply
            }
            (None, Some(host)) => {
                debug!("forwarding verbatim");
                forward(&*host, invocation)
            }
            (None, None) => {
                debug!("no handler and no original delegate; ignoring");
                invocation.complete_neutral();
                invocation.neutral_reply()
            }
        }
    }
}

impl ApplicationDelegate for InterceptionProxy {
    fn responds_to(&self, selector: Selector) -> bool {
        self.registry.is_intercepted(selector) || self.forward_target(selector).is_some()
    }

    fn invoke(&self, invocation: Invocation) -> Result<Reply, DelegateError> {
        Ok(self.dispatch(invocation))
    }

    fn is_interception_proxy(&self) -> bool {
        true
    }
}

/// Run an SDK handler, containing panics.
fn run_handler(handler: &dyn SelectorHandler, invocation: Invocation) -> Reply {
    let settle = invocation.clone();
    match catch_unwind(AssertUnwindSafe(|| handler.handle(invocation))) {
        Ok(reply) => reply,
        Err(_) => {
            error!(selector = %settle.selector(), "SDK handler panicked");
            settle.complete_neutral();
            settle.neutral_reply()
        }
    }
}

/// Forward to the original delegate. A host that rejects a selector it
/// advertised is a contract violation: logged, settled, never fatal.
fn forward(host: &dyn ApplicationDelegate, invocation: Invocation) -> Reply {
    let settle = invocation.clone();
    let outcome = catch_unwind(AssertUnwindSafe(|| host.invoke(invocation)));
    match outcome {
        Ok(Ok(reply)) => reply,
        Ok(Err(DelegateError::Unrecognized(selector))) => {
            warn!(
                selector = %selector,
                "original delegate advertised a selector it does not implement"
            );
            settle.complete_neutral();
            settle.neutral_reply()
        }
        Err(_) => {
            error!(selector = %settle.selector(), "original delegate panicked");
            settle.complete_neutral();
            settle.neutral_reply()
        }
    }
}

/// Combined result of an intercepted call that was also forwarded.
fn combine(sdk: Reply, host: Reply) -> Reply {
    match (sdk, host) {
        (Reply::Bool(sdk), Reply::Bool(host)) => Reply::Bool(sdk && host),
        (Reply::Bool(sdk), Reply::Unit) => Reply::Bool(sdk),
        (Reply::Unit, host) => host,
    }
}
