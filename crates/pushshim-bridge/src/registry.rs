// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Delegate registry: which selectors the SDK intercepts, and the single
// original delegate unhandled calls are forwarded to.
//
// Writes happen during startup only; after `freeze` the handler table is
// read-only. The original delegate is captured once and held weakly.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock, Weak};

use tracing::{debug, info};

use pushshim_core::error::{Result, ShimError};

use crate::selector::Selector;
use crate::traits::{ApplicationDelegate, SelectorHandler};

#[derive(Default)]
/// Selector to SDK handler table, plus the weakly held original delegate.
pub struct DelegateRegistry {
    handlers: RwLock<HashMap<Selector, Arc<dyn SelectorHandler>>>,
    frozen: AtomicBool,
    original: OnceLock<Weak<dyn ApplicationDelegate>>,
    /// Serialises the write path.
    init: Mutex<()>,
}

impl fmt::Debug for DelegateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateRegistry")
            .field("intercepted", &self.intercepted_selectors())
            .field("frozen", &self.is_frozen())
            .field("original_captured", &self.original.get().is_some())
            .finish()
    }
}

impl DelegateRegistry {
    /// Empty, unfrozen registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `selector`. Fails after `freeze` or when the
    /// selector already has a handler.
    pub fn register(&self, selector: Selector, handler: Arc<dyn SelectorHandler>) -> Result<()> {
        let _init = self.init.lock().unwrap_or_else(|p| p.into_inner());
        if self.is_frozen() {
            return Err(ShimError::RegistryFrozen);
        }
        let mut handlers = self.handlers.write().unwrap_or_else(|p| p.into_inner());
        if handlers.contains_key(&selector) {
            return Err(ShimError::DuplicateHandler(selector.as_str().to_owned()));
        }
        handlers.insert(selector, handler);
        debug!(selector = %selector, "handler registered");
        Ok(())
    }

    /// Make the handler table read-only.
    pub fn freeze(&self) {
        let _init = self.init.lock().unwrap_or_else(|p| p.into_inner());
        if !self.frozen.swap(true, Ordering::AcqRel) {
            debug!(
                intercepted = self.handlers.read().map(|h| h.len()).unwrap_or(0),
                "delegate registry frozen"
            );
        }
    }

    /// True once [`DelegateRegistry::freeze`] ran.
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Whether an SDK handler is bound to `selector`.
    pub fn is_intercepted(&self, selector: Selector) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .contains_key(&selector)
    }

    /// Handler for an intercepted selector; `None` otherwise.
    pub fn handler_for(&self, selector: Selector) -> Option<Arc<dyn SelectorHandler>> {
        self.handlers
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(&selector)
            .cloned()
    }

    /// Intercepted selectors in declaration order.
    pub fn intercepted_selectors(&self) -> Vec<Selector> {
        let handlers = self.handlers.read().unwrap_or_else(|p| p.into_inner());
        let mut selectors: Vec<_> = handlers.keys().copied().collect();
        selectors.sort();
        selectors
    }

    /// Capture the host's original delegate.
    ///
    /// Only the first call stores anything; every call returns the delegate
    /// that is actually tracked (if still alive). The shim's own delegates
    /// are refused to rule out forwarding cycles.
    pub fn set_original(
        &self,
        delegate: &Arc<dyn ApplicationDelegate>,
    ) -> Result<Option<Arc<dyn ApplicationDelegate>>> {
        if delegate.is_interception_proxy() {
            return Err(ShimError::SelfForwarding);
        }
        let _init = self.init.lock().unwrap_or_else(|p| p.into_inner());
        let mut stored = false;
        let tracked = self.original.get_or_init(|| {
            stored = true;
            Arc::downgrade(delegate)
        });
        if stored {
            info!("original application delegate captured");
        } else {
            debug!("original delegate already captured; keeping the first one");
        }
        Ok(tracked.upgrade())
    }

    /// The original delegate, if one was captured and the host still holds it.
    pub fn original_delegate(&self) -> Option<Arc<dyn ApplicationDelegate>> {
        self.original.get().and_then(Weak::upgrade)
    }

    /// Whether an original delegate is recorded and still alive.
    pub fn has_original(&self) -> bool {
        self.original.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::{Invocation, Reply};
    use crate::traits::DelegateError;

    struct Host;

    impl ApplicationDelegate for Host {
        fn responds_to(&self, _selector: Selector) -> bool {
            true
        }

        fn invoke(&self, _invocation: Invocation) -> std::result::Result<Reply, DelegateError> {
            Ok(Reply::Unit)
        }
    }

    struct FakeProxy;

    impl ApplicationDelegate for FakeProxy {
        fn responds_to(&self, _selector: Selector) -> bool {
            false
        }

        fn invoke(&self, invocation: Invocation) -> std::result::Result<Reply, DelegateError> {
            Err(DelegateError::Unrecognized(invocation.selector()))
        }

        fn is_interception_proxy(&self) -> bool {
            true
        }
    }

    fn noop() -> Arc<dyn SelectorHandler> {
        Arc::new(|_: Invocation| Reply::Unit)
    }

    #[test]
    fn intercepted_iff_registered() {
        let registry = DelegateRegistry::new();
        registry.register(Selector::DidFinishLaunching, noop()).unwrap();
        registry
            .register(Selector::DidReceiveRemoteNotification, noop())
            .unwrap();
        for selector in Selector::ALL {
            let expected = matches!(
                selector,
                Selector::DidFinishLaunching | Selector::DidReceiveRemoteNotification
            );
            assert_eq!(registry.is_intercepted(selector), expected, "{selector}");
            assert_eq!(registry.handler_for(selector).is_some(), expected);
        }
        assert_eq!(
            registry.intercepted_selectors(),
            vec![
                Selector::DidFinishLaunching,
                Selector::DidReceiveRemoteNotification
            ]
        );
    }

    #[test]
    fn duplicate_and_late_registration_rejected() {
        let registry = DelegateRegistry::new();
        registry.register(Selector::OpenUrl, noop()).unwrap();
        assert!(matches!(
            registry.register(Selector::OpenUrl, noop()),
            Err(ShimError::DuplicateHandler(_))
        ));
        registry.freeze();
        assert!(matches!(
            registry.register(Selector::PerformFetch, noop()),
            Err(ShimError::RegistryFrozen)
        ));
    }

    #[test]
    fn original_captured_once() {
        let registry = DelegateRegistry::new();
        let first: Arc<dyn ApplicationDelegate> = Arc::new(Host);
        let second: Arc<dyn ApplicationDelegate> = Arc::new(Host);

        let tracked = registry.set_original(&first).unwrap().unwrap();
        assert!(Arc::ptr_eq(&tracked, &first));
        let tracked = registry.set_original(&second).unwrap().unwrap();
        assert!(Arc::ptr_eq(&tracked, &first));
        assert!(Arc::ptr_eq(&registry.original_delegate().unwrap(), &first));
    }

    #[test]
    fn proxy_never_becomes_original() {
        let registry = DelegateRegistry::new();
        let proxy: Arc<dyn ApplicationDelegate> = Arc::new(FakeProxy);
        assert!(matches!(
            registry.set_original(&proxy),
            Err(ShimError::SelfForwarding)
        ));
        assert!(!registry.has_original());
    }

    #[test]
    fn released_original_is_not_resurrected() {
        let registry = DelegateRegistry::new();
        let host: Arc<dyn ApplicationDelegate> = Arc::new(Host);
        registry.set_original(&host).unwrap();
        drop(host);
        assert!(registry.has_original());
        assert!(registry.original_delegate().is_none());
    }
}
