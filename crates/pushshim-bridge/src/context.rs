// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shim context: the explicitly constructed bundle of configuration, event
// bus, delegate registry, backend and proxy. Initialisation order:
// config -> bus -> backend -> handlers -> freeze -> proxy.

use std::sync::Arc;

use tracing::debug;

use pushshim_core::config::ShimConfig;
use pushshim_core::error::Result;
use pushshim_events::EventBus;

use crate::backend::{InMemoryBackend, MessagingBackend};
use crate::handlers::{SdkServices, default_handlers};
use crate::proxy::InterceptionProxy;
use crate::registry::DelegateRegistry;
use crate::selector::Selector;
use crate::traits::SelectorHandler;

#[derive(Clone)]
/// Everything an installed shim runs on. Cloning shares the same services.
pub struct ShimContext {
    config: ShimConfig,
    bus: EventBus,
    backend: Arc<dyn MessagingBackend>,
    registry: Arc<DelegateRegistry>,
    proxy: Arc<InterceptionProxy>,
}

impl std::fmt::Debug for ShimContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShimContext")
            .field("application_code", &self.config.application_code)
            .field("bus", &self.bus)
            .field("registry", &self.registry)
            .finish()
    }
}

impl ShimContext {
    /// Start building a context from `config`.
    pub fn builder(config: ShimConfig) -> ShimContextBuilder {
        ShimContextBuilder {
            config,
            bus: None,
            backend: None,
            default_handlers: true,
            extra_handlers: Vec::new(),
        }
    }

    /// Configuration the context was built with.
    pub fn config(&self) -> &ShimConfig {
        &self.config
    }

    /// Bus the SDK handlers publish on.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Backend the SDK handlers hand work to.
    pub fn backend(&self) -> &Arc<dyn MessagingBackend> {
        &self.backend
    }

    /// Frozen selector table and the original delegate slot.
    pub fn registry(&self) -> &Arc<DelegateRegistry> {
        &self.registry
    }

    /// Delegate to hand to the platform application.
    pub fn proxy(&self) -> &Arc<InterceptionProxy> {
        &self.proxy
    }
}

/// Builder returned by [`ShimContext::builder`].
pub struct ShimContextBuilder {
    config: ShimConfig,
    bus: Option<EventBus>,
    backend: Option<Arc<dyn MessagingBackend>>,
    default_handlers: bool,
    extra_handlers: Vec<(Selector, Arc<dyn SelectorHandler>)>,
}

impl ShimContextBuilder {
    /// Share an existing bus instead of creating one.
    pub fn bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Use `backend` instead of an [`InMemoryBackend`].
    pub fn backend(mut self, backend: Arc<dyn MessagingBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Skip the SDK's own handler table.
    pub fn without_default_handlers(mut self) -> Self {
        self.default_handlers = false;
        self
    }

    /// Intercept an additional selector. Clashing with a default handler
    /// fails `build`.
    pub fn handler(mut self, selector: Selector, handler: Arc<dyn SelectorHandler>) -> Self {
        self.extra_handlers.push((selector, handler));
        self
    }

    /// Validate the config, register handlers, freeze the registry and
    /// create the proxy.
    pub fn build(self) -> Result<ShimContext> {
        self.config.validate()?;
        let bus = self
            .bus
            .unwrap_or_default();
        let backend = self
            .backend
            .unwrap_or_else(|| Arc::new(InMemoryBackend::new()) as Arc<dyn MessagingBackend>);

        let registry = Arc::new(DelegateRegistry::new());
        if self.default_handlers {
            let services = Arc::new(SdkServices::new(
                self.config.clone(),
                bus.clone(),
                Arc::clone(&backend),
            ));
            for (selector, handler) in default_handlers(services) {
                registry.register(selector, handler)?;
            }
        }
        for (selector, handler) in self.extra_handlers {
            registry.register(selector, handler)?;
        }
        registry.freeze();

        let proxy = Arc::new(InterceptionProxy::new(
            Arc::clone(&registry),
            self.config.forward_unhandled,
        ));
        debug!(
            intercepted = registry.intercepted_selectors().len(),
            "shim context built"
        );
        Ok(ShimContext {
            config: self.config,
            bus,
            backend,
            registry,
            proxy,
        })
    }
}
