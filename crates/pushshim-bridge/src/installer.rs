// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Installer: one-time substitution of the host's delegate with the
// interception proxy.
//
// `install` must run synchronously during app startup, before the platform
// dispatches its first lifecycle callback; callbacks delivered earlier reach
// the host's delegate only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use tracing::{debug, info, instrument, warn};

use pushshim_core::config::ShimConfig;
use pushshim_core::error::{Result, ShimError};

use crate::context::ShimContext;
use crate::plugin::{NotificationCache, PluginDelegate};
use crate::traits::{Application, ApplicationDelegate};

static SHARED: OnceLock<Installer> = OnceLock::new();

/// Performs the one-time delegate substitution and records that it happened.
pub struct Installer {
    context: ShimContext,
    installed: AtomicBool,
    /// Delegate handed to the application; also serialises `install`.
    active: Mutex<Option<Arc<dyn ApplicationDelegate>>>,
}

impl std::fmt::Debug for Installer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("context", &self.context)
            .field("installed", &self.is_installed())
            .finish()
    }
}

impl Installer {
    /// Installer over an explicitly built context.
    pub fn new(context: ShimContext) -> Self {
        Self {
            context,
            installed: AtomicBool::new(false),
            active: Mutex::new(None),
        }
    }

    /// Process-wide installer, built from `ShimConfig::default()` on first
    /// use unless [`Installer::init_shared`] ran before.
    pub fn shared() -> Result<&'static Installer> {
        if let Some(installer) = SHARED.get() {
            return Ok(installer);
        }
        let context = ShimContext::builder(ShimConfig::default()).build()?;
        Ok(SHARED.get_or_init(|| Installer::new(context)))
    }

    /// Seed the process-wide installer. The first context wins; later calls
    /// return the existing installer.
    pub fn init_shared(context: ShimContext) -> &'static Installer {
        SHARED.get_or_init(|| Installer::new(context))
    }

    /// Context whose proxy this installer installs.
    pub fn context(&self) -> &ShimContext {
        &self.context
    }

    /// True once an install succeeded.
    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::Acquire)
    }

    /// The delegate currently installed on the application by this
    /// installer, if any.
    pub fn active_delegate(&self) -> Option<Arc<dyn ApplicationDelegate>> {
        self.active
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Substitute the interception proxy for the application's delegate.
    /// Idempotent.
    #[instrument(skip_all)]
    pub fn install(&self, app: &dyn Application) -> Result<()> {
        let proxy: Arc<dyn ApplicationDelegate> = self.context.proxy().clone();
        self.install_delegate(app, proxy)
    }

    /// Plugin variant: notifications are offered to `cache` before the
    /// proxy routes them.
    #[instrument(skip_all)]
    pub fn install_with_cache(
        &self,
        app: &dyn Application,
        cache: Arc<dyn NotificationCache>,
    ) -> Result<()> {
        let delegate: Arc<dyn ApplicationDelegate> =
            Arc::new(PluginDelegate::new(Arc::clone(self.context.proxy()), cache));
        self.install_delegate(app, delegate)
    }

    fn install_delegate(
        &self,
        app: &dyn Application,
        delegate: Arc<dyn ApplicationDelegate>,
    ) -> Result<()> {
        let mut active = self.active.lock().unwrap_or_else(|p| p.into_inner());
        if self.is_installed() {
            debug!("already installed; nothing to do");
            return Ok(());
        }

        match app.delegate() {
            Some(current) if current.is_interception_proxy() => {
                warn!("application delegate is already an interception proxy");
                return Err(ShimError::SelfForwarding);
            }
            Some(current) => {
                self.context.registry().set_original(&current)?;
            }
            None => debug!("host has no delegate; unhandled calls will be dropped"),
        }

        app.set_delegate(Arc::clone(&delegate));
        *active = Some(delegate);
        self.installed.store(true, Ordering::Release);
        info!(
            intercepted = self.context.registry().intercepted_selectors().len(),
            has_original = self.context.registry().has_original(),
            "interception proxy installed"
        );
        Ok(())
    }
}
