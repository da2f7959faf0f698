// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plugin delegate variant for hybrid-app integration layers.
//
// The integration layer injects a notification cache; every notification is
// offered to the cache first (so it can be replayed to script code that is
// not loaded yet) and then routed through the interception proxy as usual.

use std::sync::Arc;

use tracing::debug;

use pushshim_core::types::UserInfo;

use crate::invocation::{Call, Invocation, LocalNotification, Reply};
use crate::proxy::InterceptionProxy;
use crate::selector::Selector;
use crate::traits::{ApplicationDelegate, DelegateError};

/// Caching collaborator supplied by the integration layer.
pub trait NotificationCache: Send + Sync {
    fn receive_remote_notification(&self, user_info: &UserInfo);

    fn receive_local_notification(&self, notification: &LocalNotification);
}

/// Interception proxy that offers notifications to a host cache first.
pub struct PluginDelegate {
    proxy: Arc<InterceptionProxy>,
    cache: Arc<dyn NotificationCache>,
}

impl PluginDelegate {
    /// Wrap `proxy`, feeding notifications to `cache` before routing.
    pub fn new(proxy: Arc<InterceptionProxy>, cache: Arc<dyn NotificationCache>) -> Self {
        Self { proxy, cache }
    }

    fn offer_to_cache(&self, call: &Call) {
        match call {
            Call::DidReceiveRemoteNotification { user_info, .. }
            | Call::HandleActionForRemoteNotification { user_info, .. } => {
                debug!("caching remote notification");
                self.cache.receive_remote_notification(user_info);
            }
            Call::DidReceiveLocalNotification { notification }
            | Call::HandleActionForLocalNotification { notification, .. } => {
                debug!("caching local notification");
                self.cache.receive_local_notification(notification);
            }
            _ => {}
        }
    }
}

impl ApplicationDelegate for PluginDelegate {
    fn responds_to(&self, selector: Selector) -> bool {
        self.proxy.responds_to(selector)
    }

    fn invoke(&self, invocation: Invocation) -> Result<Reply, DelegateError> {
        self.offer_to_cache(&invocation.call);
        self.proxy.invoke(invocation)
    }

    fn is_interception_proxy(&self) -> bool {
        true
    }
}
