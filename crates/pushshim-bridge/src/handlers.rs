// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SDK handlers bound to the intercepted selectors.
//
// Each handler does its SDK work through the messaging backend, then
// publishes the matching lifecycle events. Failures are logged and turned
// into the platform-facing outcome (`false` launch, `Failed` fetch); nothing
// propagates into the platform runtime.
//
// Only the launch handler works before the session has started. Until then
// the others settle their completion neutrally and publish nothing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info, warn};

use pushshim_core::config::ShimConfig;
use pushshim_core::types::{ApplicationState, FetchResult, Message, UserInfo};
use pushshim_events::{EventBus, SdkEvent};

use crate::backend::MessagingBackend;
use crate::invocation::{Call, DEFAULT_ACTION_IDENTIFIER, Invocation, Reply, typed_text};
use crate::selector::Selector;
use crate::traits::SelectorHandler;

/// What the handlers share.
pub struct SdkServices {
    pub config: ShimConfig,
    pub bus: EventBus,
    pub backend: Arc<dyn MessagingBackend>,
    /// Set once the backend session has started.
    running: AtomicBool,
}

impl SdkServices {
    /// Services with the session not yet running.
    pub fn new(config: ShimConfig, bus: EventBus, backend: Arc<dyn MessagingBackend>) -> Self {
        Self {
            config,
            bus,
            backend,
            running: AtomicBool::new(false),
        }
    }

    /// Whether a launch has started the backend session.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Notifications count as tapped when they arrive while the app is
    /// inactive, or carry the launch marker.
    fn is_tap(state: ApplicationState, message: &Message) -> bool {
        state == ApplicationState::Inactive || message.launched_application
    }

    /// Publish, logging instead of failing.
    fn emit(&self, event: SdkEvent) {
        let name = event.name();
        if let Err(e) = self.bus.emit(event) {
            error!(event = %name, error = %e, "failed to publish SDK event");
        }
    }

    fn emit_tapped(&self, message: Message, user_info: &UserInfo) {
        self.emit(SdkEvent::MessageTapped {
            message,
            notification_user_info: Some(user_info.clone()),
        });
    }
}

/// The handler table installed by default.
pub fn default_handlers(services: Arc<SdkServices>) -> Vec<(Selector, Arc<dyn SelectorHandler>)> {
    let action: Arc<dyn SelectorHandler> = Arc::new(ActionHandler(Arc::clone(&services)));
    vec![
        bind(
            Selector::DidFinishLaunching,
            LaunchHandler(Arc::clone(&services)),
        ),
        bind(
            Selector::DidRegisterForRemoteNotifications,
            DeviceTokenHandler(Arc::clone(&services)),
        ),
        bind(
            Selector::DidReceiveRemoteNotification,
            RemoteNotificationHandler(Arc::clone(&services)),
        ),
        bind(
            Selector::DidReceiveLocalNotification,
            LocalNotificationHandler(services),
        ),
        (Selector::HandleActionForLocalNotification, Arc::clone(&action)),
        (Selector::HandleActionForRemoteNotification, action),
    ]
}

fn bind<H>(selector: Selector, handler: H) -> (Selector, Arc<dyn SelectorHandler>)
where
    H: SelectorHandler + 'static,
{
    (selector, Arc::new(handler))
}

/// Settle a call that arrived before the session started.
fn not_running(handler: &'static str, invocation: &Invocation) -> Reply {
    debug!(
        handler,
        selector = %invocation.selector(),
        "SDK session not running; call ignored"
    );
    invocation.complete_neutral();
    invocation.neutral_reply()
}

/// A handler received a call for a selector it is not bound to.
fn misrouted(handler: &'static str, invocation: &Invocation) -> Reply {
    warn!(
        handler,
        selector = %invocation.selector(),
        "handler invoked for a foreign selector"
    );
    invocation.complete_neutral();
    invocation.neutral_reply()
}

// ---------------------------------------------------------------------------
// Launch
// ---------------------------------------------------------------------------

/// Starts the SDK session with the configured alert styles and interactive
/// categories. A launch caused by a notification tap is published as
/// `MessageTapped`.
pub struct LaunchHandler(Arc<SdkServices>);

impl SelectorHandler for LaunchHandler {
    fn handle(&self, invocation: Invocation) -> Reply {
        let Call::DidFinishLaunching { options } = &invocation.call else {
            return misrouted("launch", &invocation);
        };
        let session = self.0.config.session_options();
        if !session.discarded.is_empty() {
            warn!(
                discarded = ?session.discarded,
                "interactive categories and actions with the reserved \"mm_\" prefix were discarded"
            );
        }
        if let Err(e) = self.0.backend.start(&session) {
            error!(error = %e, "SDK session failed to start");
            return Reply::Bool(false);
        }
        if !self.0.running.swap(true, Ordering::AcqRel) {
            info!(categories = session.categories.len(), "SDK session running");
        }
        if let Some(user_info) = options.remote_notification() {
            match Message::from_apns_payload(user_info) {
                Some(message) => self.0.emit_tapped(message, user_info),
                None => debug!("launched from a foreign notification"),
            }
        }
        Reply::Bool(true)
    }
}

// ---------------------------------------------------------------------------
// Device token
// ---------------------------------------------------------------------------

/// Hex-encodes and stores the token, then announces it.
pub struct DeviceTokenHandler(Arc<SdkServices>);

impl SelectorHandler for DeviceTokenHandler {
    fn handle(&self, invocation: Invocation) -> Reply {
        let Call::DidRegisterForRemoteNotifications { device_token } = &invocation.call else {
            return misrouted("device-token", &invocation);
        };
        if !self.0.is_running() {
            return not_running("device-token", &invocation);
        }
        if device_token.is_empty() {
            warn!("platform delivered an empty device token");
            return Reply::Unit;
        }
        let token = hex::encode(device_token);
        match self.0.backend.persist_device_token(&token) {
            // Announce only what has been stored.
            Ok(()) => self.0.emit(SdkEvent::DeviceTokenReceived {
                device_token: token,
            }),
            Err(e) => error!(error = %e, "device token could not be stored"),
        }
        Reply::Unit
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Parses a push, hands it to the backend, publishes `MessageReceived` and
/// reports the fetch outcome.
pub struct RemoteNotificationHandler(Arc<SdkServices>);

impl SelectorHandler for RemoteNotificationHandler {
    fn handle(&self, invocation: Invocation) -> Reply {
        let Call::DidReceiveRemoteNotification {
            user_info,
            completion,
        } = &invocation.call
        else {
            return misrouted("remote-notification", &invocation);
        };
        if !self.0.is_running() {
            return not_running("remote-notification", &invocation);
        }

        let Some(message) = Message::from_apns_payload(user_info) else {
            debug!("remote notification not addressed to the SDK");
            completion.complete(FetchResult::NoData);
            return Reply::Unit;
        };

        if let Err(e) = self.0.backend.handle_message(&message) {
            error!(message_id = %message.message_id, error = %e, "message handling failed");
            completion.complete(FetchResult::Failed);
            return Reply::Unit;
        }

        let tapped = SdkServices::is_tap(invocation.state, &message).then(|| message.clone());
        self.0.emit(SdkEvent::MessageReceived {
            is_silent: Some(message.is_silent),
            custom_payload: message.custom_payload.clone(),
            message,
            notification_user_info: Some(user_info.clone()),
            is_push: Some(true),
        });
        if let Some(message) = tapped {
            self.0.emit_tapped(message, user_info);
        }
        completion.complete(FetchResult::NewData);
        Reply::Unit
    }
}

/// A local notification delivered while the app is inactive, or marked as
/// the launching one, was tapped.
pub struct LocalNotificationHandler(Arc<SdkServices>);

impl SelectorHandler for LocalNotificationHandler {
    fn handle(&self, invocation: Invocation) -> Reply {
        let Call::DidReceiveLocalNotification { notification } = &invocation.call else {
            return misrouted("local-notification", &invocation);
        };
        if !self.0.is_running() {
            return not_running("local-notification", &invocation);
        }
        match Message::from_apns_payload(&notification.user_info) {
            Some(message) if SdkServices::is_tap(invocation.state, &message) => {
                self.0.emit_tapped(message, &notification.user_info)
            }
            Some(_) => debug!("local notification delivered in the foreground"),
            None => debug!("local notification not addressed to the SDK"),
        }
        Reply::Unit
    }
}

/// Notification actions, local and remote alike.
pub struct ActionHandler(Arc<SdkServices>);

impl SelectorHandler for ActionHandler {
    fn handle(&self, invocation: Invocation) -> Reply {
        let (identifier, user_info, response_info, completion) = match &invocation.call {
            Call::HandleActionForLocalNotification {
                identifier,
                notification,
                response_info,
                completion,
            } => (identifier, &notification.user_info, response_info, completion),
            Call::HandleActionForRemoteNotification {
                identifier,
                user_info,
                response_info,
                completion,
            } => (identifier, user_info, response_info, completion),
            _ => return misrouted("action", &invocation),
        };
        if !self.0.is_running() {
            return not_running("action", &invocation);
        }

        match Message::from_apns_payload(user_info) {
            Some(message) => match identifier.as_deref() {
                None | Some(DEFAULT_ACTION_IDENTIFIER) => self.0.emit_tapped(message, user_info),
                Some(action) => self.0.emit(SdkEvent::ActionTapped {
                    message,
                    action_identifier: action.to_owned(),
                    text_input: typed_text(response_info.as_ref()),
                    notification_user_info: Some(user_info.clone()),
                }),
            },
            None => debug!("action for a notification not addressed to the SDK"),
        }
        completion.complete(());
        Reply::Unit
    }
}
