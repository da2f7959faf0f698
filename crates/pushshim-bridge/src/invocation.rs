// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Invocations: a lifecycle callback together with its typed arguments.
//
// Each `Call` variant fixes the argument shape of one selector, so the proxy
// can forward a call to the original delegate exactly as it arrived.

use serde_json::Value;

use pushshim_core::types::{ApplicationState, FetchResult, LaunchOptions, UserInfo};

use crate::completion::CompletionToken;
use crate::selector::Selector;

/// Background-fetch completion handler.
pub type FetchCompletion = CompletionToken<FetchResult>;

/// Action-handling completion handler.
pub type ActionCompletion = CompletionToken<()>;

/// A scheduled local notification as delivered to the delegate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalNotification {
    pub user_info: UserInfo,
    pub category: Option<String>,
    pub alert_body: Option<String>,
}

impl LocalNotification {
    pub fn new(user_info: UserInfo) -> Self {
        Self {
            user_info,
            ..Self::default()
        }
    }
}

/// Arguments of one lifecycle callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    DidFinishLaunching {
        options: LaunchOptions,
    },
    DidRegisterForRemoteNotifications {
        device_token: Vec<u8>,
    },
    DidFailToRegisterForRemoteNotifications {
        error: String,
    },
    DidReceiveRemoteNotification {
        user_info: UserInfo,
        completion: FetchCompletion,
    },
    DidReceiveLocalNotification {
        notification: LocalNotification,
    },
    HandleActionForLocalNotification {
        identifier: Option<String>,
        notification: LocalNotification,
        response_info: Option<UserInfo>,
        completion: ActionCompletion,
    },
    HandleActionForRemoteNotification {
        identifier: Option<String>,
        user_info: UserInfo,
        response_info: Option<UserInfo>,
        completion: ActionCompletion,
    },
    WillEnterForeground,
    DidBecomeActive,
    WillResignActive,
    DidEnterBackground,
    WillTerminate,
    OpenUrl {
        url: String,
        options: UserInfo,
    },
    PerformFetch {
        completion: FetchCompletion,
    },
}

impl Call {
    pub fn selector(&self) -> Selector {
        match self {
            Self::DidFinishLaunching { .. } => Selector::DidFinishLaunching,
            Self::DidRegisterForRemoteNotifications { .. } => {
                Selector::DidRegisterForRemoteNotifications
            }
            Self::DidFailToRegisterForRemoteNotifications { .. } => {
                Selector::DidFailToRegisterForRemoteNotifications
            }
            Self::DidReceiveRemoteNotification { .. } => Selector::DidReceiveRemoteNotification,
            Self::DidReceiveLocalNotification { .. } => Selector::DidReceiveLocalNotification,
            Self::HandleActionForLocalNotification { .. } => {
                Selector::HandleActionForLocalNotification
            }
            Self::HandleActionForRemoteNotification { .. } => {
                Selector::HandleActionForRemoteNotification
            }
            Self::WillEnterForeground => Selector::WillEnterForeground,
            Self::DidBecomeActive => Selector::DidBecomeActive,
            Self::WillResignActive => Selector::WillResignActive,
            Self::DidEnterBackground => Selector::DidEnterBackground,
            Self::WillTerminate => Selector::WillTerminate,
            Self::OpenUrl { .. } => Selector::OpenUrl,
            Self::PerformFetch { .. } => Selector::PerformFetch,
        }
    }
}

/// Value returned to the platform runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Unit,
    Bool(bool),
}

impl Reply {
    /// The boolean result, if the callback returns one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Unit => None,
        }
    }
}

/// A callback as dispatched by the platform: run state plus arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub state: ApplicationState,
    pub call: Call,
}

impl Invocation {
    /// Invocation of `call` while the app is in `state`.
    pub fn new(state: ApplicationState, call: Call) -> Self {
        Self { state, call }
    }

    pub fn selector(&self) -> Selector {
        self.call.selector()
    }

    /// Reply a call produces when nobody handles it.
    pub fn neutral_reply(&self) -> Reply {
        match self.call {
            Call::DidFinishLaunching { .. } | Call::OpenUrl { .. } => Reply::Bool(false),
            _ => Reply::Unit,
        }
    }

    /// True while the call's platform completion has not been invoked.
    pub fn completion_pending(&self) -> bool {
        match &self.call {
            Call::DidReceiveRemoteNotification { completion, .. }
            | Call::PerformFetch { completion } => completion.is_pending(),
            Call::HandleActionForLocalNotification { completion, .. }
            | Call::HandleActionForRemoteNotification { completion, .. } => completion.is_pending(),
            _ => false,
        }
    }

    /// Settle the platform completion with its neutral value if nobody has.
    pub fn complete_neutral(&self) -> bool {
        match &self.call {
            Call::DidReceiveRemoteNotification { completion, .. }
            | Call::PerformFetch { completion } => {
                completion.complete_if_pending(FetchResult::NoData)
            }
            Call::HandleActionForLocalNotification { completion, .. }
            | Call::HandleActionForRemoteNotification { completion, .. } => {
                completion.complete_if_pending(())
            }
            _ => false,
        }
    }

    /// Copy of this invocation whose completion is detached from the platform.
    pub fn with_detached_completion(&self) -> Self {
        let mut copy = self.clone();
        match &mut copy.call {
            Call::DidReceiveRemoteNotification { completion, .. }
            | Call::PerformFetch { completion } => {
                *completion = CompletionToken::detached(completion.label());
            }
            Call::HandleActionForLocalNotification { completion, .. }
            | Call::HandleActionForRemoteNotification { completion, .. } => {
                *completion = CompletionToken::detached(completion.label());
            }
            _ => {}
        }
        copy
    }

    /// The notification dictionary the call carries, if any.
    pub fn notification_user_info(&self) -> Option<&UserInfo> {
        match &self.call {
            Call::DidReceiveRemoteNotification { user_info, .. }
            | Call::HandleActionForRemoteNotification { user_info, .. } => Some(user_info),
            Call::DidReceiveLocalNotification { notification }
            | Call::HandleActionForLocalNotification { notification, .. } => {
                Some(&notification.user_info)
            }
            Call::DidFinishLaunching { options } => options.remote_notification(),
            _ => None,
        }
    }
}

/// Typed text the user entered for a text-input action, if any.
pub fn typed_text(response_info: Option<&UserInfo>) -> Option<String> {
    response_info?
        .get(RESPONSE_TYPED_TEXT_KEY)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Response-info key carrying text-input action content.
pub const RESPONSE_TYPED_TEXT_KEY: &str = "UIUserNotificationActionResponseTypedTextKey";

/// Identifier reported when the user taps the notification itself.
pub const DEFAULT_ACTION_IDENTIFIER: &str = "com.apple.UNNotificationDefaultActionIdentifier";
