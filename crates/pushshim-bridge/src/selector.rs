// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lifecycle selectors: every callback the platform runtime may invoke on an
// application delegate, enumerated up front.

use std::fmt;

/// Identity of a lifecycle callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Selector {
    DidFinishLaunching,
    DidRegisterForRemoteNotifications,
    DidFailToRegisterForRemoteNotifications,
    DidReceiveRemoteNotification,
    DidReceiveLocalNotification,
    HandleActionForLocalNotification,
    HandleActionForRemoteNotification,
    WillEnterForeground,
    DidBecomeActive,
    WillResignActive,
    DidEnterBackground,
    WillTerminate,
    OpenUrl,
    PerformFetch,
}

impl Selector {
    /// Every selector, in declaration order.
    pub const ALL: [Selector; 14] = [
        Self::DidFinishLaunching,
        Self::DidRegisterForRemoteNotifications,
        Self::DidFailToRegisterForRemoteNotifications,
        Self::DidReceiveRemoteNotification,
        Self::DidReceiveLocalNotification,
        Self::HandleActionForLocalNotification,
        Self::HandleActionForRemoteNotification,
        Self::WillEnterForeground,
        Self::DidBecomeActive,
        Self::WillResignActive,
        Self::DidEnterBackground,
        Self::WillTerminate,
        Self::OpenUrl,
        Self::PerformFetch,
    ];

    /// Platform method name, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DidFinishLaunching => "application:didFinishLaunchingWithOptions:",
            Self::DidRegisterForRemoteNotifications => {
                "application:didRegisterForRemoteNotificationsWithDeviceToken:"
            }
            Self::DidFailToRegisterForRemoteNotifications => {
                "application:didFailToRegisterForRemoteNotificationsWithError:"
            }
            Self::DidReceiveRemoteNotification => {
                "application:didReceiveRemoteNotification:fetchCompletionHandler:"
            }
            Self::DidReceiveLocalNotification => "application:didReceiveLocalNotification:",
            Self::HandleActionForLocalNotification => {
                "application:handleActionWithIdentifier:forLocalNotification:withResponseInfo:completionHandler:"
            }
            Self::HandleActionForRemoteNotification => {
                "application:handleActionWithIdentifier:forRemoteNotification:withResponseInfo:completionHandler:"
            }
            Self::WillEnterForeground => "applicationWillEnterForeground:",
            Self::DidBecomeActive => "applicationDidBecomeActive:",
            Self::WillResignActive => "applicationWillResignActive:",
            Self::DidEnterBackground => "applicationDidEnterBackground:",
            Self::WillTerminate => "applicationWillTerminate:",
            Self::OpenUrl => "application:openURL:options:",
            Self::PerformFetch => "application:performFetchWithCompletionHandler:",
        }
    }

    /// Whether the callback carries a platform completion handler.
    pub fn has_completion(&self) -> bool {
        matches!(
            self,
            Self::DidReceiveRemoteNotification
                | Self::HandleActionForLocalNotification
                | Self::HandleActionForRemoteNotification
                | Self::PerformFetch
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
