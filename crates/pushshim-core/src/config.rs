// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shim configuration.
//
// Besides identifying the application, the config carries what the SDK
// session registers with the platform at launch: the alert styles it asks
// for and the host's interactive notification categories. Category and
// action identifiers starting with `mm_` belong to the SDK; host entries
// using the prefix are discarded before registration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShimError};

/// Identifier prefix reserved for SDK-defined categories and actions.
pub const RESERVED_PREFIX: &str = "mm_";

/// How the app alerts the user when a push arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Alert,
    Sound,
    Badge,
}

/// A button shown on an interactive notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub identifier: String,
    pub title: String,
    /// Offers a text field; the typed text arrives in the action's
    /// response info.
    #[serde(default)]
    pub text_input: bool,
    /// Launches the app into the foreground when tapped.
    #[serde(default)]
    pub foreground: bool,
}

impl NotificationAction {
    /// Background action without text input.
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            text_input: false,
            foreground: false,
        }
    }

    /// Identifier uses the SDK's reserved prefix.
    pub fn is_reserved(&self) -> bool {
        self.identifier.starts_with(RESERVED_PREFIX)
    }
}

/// A named set of actions a notification can reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCategory {
    pub identifier: String,
    pub actions: Vec<NotificationAction>,
}

impl NotificationCategory {
    /// Category offering `actions` in order.
    pub fn new(identifier: impl Into<String>, actions: Vec<NotificationAction>) -> Self {
        Self {
            identifier: identifier.into(),
            actions,
        }
    }

    pub fn is_reserved(&self) -> bool {
        self.identifier.starts_with(RESERVED_PREFIX)
    }
}

/// What the messaging backend needs to start a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub application_code: String,
    pub app_group_id: Option<String>,
    pub notification_types: Vec<NotificationType>,
    /// Host categories with reserved entries already removed.
    pub categories: Vec<NotificationCategory>,
    /// Host category and action identifiers that were removed.
    pub discarded: Vec<String>,
}

/// Settings supplied by the host application at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShimConfig {
    /// Application code identifying the host app to the messaging backend.
    pub application_code: String,
    /// Shared app group used by notification extensions, if any.
    pub app_group_id: Option<String>,
    /// Fallback log filter when `RUST_LOG` is not set.
    pub log_level: String,
    /// Forward callbacks to the host's original delegate.
    pub forward_unhandled: bool,
    /// Alert styles requested from the platform.
    pub notification_types: Vec<NotificationType>,
    /// Host-defined interactive categories registered at launch.
    pub interactive_categories: Vec<NotificationCategory>,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            application_code: String::from("unconfigured"),
            app_group_id: None,
            log_level: String::from("info"),
            forward_unhandled: true,
            notification_types: vec![NotificationType::Alert, NotificationType::Sound],
            interactive_categories: Vec::new(),
        }
    }
}

impl ShimConfig {
    /// Config with the given application code and defaults elsewhere.
    pub fn with_application_code(code: impl Into<String>) -> Self {
        Self {
            application_code: code.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Reject settings the SDK cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.application_code.trim().is_empty() {
            return Err(ShimError::InvalidConfig(
                "application_code must not be empty".into(),
            ));
        }
        if let Some(group) = &self.app_group_id {
            if !group.starts_with("group.") {
                return Err(ShimError::InvalidConfig(format!(
                    "app_group_id {group:?} must start with \"group.\""
                )));
            }
        }
        if self.notification_types.is_empty() {
            return Err(ShimError::InvalidConfig(
                "notification_types must name at least one alert style".into(),
            ));
        }
        let blank = self.interactive_categories.iter().any(|category| {
            category.identifier.trim().is_empty()
                || category.actions.iter().any(|a| a.identifier.trim().is_empty())
        });
        if blank {
            return Err(ShimError::InvalidConfig(
                "interactive category and action identifiers must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Session parameters for the backend. Reserved categories are dropped
    /// whole; reserved actions are dropped from otherwise valid categories.
    pub fn session_options(&self) -> SessionOptions {
        let mut discarded = Vec::new();
        let mut categories = Vec::with_capacity(self.interactive_categories.len());
        for category in &self.interactive_categories {
            if category.is_reserved() {
                discarded.push(category.identifier.clone());
                continue;
            }
            let (reserved, actions): (Vec<_>, Vec<_>) = category
                .actions
                .iter()
                .cloned()
                .partition(NotificationAction::is_reserved);
            discarded.extend(reserved.into_iter().map(|a| a.identifier));
            categories.push(NotificationCategory {
                identifier: category.identifier.clone(),
                actions,
            });
        }

        let mut notification_types = self.notification_types.clone();
        let mut seen = std::collections::HashSet::new();
        notification_types.retain(|t| seen.insert(*t));

        SessionOptions {
            application_code: self.application_code.clone(),
            app_group_id: self.app_group_id.clone(),
            notification_types,
            categories,
            discarded,
        }
    }
}
