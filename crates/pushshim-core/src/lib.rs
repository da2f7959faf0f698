// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pushshim: Core types, error definitions and the event catalog shared
// across all crates.

pub mod catalog;
pub mod config;
pub mod error;
pub mod types;

pub use catalog::{EventDescriptor, EventName, KeySpec, PayloadKey, Presence, ValueKind};
pub use config::{
    NotificationAction, NotificationCategory, NotificationType, SessionOptions, ShimConfig,
};
pub use error::ShimError;
pub use types::*;
