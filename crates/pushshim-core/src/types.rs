// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain records carried by lifecycle callbacks and event payloads.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// String-keyed, dynamically-typed dictionary as delivered by the platform
/// (notification `userInfo`, launch options, action response info).
pub type UserInfo = Map<String, Value>;

/// APNs payload keys the SDK understands.
pub mod apns_keys {
    pub const APS: &str = "aps";
    pub const MESSAGE_ID: &str = "messageId";
    pub const INTERNAL_DATA: &str = "internalData";
    pub const CUSTOM_PAYLOAD: &str = "customPayload";
    pub const CATEGORY: &str = "category";
    pub const SILENT: &str = "silent";
    pub const SEND_DATE_TIME: &str = "sendDateTime";
    /// Set by plugin hosts on a payload that launched the app.
    pub const LAUNCHED_APPLICATION: &str = "ApplicationLaunchedByNotification_Key";
}

/// Outcome reported through a fetch-completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchResult {
    /// New data was downloaded.
    NewData,
    /// Nothing new to fetch.
    NoData,
    /// The fetch attempt failed.
    Failed,
}

/// Run state of the host application at the moment a callback fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationState {
    Active,
    /// Transitioning, e.g. the user just tapped a notification.
    Inactive,
    Background,
}

/// Options dictionary passed to did-finish-launching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchOptions(pub UserInfo);

impl LaunchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Remote notification that launched the app, if any.
    pub fn remote_notification(&self) -> Option<&UserInfo> {
        self.0
            .get("UIApplicationLaunchOptionsRemoteNotificationKey")
            .and_then(Value::as_object)
    }
}

/// A mobile-terminated message parsed from a push or local notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: String,
    /// Effective `aps` dictionary (silent aps merged over the native one).
    pub aps: UserInfo,
    pub is_silent: bool,
    pub category: Option<String>,
    pub custom_payload: Option<UserInfo>,
    pub internal_data: Option<UserInfo>,
    pub send_date_time: DateTime<Utc>,
    /// The payload was marked as the one that launched the app.
    #[serde(default)]
    pub launched_application: bool,
    /// Payload as delivered, minus the launch marker.
    pub original_payload: UserInfo,
}

impl Message {
    /// Parse a notification payload.
    ///
    /// Returns `None` for payloads that did not originate from the messaging
    /// backend: no string `messageId`, or neither a native `aps` object nor a
    /// silent `internalData.silent` object.
    pub fn from_apns_payload(payload: &UserInfo) -> Option<Self> {
        let message_id = payload.get(apns_keys::MESSAGE_ID)?.as_str()?.to_owned();
        let internal_data = payload
            .get(apns_keys::INTERNAL_DATA)
            .and_then(Value::as_object)
            .cloned();
        let native_aps = payload.get(apns_keys::APS).and_then(Value::as_object);

        let silent_aps = internal_data
            .as_ref()
            .and_then(|d| d.get(apns_keys::SILENT));
        let (aps, is_silent) = match silent_aps {
            Some(silent) => {
                let silent = silent.as_object()?;
                let mut merged = native_aps.cloned().unwrap_or_default();
                for (k, v) in silent {
                    merged.insert(k.clone(), v.clone());
                }
                (merged, true)
            }
            None => (native_aps?.clone(), false),
        };

        let send_date_time = internal_data
            .as_ref()
            .and_then(|d| d.get(apns_keys::SEND_DATE_TIME))
            .and_then(Value::as_f64)
            .and_then(|millis| Utc.timestamp_millis_opt(millis as i64).single())
            .unwrap_or_else(Utc::now);

        let category = aps
            .get(apns_keys::CATEGORY)
            .and_then(Value::as_str)
            .map(str::to_owned);

        let mut original_payload = payload.clone();
        let launched_application = original_payload
            .remove(apns_keys::LAUNCHED_APPLICATION)
            .is_some();

        Some(Self {
            message_id,
            aps,
            is_silent,
            category,
            custom_payload: payload
                .get(apns_keys::CUSTOM_PAYLOAD)
                .and_then(Value::as_object)
                .cloned(),
            internal_data,
            send_date_time,
            launched_application,
            original_payload,
        })
    }

    /// Alert body text, when the message carries one.
    pub fn text(&self) -> Option<&str> {
        match self.aps.get("alert")? {
            Value::String(s) => Some(s),
            Value::Object(alert) => alert.get("body").and_then(Value::as_str),
            _ => None,
        }
    }
}

/// Delivery status of a mobile-originated message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoMessageStatus {
    Undefined,
    SentSuccessfully,
    SentWithFailure,
}

/// A mobile-originated message with its sending status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoMessage {
    pub message_id: String,
    pub destination: Option<String>,
    pub text: String,
    pub custom_payload: Option<UserInfo>,
    pub status: MoMessageStatus,
}

/// A monitored geographical region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub identifier: String,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
}

/// User record as last synced with the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub external_user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub custom_attributes: UserInfo,
}

/// Installation (device registration) record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    pub push_registration_id: Option<String>,
    pub device_token: Option<String>,
    pub is_push_registration_enabled: bool,
    pub is_primary_device: bool,
}

/// Structured error reported by the messaging backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub code: String,
    pub description: String,
}

/// State of the in-app chat view, published with its readable wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatViewState {
    #[serde(rename = "LOADING")]
    Loading,
    #[serde(rename = "THREAD_LIST")]
    ThreadList,
    #[serde(rename = "LOADING_THREAD")]
    LoadingThread,
    #[serde(rename = "THREAD")]
    Thread,
    #[serde(rename = "SINGLE_MODE_THREAD")]
    SingleThreadMode,
    #[serde(rename = "CLOSED_THREAD")]
    ClosedThread,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl ChatViewState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "LOADING",
            Self::ThreadList => "THREAD_LIST",
            Self::LoadingThread => "LOADING_THREAD",
            Self::Thread => "THREAD",
            Self::SingleThreadMode => "SINGLE_MODE_THREAD",
            Self::ClosedThread => "CLOSED_THREAD",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parse a readable value; anything unrecognised maps to `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value {
            "LOADING" => Self::Loading,
            "THREAD_LIST" => Self::ThreadList,
            "LOADING_THREAD" => Self::LoadingThread,
            "THREAD" => Self::Thread,
            "SINGLE_MODE_THREAD" => Self::SingleThreadMode,
            "CLOSED_THREAD" => Self::ClosedThread,
            _ => Self::Unknown,
        }
    }
}
