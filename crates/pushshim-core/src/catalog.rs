// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Event catalog: the fixed table of event names and their payload contracts.
//
// Names and keys are wire-stable. A published event may only ever gain new
// optional keys; existing keys never change kind and required keys are never
// dropped.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{Result, ShimError};

/// Catalog version, tied to the crate release that shipped it.
pub const CATALOG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Namespace shared by every event wire name.
pub const EVENT_NAMESPACE: &str = "com.mobile-messaging.notification.";

/// Every event the SDK can publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventName {
    RegistrationUpdated,
    DeviceTokenReceived,
    DeliveryReportSent,
    ApiError,
    MessageReceived,
    MessagesWillSend,
    MessagesDidSend,
    GeoRegionDidEnter,
    GeoRegionDidExit,
    GeoServiceDidStart,
    MessageTapped,
    ActionTapped,
    UserSynced,
    InstallationSynced,
    CenterAuthRequestFinished,
    Depersonalized,
    Personalized,
    InAppChatAvailabilityUpdated,
    InAppChatUnreadCounterUpdated,
    InAppChatViewChanged,
    ChatRegistrationReceived,
}

impl EventName {
    pub const ALL: [EventName; 21] = [
        Self::RegistrationUpdated,
        Self::DeviceTokenReceived,
        Self::DeliveryReportSent,
        Self::ApiError,
        Self::MessageReceived,
        Self::MessagesWillSend,
        Self::MessagesDidSend,
        Self::GeoRegionDidEnter,
        Self::GeoRegionDidExit,
        Self::GeoServiceDidStart,
        Self::MessageTapped,
        Self::ActionTapped,
        Self::UserSynced,
        Self::InstallationSynced,
        Self::CenterAuthRequestFinished,
        Self::Depersonalized,
        Self::Personalized,
        Self::InAppChatAvailabilityUpdated,
        Self::InAppChatUnreadCounterUpdated,
        Self::InAppChatViewChanged,
        Self::ChatRegistrationReceived,
    ];

    /// Stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegistrationUpdated => "com.mobile-messaging.notification.reg-updated",
            Self::DeviceTokenReceived => "com.mobile-messaging.notification.device-token-received",
            Self::DeliveryReportSent => "com.mobile-messaging.notification.dlr-sent",
            Self::ApiError => "com.mobile-messaging.notification.api-error",
            Self::MessageReceived => "com.mobile-messaging.notification.message-received",
            Self::MessagesWillSend => "com.mobile-messaging.notification.messages-will-send",
            Self::MessagesDidSend => "com.mobile-messaging.notification.messages-did-send",
            Self::GeoRegionDidEnter => {
                "com.mobile-messaging.notification.geographical-region-did-enter"
            }
            Self::GeoRegionDidExit => {
                "com.mobile-messaging.notification.geographical-region-did-exit"
            }
            Self::GeoServiceDidStart => "com.mobile-messaging.notification.geo-service-did-start",
            Self::MessageTapped => "com.mobile-messaging.notification.message-tapped",
            Self::ActionTapped => "com.mobile-messaging.notification.action-tapped",
            Self::UserSynced => "com.mobile-messaging.notification.user-synced",
            Self::InstallationSynced => "com.mobile-messaging.notification.installation-synced",
            Self::CenterAuthRequestFinished => {
                "com.mobile-messaging.notification.center-auth-request-finished"
            }
            Self::Depersonalized => "com.mobile-messaging.notification.depersonalized",
            Self::Personalized => "com.mobile-messaging.notification.personalized",
            Self::InAppChatAvailabilityUpdated => {
                "com.mobile-messaging.notification.inappchat-availability-updated"
            }
            Self::InAppChatUnreadCounterUpdated => {
                "com.mobile-messaging.notification.inappchat-unread-counter-updated"
            }
            Self::InAppChatViewChanged => "com.mobile-messaging.notification.inappchat-view-changed",
            Self::ChatRegistrationReceived => {
                "com.mobile-messaging.notification.chat-registration-received"
            }
        }
    }

    /// Payload contract for this event.
    pub fn descriptor(&self) -> &'static EventDescriptor {
        // DESCRIPTORS is laid out in the same order as `ALL`.
        &DESCRIPTORS[*self as usize]
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = ShimError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ShimError::UnknownEvent(s.to_owned()))
    }
}

/// Every payload key used by any event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKey {
    InternalId,
    DeviceToken,
    MessageIds,
    Error,
    Message,
    NotificationUserInfo,
    IsPush,
    IsSilent,
    CustomPayload,
    MoMessages,
    Region,
    ActionIdentifier,
    TextInput,
    User,
    Installation,
    Granted,
    Enabled,
    Counter,
    ViewState,
    RegistrationId,
}

impl PayloadKey {
    /// Stable wire key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InternalId => "internalId",
            Self::DeviceToken => "deviceToken",
            Self::MessageIds => "messageIds",
            Self::Error => "error",
            Self::Message => "message",
            Self::NotificationUserInfo => "notificationUserInfo",
            Self::IsPush => "isPush",
            Self::IsSilent => "isSilent",
            Self::CustomPayload => "customPayload",
            Self::MoMessages => "moMessages",
            Self::Region => "region",
            Self::ActionIdentifier => "actionIdentifier",
            Self::TextInput => "textInput",
            Self::User => "user",
            Self::Installation => "installation",
            Self::Granted => "granted",
            Self::Enabled => "enabled",
            Self::Counter => "counter",
            Self::ViewState => "viewState",
            Self::RegistrationId => "registrationId",
        }
    }
}

impl fmt::Display for PayloadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape a payload value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    /// Non-empty string of hexadecimal digits.
    HexString,
    /// String drawn from a closed set of readable values.
    Enumerated(&'static [&'static str]),
    Boolean,
    Integer,
    /// Structured record (JSON object).
    Object,
    StringList,
    ObjectList,
}

impl ValueKind {
    /// Whether `value` has this shape.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::HexString => value
                .as_str()
                .is_some_and(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())),
            Self::Enumerated(allowed) => value.as_str().is_some_and(|s| allowed.contains(&s)),
            Self::Boolean => value.is_boolean(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Object => value.is_object(),
            Self::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            Self::ObjectList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_object)),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::HexString => "a hex string",
            Self::Enumerated(_) => "one of the enumerated readable values",
            Self::Boolean => "a boolean",
            Self::Integer => "an integer",
            Self::Object => "an object",
            Self::StringList => "a list of strings",
            Self::ObjectList => "a list of objects",
        }
    }
}

/// Whether a key must always be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// Contract for one payload key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub key: PayloadKey,
    pub kind: ValueKind,
    pub presence: Presence,
}

const fn required(key: PayloadKey, kind: ValueKind) -> KeySpec {
    KeySpec {
        key,
        kind,
        presence: Presence::Required,
    }
}

const fn optional(key: PayloadKey, kind: ValueKind) -> KeySpec {
    KeySpec {
        key,
        kind,
        presence: Presence::Optional,
    }
}

/// Payload contract of a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventDescriptor {
    pub name: EventName,
    pub keys: &'static [KeySpec],
}

impl EventDescriptor {
    /// Contract for a wire key, if this event declares it.
    pub fn key(&self, wire_key: &str) -> Option<&'static KeySpec> {
        self.keys.iter().find(|spec| spec.key.as_str() == wire_key)
    }

    pub fn required_keys(&self) -> impl Iterator<Item = PayloadKey> + '_ {
        self.keys
            .iter()
            .filter(|spec| spec.presence == Presence::Required)
            .map(|spec| spec.key)
    }

    /// Check a payload against this contract.
    ///
    /// Fails on the first undeclared key, wrongly-shaped value, or missing
    /// required key.
    pub fn validate(&self, payload: &Map<String, Value>) -> Result<()> {
        for (key, value) in payload {
            let spec = self.key(key).ok_or_else(|| ShimError::UndeclaredKey {
                event: self.name.to_string(),
                key: key.clone(),
            })?;
            if !spec.kind.accepts(value) {
                return Err(ShimError::KindMismatch {
                    event: self.name.to_string(),
                    key: key.clone(),
                    expected: spec.kind.describe(),
                });
            }
        }
        if let Some(missing) = self
            .required_keys()
            .find(|key| !payload.contains_key(key.as_str()))
        {
            return Err(ShimError::MissingKey {
                event: self.name.to_string(),
                key: missing.to_string(),
            });
        }
        Ok(())
    }
}

const CHAT_VIEW_STATES: &[&str] = &[
    "LOADING",
    "THREAD_LIST",
    "LOADING_THREAD",
    "THREAD",
    "SINGLE_MODE_THREAD",
    "CLOSED_THREAD",
    "UNKNOWN",
];

use PayloadKey as K;
use ValueKind as V;

static DESCRIPTORS: [EventDescriptor; 21] = [
    EventDescriptor {
        name: EventName::RegistrationUpdated,
        keys: &[required(K::InternalId, V::String)],
    },
    EventDescriptor {
        name: EventName::DeviceTokenReceived,
        keys: &[required(K::DeviceToken, V::HexString)],
    },
    EventDescriptor {
        name: EventName::DeliveryReportSent,
        keys: &[required(K::MessageIds, V::StringList)],
    },
    EventDescriptor {
        name: EventName::ApiError,
        keys: &[required(K::Error, V::Object)],
    },
    EventDescriptor {
        name: EventName::MessageReceived,
        keys: &[
            required(K::Message, V::Object),
            optional(K::NotificationUserInfo, V::Object),
            optional(K::IsPush, V::Boolean),
            optional(K::IsSilent, V::Boolean),
            optional(K::CustomPayload, V::Object),
        ],
    },
    EventDescriptor {
        name: EventName::MessagesWillSend,
        keys: &[required(K::MoMessages, V::ObjectList)],
    },
    EventDescriptor {
        name: EventName::MessagesDidSend,
        keys: &[required(K::MoMessages, V::ObjectList)],
    },
    EventDescriptor {
        name: EventName::GeoRegionDidEnter,
        keys: &[required(K::Region, V::Object)],
    },
    EventDescriptor {
        name: EventName::GeoRegionDidExit,
        keys: &[required(K::Region, V::Object)],
    },
    EventDescriptor {
        name: EventName::GeoServiceDidStart,
        keys: &[],
    },
    EventDescriptor {
        name: EventName::MessageTapped,
        keys: &[
            required(K::Message, V::Object),
            optional(K::NotificationUserInfo, V::Object),
        ],
    },
    EventDescriptor {
        name: EventName::ActionTapped,
        keys: &[
            required(K::Message, V::Object),
            required(K::ActionIdentifier, V::String),
            optional(K::TextInput, V::String),
            optional(K::NotificationUserInfo, V::Object),
        ],
    },
    EventDescriptor {
        name: EventName::UserSynced,
        keys: &[required(K::User, V::Object)],
    },
    EventDescriptor {
        name: EventName::InstallationSynced,
        keys: &[required(K::Installation, V::Object)],
    },
    EventDescriptor {
        name: EventName::CenterAuthRequestFinished,
        keys: &[
            required(K::Granted, V::Boolean),
            optional(K::Error, V::Object),
        ],
    },
    EventDescriptor {
        name: EventName::Depersonalized,
        keys: &[],
    },
    EventDescriptor {
        name: EventName::Personalized,
        keys: &[],
    },
    EventDescriptor {
        name: EventName::InAppChatAvailabilityUpdated,
        keys: &[required(K::Enabled, V::Boolean)],
    },
    EventDescriptor {
        name: EventName::InAppChatUnreadCounterUpdated,
        keys: &[required(K::Counter, V::Integer)],
    },
    EventDescriptor {
        name: EventName::InAppChatViewChanged,
        keys: &[required(K::ViewState, V::Enumerated(CHAT_VIEW_STATES))],
    },
    EventDescriptor {
        name: EventName::ChatRegistrationReceived,
        keys: &[required(K::RegistrationId, V::String)],
    },
];

/// Look up a descriptor by wire name.
pub fn descriptor_for(name: &str) -> Option<&'static EventDescriptor> {
    name.parse::<EventName>().ok().map(|n| n.descriptor())
}

/// All descriptors in catalog order.
pub fn descriptors() -> &'static [EventDescriptor] {
    &DESCRIPTORS
}
