// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Strongly-typed events published by SDK subsystems. Each variant lowers to
// a catalog-validated `Event`, so a publisher cannot misspell a key or put
// the wrong kind of value under it.

use serde::Serialize;
use serde_json::Value;

use pushshim_core::catalog::{EventName, PayloadKey};
use pushshim_core::error::Result;
use pushshim_core::types::{
    ApiError, ChatViewState, Installation, Message, MoMessage, Region, User, UserInfo,
};

use crate::event::{Event, Payload};

/// One variant per catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub enum SdkEvent {
    RegistrationUpdated {
        internal_id: String,
    },
    DeviceTokenReceived {
        device_token: String,
    },
    DeliveryReportSent {
        message_ids: Vec<String>,
    },
    ApiError {
        error: ApiError,
    },
    MessageReceived {
        message: Message,
        notification_user_info: Option<UserInfo>,
        is_push: Option<bool>,
        is_silent: Option<bool>,
        custom_payload: Option<UserInfo>,
    },
    MessagesWillSend {
        mo_messages: Vec<MoMessage>,
    },
    MessagesDidSend {
        mo_messages: Vec<MoMessage>,
    },
    GeoRegionDidEnter {
        region: Region,
    },
    GeoRegionDidExit {
        region: Region,
    },
    GeoServiceDidStart,
    MessageTapped {
        message: Message,
        notification_user_info: Option<UserInfo>,
    },
    ActionTapped {
        message: Message,
        action_identifier: String,
        text_input: Option<String>,
        notification_user_info: Option<UserInfo>,
    },
    UserSynced {
        user: User,
    },
    InstallationSynced {
        installation: Installation,
    },
    CenterAuthRequestFinished {
        granted: bool,
        error: Option<ApiError>,
    },
    Depersonalized,
    Personalized,
    InAppChatAvailabilityUpdated {
        enabled: bool,
    },
    InAppChatUnreadCounterUpdated {
        counter: i64,
    },
    InAppChatViewChanged {
        view_state: ChatViewState,
    },
    ChatRegistrationReceived {
        registration_id: String,
    },
}

/// Accumulates payload entries, skipping `None` optionals.
struct PayloadBuilder(Payload);

impl PayloadBuilder {
    fn new() -> Self {
        Self(Payload::new())
    }

    fn put(mut self, key: PayloadKey, value: impl Serialize) -> Result<Self> {
        self.0.insert(key.as_str().to_owned(), serde_json::to_value(value)?);
        Ok(self)
    }

    fn put_opt<T: Serialize>(self, key: PayloadKey, value: Option<T>) -> Result<Self> {
        match value {
            Some(v) => self.put(key, v),
            None => Ok(self),
        }
    }

    fn put_raw(mut self, key: PayloadKey, value: Value) -> Self {
        self.0.insert(key.as_str().to_owned(), value);
        self
    }

    fn finish(self) -> Payload {
        self.0
    }
}

impl SdkEvent {
    /// Catalog entry this variant lowers to.
    pub fn name(&self) -> EventName {
        match self {
            Self::RegistrationUpdated { .. } => EventName::RegistrationUpdated,
            Self::DeviceTokenReceived { .. } => EventName::DeviceTokenReceived,
            Self::DeliveryReportSent { .. } => EventName::DeliveryReportSent,
            Self::ApiError { .. } => EventName::ApiError,
            Self::MessageReceived { .. } => EventName::MessageReceived,
            Self::MessagesWillSend { .. } => EventName::MessagesWillSend,
            Self::MessagesDidSend { .. } => EventName::MessagesDidSend,
            Self::GeoRegionDidEnter { .. } => EventName::GeoRegionDidEnter,
            Self::GeoRegionDidExit { .. } => EventName::GeoRegionDidExit,
            Self::GeoServiceDidStart => EventName::GeoServiceDidStart,
            Self::MessageTapped { .. } => EventName::MessageTapped,
            Self::ActionTapped { .. } => EventName::ActionTapped,
            Self::UserSynced { .. } => EventName::UserSynced,
            Self::InstallationSynced { .. } => EventName::InstallationSynced,
            Self::CenterAuthRequestFinished { .. } => EventName::CenterAuthRequestFinished,
            Self::Depersonalized => EventName::Depersonalized,
            Self::Personalized => EventName::Personalized,
            Self::InAppChatAvailabilityUpdated { .. } => EventName::InAppChatAvailabilityUpdated,
            Self::InAppChatUnreadCounterUpdated { .. } => EventName::InAppChatUnreadCounterUpdated,
            Self::InAppChatViewChanged { .. } => EventName::InAppChatViewChanged,
            Self::ChatRegistrationReceived { .. } => EventName::ChatRegistrationReceived,
        }
    }

    /// Lower to a validated [`Event`].
    pub fn into_event(self) -> Result<Event> {
        use PayloadKey as K;

        let name = self.name();
        let b = PayloadBuilder::new();
        let b = match self {
            Self::RegistrationUpdated { internal_id } => b.put(K::InternalId, internal_id)?,
            Self::DeviceTokenReceived { device_token } => b.put(K::DeviceToken, device_token)?,
            Self::DeliveryReportSent { message_ids } => b.put(K::MessageIds, message_ids)?,
            Self::ApiError { error } => b.put(K::Error, error)?,
            Self::MessageReceived {
                message,
                notification_user_info,
                is_push,
                is_silent,
                custom_payload,
            } => b
                .put(K::Message, message)?
                .put_opt(K::NotificationUserInfo, notification_user_info)?
                .put_opt(K::IsPush, is_push)?
                .put_opt(K::IsSilent, is_silent)?
                .put_opt(K::CustomPayload, custom_payload)?,
            Self::MessagesWillSend { mo_messages } | Self::MessagesDidSend { mo_messages } => {
                b.put(K::MoMessages, mo_messages)?
            }
            Self::GeoRegionDidEnter { region } | Self::GeoRegionDidExit { region } => {
                b.put(K::Region, region)?
            }
            Self::MessageTapped {
                message,
                notification_user_info,
            } => b
                .put(K::Message, message)?
                .put_opt(K::NotificationUserInfo, notification_user_info)?,
            Self::ActionTapped {
                message,
                action_identifier,
                text_input,
                notification_user_info,
            } => b
                .put(K::Message, message)?
                .put(K::ActionIdentifier, action_identifier)?
                .put_opt(K::TextInput, text_input)?
                .put_opt(K::NotificationUserInfo, notification_user_info)?,
            Self::UserSynced { user } => b.put(K::User, user)?,
            Self::InstallationSynced { installation } => b.put(K::Installation, installation)?,
            Self::CenterAuthRequestFinished { granted, error } => {
                b.put(K::Granted, granted)?.put_opt(K::Error, error)?
            }
            Self::InAppChatAvailabilityUpdated { enabled } => b.put(K::Enabled, enabled)?,
            Self::InAppChatUnreadCounterUpdated { counter } => b.put(K::Counter, counter)?,
            Self::InAppChatViewChanged { view_state } => {
                b.put_raw(K::ViewState, Value::from(view_state.as_str()))
            }
            Self::ChatRegistrationReceived { registration_id } => {
                b.put(K::RegistrationId, registration_id)?
            }
            Self::GeoServiceDidStart | Self::Depersonalized | Self::Personalized => b,
        };
        Event::new(name, b.finish())
    }
}
