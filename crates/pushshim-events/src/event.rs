// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Event instances. An `Event` can only be built through catalog validation,
// so holding one is proof that its payload honours the contract.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use pushshim_core::catalog::{EventName, PayloadKey};
use pushshim_core::error::Result;

/// Payload dictionary keyed by wire key.
pub type Payload = Map<String, Value>;

/// A named event with a validated payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    name: EventName,
    payload: Payload,
}

impl Event {
    /// Validate `payload` against the catalog entry for `name`.
    pub fn new(name: EventName, payload: Payload) -> Result<Self> {
        name.descriptor().validate(&payload)?;
        Ok(Self { name, payload })
    }

    /// Same as [`Event::new`] but resolves the wire name first.
    pub fn named(name: &str, payload: Payload) -> Result<Self> {
        Self::new(name.parse()?, payload)
    }

    /// An event whose catalog entry declares no required keys.
    pub fn bare(name: EventName) -> Result<Self> {
        Self::new(name, Payload::new())
    }

    /// Catalog entry this event was validated against.
    pub fn name(&self) -> EventName {
        self.name
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    pub fn get(&self, key: PayloadKey) -> Option<&Value> {
        self.payload.get(key.as_str())
    }

    pub fn contains(&self, key: PayloadKey) -> bool {
        self.payload.contains_key(key.as_str())
    }

    pub fn str(&self, key: PayloadKey) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn bool(&self, key: PayloadKey) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn integer(&self, key: PayloadKey) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Deserialize a structured value (message, region, user, ...).
    ///
    /// `Ok(None)` when the key is absent.
    pub fn decode<T: DeserializeOwned>(&self, key: PayloadKey) -> Result<Option<T>> {
        match self.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }
}
