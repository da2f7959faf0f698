// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pushshim-events: catalog-validated publish/subscribe event bus.
//
// Publishers are the SDK subsystems (registration, message handling,
// geofencing, chat); subscribers are host-app observers or other SDK
// subsystems. Every payload is checked against the event catalog before any
// subscriber sees it.

pub mod bus;
pub mod dispatch;
pub mod event;
pub mod sdk_event;

pub use bus::{EventBus, Subscription, SubscriptionId, Topic};
pub use dispatch::{DispatchContext, DispatchQueue};
pub use event::{Event, Payload};
pub use sdk_event::SdkEvent;
