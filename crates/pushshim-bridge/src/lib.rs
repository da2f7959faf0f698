// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pushshim: application delegate interception.
//
// The host hands its application object to an `Installer`; the installer
// captures the host's delegate and puts the interception proxy in its place.
// Intercepted lifecycle callbacks run the SDK handlers (which publish on the
// event bus) and are forwarded to the original delegate; everything else is
// forwarded verbatim.

pub mod backend;
pub mod completion;
pub mod context;
pub mod handlers;
pub mod installer;
pub mod invocation;
pub mod logging;
pub mod plugin;
pub mod proxy;
pub mod registry;
pub mod selector;
pub mod traits;

pub use backend::{InMemoryBackend, MessagingBackend};
pub use completion::CompletionToken;
pub use context::{ShimContext, ShimContextBuilder};
pub use installer::Installer;
pub use invocation::{ActionCompletion, Call, FetchCompletion, Invocation, LocalNotification, Reply};
pub use plugin::{NotificationCache, PluginDelegate};
pub use proxy::InterceptionProxy;
pub use registry::DelegateRegistry;
pub use selector::Selector;
pub use traits::{Application, ApplicationDelegate, DelegateError, SelectorHandler};
