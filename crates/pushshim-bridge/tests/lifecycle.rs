// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end lifecycle scenarios: install, dispatch through the platform
// delegate slot, observe events on the bus.

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use pushshim_bridge::{
    Application, ApplicationDelegate, Call, CompletionToken, DelegateError, InMemoryBackend,
    Installer, Invocation, Reply, Selector, ShimContext,
};
use pushshim_core::types::{ApplicationState, FetchResult, LaunchOptions, UserInfo};
use pushshim_core::{EventName, Message, PayloadKey, ShimConfig};
use pushshim_events::{DispatchContext, DispatchQueue, Event, EventBus, SdkEvent, Topic};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Stand-in for the platform application object.
#[derive(Default)]
struct FakeApplication {
    delegate: Mutex<Option<Arc<dyn ApplicationDelegate>>>,
}

impl Application for FakeApplication {
    fn delegate(&self) -> Option<Arc<dyn ApplicationDelegate>> {
        self.delegate.lock().unwrap().clone()
    }

    fn set_delegate(&self, delegate: Arc<dyn ApplicationDelegate>) {
        *self.delegate.lock().unwrap() = Some(delegate);
    }
}

impl FakeApplication {
    /// Dispatch the way the platform does: ask first, then call.
    fn deliver(&self, invocation: Invocation) -> Option<Reply> {
        let delegate = self.delegate()?;
        if !delegate.responds_to(invocation.selector()) {
            return None;
        }
        delegate.invoke(invocation).ok()
    }
}

/// Host delegate recording every call it receives.
struct HostDelegate {
    implements: Vec<Selector>,
    launch_result: bool,
    calls: Mutex<Vec<Invocation>>,
}

impl HostDelegate {
    fn new(implements: &[Selector]) -> Arc<Self> {
        Arc::new(Self {
            implements: implements.to_vec(),
            launch_result: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

impl ApplicationDelegate for HostDelegate {
    fn responds_to(&self, selector: Selector) -> bool {
        self.implements.contains(&selector)
    }

    fn invoke(&self, invocation: Invocation) -> Result<Reply, DelegateError> {
        let selector = invocation.selector();
        if !self.implements.contains(&selector) {
            return Err(DelegateError::Unrecognized(selector));
        }
        self.calls.lock().unwrap().push(invocation.clone());
        Ok(match invocation.call {
            Call::DidFinishLaunching { .. } => Reply::Bool(self.launch_result),
            Call::OpenUrl { .. } => Reply::Bool(true),
            _ => Reply::Unit,
        })
    }
}

struct World {
    app: FakeApplication,
    installer: Installer,
    backend: InMemoryBackend,
    events: Arc<Mutex<Vec<Event>>>,
}

impl World {
    /// Deliver the launch callback that starts the SDK session.
    fn launch(&self) {
        self.app.deliver(Invocation::new(
            ApplicationState::Inactive,
            Call::DidFinishLaunching {
                options: LaunchOptions::new(),
            },
        ));
    }
}

fn world(host: Option<Arc<dyn ApplicationDelegate>>) -> World {
    let backend = InMemoryBackend::new();
    let context = ShimContext::builder(ShimConfig::with_application_code("app-code-1"))
        .backend(Arc::new(backend.clone()))
        .build()
        .unwrap();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    context
        .bus()
        .subscribe(Topic::All, DispatchContext::Immediate, move |e| {
            sink.lock().unwrap().push(e.clone())
        });

    let app = FakeApplication::default();
    if let Some(host) = host {
        app.set_delegate(host);
    }
    World {
        app,
        installer: Installer::new(context),
        backend,
        events,
    }
}

fn object(value: Value) -> UserInfo {
    value.as_object().cloned().unwrap()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn install_is_idempotent_and_keeps_the_original() {
    let host = HostDelegate::new(&[Selector::WillTerminate]);
    let host_dyn: Arc<dyn ApplicationDelegate> = host.clone();
    let w = world(Some(Arc::clone(&host_dyn)));

    w.installer.install(&w.app).unwrap();
    let installed = w.app.delegate().unwrap();
    w.installer.install(&w.app).unwrap();

    assert!(w.installer.is_installed());
    assert!(Arc::ptr_eq(&installed, &w.app.delegate().unwrap()));
    let original = w.installer.context().registry().original_delegate().unwrap();
    assert!(Arc::ptr_eq(&original, &host_dyn));
}

#[test]
fn non_intercepted_call_reaches_host_exactly_once() {
    let host = HostDelegate::new(&[Selector::OpenUrl, Selector::DidEnterBackground]);
    let w = world(Some(host.clone()));
    w.installer.install(&w.app).unwrap();

    let open = Invocation::new(
        ApplicationState::Inactive,
        Call::OpenUrl {
            url: "myapp://chat/42".into(),
            options: object(json!({"UIApplicationOpenURLOptionsSourceApplicationKey": "com.mail"})),
        },
    );
    assert_eq!(w.app.deliver(open.clone()), Some(Reply::Bool(true)));
    assert_eq!(host.calls(), vec![open]);

    // Selectors nobody implements are never attempted by the platform.
    assert_eq!(
        w.app
            .deliver(Invocation::new(ApplicationState::Active, Call::WillTerminate)),
        None
    );
    assert!(w.events.lock().unwrap().is_empty());
}

#[test]
fn remote_notification_without_original_delegate() {
    let w = world(None);
    w.installer.install(&w.app).unwrap();
    w.launch();

    let payload = object(json!({
        "messageId": "msg-1",
        "aps": {"alert": {"body": "Your parcel is out for delivery"}, "badge": 1}
    }));
    let completions = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&completions);
    let reply = w.app.deliver(Invocation::new(
        ApplicationState::Background,
        Call::DidReceiveRemoteNotification {
            user_info: payload.clone(),
            completion: CompletionToken::new("fetch", move |r| sink.lock().unwrap().push(r)),
        },
    ));

    assert_eq!(reply, Some(Reply::Unit));
    assert_eq!(*completions.lock().unwrap(), vec![FetchResult::NewData]);
    assert_eq!(w.backend.handled_messages(), vec!["msg-1".to_owned()]);

    let events = w.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.name(), EventName::MessageReceived);
    assert_eq!(event.bool(PayloadKey::IsPush), Some(true));
    assert_eq!(event.bool(PayloadKey::IsSilent), Some(false));
    let message: Message = event.decode(PayloadKey::Message).unwrap().unwrap();
    assert_eq!(message.message_id, "msg-1");
    assert_eq!(message.text(), Some("Your parcel is out for delivery"));
}

#[test]
fn launch_runs_sdk_and_host_with_same_options() {
    let host = HostDelegate::new(&[Selector::DidFinishLaunching]);
    let w = world(Some(host.clone()));
    w.installer.install(&w.app).unwrap();

    let options = LaunchOptions::new().with("UIApplicationLaunchOptionsURLKey", json!("myapp://"));
    let launch = Invocation::new(
        ApplicationState::Inactive,
        Call::DidFinishLaunching {
            options: options.clone(),
        },
    );
    assert_eq!(w.app.deliver(launch), Some(Reply::Bool(true)));
    assert_eq!(w.backend.started_with().as_deref(), Some("app-code-1"));

    let calls = host.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].call, Call::DidFinishLaunching { options });
}

#[test]
fn launch_result_requires_both_sides() {
    let host = Arc::new(HostDelegate {
        implements: vec![Selector::DidFinishLaunching],
        launch_result: false,
        calls: Mutex::new(Vec::new()),
    });
    let w = world(Some(host.clone()));
    w.installer.install(&w.app).unwrap();

    let reply = w.app.deliver(Invocation::new(
        ApplicationState::Inactive,
        Call::DidFinishLaunching {
            options: LaunchOptions::new(),
        },
    ));
    assert_eq!(reply, Some(Reply::Bool(false)));
    assert_eq!(w.backend.start_count(), 1);
}

#[test]
fn device_token_is_announced_after_storage() {
    let w = world(None);
    w.installer.install(&w.app).unwrap();
    w.launch();

    let backend = w.backend.clone();
    let stored_at_delivery = Arc::new(Mutex::new(None));
    let probe = Arc::clone(&stored_at_delivery);
    w.installer.context().bus().subscribe(
        EventName::DeviceTokenReceived,
        DispatchContext::Immediate,
        move |_| *probe.lock().unwrap() = backend.device_token(),
    );

    w.app.deliver(Invocation::new(
        ApplicationState::Active,
        Call::DidRegisterForRemoteNotifications {
            device_token: vec![0xab, 0xc1, 0x23],
        },
    ));
    assert_eq!(stored_at_delivery.lock().unwrap().as_deref(), Some("abc123"));
}

#[test]
fn subscribers_receive_in_subscription_order() {
    let bus = EventBus::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    for tag in ["S1", "S2"] {
        let order = Arc::clone(&order);
        bus.subscribe(
            EventName::RegistrationUpdated,
            DispatchContext::Immediate,
            move |_| order.lock().unwrap().push(tag),
        );
    }
    bus.emit(SdkEvent::RegistrationUpdated {
        internal_id: "push-reg-7".into(),
    })
    .unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["S1", "S2"]);
}

#[tokio::test]
async fn subscribers_sharing_a_queue_keep_subscription_order() {
    let bus = EventBus::new();
    let queue = DispatchQueue::new("test.lifecycle.main").unwrap();
    let order = Arc::new(Mutex::new(Vec::new()));
    for tag in ["S1", "S2"] {
        let order = Arc::clone(&order);
        bus.subscribe(
            EventName::RegistrationUpdated,
            DispatchContext::Queue(queue.clone()),
            move |_| order.lock().unwrap().push(tag),
        );
    }
    bus.publish_named(
        EventName::RegistrationUpdated.as_str(),
        object(json!({"internalId": "push-reg-8"})),
    )
    .unwrap();
    queue.flush().await.unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["S1", "S2"]);
}

#[test]
fn action_with_text_input_publishes_action_tapped() {
    let w = world(None);
    w.installer.install(&w.app).unwrap();
    w.launch();

    let done = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&done);
    w.app.deliver(Invocation::new(
        ApplicationState::Background,
        Call::HandleActionForRemoteNotification {
            identifier: Some("reply".into()),
            user_info: object(json!({"messageId": "msg-2", "aps": {"category": "chat"}})),
            response_info: Some(object(
                json!({"UIUserNotificationActionResponseTypedTextKey": "thanks"}),
            )),
            completion: CompletionToken::new("action", move |()| *counter.lock().unwrap() += 1),
        },
    ));

    assert_eq!(*done.lock().unwrap(), 1);
    let events = w.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name(), EventName::ActionTapped);
    assert_eq!(events[0].str(PayloadKey::TextInput), Some("thanks"));
}

#[test]
fn remote_notification_before_launch_is_not_processed() {
    let w = world(None);
    w.installer.install(&w.app).unwrap();

    let completions = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&completions);
    w.installer.context().proxy().dispatch(Invocation::new(
        ApplicationState::Background,
        Call::DidReceiveRemoteNotification {
            user_info: object(json!({"messageId": "msg-early", "aps": {}})),
            completion: CompletionToken::new("fetch", move |r| sink.lock().unwrap().push(r)),
        },
    ));

    assert_eq!(w.backend.start_count(), 0);
    assert_eq!(*completions.lock().unwrap(), vec![FetchResult::NoData]);
    assert!(w.backend.handled_messages().is_empty());
    assert!(w.events.lock().unwrap().is_empty());
}

#[test]
fn released_original_delegate_is_no_longer_forwarded_to() {
    let host = HostDelegate::new(&[Selector::OpenUrl, Selector::DidReceiveRemoteNotification]);
    let w = world(Some(host.clone()));
    w.installer.install(&w.app).unwrap();
    w.launch();

    let proxy = w.app.delegate().unwrap();
    assert!(proxy.responds_to(Selector::OpenUrl));
    drop(host);
    assert!(w.installer.context().registry().original_delegate().is_none());
    assert!(!proxy.responds_to(Selector::OpenUrl));
    assert!(proxy.responds_to(Selector::DidReceiveRemoteNotification));

    let open = Invocation::new(
        ApplicationState::Inactive,
        Call::OpenUrl {
            url: "myapp://inbox".into(),
            options: UserInfo::new(),
        },
    );
    assert_eq!(w.app.deliver(open.clone()), None);
    assert_eq!(proxy.invoke(open).unwrap(), Reply::Bool(false));

    let completions = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&completions);
    let reply = w.app.deliver(Invocation::new(
        ApplicationState::Background,
        Call::DidReceiveRemoteNotification {
            user_info: object(json!({"messageId": "msg-3", "aps": {}})),
            completion: CompletionToken::new("fetch", move |r| sink.lock().unwrap().push(r)),
        },
    ));
    assert_eq!(reply, Some(Reply::Unit));
    assert_eq!(*completions.lock().unwrap(), vec![FetchResult::NewData]);
    let events = w.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name(), EventName::MessageReceived);
}
