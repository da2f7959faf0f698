// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for payload validation and publish fan-out in the
// pushshim-events crate.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;

use pushshim_core::EventName;
use pushshim_events::{DispatchContext, Event, EventBus, Payload, SdkEvent, Topic};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Validation cost of a message-received payload with every optional key.
fn bench_validate_message_received(c: &mut Criterion) {
    let payload: Payload = json!({
        "message": {"messageId": "m1", "aps": {"alert": "hello"}},
        "notificationUserInfo": {"messageId": "m1"},
        "isPush": true,
        "isSilent": false,
        "customPayload": {"k": "v"}
    })
    .as_object()
    .cloned()
    .expect("object literal");

    c.bench_function("validate message-received", |b| {
        b.iter(|| {
            let event = Event::new(EventName::MessageReceived, black_box(payload.clone()))
                .expect("valid payload");
            black_box(event);
        });
    });
}

/// Publish to 1, 10 and 100 immediate subscribers.
fn bench_publish_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish_fan_out");
    for &subscribers in &[1usize, 10, 100] {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for i in 0..subscribers {
            let hits = Arc::clone(&hits);
            let topic = if i % 2 == 0 {
                Topic::All
            } else {
                Topic::Event(EventName::RegistrationUpdated)
            };
            bus.subscribe(topic, DispatchContext::Immediate, move |_| {
                hits.fetch_add(1, Ordering::Relaxed);
            });
        }

        group.bench_function(format!("{subscribers} subscribers"), |b| {
            b.iter(|| {
                let delivered = bus
                    .emit(SdkEvent::RegistrationUpdated {
                        internal_id: "push-reg-1".into(),
                    })
                    .expect("valid event");
                black_box(delivered);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_validate_message_received, bench_publish_fan_out);
criterion_main!(benches);
