//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tinyhooks::{Definition, Props, RenderScope, Setter};

/// Install a test-friendly tracing subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// The tutorial counter: `initialValue` seeds the count, the output shows it.
pub fn counter() -> Definition<Props, String> {
    Definition::new("Counter", |props: &Props, scope: &mut RenderScope<'_>| {
        let initial = props.get_i64("initialValue").unwrap_or(0);
        let (count, _) = scope.use_state(initial)?;
        let label = props.get_str("label").unwrap_or("Count");
        Ok(format!("<p>{}: {}</p>", label, count))
    })
}

/// Counter that hands its setter to the test and counts definition calls.
pub struct Harness {
    pub setter: Arc<parking_lot::Mutex<Option<Setter<i64>>>>,
    pub calls: Arc<AtomicUsize>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            setter: Arc::new(parking_lot::Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn definition(&self) -> Definition<Props, String> {
        let slot = Arc::clone(&self.setter);
        let calls = Arc::clone(&self.calls);
        Definition::new("TrackedCounter", move |props: &Props, scope: &mut RenderScope<'_>| {
            calls.fetch_add(1, Ordering::SeqCst);
            let initial = props.get_i64("initialValue").unwrap_or(0);
            let (count, set_count) = scope.use_state(initial)?;
            *slot.lock() = Some(set_count);
            Ok(format!("<p>Count: {}</p>", count))
        })
    }

    pub fn setter(&self) -> Setter<i64> {
        self.setter
            .lock()
            .clone()
            .expect("definition has rendered at least once")
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn props(initial: i64) -> Props {
    Props::new().with("initialValue", initial).with("increment", 1)
}
