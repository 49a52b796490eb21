//! Counter scenarios from the component/state walkthrough.

mod common;

use common::{counter, init_tracing, props, Harness};
use tinyhooks::{mount, ComponentInstance, Lifecycle, Props, RuntimeConfig, Version};

// --- Round-trip ---

#[test]
fn test_mount_then_render_matches_initial_state() {
    init_tracing();
    let (instance, output) = mount(counter(), props(0)).unwrap();
    assert_eq!(output, "<p>Count: 0</p>");
    assert_eq!(instance.render().unwrap(), output);
}

#[test]
fn test_props_flow_into_output() {
    let (_, output) = mount(counter(), props(7).with("label", "Clicks")).unwrap();
    assert_eq!(output, "<p>Clicks: 7</p>");
}

// --- Coalescing ---

#[test]
fn test_three_updaters_coalesce_into_one_render() {
    init_tracing();
    let harness = Harness::new();
    let (instance, _) = mount(harness.definition(), props(0)).unwrap();
    let set_count = harness.setter();

    for _ in 0..3 {
        set_count.update(|v| v + 1).unwrap();
    }
    assert_eq!(instance.lifecycle(), Lifecycle::MountedDirty);
    assert_eq!(harness.calls(), 1);

    let output = instance.render().unwrap();
    assert_eq!(output, "<p>Count: 3</p>");
    assert_eq!(harness.calls(), 2);
    assert_eq!(set_count.version().unwrap(), Version(3));
}

#[test]
fn test_last_literal_wins() {
    let harness = Harness::new();
    let (instance, _) = mount(harness.definition(), props(0)).unwrap();
    let set_count = harness.setter();

    set_count.set(10).unwrap();
    set_count.set(4).unwrap();
    set_count.set(9).unwrap();

    assert_eq!(instance.render().unwrap(), "<p>Count: 9</p>");
}

#[test]
fn test_updaters_see_earlier_literals() {
    let harness = Harness::new();
    let (instance, _) = mount(harness.definition(), props(0)).unwrap();
    let set_count = harness.setter();

    set_count.set(10).unwrap();
    set_count.update(|v| v * 2).unwrap();
    set_count.update(|v| v - 1).unwrap();

    assert_eq!(instance.render().unwrap(), "<p>Count: 19</p>");
}

#[test]
fn test_state_survives_rerenders() {
    let harness = Harness::new();
    let (instance, _) = mount(harness.definition(), props(0)).unwrap();

    harness.setter().update(|v| v + 1).unwrap();
    instance.render().unwrap();
    harness.setter().update(|v| v + 1).unwrap();
    assert_eq!(instance.render().unwrap(), "<p>Count: 2</p>");

    // A new initialValue prop does not reset existing state.
    assert_eq!(instance.update_props(props(100)).unwrap(), "<p>Count: 2</p>");
}

// --- Idempotence ---

#[test]
fn test_render_twice_is_idempotent() {
    let harness = Harness::new();
    let (instance, _) = mount(harness.definition(), props(0)).unwrap();
    harness.setter().update(|v| v + 5).unwrap();

    let first = instance.render().unwrap();
    let second = instance.render().unwrap();
    assert_eq!(first, second);
    assert_eq!(harness.calls(), 2);
    assert_eq!(instance.lifecycle(), Lifecycle::MountedClean);
}

// --- Bail-out ---

#[test]
fn test_equal_literal_bails_out() {
    let harness = Harness::new();
    let (instance, before) = mount(harness.definition(), props(500)).unwrap();

    assert!(!harness.setter().set(500).unwrap());
    assert!(!instance.is_dirty());
    assert_eq!(instance.render().unwrap(), before);
    assert_eq!(harness.calls(), 1);
}

#[test]
fn test_equal_literal_without_bail_out_renders_same_output() {
    let harness = Harness::new();
    let config = RuntimeConfig {
        bail_out_on_equal: false,
        ..Default::default()
    };
    let (instance, before) =
        ComponentInstance::mount_with_config(harness.definition(), props(500), &config).unwrap();

    assert!(harness.setter().set(500).unwrap());
    assert!(instance.is_dirty());
    assert_eq!(instance.render().unwrap(), before);
    assert_eq!(harness.calls(), 2);
}

// --- Multiple cells ---

#[test]
fn test_cells_are_matched_by_position() {
    use tinyhooks::{Definition, RenderScope};

    let definition = Definition::new("Form", |_: &Props, scope: &mut RenderScope<'_>| {
        let (name, _) = scope.use_state(String::from("Ada"))?;
        let (age, set_age) = scope.use_state(36u32)?;
        if age == 36 {
            set_age.set(37)?;
        }
        Ok(format!("{} ({})", name, age))
    });

    let (instance, output) = mount(definition, Props::new()).unwrap();
    assert_eq!(output, "Ada (36)");
    assert_eq!(instance.render().unwrap(), "Ada (37)");
    assert_eq!(instance.stats().cell_count, 2);
}

#[test]
fn test_lazy_initializer_runs_once() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tinyhooks::{Definition, RenderScope};

    let inits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&inits);
    let definition = Definition::new("Lazy", move |_: &(), scope: &mut RenderScope<'_>| {
        let counter = Arc::clone(&counter);
        let (items, _) = scope.use_state_with(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            vec![1, 2, 3]
        })?;
        Ok(items.len())
    });

    let (instance, _) = mount(definition, ()).unwrap();
    instance.update_props(()).unwrap();
    instance.update_props(()).unwrap();
    assert_eq!(inits.load(Ordering::SeqCst), 1);
}
