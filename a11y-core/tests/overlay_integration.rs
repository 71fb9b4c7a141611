//! Overlay Integration Tests
//!
//! Drives complete overlays against the in-memory document:
//! - Button keyboard and pointer forwarding
//! - Pause/resume snapshots and focus restoration
//! - Teardown through every lifecycle path
//! - Live announcements and deferred text writes
//! - Progress bar and slider value projection

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use a11y_core::{
    AccessibleOverlay, Affine, Announcer, Bounds, ButtonOverlay, Dom, DomEvent, DomEventKind,
    ImageOverlay, InteractionCallbacks, LifecycleEvent, ManualScheduler, MemoryDom,
    OverlayConfig, OverlayContext, OverlayOptions, OverlayStatus, Politeness, ProgressBarOverlay,
    ProxyNode, ProxyScene, RenderNode, SceneHost, SliderOptions, SliderOverlay, TextOptions,
    TextOverlay,
};

struct Harness {
    dom: MemoryDom,
    scheduler: ManualScheduler,
    ctx: OverlayContext<MemoryDom>,
    scene: Rc<ProxyScene>,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(OverlayConfig::default())
    }

    fn with_config(config: OverlayConfig) -> Self {
        let dom = MemoryDom::new();
        let scheduler = ManualScheduler::new();
        let ctx = OverlayContext::new(dom.clone(), Rc::new(scheduler.clone()), config);
        Self {
            dom,
            scheduler,
            ctx,
            scene: Rc::new(ProxyScene::new()),
        }
    }

    fn scene(&self) -> Option<Rc<dyn SceneHost>> {
        let scene: Rc<dyn SceneHost> = self.scene.clone();
        Some(scene)
    }
}

/// A node at `(x, y)` with the given local size.
fn node_at(x: f64, y: f64, width: f64, height: f64) -> Rc<ProxyNode> {
    Rc::new(ProxyNode::new(
        Affine::translate(x, y),
        Bounds::sized(width, height),
    ))
}

/// Callbacks that record their invocations by name.
fn recording_callbacks() -> (InteractionCallbacks, Rc<RefCell<Vec<&'static str>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let record = |name: &'static str| {
        let log = Rc::clone(&log);
        move || log.borrow_mut().push(name)
    };
    let callbacks = InteractionCallbacks::new()
        .with_key_down(record("down"))
        .with_key_up(record("up"))
        .with_focus(record("focus"))
        .with_blur(record("blur"));
    (callbacks, log)
}

fn count(log: &Rc<RefCell<Vec<&'static str>>>, name: &str) -> usize {
    log.borrow().iter().filter(|entry| **entry == name).count()
}

// ============================================================================
// Button Scenario Tests
// ============================================================================

#[test]
fn test_play_button_keyboard_and_target_teardown() {
    let h = Harness::new();
    let node = node_at(150.0, 80.0, 120.0, 40.0);
    let (callbacks, log) = recording_callbacks();
    let button = ButtonOverlay::new(
        &h.ctx,
        h.scene(),
        node.clone(),
        OverlayOptions::new("Play"),
        callbacks,
    );

    let el = button.element().expect("button element");
    assert_eq!(h.dom.tag(el), "button");
    assert_eq!(h.dom.attribute(el, "type").as_deref(), Some("button"));
    assert_eq!(h.dom.attribute(el, "role").as_deref(), Some("button"));
    assert_eq!(h.dom.attribute(el, "aria-label").as_deref(), Some("Play"));
    assert_eq!(h.dom.style(el, "left").as_deref(), Some("150px"));
    assert_eq!(h.dom.style(el, "top").as_deref(), Some("80px"));

    assert!(h.dom.key(el, DomEventKind::KeyDown, "Enter"));
    assert_eq!(count(&log, "down"), 1);
    assert!(h.dom.key(el, DomEventKind::KeyUp, "Enter"));
    assert_eq!(count(&log, "up"), 1);

    node.destroy();
    assert!(!h.dom.contains(el));
    assert!(button.is_destroyed());
    assert_eq!(button.base().cleanup_len(), 0);
}

#[test]
fn test_button_focus_and_pointer_forwarding() {
    let h = Harness::new();
    let (callbacks, log) = recording_callbacks();
    let button = ButtonOverlay::new(
        &h.ctx,
        h.scene(),
        node_at(10.0, 10.0, 20.0, 20.0),
        OverlayOptions::new("Jump"),
        callbacks,
    );
    let el = button.element().expect("element");

    button.focus();
    assert_eq!(h.dom.focused(), Some(el));
    h.dom.dispatch(el, &DomEvent::new(DomEventKind::PointerDown));
    h.dom.dispatch(el, &DomEvent::new(DomEventKind::PointerUp));
    assert!(h.dom.dispatch(el, &DomEvent::new(DomEventKind::Click)));
    assert!(h.dom.dispatch(el, &DomEvent::new(DomEventKind::TouchStart)));

    assert_eq!(*log.borrow(), vec!["focus", "down", "up"]);
}

#[test]
fn test_callbacks_not_forwarded_while_scene_paused() {
    let h = Harness::new();
    let (callbacks, log) = recording_callbacks();
    let button = ButtonOverlay::new(
        &h.ctx,
        h.scene(),
        node_at(0.0, 0.0, 10.0, 10.0),
        OverlayOptions::new("Fire"),
        callbacks,
    );
    let el = button.element().expect("element");

    h.scene.pause();
    h.dom.key(el, DomEventKind::KeyDown, " ");
    h.dom.key(el, DomEventKind::KeyUp, " ");
    assert!(log.borrow().is_empty());

    h.scene.resume();
    h.dom.key(el, DomEventKind::KeyDown, " ");
    assert_eq!(count(&log, "down"), 1);
    assert_eq!(button.status(), OverlayStatus::Active);
}

#[test]
fn test_disabled_button_ignores_input() {
    let h = Harness::new();
    let (callbacks, log) = recording_callbacks();
    let button = ButtonOverlay::new(
        &h.ctx,
        h.scene(),
        node_at(0.0, 0.0, 10.0, 10.0),
        OverlayOptions::new("Locked").with_disabled(true),
        callbacks,
    );
    let el = button.element().expect("element");

    assert!(h.dom.has_attribute(el, "disabled"));
    assert_eq!(h.dom.attribute(el, "tabindex").as_deref(), Some("-1"));
    button.focus();
    h.dom.key(el, DomEventKind::KeyDown, "Enter");
    assert!(log.borrow().is_empty());
    assert_eq!(button.status(), OverlayStatus::Disabled);
}

// ============================================================================
// Pause / Resume Tests
// ============================================================================

#[test]
fn test_pause_resume_restores_exact_state() {
    let h = Harness::new();
    let (callbacks, _log) = recording_callbacks();
    let focused = ButtonOverlay::new(
        &h.ctx,
        h.scene(),
        node_at(0.0, 0.0, 10.0, 10.0),
        OverlayOptions::new("A"),
        callbacks.clone(),
    );
    let disabled = ButtonOverlay::new(
        &h.ctx,
        h.scene(),
        node_at(50.0, 0.0, 10.0, 10.0),
        OverlayOptions::new("B").with_disabled(true),
        callbacks,
    );
    let a = focused.element().expect("a");
    let b = disabled.element().expect("b");
    focused.focus();

    let projected = |el| {
        (
            h.dom.attribute(el, "aria-hidden"),
            h.dom.has_attribute(el, "disabled"),
        )
    };
    let (a_before, b_before) = (projected(a), projected(b));

    h.scene.pause();
    assert_eq!(h.dom.attribute(a, "aria-hidden").as_deref(), Some("true"));
    assert_eq!(h.dom.focused(), None);

    h.scene.resume();
    assert_eq!(projected(a), a_before);
    assert_eq!(projected(b), b_before);
    assert_eq!(h.dom.focused(), Some(a));
}

#[test]
fn test_resume_does_not_steal_focus() {
    let h = Harness::new();
    let (callbacks, _log) = recording_callbacks();
    let button = ButtonOverlay::new(
        &h.ctx,
        h.scene(),
        node_at(0.0, 0.0, 10.0, 10.0),
        OverlayOptions::new("Idle"),
        callbacks,
    );

    h.scene.pause();
    h.scene.resume();
    assert_eq!(h.dom.focused(), None);
    assert_eq!(button.status(), OverlayStatus::Active);
}

#[test]
fn test_set_disabled_during_pause_applies_on_resume() {
    let h = Harness::new();
    let (callbacks, _log) = recording_callbacks();
    let button = ButtonOverlay::new(
        &h.ctx,
        h.scene(),
        node_at(0.0, 0.0, 10.0, 10.0),
        OverlayOptions::new("Shop"),
        callbacks,
    );
    let el = button.element().expect("element");

    h.scene.pause();
    button.set_disabled(true);
    assert_eq!(button.status(), OverlayStatus::Paused);

    h.scene.resume();
    assert_eq!(button.status(), OverlayStatus::Disabled);
    assert!(!h.dom.has_attribute(el, "aria-hidden"));
    assert_eq!(h.dom.attribute(el, "aria-disabled").as_deref(), Some("true"));
}

#[test]
fn test_hidden_overlay_stays_hidden_across_pause() {
    let h = Harness::new();
    let (callbacks, _log) = recording_callbacks();
    let button = ButtonOverlay::new(
        &h.ctx,
        h.scene(),
        node_at(0.0, 0.0, 10.0, 10.0),
        OverlayOptions::new("Secret").with_hidden(true),
        callbacks,
    );
    let el = button.element().expect("element");

    h.scene.pause();
    h.scene.resume();

    assert_eq!(button.status(), OverlayStatus::Hidden);
    assert!(button.base().is_hidden());
    assert_eq!(h.dom.attribute(el, "aria-hidden").as_deref(), Some("true"));
    assert_eq!(h.dom.attribute(el, "aria-disabled").as_deref(), Some("true"));
    assert_eq!(h.dom.attribute(el, "tabindex").as_deref(), Some("-1"));

    button.focus();
    assert_eq!(h.dom.focused(), None);
}

#[test]
fn test_hidden_toggle_without_pause() {
    let h = Harness::new();
    let image = ImageOverlay::new(
        &h.ctx,
        h.scene(),
        node_at(0.0, 0.0, 32.0, 32.0),
        OverlayOptions::new("Coin"),
    );
    let el = image.element().expect("element");
    assert_eq!(h.dom.tag(el), "img");
    assert_eq!(h.dom.attribute(el, "draggable").as_deref(), Some("false"));
    assert!(h.dom.dispatch(el, &DomEvent::new(DomEventKind::DragStart)));

    image.set_aria_hidden(true);
    image.set_aria_hidden(false);
    assert!(!h.dom.has_attribute(el, "aria-hidden"));
}

// ============================================================================
// Teardown Tests
// ============================================================================

#[test]
fn test_destroy_every_variant() {
    let h = Harness::new();
    let node: Rc<dyn RenderNode> = node_at(0.0, 0.0, 10.0, 10.0);
    let overlays: Vec<Box<dyn AccessibleOverlay<Backend = MemoryDom>>> = vec![
        Box::new(ButtonOverlay::new(
            &h.ctx,
            h.scene(),
            node.clone(),
            OverlayOptions::new("b"),
            InteractionCallbacks::new(),
        )),
        Box::new(TextOverlay::new(
            &h.ctx,
            h.scene(),
            node.clone(),
            OverlayOptions::new("t"),
            TextOptions::new(),
        )),
        Box::new(ImageOverlay::new(
            &h.ctx,
            h.scene(),
            node.clone(),
            OverlayOptions::new("i"),
        )),
        Box::new(ProgressBarOverlay::new(
            &h.ctx,
            h.scene(),
            node.clone(),
            OverlayOptions::new("p"),
        )),
        Box::new(SliderOverlay::new(
            &h.ctx,
            h.scene(),
            node,
            OverlayOptions::new("s"),
            SliderOptions::default(),
            InteractionCallbacks::new(),
            None,
        )),
    ];

    for overlay in &overlays {
        let el = overlay.element().expect("element");
        assert!(h.dom.contains(el));
        overlay.destroy();
        overlay.cleanup();
        assert!(!h.dom.contains(el));
        assert_eq!(h.dom.listener_count(el), 0);
        assert_eq!(overlay.base().cleanup_len(), 0);
        assert!(overlay.is_destroyed());
    }
    assert_eq!(h.scene.events().listener_count(LifecycleEvent::Pause), 0);
}

#[test]
fn test_scene_shutdown_and_destroy_tear_down_once() {
    let h = Harness::new();
    let button = ButtonOverlay::new(
        &h.ctx,
        h.scene(),
        node_at(0.0, 0.0, 10.0, 10.0),
        OverlayOptions::new("Quit"),
        InteractionCallbacks::new(),
    );
    let el = button.element().expect("element");

    h.scene.shutdown();
    assert!(!h.dom.contains(el));
    h.scene.destroy();
    button.destroy();
    assert_eq!(button.status(), OverlayStatus::Destroyed);
}

#[test]
fn test_recreate_replaces_element_and_keeps_subscriptions() {
    let h = Harness::new();
    let (callbacks, log) = recording_callbacks();
    let button = ButtonOverlay::new(
        &h.ctx,
        h.scene(),
        node_at(0.0, 0.0, 10.0, 10.0),
        OverlayOptions::new("Retry"),
        callbacks,
    );
    let old = button.element().expect("element");

    button.recreate();
    let new = button.element().expect("element");
    assert_ne!(old, new);
    assert!(!h.dom.contains(old));
    assert_eq!(h.dom.listener_count(old), 0);

    h.dom.key(new, DomEventKind::KeyDown, "Enter");
    assert_eq!(count(&log, "down"), 1);

    h.scene.pause();
    assert_eq!(h.dom.attribute(new, "aria-hidden").as_deref(), Some("true"));
}

// ============================================================================
// Announcement Tests
// ============================================================================

#[test]
fn test_repeated_countdown_announcement_clears_between_writes() {
    let h = Harness::new();
    h.ctx.announce("3");
    h.ctx.announce("3");
    h.scheduler.flush();

    let region = h
        .dom
        .element_by_id("a11y-live-announcer")
        .expect("live region");
    let history = h.dom.text_history(region);
    let writes: Vec<usize> = history
        .iter()
        .enumerate()
        .filter(|(_, text)| text.as_str() == "3")
        .map(|(index, _)| index)
        .collect();
    assert_eq!(writes.len(), 2);
    assert!(history[writes[0]..writes[1]].iter().any(String::is_empty));
}

#[test]
fn test_announcer_can_be_replaced() {
    struct Recorder(RefCell<Vec<(String, Politeness)>>);

    impl Announcer for Recorder {
        fn announce(&self, message: &str) {
            self.announce_with(message, Politeness::Polite);
        }

        fn announce_with(&self, message: &str, politeness: Politeness) {
            self.0.borrow_mut().push((message.to_string(), politeness));
        }
    }

    let h = Harness::new();
    let recorder = Rc::new(Recorder(RefCell::new(Vec::new())));
    let ctx = h.ctx.clone().with_announcer(recorder.clone());
    ctx.announce("Game over");
    assert_eq!(
        *recorder.0.borrow(),
        vec![("Game over".to_string(), Politeness::Polite)]
    );
    assert!(h.dom.element_by_id("a11y-live-announcer").is_none());
}

#[test]
fn test_deferred_text_after_destroy_is_dropped() {
    let h = Harness::new();
    let text = TextOverlay::new(
        &h.ctx,
        h.scene(),
        node_at(0.0, 0.0, 100.0, 20.0),
        OverlayOptions::new("Wave 1"),
        TextOptions::new().with_announce(true),
    );
    let el = text.element().expect("element");
    text.update_content("Wave 2");
    text.destroy();
    h.scheduler.flush();

    assert!(!h.dom.text_history(el).contains(&"Wave 2".to_string()));
}

// ============================================================================
// Value Projection Tests
// ============================================================================

#[test]
fn test_progress_bar_values() {
    let h = Harness::new();
    let bar = ProgressBarOverlay::new(
        &h.ctx,
        h.scene(),
        node_at(0.0, 0.0, 200.0, 10.0),
        OverlayOptions::new("Level progress"),
    );
    let el = bar.element().expect("element");
    assert_eq!(h.dom.attribute(el, "role").as_deref(), Some("progressbar"));
    assert_eq!(h.dom.attribute(el, "aria-valuemin").as_deref(), Some("0"));
    assert_eq!(h.dom.attribute(el, "aria-valuemax").as_deref(), Some("100"));

    bar.update_progress(0.5, Some(5));
    assert_eq!(h.dom.attribute(el, "aria-valuenow").as_deref(), Some("50"));
    let text = h.dom.attribute(el, "aria-valuetext").expect("valuetext");
    assert!(text.contains("50"));
    assert!(text.contains("5 in a row"));

    bar.update_progress(0.0, None);
    assert_eq!(h.dom.attribute(el, "aria-valuenow").as_deref(), Some("0"));
    let text = h.dom.attribute(el, "aria-valuetext").expect("valuetext");
    assert!(!text.contains("in a row"));

    bar.update_progress(f64::NAN, None);
    assert_eq!(bar.percent(), 0);
}

#[test]
fn test_progress_templates_are_configurable() {
    let config = OverlayConfig::from_json(
        r#"{"progress_template": "{percent} por ciento", "streak_template": "racha de {streak}"}"#,
    )
    .expect("config");
    let h = Harness::with_config(config);
    let bar = ProgressBarOverlay::new(
        &h.ctx,
        h.scene(),
        node_at(0.0, 0.0, 200.0, 10.0),
        OverlayOptions::new("Progreso"),
    );
    bar.update_progress(0.25, Some(3));
    assert_eq!(bar.value_text(), "25 por ciento, racha de 3");
}

#[test]
fn test_slider_keyboard_steps_clamp_and_report() {
    let h = Harness::new();
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    let slider = SliderOverlay::new(
        &h.ctx,
        h.scene(),
        node_at(100.0, 100.0, 20.0, 20.0),
        OverlayOptions::new("Volume"),
        SliderOptions::new(0.0, 10.0).with_step(2.0).with_value(8.0),
        InteractionCallbacks::new(),
        Some(Rc::new(move |value: f64| sink.borrow_mut().push(value))),
    );
    let el = slider.element().expect("element");
    assert_eq!(h.dom.attribute(el, "role").as_deref(), Some("slider"));
    assert_eq!(h.dom.attribute(el, "tabindex").as_deref(), Some("0"));
    assert_eq!(
        h.dom.attribute(el, "aria-orientation").as_deref(),
        Some("horizontal")
    );

    assert!(h.dom.key(el, DomEventKind::KeyDown, "ArrowRight"));
    assert!(h.dom.key(el, DomEventKind::KeyDown, "ArrowRight"));
    assert!(h.dom.key(el, DomEventKind::KeyDown, "Home"));
    assert!(!h.dom.key(el, DomEventKind::KeyDown, "Tab"));

    assert_eq!(*changes.borrow(), vec![10.0, 0.0]);
    assert_eq!(h.dom.attribute(el, "aria-valuenow").as_deref(), Some("0"));

    slider.set_value(42.0);
    assert!((slider.value() - 10.0).abs() < f64::EPSILON);
    assert_eq!(changes.borrow().len(), 2);
}

#[test]
fn test_slider_fractional_steps_read_cleanly() {
    let h = Harness::new();
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    let slider = SliderOverlay::new(
        &h.ctx,
        h.scene(),
        node_at(100.0, 100.0, 20.0, 20.0),
        OverlayOptions::new("Volume"),
        SliderOptions::new(0.0, 1.0).with_step(0.1),
        InteractionCallbacks::new(),
        Some(Rc::new(move |value: f64| sink.borrow_mut().push(value))),
    );
    let el = slider.element().expect("element");

    for _ in 0..3 {
        assert!(h.dom.key(el, DomEventKind::KeyDown, "ArrowRight"));
    }

    assert_eq!(h.dom.attribute(el, "aria-valuenow").as_deref(), Some("0.3"));
    assert_eq!(h.dom.attribute(el, "aria-valuetext").as_deref(), Some("0.3"));
    let last = changes.borrow().last().copied().expect("change reported");
    assert!((last - 0.3).abs() < f64::EPSILON);
    assert!((slider.value() - 0.3).abs() < f64::EPSILON);
}

#[test]
fn test_debug_visible_overlays() {
    let config = OverlayConfig {
        debug_visible: true,
        ..OverlayConfig::default()
    };
    let h = Harness::with_config(config);
    let focus_count = Rc::new(Cell::new(0));
    let counter = Rc::clone(&focus_count);
    let button = ButtonOverlay::new(
        &h.ctx,
        None,
        node_at(0.0, 0.0, 10.0, 10.0),
        OverlayOptions::new("Debug"),
        InteractionCallbacks::new().with_focus(move || counter.set(counter.get() + 1)),
    );
    let el = button.element().expect("element");
    assert_eq!(h.dom.style(el, "opacity").as_deref(), Some("0.35"));
    assert!(h.dom.style(el, "outline").is_some());

    button.focus();
    assert_eq!(focus_count.get(), 1);
}
