use std::time::{Duration, Instant};

use approx::assert_abs_diff_eq;

use chromalign_core::session::{Event, Redraw, RenderDebounce, SessionState, StepModifier};

fn session() -> SessionState {
    SessionState::new(3, (64, 48), (32, 32))
}

#[test]
fn nudge_moves_only_the_active_channel() {
    let mut s = session();
    assert_eq!(s.active(), 1);

    let redraw = s.apply(Event::Nudge {
        dx: 1.0,
        dy: 0.0,
        modifier: StepModifier::Normal,
    });
    assert_eq!(redraw, Redraw::Draft);

    assert_eq!(s.transforms()[1].dx, 1.0);
    assert!(s.transforms()[0].is_identity());
    assert!(s.transforms()[2].is_identity());
}

#[test]
fn modifiers_scale_translation_steps() {
    let mut s = session();
    s.apply(Event::Nudge {
        dx: 1.0,
        dy: 0.0,
        modifier: StepModifier::Coarse,
    });
    assert_eq!(s.transforms()[1].dx, 10.0);

    s.apply(Event::Nudge {
        dx: 0.0,
        dy: 1.0,
        modifier: StepModifier::Fine,
    });
    assert_eq!(s.transforms()[1].dy, 0.5);
}

#[test]
fn rotate_steps_accumulate() {
    let mut s = session();
    s.apply(Event::Rotate {
        direction: -1,
        modifier: StepModifier::Normal,
    });
    assert_abs_diff_eq!(s.transforms()[1].angle_deg, -0.1, epsilon = 1e-12);

    s.apply(Event::Rotate {
        direction: 1,
        modifier: StepModifier::Coarse,
    });
    assert_abs_diff_eq!(s.transforms()[1].angle_deg, 0.9, epsilon = 1e-12);
}

#[test]
fn cycling_wraps_after_a_full_loop() {
    let mut s = session();
    let start = s.active();
    for _ in 0..s.channel_count() {
        assert_eq!(s.apply(Event::CycleActive), Redraw::Full);
    }
    assert_eq!(s.active(), start);
}

#[test]
fn reset_restores_identity() {
    let mut s = session();
    s.apply(Event::Nudge {
        dx: 3.0,
        dy: 2.0,
        modifier: StepModifier::Normal,
    });
    s.apply(Event::Rotate {
        direction: 1,
        modifier: StepModifier::Normal,
    });
    assert!(!s.transforms()[1].is_identity());

    s.apply(Event::ResetActive);
    assert!(s.transforms()[1].is_identity());

    s.apply(Event::SetActive { index: 2 });
    s.apply(Event::Nudge {
        dx: -1.0,
        dy: 0.0,
        modifier: StepModifier::Normal,
    });
    s.apply(Event::ResetAll);
    assert!(s.transforms().iter().all(|t| t.is_identity()));
}

#[test]
fn generation_invalidates_stale_renders() {
    let mut s = session();
    let before = s.generation();
    assert!(s.accepts(before));

    s.apply(Event::Nudge {
        dx: 1.0,
        dy: 0.0,
        modifier: StepModifier::Normal,
    });

    // A render started for the old state must never be displayed.
    assert!(!s.accepts(before));
    assert!(s.accepts(s.generation()));
}

#[test]
fn noop_events_leave_generation_alone() {
    let mut s = session();
    let before = s.generation();

    let (w, h) = s.viewport.size;
    assert_eq!(s.apply(Event::Resize { width: w, height: h }), Redraw::None);
    assert_eq!(
        s.apply(Event::SetOpacity {
            index: 99,
            value: 0.5
        }),
        Redraw::None
    );
    assert_eq!(s.generation(), before);
}

#[test]
fn zoom_anchor_keeps_the_image_point_fixed() {
    let mut s = session();
    // fit of a 64x48 image into 32x32: zoom 0.5, image centered.
    assert_abs_diff_eq!(s.viewport.zoom, 0.5, epsilon = 1e-6);

    let anchor = (16.0f32, 16.0f32);
    let before = (
        s.viewport.pan.0 + anchor.0 / s.viewport.zoom,
        s.viewport.pan.1 + anchor.1 / s.viewport.zoom,
    );

    s.apply(Event::ZoomBy {
        factor: 2.0,
        anchor: Some(anchor),
    });
    assert_abs_diff_eq!(s.viewport.zoom, 1.0, epsilon = 1e-6);

    let after = (
        s.viewport.pan.0 + anchor.0 / s.viewport.zoom,
        s.viewport.pan.1 + anchor.1 / s.viewport.zoom,
    );
    assert_abs_diff_eq!(before.0, after.0, epsilon = 1e-4);
    assert_abs_diff_eq!(before.1, after.1, epsilon = 1e-4);
}

#[test]
fn pan_accumulates_in_image_space() {
    let mut s = session();
    let start = s.viewport.pan;
    s.apply(Event::Pan { dx: 5.0, dy: -3.0 });
    assert_abs_diff_eq!(s.viewport.pan.0, start.0 + 5.0, epsilon = 1e-6);
    assert_abs_diff_eq!(s.viewport.pan.1, start.1 - 3.0, epsilon = 1e-6);
}

#[test]
fn debounce_fires_once_after_input_settles() {
    let mut d = RenderDebounce::new(Duration::from_millis(120));
    let t0 = Instant::now();

    d.touch(t0);
    assert!(!d.fire(t0 + Duration::from_millis(50)));

    // A new interaction pushes the deadline out.
    d.touch(t0 + Duration::from_millis(100));
    assert!(!d.fire(t0 + Duration::from_millis(150)));

    assert!(d.fire(t0 + Duration::from_millis(221)));
    // Only once per settle.
    assert!(!d.fire(t0 + Duration::from_millis(400)));
}

#[test]
fn debounce_cancel_drops_the_pending_render() {
    let mut d = RenderDebounce::new(Duration::from_millis(120));
    let t0 = Instant::now();

    d.touch(t0);
    assert!(d.pending());
    d.cancel();
    assert!(!d.pending());
    assert!(!d.fire(t0 + Duration::from_secs(10)));
}
