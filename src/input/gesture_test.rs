use super::*;
use std::time::Duration;

fn detector() -> SwipeDetector {
    SwipeDetector::new()
}

fn base() -> Instant {
    Instant::now()
}

// =============================================================================
// SWIPES
// =============================================================================

#[test]
fn drag_past_threshold_left_fires_swipe_left_once() {
    let mut d = detector();
    d.press(Point::new(200.0, 100.0), base(), PressTarget::Surface);
    d.movement(Point::new(150.0, 100.0));
    d.movement(Point::new(100.0, 100.0));

    assert_eq!(d.release(Point::new(100.0, 100.0)), Some(Swipe::Left));
    // Session state is gone; a second release reports nothing.
    assert_eq!(d.release(Point::new(100.0, 100.0)), None);
}

#[test]
fn drag_past_threshold_right_fires_swipe_right() {
    let mut d = detector();
    d.press(Point::new(100.0, 100.0), base(), PressTarget::Surface);
    d.movement(Point::new(190.0, 105.0));

    assert_eq!(d.release(Point::new(190.0, 105.0)), Some(Swipe::Right));
}

#[test]
fn drag_under_threshold_fires_nothing() {
    let mut d = detector();
    d.press(Point::new(100.0, 100.0), base(), PressTarget::Surface);
    d.movement(Point::new(150.0, 100.0));

    assert!(d.is_dragging());
    assert_eq!(d.release(Point::new(150.0, 100.0)), None);
}

#[test]
fn vertical_movement_never_starts_a_drag() {
    let mut d = detector();
    d.press(Point::new(100.0, 100.0), base(), PressTarget::Surface);
    d.movement(Point::new(105.0, 300.0));

    assert!(!d.is_dragging());
    assert_eq!(d.release(Point::new(105.0, 300.0)), None);
}

#[test]
fn movement_without_press_is_ignored() {
    let mut d = detector();
    assert!((d.movement(Point::new(500.0, 0.0))).abs() < f64::EPSILON);
    assert_eq!(d.release(Point::new(500.0, 0.0)), None);
}

#[test]
fn offset_tracks_live_horizontal_displacement() {
    let mut d = detector();
    d.press(Point::new(100.0, 100.0), base(), PressTarget::Surface);

    assert!((d.movement(Point::new(130.0, 100.0)) - 30.0).abs() < f64::EPSILON);
    assert!((d.movement(Point::new(60.0, 100.0)) - (-40.0)).abs() < f64::EPSILON);
    assert!((d.drag_offset() - (-40.0)).abs() < f64::EPSILON);
}

#[test]
fn release_clears_offset_and_drag_state() {
    let mut d = detector();
    d.press(Point::new(100.0, 100.0), base(), PressTarget::Surface);
    d.movement(Point::new(200.0, 100.0));
    let _ = d.release(Point::new(200.0, 100.0));

    assert!(!d.is_pressed());
    assert!(!d.is_dragging());
    assert!(d.drag_offset().abs() < f64::EPSILON);
}

// =============================================================================
// LONG-PRESS INTERACTION
// =============================================================================

#[test]
fn short_press_never_fires_long_press() {
    let t0 = base();
    let mut d = detector();
    d.press(Point::new(100.0, 100.0), t0, PressTarget::Surface);
    let _ = d.release(Point::new(100.0, 100.0));

    assert!(!d.poll_long_press(t0 + Duration::from_secs(2)));
}

#[test]
fn held_press_fires_long_press_exactly_once() {
    let t0 = base();
    let mut d = detector();
    d.press(Point::new(100.0, 100.0), t0, PressTarget::Surface);

    assert!(!d.poll_long_press(t0 + Duration::from_millis(500)));
    assert!(d.poll_long_press(t0 + Duration::from_millis(800)));
    assert!(!d.poll_long_press(t0 + Duration::from_millis(900)));
}

#[test]
fn drag_cancels_pending_long_press() {
    let t0 = base();
    let mut d = detector();
    d.press(Point::new(100.0, 100.0), t0, PressTarget::Surface);
    d.movement(Point::new(120.0, 100.0));

    assert!(d.is_dragging());
    assert!(!d.poll_long_press(t0 + Duration::from_secs(2)));
}

#[test]
fn small_jitter_keeps_long_press_armed() {
    let t0 = base();
    let mut d = detector();
    d.press(Point::new(100.0, 100.0), t0, PressTarget::Surface);
    d.movement(Point::new(105.0, 102.0));

    assert!(!d.is_dragging());
    assert!(d.poll_long_press(t0 + Duration::from_millis(800)));
}

#[test]
fn leave_cancels_long_press_and_session() {
    let t0 = base();
    let mut d = detector();
    d.press(Point::new(100.0, 100.0), t0, PressTarget::Surface);
    d.leave();

    assert!(!d.poll_long_press(t0 + Duration::from_secs(2)));
    assert!(!d.is_pressed());
}

#[test]
fn dragging_and_fired_long_press_are_mutually_exclusive() {
    let t0 = base();
    let mut d = detector();
    d.press(Point::new(100.0, 100.0), t0, PressTarget::Surface);
    // Hold past the long-press deadline, then move: the poll happens after
    // the drag commit, so the long-press must not fire.
    d.movement(Point::new(200.0, 100.0));

    assert!(!d.poll_long_press(t0 + Duration::from_secs(2)));
    assert_eq!(d.release(Point::new(200.0, 100.0)), Some(Swipe::Right));
}

// =============================================================================
// CONTROL EXCLUSION
// =============================================================================

#[test]
fn press_on_control_captures_nothing() {
    let t0 = base();
    let mut d = detector();
    d.press(Point::new(100.0, 100.0), t0, PressTarget::Control);

    assert!(!d.is_pressed());
    d.movement(Point::new(300.0, 100.0));
    assert_eq!(d.release(Point::new(300.0, 100.0)), None);
    assert!(!d.poll_long_press(t0 + Duration::from_secs(2)));
}

// =============================================================================
// CONFIG
// =============================================================================

#[test]
fn custom_threshold_is_honored() {
    let mut d = SwipeDetector::with_config(GestureConfig {
        swipe_threshold: 20.0,
        ..GestureConfig::default()
    });
    d.press(Point::new(100.0, 100.0), base(), PressTarget::Surface);
    d.movement(Point::new(125.0, 100.0));

    assert_eq!(d.release(Point::new(125.0, 100.0)), Some(Swipe::Right));
}
