//! Globe engine: owns the orientation, the animation intent, and the
//! marker location. All mutation goes through its methods so the behavior
//! is deterministic and testable without a terminal.

use crate::geolocate::{GeolocateError, FALLBACK};
use crate::globe::orientation::{wrap_angle, Quat, NORTH};
use crate::globe::projection::{target_yaw_for_longitude, GeoPoint};
use std::f64::consts::FRAC_PI_2;

/// Default autospin step, radians per frame.
pub const DEFAULT_SPIN_SPEED: f64 = 0.0025;
/// Fastest allowed autospin step.
pub const MAX_SPIN_SPEED: f64 = 0.05;
/// Fraction of the remaining yaw distance covered per centering tick.
const CENTERING_FACTOR: f64 = 0.12;
/// Yaw distance below which a centering animation snaps to its target.
const SNAP_THRESHOLD: f64 = 0.0008;
/// Radians of rotation per braille dot of pointer drag.
const DRAG_SENSITIVITY: f64 = 0.02;
/// Keeps pitch clear of the gimbal poles.
const PITCH_MARGIN: f64 = 0.05;

/// What the per-frame tick currently does to the orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationIntent {
    Idle,
    AutoRotating,
    Dragging,
    CenteringTo { target_yaw: f64 },
}

/// Marker position and the timezone offset derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationState {
    pub point: GeoPoint,
    pub has_location: bool,
    pub timezone_offset_minutes: i32,
}

/// Broadcast payload sent to subscribers whenever the location changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneChange {
    pub offset_minutes: i32,
}

type TimezoneListener = Box<dyn FnMut(TimezoneChange)>;

pub struct GlobeEngine {
    orientation: Quat,
    intent: AnimationIntent,
    location: LocationState,
    /// Sticky autospin preference; survives drags and centering.
    autorotate: bool,
    spin_speed: f64,
    listeners: Vec<TimezoneListener>,
}

impl GlobeEngine {
    pub fn new(initial_pitch: f64, autorotate: bool, spin_speed: f64) -> Self {
        let pitch =
            initial_pitch.clamp(-FRAC_PI_2 + PITCH_MARGIN, FRAC_PI_2 - PITCH_MARGIN);
        let mut engine = GlobeEngine {
            orientation: Quat::from_euler(pitch, 0.0, 0.0),
            intent: AnimationIntent::Idle,
            location: LocationState {
                point: GeoPoint::new(0.0, 0.0),
                has_location: false,
                timezone_offset_minutes: 0,
            },
            autorotate,
            spin_speed: spin_speed.clamp(0.0, MAX_SPIN_SPEED),
            listeners: Vec::new(),
        };
        engine.intent = engine.resume_intent();
        engine
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn intent(&self) -> AnimationIntent {
        self.intent
    }

    pub fn autorotate_enabled(&self) -> bool {
        self.autorotate
    }

    pub fn spin_speed(&self) -> f64 {
        self.spin_speed
    }

    pub fn set_spin_speed(&mut self, speed: f64) {
        self.spin_speed = speed.clamp(0.0, MAX_SPIN_SPEED);
    }

    /// Flip the sticky autospin preference. Takes effect immediately when
    /// idle or spinning; a drag or centering in progress keeps running and
    /// picks the new preference up when it finishes.
    pub fn toggle_autorotate(&mut self) {
        self.set_autorotate(!self.autorotate);
    }

    pub fn set_autorotate(&mut self, enabled: bool) {
        self.autorotate = enabled;
        if matches!(
            self.intent,
            AnimationIntent::Idle | AnimationIntent::AutoRotating
        ) {
            self.intent = self.resume_intent();
        }
    }

    fn resume_intent(&self) -> AnimationIntent {
        if self.autorotate {
            AnimationIntent::AutoRotating
        } else {
            AnimationIntent::Idle
        }
    }

    /// Adjust tilt from the keyboard, clamped clear of the poles.
    pub fn nudge_pitch(&mut self, delta: f64) {
        let (pitch, yaw, roll) = self.orientation.to_euler();
        let pitch =
            (pitch + delta).clamp(-FRAC_PI_2 + PITCH_MARGIN, FRAC_PI_2 - PITCH_MARGIN);
        self.orientation = Quat::from_euler(pitch, yaw, roll);
    }

    /// Pointer pressed: any running animation (including centering) yields
    /// to the drag.
    pub fn pointer_down(&mut self) {
        self.intent = AnimationIntent::Dragging;
    }

    /// Fold a pointer movement (in braille dots) into the orientation.
    /// Ignored unless a drag is active.
    pub fn drag_move(&mut self, dx: f64, dy: f64) {
        if self.intent != AnimationIntent::Dragging {
            return;
        }
        let (pitch, yaw, roll) = self.orientation.to_euler();
        let yaw = yaw + dx * DRAG_SENSITIVITY;
        let pitch = (pitch + dy * DRAG_SENSITIVITY)
            .clamp(-FRAC_PI_2 + PITCH_MARGIN, FRAC_PI_2 - PITCH_MARGIN);
        self.orientation = Quat::from_euler(pitch, yaw, roll);
    }

    /// Pointer released: restore exactly the pre-drag autospin preference.
    pub fn pointer_up(&mut self) {
        if self.intent == AnimationIntent::Dragging {
            self.intent = self.resume_intent();
        }
    }

    /// Start a damped rotation that brings `lon_deg` to the front. A drag
    /// in progress wins; the request is dropped rather than queued.
    pub fn center_on_longitude(&mut self, lon_deg: f64) {
        if self.intent == AnimationIntent::Dragging {
            return;
        }
        self.intent = AnimationIntent::CenteringTo {
            target_yaw: target_yaw_for_longitude(lon_deg),
        };
    }

    /// Center on the marker, if one has been set.
    pub fn center_on_location(&mut self) {
        if self.location.has_location {
            self.center_on_longitude(self.location.point.lon);
        }
    }

    /// Advance one animation frame.
    pub fn tick(&mut self) {
        match self.intent {
            AnimationIntent::AutoRotating => {
                // Spin about the globe's own (rotated) north axis so tilt
                // is preserved frame over frame.
                let axis = self.orientation.rotate_vector(NORTH);
                let delta = Quat::from_axis_angle(axis, self.spin_speed);
                self.orientation = self.orientation.compose(delta);
            }
            AnimationIntent::CenteringTo { target_yaw } => {
                let (pitch, yaw, roll) = self.orientation.to_euler();
                if wrap_angle(target_yaw - yaw).abs() < SNAP_THRESHOLD {
                    self.orientation = Quat::from_euler(pitch, target_yaw, roll);
                    self.intent = self.resume_intent();
                } else {
                    self.orientation =
                        self.orientation.step_yaw_toward(target_yaw, CENTERING_FACTOR);
                }
            }
            AnimationIntent::Idle | AnimationIntent::Dragging => {}
        }
    }

    pub fn location(&self) -> Option<GeoPoint> {
        self.location.has_location.then_some(self.location.point)
    }

    pub fn location_state(&self) -> LocationState {
        self.location
    }

    pub fn timezone_offset_minutes(&self) -> i32 {
        self.location.timezone_offset_minutes
    }

    /// Subscribe to timezone changes; fired synchronously from
    /// [`GlobeEngine::set_location`].
    pub fn on_timezone_change<F>(&mut self, listener: F)
    where
        F: FnMut(TimezoneChange) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Place the marker, derive the nearest whole-hour timezone offset
    /// from the longitude (15° per hour), and notify subscribers. Ignores
    /// real timezone boundaries and DST on purpose.
    pub fn set_location(&mut self, lat: f64, lon: f64) {
        let lat = lat.clamp(-90.0, 90.0);
        let lon = lon.clamp(-180.0, 180.0);
        self.location.point = GeoPoint::new(lat, lon);
        self.location.has_location = true;
        self.location.timezone_offset_minutes = (lon / 15.0).round() as i32 * 60;
        let change = TimezoneChange {
            offset_minutes: self.location.timezone_offset_minutes,
        };
        for listener in &mut self.listeners {
            listener(change);
        }
    }

    /// Apply a finished geolocation lookup. Failures fall back to the
    /// Greenwich coordinate so the marker always exists afterwards.
    /// Returns true when the fallback was used.
    pub fn apply_geolocation(&mut self, result: Result<GeoPoint, GeolocateError>) -> bool {
        match result {
            Ok(p) => {
                self.set_location(p.lat, p.lon);
                false
            }
            Err(_) => {
                self.set_location(FALLBACK.lat, FALLBACK.lon);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::cell::Cell;
    use std::f64::consts::PI;
    use std::rc::Rc;

    fn engine() -> GlobeEngine {
        GlobeEngine::new(0.0, true, DEFAULT_SPIN_SPEED)
    }

    #[test]
    fn starts_spinning_unless_disabled() {
        assert_eq!(engine().intent(), AnimationIntent::AutoRotating);
        let idle = GlobeEngine::new(0.0, false, DEFAULT_SPIN_SPEED);
        assert_eq!(idle.intent(), AnimationIntent::Idle);
    }

    #[test]
    fn autospin_advances_yaw_and_preserves_tilt() {
        let mut e = engine();
        e.nudge_pitch(0.5);
        for _ in 0..100 {
            e.tick();
        }
        let (pitch, yaw, roll) = e.orientation().to_euler();
        assert_abs_diff_eq!(pitch, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(yaw, 100.0 * DEFAULT_SPIN_SPEED, epsilon = 1e-9);
        assert_abs_diff_eq!(roll, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(e.orientation().norm(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn idle_ticks_change_nothing() {
        let mut e = GlobeEngine::new(0.2, false, DEFAULT_SPIN_SPEED);
        let before = e.orientation();
        for _ in 0..50 {
            e.tick();
        }
        assert_eq!(e.orientation(), before);
    }

    #[test]
    fn release_restores_the_pre_drag_state() {
        // Spinning before the drag: spinning after.
        let mut e = engine();
        e.pointer_down();
        assert_eq!(e.intent(), AnimationIntent::Dragging);
        e.drag_move(10.0, -4.0);
        e.pointer_up();
        assert_eq!(e.intent(), AnimationIntent::AutoRotating);

        // Idle before the drag: idle after.
        let mut e = GlobeEngine::new(0.0, false, DEFAULT_SPIN_SPEED);
        e.pointer_down();
        e.drag_move(-3.0, 2.0);
        e.pointer_up();
        assert_eq!(e.intent(), AnimationIntent::Idle);
    }

    #[test]
    fn drag_moves_are_ignored_without_a_press() {
        let mut e = engine();
        let before = e.orientation();
        e.drag_move(25.0, 25.0);
        assert_eq!(e.orientation(), before);
    }

    #[test]
    fn drag_clamps_pitch_short_of_the_poles() {
        let mut e = engine();
        e.pointer_down();
        e.drag_move(0.0, 1e6);
        let (pitch, _, _) = e.orientation().to_euler();
        assert_abs_diff_eq!(pitch, FRAC_PI_2 - 0.05, epsilon = 1e-9);
    }

    #[test]
    fn extreme_initial_tilt_is_clamped() {
        let e = GlobeEngine::new(3.0, false, DEFAULT_SPIN_SPEED);
        let (pitch, _, _) = e.orientation().to_euler();
        assert_abs_diff_eq!(pitch, FRAC_PI_2 - 0.05, epsilon = 1e-9);
    }

    #[test]
    fn pointer_down_cancels_centering() {
        let mut e = engine();
        e.center_on_longitude(120.0);
        assert!(matches!(e.intent(), AnimationIntent::CenteringTo { .. }));
        e.pointer_down();
        assert_eq!(e.intent(), AnimationIntent::Dragging);
    }

    #[test]
    fn centering_requests_are_dropped_mid_drag() {
        let mut e = engine();
        e.pointer_down();
        e.center_on_longitude(120.0);
        assert_eq!(e.intent(), AnimationIntent::Dragging);
        e.pointer_up();
        assert_eq!(e.intent(), AnimationIntent::AutoRotating);
    }

    #[test]
    fn centering_converges_and_resumes() {
        // Worst case: half a turn away from the target.
        let mut e = engine();
        e.pointer_down();
        e.drag_move(PI / 0.02, 0.0);
        e.pointer_up();
        e.center_on_longitude(-90.0);

        let mut frames = 0;
        while matches!(e.intent(), AnimationIntent::CenteringTo { .. }) {
            e.tick();
            frames += 1;
            assert!(frames <= 500, "centering did not converge");
        }
        assert_eq!(e.intent(), AnimationIntent::AutoRotating);
        let (_, yaw, _) = e.orientation().to_euler();
        assert_abs_diff_eq!(yaw, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn centering_at_the_target_completes_in_one_tick() {
        let mut e = GlobeEngine::new(0.0, false, DEFAULT_SPIN_SPEED);
        e.center_on_longitude(-90.0);
        e.tick();
        assert_eq!(e.intent(), AnimationIntent::Idle);
        let (_, yaw, _) = e.orientation().to_euler();
        assert_abs_diff_eq!(yaw, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn timezone_offsets_snap_to_whole_hours() {
        let mut e = engine();
        e.set_location(51.4779, -0.0015);
        assert_eq!(e.timezone_offset_minutes(), 0);
        e.set_location(35.0, 139.0);
        assert_eq!(e.timezone_offset_minutes(), 540);
        e.set_location(40.7, -74.0);
        assert_eq!(e.timezone_offset_minutes(), -300);
    }

    #[test]
    fn set_location_clamps_out_of_range_input() {
        let mut e = engine();
        e.set_location(123.0, 500.0);
        let p = e.location().unwrap();
        assert_eq!(p.lat, 90.0);
        assert_eq!(p.lon, 180.0);
    }

    #[test]
    fn listeners_hear_every_location_change() {
        let mut e = engine();
        let seen = Rc::new(Cell::new(None));
        let sink = Rc::clone(&seen);
        e.on_timezone_change(move |change| sink.set(Some(change.offset_minutes)));
        e.set_location(35.0, 139.0);
        assert_eq!(seen.get(), Some(540));
        e.set_location(0.0, 0.0);
        assert_eq!(seen.get(), Some(0));
    }

    #[test]
    fn failed_geolocation_falls_back_to_greenwich() {
        let mut e = engine();
        assert!(e.location().is_none());
        let used_fallback =
            e.apply_geolocation(Err(GeolocateError::Request("timed out".into())));
        assert!(used_fallback);
        let state = e.location_state();
        assert!(state.has_location);
        assert_abs_diff_eq!(state.point.lat, FALLBACK.lat);
        assert_eq!(state.timezone_offset_minutes, 0);
    }

    #[test]
    fn successful_geolocation_places_the_marker() {
        let mut e = engine();
        let used_fallback = e.apply_geolocation(Ok(GeoPoint::new(35.0, 139.0)));
        assert!(!used_fallback);
        assert_eq!(e.timezone_offset_minutes(), 540);
    }

    #[test]
    fn center_on_location_needs_a_marker() {
        let mut e = engine();
        e.center_on_location();
        assert_eq!(e.intent(), AnimationIntent::AutoRotating);
        e.set_location(35.0, 139.0);
        e.center_on_location();
        assert!(matches!(e.intent(), AnimationIntent::CenteringTo { .. }));
    }

    #[test]
    fn toggling_autospin_switches_between_idle_and_spinning() {
        let mut e = engine();
        e.toggle_autorotate();
        assert_eq!(e.intent(), AnimationIntent::Idle);
        e.toggle_autorotate();
        assert_eq!(e.intent(), AnimationIntent::AutoRotating);
    }

    #[test]
    fn spin_speed_is_clamped() {
        let mut e = engine();
        e.set_spin_speed(1.0);
        assert_eq!(e.spin_speed(), MAX_SPIN_SPEED);
        e.set_spin_speed(-1.0);
        assert_eq!(e.spin_speed(), 0.0);
    }
}
