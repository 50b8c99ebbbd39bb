//! Solar geometry for the day/night terminator.
//!
//! Single-term declination approximation, good to about a degree. Fine for
//! shading a globe, not for navigation.

use crate::globe::projection::GeoPoint;
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::f64::consts::TAU;

/// Earth's axial tilt, degrees.
const AXIAL_TILT_DEG: f64 = 23.45;
/// Day of year of the March equinox in the approximation.
const EQUINOX_ORDINAL: f64 = 81.0;
/// Below this |sin(declination)| the terminator formula divides by ~zero
/// and the latitude snaps to a pole instead.
const DECLINATION_TOLERANCE: f64 = 1e-3;
/// Longitude sampling step for the terminator curve, degrees.
const TERMINATOR_STEP_DEG: f64 = 2.0;

/// Solar declination in radians: `23.45° · sin(2π·(day − 81)/365)`.
pub fn solar_declination(now: DateTime<Utc>) -> f64 {
    let day = now.ordinal() as f64;
    AXIAL_TILT_DEG.to_radians() * (TAU * (day - EQUINOX_ORDINAL) / 365.0).sin()
}

/// How far the sun sits past local solar noon at `lon` degrees, radians.
pub fn hour_angle(now: DateTime<Utc>, lon: f64) -> f64 {
    let hours =
        now.hour() as f64 + now.minute() as f64 / 60.0 + now.second() as f64 / 3600.0;
    ((hours - 12.0) * 15.0 + lon).to_radians()
}

/// Latitude in degrees where solar altitude is zero at `lon`:
/// `atan(-cos(dec)·cos(HA) / sin(dec))`, clamped to [-90, 90].
///
/// Near the equinoxes the formula degenerates and the latitude snaps to
/// +90° for positive longitudes and -90° otherwise. The hard jump at
/// the antimeridian is visible for a day or so around each equinox and
/// is kept as-is.
pub fn terminator_latitude(now: DateTime<Utc>, lon: f64) -> f64 {
    let dec = solar_declination(now);
    if dec.sin().abs() < DECLINATION_TOLERANCE {
        return if lon > 0.0 { 90.0 } else { -90.0 };
    }
    let ha = hour_angle(now, lon);
    (-(dec.cos() * ha.cos()) / dec.sin())
        .atan()
        .to_degrees()
        .clamp(-90.0, 90.0)
}

/// Terminator polyline sampled every 2° of longitude from -180° to 180°,
/// recomputed fresh on every call.
pub fn terminator_curve(now: DateTime<Utc>) -> Vec<GeoPoint> {
    let steps = (360.0 / TERMINATOR_STEP_DEG) as usize;
    (0..=steps)
        .map(|i| {
            let lon = -180.0 + i as f64 * TERMINATOR_STEP_DEG;
            GeoPoint::new(terminator_latitude(now, lon), lon)
        })
        .collect()
}

/// True when the sun is above the horizon at `point`.
pub fn is_daylit(now: DateTime<Utc>, point: GeoPoint) -> bool {
    let dec = solar_declination(now);
    let ha = hour_angle(now, point.lon);
    let lat = point.lat.to_radians();
    lat.sin() * dec.sin() + lat.cos() * dec.cos() * ha.cos() > 0.0
}
