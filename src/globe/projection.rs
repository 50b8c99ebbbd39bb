//! Orthographic projection of geographic points through the globe's
//! orientation onto screen coordinates.

use crate::globe::orientation::{wrap_angle, Quat, Vec3};
use std::f64::consts::FRAC_PI_2;

/// Fraction of the radius a rotated point must clear toward the viewer
/// before it counts as visible. Slightly above zero so dots never sit on
/// the exact limb.
pub const VISIBILITY_EPSILON: f64 = 0.15;

/// Latitude and longitude in degrees, north and east positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        GeoPoint { lat, lon }
    }

    /// Position on the unit sphere, +Y through the north pole and
    /// longitude -90° facing the viewer under the identity orientation.
    pub fn to_unit_vector(self) -> Vec3 {
        let lat = self.lat.to_radians();
        let lon = self.lon.to_radians();
        [lat.cos() * lon.cos(), lat.sin(), -(lat.cos() * lon.sin())]
    }
}

/// Projected point. Screen y grows downward; `z` is depth toward the
/// viewer after rotation, scaled by the radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub visible: bool,
}

/// Rotate a geographic point by the orientation and drop it orthographically
/// onto the screen. Pure: output depends only on the arguments.
pub fn project(point: GeoPoint, orientation: Quat, center: (f64, f64), radius: f64) -> ScreenPoint {
    let v = orientation.rotate_vector(point.to_unit_vector());
    let z = v[2] * radius;
    ScreenPoint {
        x: center.0 + v[0] * radius,
        y: center.1 - v[1] * radius,
        z,
        visible: z > VISIBILITY_EPSILON * radius,
    }
}

/// Yaw that brings `lon_deg` to the center of the visible hemisphere.
pub fn target_yaw_for_longitude(lon_deg: f64) -> f64 {
    wrap_angle(-FRAC_PI_2 - lon_deg.to_radians())
}
