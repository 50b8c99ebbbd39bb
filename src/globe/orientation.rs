//! Unit quaternion orientation math.
//!
//! The globe's orientation is a single unit quaternion in world space.
//! Euler conversions use yaw about +Y applied first, then pitch about +X,
//! then roll about +Z, so pitch is the asin-extracted middle angle and the
//! gimbal singularity sits at pitch = ±90°.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

pub type Vec3 = [f64; 3];

/// World-space north pole axis.
pub const NORTH: Vec3 = [0.0, 1.0, 0.0];

/// Quaternions this close to the gimbal poles take the degenerate
/// extraction branch.
const GIMBAL_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Rotation of `angle` radians around `axis`. A near-zero axis yields
    /// the identity rather than NaN.
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let len = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
        if len < 1e-12 {
            return Quat::IDENTITY;
        }
        let (sin_half, cos_half) = (angle / 2.0).sin_cos();
        let s = sin_half / len;
        Quat {
            w: cos_half,
            x: axis[0] * s,
            y: axis[1] * s,
            z: axis[2] * s,
        }
    }

    /// Orientation reached by yawing about +Y, then pitching about +X,
    /// then rolling about +Z.
    pub fn from_euler(pitch: f64, yaw: f64, roll: f64) -> Self {
        let qy = Quat::from_axis_angle([0.0, 1.0, 0.0], yaw);
        let qx = Quat::from_axis_angle([1.0, 0.0, 0.0], pitch);
        let qz = Quat::from_axis_angle([0.0, 0.0, 1.0], roll);
        qz.multiply(qx).multiply(qy).normalize()
    }

    /// Hamilton product `self * rhs` (rhs rotation applied first).
    pub fn multiply(self, rhs: Quat) -> Quat {
        Quat {
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        }
    }

    /// Apply `delta` on top of the current orientation in world space,
    /// renormalizing so repeated composition cannot drift off the unit
    /// sphere.
    pub fn compose(self, delta: Quat) -> Quat {
        delta.multiply(self).normalize()
    }

    pub fn norm(self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Rescale onto the unit sphere. Degenerate (near-zero) quaternions
    /// reset to the identity.
    pub fn normalize(self) -> Quat {
        let n = self.norm();
        if n < 1e-12 {
            return Quat::IDENTITY;
        }
        Quat {
            w: self.w / n,
            x: self.x / n,
            y: self.y / n,
            z: self.z / n,
        }
    }

    /// Rotate a vector without building the full rotation matrix:
    /// t = 2 (q_v × v), v' = v + w t + q_v × t.
    pub fn rotate_vector(self, v: Vec3) -> Vec3 {
        let qv = [self.x, self.y, self.z];
        let t = cross(qv, v);
        let t = [2.0 * t[0], 2.0 * t[1], 2.0 * t[2]];
        let c = cross(qv, t);
        [
            v[0] + self.w * t[0] + c[0],
            v[1] + self.w * t[1] + c[1],
            v[2] + self.w * t[2] + c[2],
        ]
    }

    /// Extract (pitch, yaw, roll) matching [`Quat::from_euler`].
    ///
    /// At the gimbal poles (|pitch| = 90°) yaw and roll collapse onto the
    /// same world axis; the combined angle is reported as yaw and roll is
    /// zero, which still round-trips to the same rotation.
    pub fn to_euler(self) -> (f64, f64, f64) {
        let sin_pitch = 2.0 * (self.y * self.z + self.w * self.x);
        if sin_pitch.abs() > 1.0 - GIMBAL_EPSILON {
            let pitch = FRAC_PI_2.copysign(sin_pitch);
            let yaw = (2.0 * (self.x * self.z + self.w * self.y))
                .atan2(1.0 - 2.0 * (self.y * self.y + self.z * self.z));
            return (pitch, yaw, 0.0);
        }
        let pitch = sin_pitch.clamp(-1.0, 1.0).asin();
        let yaw = (2.0 * (self.w * self.y - self.x * self.z))
            .atan2(1.0 - 2.0 * (self.x * self.x + self.y * self.y));
        let roll = (2.0 * (self.w * self.z - self.x * self.y))
            .atan2(1.0 - 2.0 * (self.x * self.x + self.z * self.z));
        (pitch, yaw, roll)
    }

    /// Move yaw a fraction of the way toward `target_yaw` along the
    /// shortest arc, keeping pitch and roll fixed.
    pub fn step_yaw_toward(self, target_yaw: f64, factor: f64) -> Quat {
        let (pitch, yaw, roll) = self.to_euler();
        let yaw = yaw + wrap_angle(target_yaw - yaw) * factor;
        Quat::from_euler(pitch, yaw, roll)
    }
}

/// Wrap an angle into (-pi, pi].
#[inline]
pub fn wrap_angle(a: f64) -> f64 {
    let r = a.rem_euclid(TAU);
    if r > PI {
        r - TAU
    } else {
        r
    }
}

#[inline]
fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        for i in 0..3 {
            assert_abs_diff_eq!(a[i], b[i], epsilon = 1e-9);
        }
    }

    /// Two unit quaternions describe the same rotation iff |<q1,q2>| = 1.
    fn assert_same_rotation(a: Quat, b: Quat) {
        let dot = a.w * b.w + a.x * b.x + a.y * b.y + a.z * b.z;
        assert_abs_diff_eq!(dot.abs(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn identity_leaves_vectors_alone() {
        assert_vec_eq(Quat::IDENTITY.rotate_vector([1.0, 2.0, 3.0]), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn axis_angle_rotates_as_expected() {
        // 90° about +Y carries +X onto -Z.
        let q = Quat::from_axis_angle([0.0, 1.0, 0.0], FRAC_PI_2);
        assert_vec_eq(q.rotate_vector([1.0, 0.0, 0.0]), [0.0, 0.0, -1.0]);
        // 90° about +X carries +Y onto +Z.
        let q = Quat::from_axis_angle([1.0, 0.0, 0.0], FRAC_PI_2);
        assert_vec_eq(q.rotate_vector([0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn zero_axis_yields_identity() {
        assert_eq!(Quat::from_axis_angle([0.0, 0.0, 0.0], 1.0), Quat::IDENTITY);
    }

    #[test]
    fn compose_keeps_unit_norm() {
        let mut q = Quat::IDENTITY;
        for i in 0..1000 {
            let angle = (i as f64) * 0.37;
            let axis = [angle.sin(), (angle * 0.7).cos(), (angle * 1.3).sin()];
            q = q.compose(Quat::from_axis_angle(axis, 0.05));
        }
        assert_abs_diff_eq!(q.norm(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn compose_applies_delta_in_world_space() {
        // Pitch the globe, then yaw it in world space: the pitched pole
        // must end up where the world yaw carries it, not where a
        // body-frame yaw would.
        let pitched = Quat::from_axis_angle([1.0, 0.0, 0.0], 0.4);
        let yaw = Quat::from_axis_angle([0.0, 1.0, 0.0], 0.8);
        let composed = pitched.compose(yaw);
        let pole = pitched.rotate_vector(NORTH);
        assert_vec_eq(composed.rotate_vector(NORTH), yaw.rotate_vector(pole));
    }

    #[test]
    fn euler_round_trip_inside_safe_range() {
        for &pitch in &[-1.2, -0.5, 0.0, 0.3, 1.4] {
            for &yaw in &[-3.0, -1.0, 0.0, 2.0, 3.1] {
                for &roll in &[-2.5, 0.0, 0.9, 3.0] {
                    let q = Quat::from_euler(pitch, yaw, roll);
                    let (p2, y2, r2) = q.to_euler();
                    assert_abs_diff_eq!(p2, pitch, epsilon = 1e-9);
                    assert_abs_diff_eq!(wrap_angle(y2 - yaw), 0.0, epsilon = 1e-9);
                    assert_abs_diff_eq!(wrap_angle(r2 - roll), 0.0, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn arbitrary_quaternions_survive_an_euler_round_trip() {
        for i in 0..25 {
            let t = i as f64;
            let axis = [t.sin() + 0.2, (t * 0.7).cos(), 1.0 - t * 0.07];
            let q = Quat::from_axis_angle(axis, 0.3 + t * 0.29);
            let (pitch, yaw, roll) = q.to_euler();
            if pitch.abs() > FRAC_PI_2 - 0.01 {
                continue;
            }
            assert_same_rotation(Quat::from_euler(pitch, yaw, roll), q);
        }
    }

    #[test]
    fn gimbal_lock_round_trips_to_same_rotation() {
        for &pitch in &[FRAC_PI_2, -FRAC_PI_2] {
            let q = Quat::from_euler(pitch, 0.7, 0.3);
            let (p2, y2, r2) = q.to_euler();
            assert_abs_diff_eq!(p2, pitch, epsilon = 1e-9);
            assert_eq!(r2, 0.0);
            // The collapsed angles still describe the original rotation.
            assert_same_rotation(Quat::from_euler(p2, y2, r2), q);
        }
    }

    #[test]
    fn to_euler_never_returns_nan_near_the_poles() {
        let q = Quat::from_euler(FRAC_PI_2 - 1e-9, 1.0, -1.0);
        let (p, y, r) = q.to_euler();
        assert!(p.is_finite() && y.is_finite() && r.is_finite());
    }

    #[test]
    fn step_yaw_converges_along_shortest_arc() {
        // 170° to -170° is 20° through the antimeridian, not 340° back.
        let q = Quat::from_euler(0.2, 170f64.to_radians(), 0.0);
        let stepped = q.step_yaw_toward((-170f64).to_radians(), 0.5);
        let (pitch, yaw, _) = stepped.to_euler();
        assert_abs_diff_eq!(pitch, 0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(wrap_angle(yaw - PI), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn step_yaw_is_a_no_op_at_the_target() {
        let q = Quat::from_euler(0.1, 0.6, -0.2);
        let stepped = q.step_yaw_toward(0.6, 0.12);
        assert_same_rotation(stepped, q);
    }

    #[test]
    fn wrap_angle_lands_in_half_open_range() {
        assert_abs_diff_eq!(wrap_angle(0.0), 0.0);
        assert_abs_diff_eq!(wrap_angle(PI), PI);
        assert_abs_diff_eq!(wrap_angle(-PI), PI);
        assert_abs_diff_eq!(wrap_angle(3.0 * PI), PI);
        assert_abs_diff_eq!(wrap_angle(TAU + 0.25), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(-3.0 * FRAC_PI_2), FRAC_PI_2, epsilon = 1e-12);
    }
}
