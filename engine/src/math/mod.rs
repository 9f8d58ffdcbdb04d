//! Vector Math Module
//!
//! Double-precision geometry helpers shared by the camera subsystem.
//! Angles passed to the rotation helpers are in degrees, matching the
//! angular state kept by the camera.
//!
//! Everything here is total: degenerate inputs (zero-length axes, NaN angles)
//! return the input unchanged or a documented fallback.

use glam::{DQuat, DVec3};

/// Rotate `v` by `degrees` around `axis` (right-handed).
///
/// Returns `v` unchanged if the axis cannot be normalized or the angle is not finite.
#[inline]
pub fn rotate_about_axis(v: DVec3, axis: DVec3, degrees: f64) -> DVec3 {
    if !degrees.is_finite() {
        return v;
    }
    match axis.try_normalize() {
        Some(axis) => DQuat::from_axis_angle(axis, degrees.to_radians()) * v,
        None => v,
    }
}

/// Rotate `point` by `degrees` around an axis passing through `pivot`.
#[inline]
pub fn rotate_around_point(point: DVec3, pivot: DVec3, axis: DVec3, degrees: f64) -> DVec3 {
    pivot + rotate_about_axis(point - pivot, axis, degrees)
}

/// Angle between two vectors in degrees, in `[0, 180]`.
///
/// Zero-length inputs yield 0.
pub fn angle_between_deg(a: DVec3, b: DVec3) -> f64 {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom <= 0.0 || !denom.is_finite() {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Normalize `v`, falling back to `fallback` for zero-length or non-finite input.
#[inline]
pub fn normalize_or(v: DVec3, fallback: DVec3) -> DVec3 {
    v.try_normalize().unwrap_or(fallback)
}

/// Recompute `up` so that it is unit length and perpendicular to `direction`.
///
/// `up' = normalize(cross(cross(direction, up), direction))`. When `up` is
/// parallel to `direction` an arbitrary perpendicular is chosen.
pub fn orthonormal_up(direction: DVec3, up: DVec3) -> DVec3 {
    let right = direction.cross(up);
    match right.cross(direction).try_normalize() {
        Some(up) => up,
        None => direction.any_orthonormal_vector(),
    }
}

/// Clamp the length of `v` to `max`. Non-positive `max` yields zero.
#[inline]
pub fn clamp_length(v: DVec3, max: f64) -> DVec3 {
    if max <= 0.0 || max.is_nan() {
        DVec3::ZERO
    } else {
        v.clamp_length_max(max)
    }
}

/// Linear interpolation of `x` from `[x0, x1]` into `[y0, y1]`, clamped at both ends.
pub fn flint(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    if x <= x0 {
        return y0;
    }
    if x >= x1 {
        return y1;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Convert a sky direction (right ascension/longitude and declination/latitude,
/// in radians) and a distance into cartesian coordinates.
///
/// The longitude is measured from +Z toward +X, +Y is the pole.
pub fn spherical_to_cartesian(longitude: f64, latitude: f64, radius: f64) -> DVec3 {
    DVec3::new(
        radius * latitude.cos() * longitude.sin(),
        radius * latitude.sin(),
        radius * latitude.cos() * longitude.cos(),
    )
}

/// Inverse of [`spherical_to_cartesian`]: returns `(longitude, latitude, radius)`
/// with longitude in `[0, 2π)` and latitude in `[-π/2, π/2]`.
pub fn cartesian_to_spherical(v: DVec3) -> (f64, f64, f64) {
    let radius = v.length();
    let mut longitude = v.x.atan2(v.z);
    if longitude < 0.0 {
        longitude += std::f64::consts::TAU;
    }
    let horizontal = (v.x * v.x + v.z * v.z).sqrt();
    let latitude = if horizontal == 0.0 {
        if v.y > 0.0 {
            std::f64::consts::FRAC_PI_2
        } else {
            -std::f64::consts::FRAC_PI_2
        }
    } else {
        (v.y / horizontal).atan()
    };
    (longitude, latitude, radius)
}
