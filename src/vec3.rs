// src/vec3.rs

use crate::error::{Result, SwimmerError};

/// 3D vector dot product.
#[inline]
pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// 3D vector cross product: a × b.
#[inline]
pub fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn scale(s: f64, v: [f64; 3]) -> [f64; 3] {
    [s * v[0], s * v[1], s * v[2]]
}

#[inline]
pub fn norm(v: [f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

/// Normalise a 3D vector to unit length.
///
/// A zero or non-finite vector has no direction and yields `DegenerateField`.
#[inline]
pub fn normalize(v: [f64; 3]) -> Result<[f64; 3]> {
    let n2 = dot(v, v);
    if n2 == 0.0 || !n2.is_finite() {
        return Err(SwimmerError::DegenerateField(v));
    }
    let inv = 1.0 / n2.sqrt();
    Ok([v[0] * inv, v[1] * inv, v[2] * inv])
}

/// Point-dipole near field of moment `m` seen along the unit axis `n`: 3(m·n)n − m.
#[inline]
pub fn dipole_field(m: [f64; 3], n: [f64; 3]) -> [f64; 3] {
    let mn = 3.0 * dot(m, n);
    [mn * n[0] - m[0], mn * n[1] - m[1], mn * n[2] - m[2]]
}
