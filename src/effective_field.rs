// src/effective_field.rs
//
// Effective field on dipole 1 and the torque it produces.
//
//   B_eff = α B_ext + near(m₂, x̂) + near(p, n̂ₚ)
//   τ     = m₁ × B_eff
//
// Only τ_z drives the in-plane rotation.

use crate::moment::{AXIS_PAIR, AXIS_PARA, mirror_moment, permanent_moment};
use crate::params::SwimmerParams;
use crate::vec3::{add, cross, dipole_field, scale};

/// Which contributions enter the effective field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldMask {
    /// α B_ext only.
    External,
    /// α B_ext + near field of the mirror dipole.
    ExternalPair,
    /// All terms, including the near field of the induced moment.
    #[default]
    Full,
}

/// Assemble the effective field acting on dipole 1.
pub fn build_b_eff_masked(
    theta: f64,
    induced: [f64; 3],
    b_ext: [f64; 3],
    params: &SwimmerParams,
    mask: FieldMask,
) -> [f64; 3] {
    let mut b_eff = scale(params.alpha, b_ext);

    if matches!(mask, FieldMask::ExternalPair | FieldMask::Full) {
        b_eff = add(b_eff, dipole_field(mirror_moment(theta), AXIS_PAIR));
    }

    // The induced moment already carries γ; a vanishing moment simply contributes nothing.
    if matches!(mask, FieldMask::Full) {
        b_eff = add(b_eff, dipole_field(induced, AXIS_PARA));
    }

    b_eff
}

pub fn build_b_eff(
    theta: f64,
    induced: [f64; 3],
    b_ext: [f64; 3],
    params: &SwimmerParams,
) -> [f64; 3] {
    build_b_eff_masked(theta, induced, b_ext, params, FieldMask::Full)
}

/// Torque on dipole 1: m₁(θ) × B_eff.
pub fn torque(
    theta: f64,
    induced: [f64; 3],
    b_ext: [f64; 3],
    params: &SwimmerParams,
    mask: FieldMask,
) -> [f64; 3] {
    let b_eff = build_b_eff_masked(theta, induced, b_ext, params, mask);
    cross(permanent_moment(theta), b_eff)
}
