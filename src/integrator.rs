// src/integrator.rs

use crate::params::{SwimmerBody, SwimmerParams};

/// Overdamped angular mobility of dipole 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mobility(f64);

impl Mobility {
    /// Triad: μ = β (1/a_l³ + 1/2), self drag plus pair-coupled drag.
    pub fn from_params(params: &SwimmerParams) -> Self {
        Self(params.beta * (1.0 / params.a_l.powi(3) + 0.5))
    }

    /// A lone dipole has no partner to couple to: μ = β/a_l³.
    pub fn single(params: &SwimmerParams) -> Self {
        Self(params.beta / params.a_l.powi(3))
    }

    pub fn for_body(params: &SwimmerParams, body: SwimmerBody) -> Self {
        match body {
            SwimmerBody::Triad => Self::from_params(params),
            SwimmerBody::SingleDipole => Self::single(params),
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// One explicit Euler step of the overdamped rotation: θ' = θ + μ τ_z dt.
///
/// `torque_z` must be evaluated at the current θ; the update is never re-evaluated at θ'.
#[inline]
pub fn step_angle(theta: f64, torque_z: f64, mobility: Mobility, dt: f64) -> f64 {
    theta + mobility.0 * torque_z * dt
}
