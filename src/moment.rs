// src/moment.rs
//
// Magnetic moments of the triad swimmer.
//
//   paramagnet          (0, √3/2)
//        /  \
//  dipole 1 ---- dipole 2
//  (-1/2, 0)     (1/2, 0)
//
// Dipole 1 carries the orientation θ; dipole 2 is its mirror image in the y axis.

use std::f64::consts::FRAC_PI_3;

use crate::params::{ParamagneticModel, SwimmerBody, SwimmerParams};
use crate::vec3::{add, dipole_field, scale};

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Unit axis from dipole 2 to dipole 1 (either sign gives the same near field).
pub const AXIS_PAIR: [f64; 3] = [1.0, 0.0, 0.0];
/// Unit axis from dipole 1 to the paramagnet.
pub const AXIS_PARA: [f64; 3] = [0.5, SQRT_3 / 2.0, 0.0];
/// Unit axis from dipole 2 to the paramagnet.
pub const AXIS_PARA_MIRROR: [f64; 3] = [-0.5, SQRT_3 / 2.0, 0.0];

/// Particle centres relative to the swimmer origin: dipole 1, dipole 2, paramagnet.
pub const POSITIONS: [[f64; 3]; 3] = [[-0.5, 0.0, 0.0], [0.5, 0.0, 0.0], [0.0, SQRT_3 / 2.0, 0.0]];

/// A lone dipole sits at the origin.
const SINGLE_POSITION: [[f64; 3]; 1] = [[0.0, 0.0, 0.0]];

pub fn particle_positions(body: SwimmerBody) -> &'static [[f64; 3]] {
    match body {
        SwimmerBody::Triad => &POSITIONS,
        SwimmerBody::SingleDipole => &SINGLE_POSITION,
    }
}

/// Moment of dipole 1: (−sin θ, cos θ, 0). Always unit length.
#[inline]
pub fn permanent_moment(theta: f64) -> [f64; 3] {
    let (s, c) = theta.sin_cos();
    [-s, c, 0.0]
}

/// Moment of dipole 2, the mirror of dipole 1: (sin θ, cos θ, 0).
#[inline]
pub fn mirror_moment(theta: f64) -> [f64; 3] {
    let m = permanent_moment(theta);
    [-m[0], m[1], m[2]]
}

/// R(θ) = 3√3 sin(θ − π/3) + 2 cos θ. The near field of both dipoles at the paramagnet is −R ŷ.
#[inline]
pub fn dipole_coupling(theta: f64) -> f64 {
    3.0 * SQRT_3 * (theta - FRAC_PI_3).sin() + 2.0 * theta.cos()
}

/// dR/dθ
#[inline]
pub fn dipole_coupling_deriv(theta: f64) -> f64 {
    3.0 * SQRT_3 * (theta - FRAC_PI_3).cos() - 2.0 * theta.sin()
}

/// Near field of both permanent dipoles at the paramagnet site (closed form).
#[inline]
pub fn local_field_correction(theta: f64) -> [f64; 3] {
    [0.0, -dipole_coupling(theta), 0.0]
}

/// Same field assembled from the point-dipole formula; kept for cross-checking the closed form.
pub fn local_field_from_dipoles(theta: f64) -> [f64; 3] {
    let neg = |n: [f64; 3]| scale(-1.0, n);
    add(
        dipole_field(permanent_moment(theta), neg(AXIS_PARA)),
        dipole_field(mirror_moment(theta), neg(AXIS_PARA_MIRROR)),
    )
}

/// Induced moment of the paramagnet.
pub fn induced_moment(
    theta: f64,
    b_ext: [f64; 3],
    params: &SwimmerParams,
    model: ParamagneticModel,
) -> [f64; 3] {
    match model {
        ParamagneticModel::Simple => scale(params.gamma, b_ext),
        ParamagneticModel::SelfConsistent => {
            let local = scale(1.0 / params.alpha, local_field_correction(theta));
            scale(params.gamma, add(b_ext, local))
        }
    }
}
