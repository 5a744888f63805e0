// src/energy.rs
//
// Potential energy of the swimmer as a function of the orientation θ, for a field value f
// along ŷ. Four separable terms:
//
//   field        E_f  = −k α f cos θ
//   dipole       E_d  = 3 − cos 2θ
//   para/field   E_pf = −2γ f Q(θ)
//   para/dipole  E_pd = −2γ P(θ) Q(θ)
//
// with Q(θ) = 3 cos(θ + π/3) + cos θ and P(θ) = −R(θ)/α (P ≡ 0 for the simple model).
// Gradient and curvature below are the exact derivatives of the same expression.
//
// A lone dipole in an arbitrary in-plane field has E = −2α m(θ)·B instead.

use std::f64::consts::{FRAC_PI_3, TAU};

use rayon::prelude::*;

use crate::minimize::Objective;
use crate::moment::{dipole_coupling, dipole_coupling_deriv, permanent_moment};
use crate::params::{ParamagneticModel, SwimmerBody, SwimmerParams};
use crate::vec3::dot;

/// Individual energy contributions at one angle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnergyBreakdown {
    pub field: f64,
    pub dipole: f64,
    pub para_field: f64,
    pub para_dipole: f64,
}

impl EnergyBreakdown {
    pub fn total(&self) -> f64 {
        self.field + self.dipole + self.para_field + self.para_dipole
    }

    /// Terms that do not depend on the external field.
    pub fn static_part(&self) -> f64 {
        self.dipole + self.para_dipole
    }

    /// Terms proportional to the external field.
    pub fn driven_part(&self) -> f64 {
        self.field + self.para_field
    }
}

#[inline]
fn q(theta: f64) -> f64 {
    3.0 * (theta + FRAC_PI_3).cos() + theta.cos()
}

#[inline]
fn dq(theta: f64) -> f64 {
    -3.0 * (theta + FRAC_PI_3).sin() - theta.sin()
}

/// (P, P′) for the chosen model.
#[inline]
fn p_and_dp(theta: f64, params: &SwimmerParams, model: ParamagneticModel) -> (f64, f64) {
    match model {
        ParamagneticModel::Simple => (0.0, 0.0),
        ParamagneticModel::SelfConsistent => (
            -dipole_coupling(theta) / params.alpha,
            -dipole_coupling_deriv(theta) / params.alpha,
        ),
    }
}

pub fn compute_energy(
    theta: f64,
    f: f64,
    params: &SwimmerParams,
    model: ParamagneticModel,
) -> EnergyBreakdown {
    let k = params.field_energy_factor;
    let (p, _) = p_and_dp(theta, params, model);
    let q = q(theta);

    EnergyBreakdown {
        field: -k * params.alpha * f * theta.cos(),
        dipole: 3.0 - (2.0 * theta).cos(),
        para_field: -2.0 * params.gamma * f * q,
        para_dipole: -2.0 * params.gamma * p * q,
    }
}

pub fn energy(theta: f64, f: f64, params: &SwimmerParams, model: ParamagneticModel) -> f64 {
    compute_energy(theta, f, params, model).total()
}

/// dE/dθ
pub fn grad_energy(theta: f64, f: f64, params: &SwimmerParams, model: ParamagneticModel) -> f64 {
    let k = params.field_energy_factor;
    let g = params.gamma;
    let (p, dp) = p_and_dp(theta, params, model);
    let (q, dq) = (q(theta), dq(theta));

    k * params.alpha * f * theta.sin() + 2.0 * (2.0 * theta).sin()
        - 2.0 * g * f * dq
        - 2.0 * g * (dp * q + p * dq)
}

/// d²E/dθ², using Q″ = −Q and P″ = −P.
pub fn curvature(theta: f64, f: f64, params: &SwimmerParams, model: ParamagneticModel) -> f64 {
    let k = params.field_energy_factor;
    let g = params.gamma;
    let (p, dp) = p_and_dp(theta, params, model);
    let (q, dq) = (q(theta), dq(theta));

    k * params.alpha * f * theta.cos() + 4.0 * (2.0 * theta).cos() + 2.0 * g * f * q
        - 4.0 * g * (dp * dq - p * q)
}

/// Energy over many angles. Element-wise identical to calling [`energy`] in a loop.
pub fn energy_landscape(
    thetas: &[f64],
    f: f64,
    params: &SwimmerParams,
    model: ParamagneticModel,
) -> Vec<f64> {
    thetas.iter().map(|&t| energy(t, f, params, model)).collect()
}

/// Rayon version of [`energy_landscape`]; same values, same order.
pub fn energy_landscape_par(
    thetas: &[f64],
    f: f64,
    params: &SwimmerParams,
    model: ParamagneticModel,
) -> Vec<f64> {
    thetas.par_iter().map(|&t| energy(t, f, params, model)).collect()
}

/// Evenly spaced angular domain used for landscape curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandscapeGrid {
    pub theta_min: f64,
    pub theta_max: f64,
    pub samples: usize,
}

impl Default for LandscapeGrid {
    fn default() -> Self {
        Self {
            theta_min: -TAU,
            theta_max: TAU,
            samples: 1000,
        }
    }
}

impl LandscapeGrid {
    /// Inclusive linspace over [theta_min, theta_max].
    pub fn thetas(&self) -> Vec<f64> {
        match self.samples {
            0 => Vec::new(),
            1 => vec![self.theta_min],
            n => {
                let h = (self.theta_max - self.theta_min) / (n - 1) as f64;
                (0..n).map(|i| self.theta_min + i as f64 * h).collect()
            }
        }
    }
}

/// The swimmer energy frozen at one field value; the objective handed to the minimum finder.
#[derive(Debug, Clone, Copy)]
pub struct Potential {
    pub params: SwimmerParams,
    pub model: ParamagneticModel,
    pub f: f64,
}

impl Potential {
    pub fn new(params: SwimmerParams, model: ParamagneticModel, f: f64) -> Self {
        Self { params, model, f }
    }

    pub fn breakdown(&self, theta: f64) -> EnergyBreakdown {
        compute_energy(theta, self.f, &self.params, self.model)
    }

    pub fn landscape(&self, thetas: &[f64], parallel: bool) -> Vec<f64> {
        if parallel {
            energy_landscape_par(thetas, self.f, &self.params, self.model)
        } else {
            energy_landscape(thetas, self.f, &self.params, self.model)
        }
    }
}

impl Objective for Potential {
    fn value(&self, x: f64) -> f64 {
        energy(x, self.f, &self.params, self.model)
    }

    fn gradient(&self, x: f64) -> f64 {
        grad_energy(x, self.f, &self.params, self.model)
    }

    fn curvature(&self, x: f64) -> f64 {
        curvature(x, self.f, &self.params, self.model)
    }
}

/// One permanent dipole in a frozen in-plane field: E = −2α m(θ)·B.
///
/// With m = (−sin θ, cos θ, 0) the minimum sits where m is parallel to B, i.e. at θ = ψ for the
/// rotating field (−sin ψ, cos ψ, 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DipolePotential {
    pub alpha: f64,
    pub b_ext: [f64; 3],
}

impl DipolePotential {
    pub fn new(alpha: f64, b_ext: [f64; 3]) -> Self {
        Self { alpha, b_ext }
    }

    pub fn landscape(&self, thetas: &[f64], parallel: bool) -> Vec<f64> {
        if parallel {
            thetas.par_iter().map(|&t| self.value(t)).collect()
        } else {
            thetas.iter().map(|&t| self.value(t)).collect()
        }
    }
}

impl Objective for DipolePotential {
    fn value(&self, x: f64) -> f64 {
        -2.0 * self.alpha * dot(permanent_moment(x), self.b_ext)
    }

    /// 2α (B_x cos θ + B_y sin θ)
    fn gradient(&self, x: f64) -> f64 {
        let (s, c) = x.sin_cos();
        2.0 * self.alpha * (self.b_ext[0] * c + self.b_ext[1] * s)
    }

    /// E″ = −E
    fn curvature(&self, x: f64) -> f64 {
        -self.value(x)
    }
}

/// Energy of whichever body is simulated, frozen at one field snapshot.
#[derive(Debug, Clone, Copy)]
pub enum BodyPotential {
    Triad(Potential),
    SingleDipole(DipolePotential),
}

impl BodyPotential {
    /// The triad only sees the ŷ component of `b_ext`; callers reject other field geometries.
    pub fn for_body(
        body: SwimmerBody,
        params: SwimmerParams,
        model: ParamagneticModel,
        b_ext: [f64; 3],
    ) -> Self {
        match body {
            SwimmerBody::Triad => Self::Triad(Potential::new(params, model, b_ext[1])),
            SwimmerBody::SingleDipole => Self::SingleDipole(DipolePotential::new(params.alpha, b_ext)),
        }
    }

    pub fn landscape(&self, thetas: &[f64], parallel: bool) -> Vec<f64> {
        match self {
            Self::Triad(p) => p.landscape(thetas, parallel),
            Self::SingleDipole(p) => p.landscape(thetas, parallel),
        }
    }
}

impl Objective for BodyPotential {
    fn value(&self, x: f64) -> f64 {
        match self {
            Self::Triad(p) => p.value(x),
            Self::SingleDipole(p) => p.value(x),
        }
    }

    fn gradient(&self, x: f64) -> f64 {
        match self {
            Self::Triad(p) => p.gradient(x),
            Self::SingleDipole(p) => p.gradient(x),
        }
    }

    fn curvature(&self, x: f64) -> f64 {
        match self {
            Self::Triad(p) => p.curvature(x),
            Self::SingleDipole(p) => p.curvature(x),
        }
    }
}
