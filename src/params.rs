// src/params.rs

use std::f64::consts::TAU;

use crate::error::{Result, SwimmerError};
use crate::field::FieldMode;

/// Coupling constants of one swimmer. Fixed for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwimmerParams {
    pub alpha: f64, // permanent dipole / external field coupling
    pub beta: f64,  // angular mobility
    pub gamma: f64, // paramagnetic susceptibility
    pub a_l: f64,   // particle radius (in units of the dipole spacing)

    /// Prefactor k of the field energy −k·α·f·cos θ.
    /// 4 counts both permanent dipoles with the pair normalisation; 2 is the single-dipole form.
    pub field_energy_factor: f64,
}

impl Default for SwimmerParams {
    fn default() -> Self {
        Self {
            alpha: 1.0e2,
            beta: 4.0e-3,
            gamma: 1.0e1,
            a_l: 0.3,
            field_energy_factor: 4.0,
        }
    }
}

impl SwimmerParams {
    pub fn new(alpha: f64, beta: f64, gamma: f64, a_l: f64) -> Result<Self> {
        let p = Self {
            alpha,
            beta,
            gamma,
            a_l,
            ..Self::default()
        };
        p.validate()?;
        Ok(p)
    }

    pub fn validate(&self) -> Result<()> {
        positive("alpha", self.alpha)?;
        positive("gamma", self.gamma)?;
        positive("a_l", self.a_l)?;
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(SwimmerError::InvalidParameter(format!(
                "beta must be finite and non-negative (got {})",
                self.beta
            )));
        }
        if !self.field_energy_factor.is_finite() {
            return Err(SwimmerError::InvalidParameter(format!(
                "field_energy_factor must be finite (got {})",
                self.field_energy_factor
            )));
        }
        Ok(())
    }
}

/// How the paramagnet responds to its local field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamagneticModel {
    /// p = γ B_ext
    Simple,
    /// p = γ (B_ext + L(θ)/α), L the near field of both permanent dipoles.
    #[default]
    SelfConsistent,
}

impl ParamagneticModel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "simple" | "bare" => Some(Self::Simple),
            "selfconsistent" | "self-consistent" | "sc" => Some(Self::SelfConsistent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::SelfConsistent => "selfconsistent",
        }
    }
}

/// Which particles make up the swimmer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwimmerBody {
    /// Mirrored dipole pair plus the paramagnet.
    #[default]
    Triad,
    /// One permanent dipole on its own, driven by the field only.
    SingleDipole,
}

impl SwimmerBody {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "triad" => Some(Self::Triad),
            "single" | "single-dipole" | "dipole" => Some(Self::SingleDipole),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Triad => "triad",
            Self::SingleDipole => "single",
        }
    }

    /// The triad energy is closed-form for a field along ŷ only.
    pub fn check_field(&self, mode: FieldMode) -> Result<()> {
        match (self, mode) {
            (Self::Triad, FieldMode::Rotating) => Err(SwimmerError::InvalidParameter(
                "the triad needs an oscillating field; use body=single with a rotating field"
                    .to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Time stepping and output sampling for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunParams {
    pub dt: f64,
    pub cycles: f64,   // field periods to simulate
    pub omega: f64,    // field angular velocity
    pub b0: f64,       // field amplitude
    pub theta0: f64,   // initial particle angle
    pub psi0: f64,     // initial field phase
    pub field_mode: FieldMode,
    pub output_stride: usize,
    /// Field periods run before recording with the field phase frozen (particles align first).
    pub settle_cycles: f64,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            dt: 1.0e-3,
            cycles: 1.0,
            omega: TAU,
            b0: 1.0,
            theta0: 0.0,
            psi0: 0.0,
            field_mode: FieldMode::Oscillating,
            output_stride: 10,
            settle_cycles: 0.0,
        }
    }
}

impl RunParams {
    pub fn validate(&self) -> Result<()> {
        positive("dt", self.dt)?;
        positive("omega", self.omega)?;
        for (name, v) in [
            ("cycles", self.cycles),
            ("settle_cycles", self.settle_cycles),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(SwimmerError::InvalidParameter(format!(
                    "{name} must be finite and non-negative (got {v})"
                )));
            }
        }
        for (name, v) in [("b0", self.b0), ("theta0", self.theta0), ("psi0", self.psi0)] {
            if !v.is_finite() {
                return Err(SwimmerError::InvalidParameter(format!(
                    "{name} must be finite (got {v})"
                )));
            }
        }
        if self.output_stride == 0 {
            return Err(SwimmerError::InvalidParameter(
                "output_stride must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Field period 2π/ω.
    pub fn period(&self) -> f64 {
        TAU / self.omega
    }

    /// Number of recorded integration steps.
    pub fn n_steps(&self) -> usize {
        (self.cycles * self.period() / self.dt).round() as usize
    }

    /// Number of settling steps before recording.
    pub fn n_settle_steps(&self) -> usize {
        (self.settle_cycles * self.period() / self.dt).round() as usize
    }
}

fn positive(name: &str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(SwimmerError::InvalidParameter(format!(
            "{name} must be finite and positive (got {v})"
        )))
    }
}
