// src/config.rs
//
// Serializable record of one run. Written as `config.json` next to the outputs and accepted
// back via `config=<file>` on the command line, so any run can be repeated exactly.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::energy::LandscapeGrid;
use crate::error::{Result, SwimmerError};
use crate::field::FieldMode;
use crate::minimize::{DescentSettings, Method, NewtonSettings, RateSchedule};
use crate::params::{ParamagneticModel, RunParams, SwimmerBody, SwimmerParams};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub swimmer: SwimmerConfig,
    pub field: FieldConfig,
    pub numerics: NumericsConfig,
    pub minimizer: MinimizerConfig,
    pub landscape: LandscapeConfig,
    pub run: RunInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwimmerConfig {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub a_l: f64,
    pub field_energy_factor: f64,
    /// "simple" or "selfconsistent"
    pub model: String,
    /// "triad" or "single"
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// "oscillating" or "rotating"
    pub mode: String,
    pub omega: f64,
    pub b0: f64,
    pub psi0: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericsConfig {
    pub integrator: String,
    pub dt: f64,
    pub cycles: f64,
    pub settle_cycles: f64,
    pub output_stride: usize,
    pub theta0: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimizerConfig {
    /// "descent" or "newton"
    pub method: String,
    /// "harmonic" or "constant" (descent only)
    pub schedule: String,
    pub rate: f64,
    pub damping: f64,
    pub tolerance: f64,
    pub max_iters: usize,
    /// Progress line every N iterations of each search (0 disables).
    pub print_every: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeConfig {
    pub theta_min: f64,
    pub theta_max: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunInfo {
    pub binary: String,
    pub run_id: String,

    // Optional provenance (can be filled later)
    pub git_commit: Option<String>,
    pub timestamp_utc: Option<String>,
}

impl Default for SwimmerConfig {
    fn default() -> Self {
        let p = SwimmerParams::default();
        Self {
            alpha: p.alpha,
            beta: p.beta,
            gamma: p.gamma,
            a_l: p.a_l,
            field_energy_factor: p.field_energy_factor,
            model: ParamagneticModel::default().as_str().to_string(),
            body: SwimmerBody::default().as_str().to_string(),
        }
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        let r = RunParams::default();
        Self {
            mode: r.field_mode.as_str().to_string(),
            omega: r.omega,
            b0: r.b0,
            psi0: r.psi0,
        }
    }
}

impl Default for NumericsConfig {
    fn default() -> Self {
        let r = RunParams::default();
        Self {
            integrator: "euler".to_string(),
            dt: r.dt,
            cycles: r.cycles,
            settle_cycles: r.settle_cycles,
            output_stride: r.output_stride,
            theta0: r.theta0,
        }
    }
}

impl Default for MinimizerConfig {
    fn default() -> Self {
        let d = DescentSettings::default();
        let n = NewtonSettings::default();
        let rate = match d.schedule {
            RateSchedule::Harmonic { base } => base,
            RateSchedule::Constant { rate } => rate,
        };
        Self {
            method: "descent".to_string(),
            schedule: "harmonic".to_string(),
            rate,
            damping: n.damping,
            tolerance: d.tolerance,
            max_iters: d.max_iters,
            print_every: d.print_every,
        }
    }
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        let g = LandscapeGrid::default();
        Self {
            theta_min: g.theta_min,
            theta_max: g.theta_max,
            samples: g.samples,
        }
    }
}

impl RunConfig {
    pub fn write_to_dir(&self, out_dir: &Path) -> Result<()> {
        let path = out_dir.join("config.json");
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let cfg = serde_json::from_reader(BufReader::new(file))?;
        Ok(cfg)
    }

    /// Validated coupling constants.
    pub fn swimmer_params(&self) -> Result<SwimmerParams> {
        let s = &self.swimmer;
        let p = SwimmerParams {
            alpha: s.alpha,
            beta: s.beta,
            gamma: s.gamma,
            a_l: s.a_l,
            field_energy_factor: s.field_energy_factor,
        };
        p.validate()?;
        Ok(p)
    }

    pub fn model(&self) -> Result<ParamagneticModel> {
        ParamagneticModel::from_str(&self.swimmer.model).ok_or_else(|| {
            SwimmerError::InvalidParameter(format!("unknown model '{}'", self.swimmer.model))
        })
    }

    pub fn body(&self) -> Result<SwimmerBody> {
        SwimmerBody::from_str(&self.swimmer.body).ok_or_else(|| {
            SwimmerError::InvalidParameter(format!("unknown body '{}'", self.swimmer.body))
        })
    }

    pub fn field_mode(&self) -> Result<FieldMode> {
        FieldMode::from_str(&self.field.mode).ok_or_else(|| {
            SwimmerError::InvalidParameter(format!("unknown field mode '{}'", self.field.mode))
        })
    }

    /// Validated time stepping.
    pub fn run_params(&self) -> Result<RunParams> {
        if self.numerics.integrator != "euler" {
            return Err(SwimmerError::InvalidParameter(format!(
                "unsupported integrator '{}' (only 'euler')",
                self.numerics.integrator
            )));
        }
        let r = RunParams {
            dt: self.numerics.dt,
            cycles: self.numerics.cycles,
            omega: self.field.omega,
            b0: self.field.b0,
            theta0: self.numerics.theta0,
            psi0: self.field.psi0,
            field_mode: self.field_mode()?,
            output_stride: self.numerics.output_stride,
            settle_cycles: self.numerics.settle_cycles,
        };
        r.validate()?;
        Ok(r)
    }

    pub fn method(&self) -> Result<Method> {
        let m = &self.minimizer;
        if !(m.tolerance.is_finite() && m.tolerance > 0.0) {
            return Err(SwimmerError::InvalidParameter(format!(
                "minimizer tolerance must be positive (got {})",
                m.tolerance
            )));
        }
        match m.method.as_str() {
            "descent" => {
                let schedule = match m.schedule.as_str() {
                    "harmonic" => RateSchedule::Harmonic { base: m.rate },
                    "constant" => RateSchedule::Constant { rate: m.rate },
                    other => {
                        return Err(SwimmerError::InvalidParameter(format!(
                            "unknown rate schedule '{other}'"
                        )));
                    }
                };
                Ok(Method::Descent(DescentSettings {
                    schedule,
                    tolerance: m.tolerance,
                    max_iters: m.max_iters,
                    print_every: m.print_every,
                }))
            }
            "newton" => Ok(Method::Newton(NewtonSettings {
                damping: m.damping,
                tolerance: m.tolerance,
                max_iters: m.max_iters,
                print_every: m.print_every,
            })),
            other => Err(SwimmerError::InvalidParameter(format!(
                "unknown minimizer '{other}'"
            ))),
        }
    }

    pub fn landscape(&self) -> LandscapeGrid {
        LandscapeGrid {
            theta_min: self.landscape.theta_min,
            theta_max: self.landscape.theta_max,
            samples: self.landscape.samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_convert_to_valid_params() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.swimmer_params().unwrap(), SwimmerParams::default());
        assert_eq!(cfg.run_params().unwrap(), RunParams::default());
        assert_eq!(cfg.model().unwrap(), ParamagneticModel::SelfConsistent);
        assert!(matches!(cfg.method().unwrap(), Method::Descent(_)));
        assert_eq!(cfg.body().unwrap(), SwimmerBody::Triad);
        assert_eq!(cfg.field_mode().unwrap(), FieldMode::Oscillating);
    }

    #[test]
    fn minimizer_progress_interval_reaches_both_methods() {
        let mut cfg = RunConfig::default();
        cfg.minimizer.print_every = 25;
        match cfg.method().unwrap() {
            Method::Descent(d) => assert_eq!(d.print_every, 25),
            other => panic!("expected descent, got {}", other.as_str()),
        }
        cfg.minimizer.method = "newton".to_string();
        match cfg.method().unwrap() {
            Method::Newton(n) => assert_eq!(n.print_every, 25),
            other => panic!("expected newton, got {}", other.as_str()),
        }
    }

    #[test]
    fn single_dipole_in_rotating_field_from_json() {
        let cfg: RunConfig = serde_json::from_str(
            r#"{ "swimmer": { "body": "single" }, "field": { "mode": "rotating" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.body().unwrap(), SwimmerBody::SingleDipole);
        assert_eq!(cfg.run_params().unwrap().field_mode, FieldMode::Rotating);

        let mut bad = RunConfig::default();
        bad.field.mode = "pulsed".to_string();
        assert!(bad.run_params().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: RunConfig =
            serde_json::from_str(r#"{ "swimmer": { "gamma": 50.0, "model": "simple" } }"#).unwrap();
        let p = cfg.swimmer_params().unwrap();
        assert_eq!(p.gamma, 50.0);
        assert_eq!(p.alpha, SwimmerParams::default().alpha);
        assert_eq!(cfg.model().unwrap(), ParamagneticModel::Simple);
    }

    #[test]
    fn invalid_values_are_rejected_on_conversion() {
        let mut cfg = RunConfig::default();
        cfg.swimmer.a_l = -0.3;
        assert!(cfg.swimmer_params().is_err());

        let mut cfg = RunConfig::default();
        cfg.minimizer.method = "bisection".to_string();
        assert!(cfg.method().is_err());

        let mut cfg = RunConfig::default();
        cfg.numerics.integrator = "rk4".to_string();
        assert!(cfg.run_params().is_err());
    }

    #[test]
    fn json_round_trip_through_file() {
        let dir = std::env::temp_dir().join(format!("swimmer_sim_cfg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut cfg = RunConfig::default();
        cfg.swimmer.alpha = 42.0;
        cfg.run.run_id = "roundtrip".to_string();
        cfg.write_to_dir(&dir).unwrap();

        let back = RunConfig::from_json_file(&dir.join("config.json")).unwrap();
        assert_eq!(back.swimmer.alpha, 42.0);
        assert_eq!(back.run.run_id, "roundtrip");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
