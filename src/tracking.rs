// src/tracking.rs
//
// Quasi-static pole tracking: no particle dynamics, the field phase ψ is swept over a grid and
// the landscape minimum is followed with warm starts. A jump of the tracked minimum larger than
// `slip_threshold` between consecutive frames is reported as a slip into another well.

use std::f64::consts::TAU;

use crate::energy::BodyPotential;
use crate::error::Result;
use crate::field::{ExternalField, FieldMode};
use crate::minimize::{Method, Objective, PoleTracker};
use crate::params::{ParamagneticModel, SwimmerBody, SwimmerParams};
use crate::simulation::Pole;

#[derive(Debug, Clone)]
pub struct SweepSettings {
    pub body: SwimmerBody,
    pub field_mode: FieldMode,
    pub frames: usize,
    pub cycles: f64,
    pub b0: f64,
    /// Seed of the first search.
    pub x0: f64,
    pub slip_threshold: f64,
    /// Restart every search from `x0` instead of the previous minimum.
    pub cold_start: bool,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            body: SwimmerBody::Triad,
            field_mode: FieldMode::Oscillating,
            frames: 100,
            cycles: 1.0,
            b0: 1.0,
            x0: 0.0,
            slip_threshold: std::f64::consts::FRAC_PI_4,
            cold_start: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    pub index: usize,
    pub psi: f64,
    pub b_ext: [f64; 3],
    pub pole: Option<Pole>,
    pub slipped: bool,
}

#[derive(Debug, Clone)]
pub struct SweepReport {
    pub points: Vec<SweepPoint>,
    pub slips: usize,
    pub failures: usize,
}

/// Phases of an inclusive linspace over [0, 2π·cycles].
fn phases(settings: &SweepSettings) -> Vec<f64> {
    let end = TAU * settings.cycles;
    match settings.frames {
        0 => Vec::new(),
        1 => vec![0.0],
        n => (0..n).map(|i| end * i as f64 / (n - 1) as f64).collect(),
    }
}

pub fn sweep_field(
    params: &SwimmerParams,
    model: ParamagneticModel,
    method: &Method,
    settings: &SweepSettings,
) -> Result<SweepReport> {
    settings.body.check_field(settings.field_mode)?;

    let mut tracker = PoleTracker::new(method.clone(), settings.x0);
    let mut points = Vec::with_capacity(settings.frames);
    let mut slips = 0usize;
    let mut failures = 0usize;
    let mut previous: Option<f64> = None;

    for (index, psi) in phases(settings).into_iter().enumerate() {
        let b_ext = ExternalField::new(psi, 0.0, settings.b0)
            .with_mode(settings.field_mode)
            .vector();
        let potential = BodyPotential::for_body(settings.body, *params, model, b_ext);

        if settings.cold_start {
            tracker = PoleTracker::new(method.clone(), settings.x0);
        }

        let pole = match tracker.track(&potential) {
            Ok(x) => Some(Pole {
                x,
                energy: potential.value(x),
            }),
            Err(e) => {
                eprintln!("[sweep] frame {}: {}", index, e);
                failures += 1;
                None
            }
        };

        let slipped = match (previous, pole) {
            (Some(prev), Some(p)) => (p.x - prev).abs() > settings.slip_threshold,
            _ => false,
        };
        if slipped {
            slips += 1;
        }
        if let Some(p) = pole {
            previous = Some(p.x);
        }

        points.push(SweepPoint {
            index,
            psi,
            b_ext,
            pole,
            slipped,
        });
    }

    Ok(SweepReport {
        points,
        slips,
        failures,
    })
}
