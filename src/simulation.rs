// src/simulation.rs
//
// Time loop for one swimmer in the driving field.
//
// Per tick, in this order:
//   1. snapshot the field vector (by value)
//   2. induced moment of the paramagnet from θ and the snapshot (triad only)
//   3. torque on dipole 1 at the current θ
//   4. explicit step θ ← θ + μ τ_z dt
//   5. advance the field phase
//
// Every `output_stride` ticks a `Frame` is emitted describing the state *before* step 4,
// together with the energy landscape and the warm-start tracked minimum ("pole").

use crate::effective_field::{FieldMask, torque};
use crate::energy::{BodyPotential, LandscapeGrid};
use crate::error::{Result, SwimmerError};
use crate::field::ExternalField;
use crate::integrator::{Mobility, step_angle};
use crate::minimize::{Method, Objective, PoleTracker};
use crate::moment::{induced_moment, mirror_moment, particle_positions, permanent_moment};
use crate::params::{ParamagneticModel, RunParams, SwimmerBody, SwimmerParams};
use crate::vec3::{normalize, scale};

#[derive(Debug, Clone)]
pub struct SimulationSettings {
    pub body: SwimmerBody,
    /// Contributions to the effective field of the triad; a single dipole always uses `External`.
    pub mask: FieldMask,
    pub landscape: LandscapeGrid,
    /// Compute the landscape curve for each frame.
    pub record_landscape: bool,
    /// Track the minimum of the landscape with warm starts.
    pub track_pole: bool,
    pub method: Method,
    /// Evaluate landscape curves with Rayon.
    pub parallel: bool,

    // Optional: print every N recorded steps (0 disables)
    pub print_every: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            body: SwimmerBody::Triad,
            mask: FieldMask::Full,
            landscape: LandscapeGrid::default(),
            record_landscape: true,
            track_pole: true,
            method: Method::default(),
            parallel: false,
            print_every: 0,
        }
    }
}

/// Tracked minimum of the landscape at one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pole {
    pub x: f64,
    pub energy: f64,
}

/// Read-only snapshot handed to output stages.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: usize,
    pub step: usize,
    pub time: f64,
    pub psi: f64,
    pub b_ext: [f64; 3],
    pub theta: f64,
    pub body: SwimmerBody,
    /// Triad: dipole 1, dipole 2, induced moment of the paramagnet. Single dipole: dipole 1.
    pub moments: Vec<[f64; 3]>,
    pub torque_z: f64,
    pub energy: f64,
    pub landscape: Option<Vec<f64>>,
    pub pole: Option<Pole>,
}

impl Frame {
    /// Display arrows (origin, vector), one per particle.
    ///
    /// Permanent moments are drawn with length `length`. The induced moment is drawn as
    /// `length`·p/γ, so it shrinks with the field and vanishes with it.
    /// Fails with `DegenerateField` only if a permanent moment has no direction.
    pub fn arrows(&self, length: f64, gamma: f64) -> Result<Vec<([f64; 3], [f64; 3])>> {
        let positions = particle_positions(self.body);
        let mut out = Vec::with_capacity(positions.len());
        for (i, (pos, m)) in positions.iter().zip(self.moments.iter()).enumerate() {
            let v = if self.body == SwimmerBody::Triad && i == 2 {
                scale(length / gamma, *m)
            } else {
                scale(length, normalize(*m)?)
            };
            out.push((*pos, v));
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunReport {
    pub settle_steps: usize,
    pub steps: usize,
    pub frames: usize,
    pub skipped_frames: usize,
    pub pole_failures: usize,
    pub final_theta: f64,
    pub final_psi: f64,
    pub final_pole: Option<f64>,
}

/// State produced by one tick, evaluated before the angle update.
#[derive(Debug, Clone, Copy)]
struct TickState {
    theta: f64,
    psi: f64,
    b_ext: [f64; 3],
    induced: [f64; 3],
    torque_z: f64,
}

pub struct Simulation {
    params: SwimmerParams,
    model: ParamagneticModel,
    run: RunParams,
    settings: SimulationSettings,
    mobility: Mobility,
    field: ExternalField,
    theta: f64,
    thetas: Vec<f64>,
    tracker: PoleTracker,
    last_pole: Option<f64>,
}

impl Simulation {
    pub fn new(
        params: SwimmerParams,
        model: ParamagneticModel,
        run: RunParams,
        settings: SimulationSettings,
    ) -> Result<Self> {
        params.validate()?;
        run.validate()?;
        settings.body.check_field(run.field_mode)?;

        let thetas = if settings.record_landscape {
            settings.landscape.thetas()
        } else {
            Vec::new()
        };

        Ok(Self {
            mobility: Mobility::for_body(&params, settings.body),
            field: ExternalField::new(run.psi0, run.omega, run.b0).with_mode(run.field_mode),
            theta: run.theta0,
            tracker: PoleTracker::new(settings.method.clone(), run.theta0),
            last_pole: None,
            thetas,
            params,
            model,
            run,
            settings,
        })
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn field(&self) -> &ExternalField {
        &self.field
    }

    /// Angles at which landscape curves are sampled.
    pub fn landscape_thetas(&self) -> &[f64] {
        &self.thetas
    }

    fn tick(&mut self, advance_field: bool) -> TickState {
        let b_ext = self.field.vector();
        let psi = self.field.phase();
        let theta = self.theta;

        let (induced, mask) = match self.settings.body {
            SwimmerBody::Triad => (
                induced_moment(theta, b_ext, &self.params, self.model),
                self.settings.mask,
            ),
            SwimmerBody::SingleDipole => ([0.0; 3], FieldMask::External),
        };
        let torque_z = torque(theta, induced, b_ext, &self.params, mask)[2];

        self.theta = step_angle(theta, torque_z, self.mobility, self.run.dt);
        if advance_field {
            self.field.advance(self.run.dt);
        }

        TickState {
            theta,
            psi,
            b_ext,
            induced,
            torque_z,
        }
    }

    /// Advance `n` ticks with the field phase frozen.
    pub fn settle(&mut self, n: usize) {
        for _ in 0..n {
            self.tick(false);
        }
    }

    fn make_frame(&mut self, index: usize, step: usize, state: &TickState) -> Frame {
        let potential =
            BodyPotential::for_body(self.settings.body, self.params, self.model, state.b_ext);

        let landscape = if self.settings.record_landscape {
            Some(potential.landscape(&self.thetas, self.settings.parallel))
        } else {
            None
        };

        let pole = if self.settings.track_pole {
            match self.tracker.track(&potential) {
                Ok(x) => {
                    self.last_pole = Some(x);
                    Some(Pole {
                        x,
                        energy: potential.value(x),
                    })
                }
                Err(e) => {
                    eprintln!("[sim] frame {}: pole search failed: {}", index, e);
                    None
                }
            }
        } else {
            None
        };

        Frame {
            index,
            step,
            time: step as f64 * self.run.dt,
            psi: state.psi,
            b_ext: state.b_ext,
            theta: state.theta,
            body: self.settings.body,
            moments: match self.settings.body {
                SwimmerBody::Triad => vec![
                    permanent_moment(state.theta),
                    mirror_moment(state.theta),
                    state.induced,
                ],
                SwimmerBody::SingleDipole => vec![permanent_moment(state.theta)],
            },
            torque_z: state.torque_z,
            energy: potential.value(state.theta),
            landscape,
            pole,
        }
    }

    /// Run settling plus the recorded steps, handing each frame to `on_frame`.
    ///
    /// A `DegenerateField` error from `on_frame` skips that frame; any other error aborts.
    pub fn run<F>(&mut self, mut on_frame: F) -> Result<RunReport>
    where
        F: FnMut(&Frame) -> Result<()>,
    {
        let settle_steps = self.run.n_settle_steps();
        self.settle(settle_steps);

        let n_steps = self.run.n_steps();
        let stride = self.run.output_stride;
        let mut frames = 0usize;
        let mut skipped = 0usize;

        for step in 0..n_steps {
            let state = self.tick(true);

            if step % stride == 0 {
                let frame = self.make_frame(frames, step, &state);
                frames += 1;

                if self.settings.print_every > 0 && frame.index % self.settings.print_every == 0 {
                    println!(
                        "[sim] frame={}  t={:.4}  theta={:.6}  pole={}",
                        frame.index,
                        frame.time,
                        frame.theta,
                        frame
                            .pole
                            .map(|p| format!("{:.6}", p.x))
                            .unwrap_or_else(|| "-".to_string())
                    );
                }

                match on_frame(&frame) {
                    Ok(()) => {}
                    Err(SwimmerError::DegenerateField(v)) => {
                        eprintln!("[sim] frame {}: skipped (degenerate vector {:?})", frame.index, v);
                        skipped += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(RunReport {
            settle_steps,
            steps: n_steps,
            frames,
            skipped_frames: skipped,
            pole_failures: self.tracker.failures(),
            final_theta: self.theta,
            final_psi: self.field.phase(),
            final_pole: self.last_pole,
        })
    }

    /// Run to completion and keep every frame.
    pub fn collect_frames(&mut self) -> Result<(Vec<Frame>, RunReport)> {
        let mut frames = Vec::new();
        let report = self.run(|f| {
            frames.push(f.clone());
            Ok(())
        })?;
        Ok((frames, report))
    }
}
