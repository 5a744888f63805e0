// src/minimize.rs
//
// One-dimensional minimum finders for the energy landscape.
//
// Gradient descent:  δ = rate(n) · E′(x);  stop when |δ| < tol, otherwise x ← x − δ.
// Newton:            δ = damping · E′(x) / E″(x), same stopping rule.
//
// Both loops are bounded by `max_iters` and report `NotConverged` instead of spinning forever.
// Callers tracking a moving minimum pass the previous result back in as `x0` (warm start).

use crate::error::{Result, SwimmerError};

/// Scalar function of one angle with analytic first and second derivatives.
pub trait Objective {
    fn value(&self, x: f64) -> f64;
    fn gradient(&self, x: f64) -> f64;
    fn curvature(&self, x: f64) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateSchedule {
    /// rate(n) = base / (1 + n)
    Harmonic { base: f64 },
    /// rate(n) = rate
    Constant { rate: f64 },
}

impl RateSchedule {
    #[inline]
    pub fn rate(&self, n: usize) -> f64 {
        match *self {
            Self::Harmonic { base } => base / (1.0 + n as f64),
            Self::Constant { rate } => rate,
        }
    }
}

/// Gradient descent stops once the step rate(n)·|E′(x)| falls below `tolerance`.
///
/// Under the harmonic schedule the rate itself decays, so the stop can fire with a sizeable
/// residual gradient: at α = 100, γ = 10, f = 1 the default search ends near it = 262 with
/// |E′| ≈ 2.6, about 0.006 rad short of the true minimum. Use `Constant` or Newton when the
/// stationary point itself is needed.
#[derive(Debug, Clone)]
pub struct DescentSettings {
    pub schedule: RateSchedule,
    pub tolerance: f64,
    pub max_iters: usize,

    // Optional: print every N iterations (0 disables)
    pub print_every: usize,
}

impl Default for DescentSettings {
    fn default() -> Self {
        Self {
            schedule: RateSchedule::Harmonic { base: 1.0e-3 },
            tolerance: 1.0e-5,
            max_iters: 100_000,
            print_every: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewtonSettings {
    pub damping: f64,
    pub tolerance: f64,
    pub max_iters: usize,
    pub print_every: usize,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        Self {
            damping: 0.1,
            tolerance: 1.0e-4,
            max_iters: 10_000,
            print_every: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DescentOutcome {
    Converged { x: f64, iterations: usize },
    /// Budget exhausted or the step became non-finite.
    NotConverged { last_x: f64, iterations: usize },
}

impl DescentOutcome {
    pub fn converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }

    /// Final position, converged or not.
    pub fn x(&self) -> f64 {
        match *self {
            Self::Converged { x, .. } => x,
            Self::NotConverged { last_x, .. } => last_x,
        }
    }

    pub fn iterations(&self) -> usize {
        match *self {
            Self::Converged { iterations, .. } | Self::NotConverged { iterations, .. } => {
                iterations
            }
        }
    }

    pub fn into_result(self) -> Result<f64> {
        match self {
            Self::Converged { x, .. } => Ok(x),
            Self::NotConverged { last_x, iterations } => {
                Err(SwimmerError::NonConvergence { last_x, iterations })
            }
        }
    }
}

/// Gradient descent with a decaying (or constant) step.
pub fn gradient_descent<O: Objective + ?Sized>(
    objective: &O,
    x0: f64,
    settings: &DescentSettings,
) -> DescentOutcome {
    let mut x = x0;

    for it in 0..settings.max_iters {
        let delta = settings.schedule.rate(it) * objective.gradient(x);

        if settings.print_every > 0 && it % settings.print_every == 0 {
            println!("      [descent] it={}  x={:.6e}  delta={:.3e}", it, x, delta);
        }

        if !delta.is_finite() {
            return DescentOutcome::NotConverged {
                last_x: x,
                iterations: it,
            };
        }
        if delta.abs() < settings.tolerance {
            return DescentOutcome::Converged { x, iterations: it };
        }
        x -= delta;
    }

    DescentOutcome::NotConverged {
        last_x: x,
        iterations: settings.max_iters,
    }
}

/// Damped Newton iteration on E′(x) = 0.
///
/// Converges to any stationary point, not only minima; use it where the landscape is known to be
/// unimodal over the search interval.
pub fn newton<O: Objective + ?Sized>(
    objective: &O,
    x0: f64,
    settings: &NewtonSettings,
) -> DescentOutcome {
    let mut x = x0;

    for it in 0..settings.max_iters {
        let delta = settings.damping * objective.gradient(x) / objective.curvature(x);

        if settings.print_every > 0 && it % settings.print_every == 0 {
            println!("      [newton] it={}  x={:.6e}  delta={:.3e}", it, x, delta);
        }

        if !delta.is_finite() {
            return DescentOutcome::NotConverged {
                last_x: x,
                iterations: it,
            };
        }
        if delta.abs() < settings.tolerance {
            return DescentOutcome::Converged { x, iterations: it };
        }
        x -= delta;
    }

    DescentOutcome::NotConverged {
        last_x: x,
        iterations: settings.max_iters,
    }
}

/// Minimum-finding method selected by drivers.
#[derive(Debug, Clone)]
pub enum Method {
    Descent(DescentSettings),
    Newton(NewtonSettings),
}

impl Default for Method {
    fn default() -> Self {
        Self::Descent(DescentSettings::default())
    }
}

impl Method {
    pub fn run<O: Objective + ?Sized>(&self, objective: &O, x0: f64) -> DescentOutcome {
        match self {
            Self::Descent(s) => gradient_descent(objective, x0, s),
            Self::Newton(s) => newton(objective, x0, s),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Descent(_) => "descent",
            Self::Newton(_) => "newton",
        }
    }
}

/// Warm-started minimum tracker: each search starts from the previous converged minimum.
///
/// A failed search leaves the seed untouched, so one bad frame does not poison the next.
#[derive(Debug, Clone)]
pub struct PoleTracker {
    method: Method,
    seed: f64,
    failures: usize,
}

impl PoleTracker {
    pub fn new(method: Method, x0: f64) -> Self {
        Self {
            method,
            seed: x0,
            failures: 0,
        }
    }

    /// Current warm-start seed (the last converged minimum).
    pub fn seed(&self) -> f64 {
        self.seed
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn track<O: Objective + ?Sized>(&mut self, objective: &O) -> Result<f64> {
        match self.method.run(objective, self.seed).into_result() {
            Ok(x) => {
                self.seed = x;
                Ok(x)
            }
            Err(e) => {
                self.failures += 1;
                Err(e)
            }
        }
    }
}
