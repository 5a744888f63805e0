// tests/validation.rs
//
// Integration-style validation tests (physics sanity checks).
// Run with: cargo test
// Or only these tests: cargo test --test validation

use std::f64::consts::{PI, TAU};

use approx::assert_relative_eq;

use swimmer_sim::SwimmerError;
use swimmer_sim::energy::{
    LandscapeGrid, Potential, curvature, energy, energy_landscape, energy_landscape_par,
    grad_energy,
};
use swimmer_sim::field::{ExternalField, FieldMode};
use swimmer_sim::integrator::{Mobility, step_angle};
use swimmer_sim::minimize::{
    DescentSettings, Method, NewtonSettings, Objective, PoleTracker, RateSchedule,
    gradient_descent, newton,
};
use swimmer_sim::moment::permanent_moment;
use swimmer_sim::params::{ParamagneticModel, RunParams, SwimmerBody, SwimmerParams};
use swimmer_sim::simulation::{Simulation, SimulationSettings};
use swimmer_sim::tracking::{SweepSettings, sweep_field};
use swimmer_sim::vec3::{norm, normalize};

const MODELS: [ParamagneticModel; 2] = [ParamagneticModel::Simple, ParamagneticModel::SelfConsistent];

fn sample_angles(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| -TAU + 2.0 * TAU * i as f64 / (n - 1) as f64)
        .collect()
}

fn scenario_params() -> SwimmerParams {
    SwimmerParams::new(100.0, 4.0e-3, 10.0, 0.3).unwrap()
}

/// Pure dipole double well 3 − cos 2θ, minima at 0 and π.
struct DipoleWell;

impl Objective for DipoleWell {
    fn value(&self, x: f64) -> f64 {
        3.0 - (2.0 * x).cos()
    }
    fn gradient(&self, x: f64) -> f64 {
        2.0 * (2.0 * x).sin()
    }
    fn curvature(&self, x: f64) -> f64 {
        4.0 * (2.0 * x).cos()
    }
}

fn small_run() -> (RunParams, SimulationSettings) {
    let run = RunParams {
        dt: 1.0e-3,
        cycles: 1.0,
        output_stride: 10,
        ..RunParams::default()
    };
    let settings = SimulationSettings {
        landscape: LandscapeGrid {
            theta_min: -PI,
            theta_max: PI,
            samples: 64,
        },
        ..SimulationSettings::default()
    };
    (run, settings)
}

#[test]
fn permanent_moment_is_unit_for_all_angles() {
    for theta in sample_angles(401) {
        assert_relative_eq!(norm(permanent_moment(theta)), 1.0, epsilon = 1e-14);
    }
    for theta in [1.0e6, -3.7e4, 123.456] {
        assert_relative_eq!(norm(permanent_moment(theta)), 1.0, epsilon = 1e-12);
    }
}

#[test]
fn landscape_paths_equal_scalar_energy() {
    let p = scenario_params();
    let thetas = LandscapeGrid::default().thetas();
    for model in MODELS {
        for f in [-1.0, 0.0, 0.42, 1.0] {
            let serial = energy_landscape(&thetas, f, &p, model);
            let par = energy_landscape_par(&thetas, f, &p, model);
            assert_eq!(serial.len(), thetas.len());
            for ((&t, &s), &q) in thetas.iter().zip(serial.iter()).zip(par.iter()) {
                let scalar = energy(t, f, &p, model);
                assert_eq!(s, scalar);
                assert_eq!(q, scalar);
            }
        }
    }
}

#[test]
fn gradient_and_curvature_match_central_differences() {
    let p = scenario_params();
    let h = 1e-5;
    for model in MODELS {
        for f in [-1.0, 0.0, 0.3, 1.0] {
            for theta in sample_angles(25) {
                let fd_grad = (energy(theta + h, f, &p, model) - energy(theta - h, f, &p, model))
                    / (2.0 * h);
                assert!(
                    (fd_grad - grad_energy(theta, f, &p, model)).abs() < 1e-6,
                    "gradient mismatch at theta={theta} f={f} model={}",
                    model.as_str()
                );

                let fd_curv = (grad_energy(theta + h, f, &p, model)
                    - grad_energy(theta - h, f, &p, model))
                    / (2.0 * h);
                assert!(
                    (fd_curv - curvature(theta, f, &p, model)).abs() < 1e-5,
                    "curvature mismatch at theta={theta} f={f} model={}",
                    model.as_str()
                );
            }
        }
    }
}

#[test]
fn zero_torque_leaves_angle_unchanged() {
    let mu = Mobility::from_params(&scenario_params());
    for theta in sample_angles(21) {
        assert_eq!(step_angle(theta, 0.0, mu, 1e-3), theta);
        assert_eq!(step_angle(theta, 0.0, mu, 10.0), theta);
    }
}

#[test]
fn descent_started_at_dipole_minimum_stops_immediately() {
    let s = DescentSettings::default();
    for x0 in [0.0, PI] {
        let out = gradient_descent(&DipoleWell, x0, &s);
        assert!(out.converged());
        assert!(out.iterations() <= 2);
        assert!((out.x() - x0).abs() < s.tolerance);
    }
}

#[test]
fn descent_finds_minimum_for_reference_scenario() {
    let p = scenario_params();
    for model in MODELS {
        let potential = Potential::new(p, model, 1.0);
        let s = DescentSettings::default();
        let out = gradient_descent(&potential, 0.0, &s);

        assert!(out.converged(), "model={}", model.as_str());
        assert!(out.iterations() <= 100_000);
        let x = out.x();

        // The stop rule bounds the step rate(n)·|E′(x*)|, not |E′(x*)|: with the decaying
        // harmonic rate the search halts with a residual gradient of order one, short of the
        // stationary point. That weaker bound is the contract checked here.
        let rate = s.schedule.rate(out.iterations());
        assert!(rate * potential.gradient(x).abs() < s.tolerance);
        assert!(potential.value(x) <= potential.value(0.0));

        // Same well as a tightly converged constant-rate search.
        let tight = DescentSettings {
            schedule: RateSchedule::Constant { rate: 1e-3 },
            tolerance: 1e-12,
            ..DescentSettings::default()
        };
        let reference = gradient_descent(&potential, x, &tight).into_result().unwrap();
        assert!(potential.gradient(reference).abs() < 1e-6);
        assert!((x - reference).abs() < 0.03);
        assert!(reference < 0.0 && reference > -0.2);
    }
}

#[test]
fn newton_agrees_with_descent_on_reference_scenario() {
    let potential = Potential::new(scenario_params(), ParamagneticModel::SelfConsistent, 1.0);
    let x_newton = newton(&potential, 0.0, &NewtonSettings::default())
        .into_result()
        .unwrap();
    let x_descent = gradient_descent(&potential, 0.0, &DescentSettings::default())
        .into_result()
        .unwrap();
    assert!((x_newton - x_descent).abs() < 0.03);
    assert!(potential.curvature(x_newton) > 0.0);
}

#[test]
fn field_phase_after_hundred_steps() {
    let mut field = ExternalField::new(0.0, TAU, 1.0);
    for _ in 0..100 {
        field.advance(0.01);
    }
    assert_relative_eq!(field.phase(), 100.0 * TAU * 0.01, epsilon = 1e-12);
    assert_relative_eq!(field.amplitude(), 1.0, epsilon = 1e-12);
}

#[test]
fn warm_started_minimum_moves_continuously_with_field() {
    let p = scenario_params();
    for model in MODELS {
        for method in [
            Method::default(),
            Method::Newton(NewtonSettings::default()),
        ] {
            let mut tracker = PoleTracker::new(method, 0.0);
            let mut previous: Option<f64> = None;
            for i in 0..=80 {
                let f = 1.0 - 0.01 * i as f64;
                let x = tracker.track(&Potential::new(p, model, f)).unwrap();
                if let Some(prev) = previous {
                    assert!(
                        (x - prev).abs() < 0.02,
                        "jump {prev} -> {x} at f={f} model={}",
                        model.as_str()
                    );
                }
                previous = Some(x);
            }
            assert_eq!(tracker.failures(), 0);
        }
    }
}

#[test]
fn full_field_cycle_makes_the_tracked_minimum_slip() {
    let p = scenario_params();
    for model in MODELS {
        let report =
            sweep_field(&p, model, &Method::default(), &SweepSettings::default()).unwrap();
        assert_eq!(report.points.len(), 100);
        assert_eq!(report.failures, 0);
        assert!(report.slips > 0, "model={}", model.as_str());
        assert_eq!(
            report.slips,
            report.points.iter().filter(|pt| pt.slipped).count()
        );
    }
}

#[test]
fn simulation_records_frames_at_stride() {
    let (run, settings) = small_run();
    let mut sim = Simulation::new(
        scenario_params(),
        ParamagneticModel::SelfConsistent,
        run,
        settings,
    )
    .unwrap();
    let (frames, report) = sim.collect_frames().unwrap();

    assert_eq!(report.steps, 1000);
    assert_eq!(report.frames, 100);
    assert_eq!(frames.len(), 100);
    assert_eq!(report.skipped_frames, 0);

    // Frames describe the state before the update of their step.
    let first = &frames[0];
    assert_eq!(first.step, 0);
    assert_eq!(first.theta, run.theta0);
    assert_eq!(first.psi, run.psi0);
    assert_eq!(first.b_ext, [0.0, run.b0, 0.0]);
    assert_eq!(first.landscape.as_ref().map(Vec::len), Some(64));
    assert!(first.pole.is_some());

    for (k, pair) in frames.windows(2).enumerate() {
        assert_eq!(pair[1].index, k + 1);
        assert_eq!(pair[1].step - pair[0].step, run.output_stride);
        assert_relative_eq!(
            pair[1].psi - pair[0].psi,
            run.omega * run.dt * run.output_stride as f64,
            epsilon = 1e-9
        );
    }

    assert_relative_eq!(report.final_psi, TAU, epsilon = 1e-9);
    assert!(report.final_theta.is_finite());
}

#[test]
fn settling_keeps_field_phase_frozen() {
    let (run, settings) = small_run();
    let run = RunParams {
        settle_cycles: 0.5,
        ..run
    };
    let mut sim = Simulation::new(scenario_params(), ParamagneticModel::Simple, run, settings)
        .unwrap();

    sim.settle(run.n_settle_steps());
    assert_eq!(sim.field().phase(), run.psi0);
    assert!(sim.theta() != run.theta0);

    let report = sim.run(|_| Ok(())).unwrap();
    assert_eq!(report.settle_steps, 500);
    assert_eq!(report.steps, 1000);
}

#[test]
fn vanishing_field_still_draws_every_particle() {
    let (run, settings) = small_run();
    // No field at all: the simple model induces exactly zero moment.
    let run = RunParams { b0: 0.0, ..run };
    let settings = SimulationSettings {
        record_landscape: false,
        track_pole: false,
        ..settings
    };
    let p = scenario_params();
    let mut sim = Simulation::new(p, ParamagneticModel::Simple, run, settings).unwrap();

    let mut drawn = 0usize;
    let report = sim
        .run(|frame| {
            let arrows = frame.arrows(0.5, p.gamma)?;
            assert_eq!(arrows.len(), 3);
            assert_relative_eq!(norm(arrows[0].1), 0.5, epsilon = 1e-12);
            assert_relative_eq!(norm(arrows[1].1), 0.5, epsilon = 1e-12);
            assert_eq!(arrows[2].1, [0.0, 0.0, 0.0]);
            drawn += 1;
            Ok(())
        })
        .unwrap();

    assert_eq!(drawn, 100);
    assert_eq!(report.skipped_frames, 0);
}

#[test]
fn induced_arrow_is_drawn_as_moment_over_susceptibility() {
    let (run, settings) = small_run();
    let run = RunParams { b0: 0.4, ..run };
    let p = scenario_params();
    let mut sim = Simulation::new(p, ParamagneticModel::Simple, run, settings).unwrap();
    let (frames, _) = sim.collect_frames().unwrap();

    let arrows = frames[0].arrows(0.5, p.gamma).unwrap();
    // p/γ = B_ext for the simple model.
    assert_relative_eq!(arrows[2].1[1], 0.5 * 0.4, epsilon = 1e-12);
}

#[test]
fn degenerate_vectors_in_the_sink_skip_frames_without_aborting() {
    let (run, settings) = small_run();
    let run = RunParams { b0: 0.0, ..run };
    let settings = SimulationSettings {
        record_landscape: false,
        track_pole: false,
        ..settings
    };
    let mut sim =
        Simulation::new(scenario_params(), ParamagneticModel::Simple, run, settings).unwrap();

    let mut drawn = 0usize;
    let report = sim
        .run(|frame| {
            // Field direction for an overlay; undefined when the field vanishes.
            normalize(frame.b_ext)?;
            drawn += 1;
            Ok(())
        })
        .unwrap();

    assert_eq!(drawn, 0);
    assert_eq!(report.frames, 100);
    assert_eq!(report.skipped_frames, 100);
    assert!(report.final_theta.is_finite());
}

fn lone_dipole_params() -> SwimmerParams {
    SwimmerParams::new(1.0, 0.1, 10.0, 0.3).unwrap()
}

fn lone_dipole_sweep(cold_start: bool) -> SweepSettings {
    SweepSettings {
        body: SwimmerBody::SingleDipole,
        field_mode: FieldMode::Rotating,
        cold_start,
        ..SweepSettings::default()
    }
}

fn constant_rate_descent() -> Method {
    Method::Descent(DescentSettings {
        schedule: RateSchedule::Constant { rate: 1e-3 },
        ..DescentSettings::default()
    })
}

#[test]
fn lone_dipole_minimum_follows_rotating_field_with_warm_start() {
    let report = sweep_field(
        &lone_dipole_params(),
        ParamagneticModel::default(),
        &constant_rate_descent(),
        &lone_dipole_sweep(false),
    )
    .unwrap();

    assert_eq!(report.failures, 0);
    assert_eq!(report.slips, 0);
    // Warm starts unwrap the angle: the minimum stays on θ = ψ for the whole turn.
    for pt in &report.points {
        let pole = pt.pole.unwrap();
        assert!((pole.x - pt.psi).abs() < 0.01, "psi={} pole={}", pt.psi, pole.x);
    }
    let last = report.points.last().unwrap();
    assert_relative_eq!(last.pole.unwrap().x, TAU, epsilon = 0.01);
}

#[test]
fn lone_dipole_minimum_slips_with_cold_start() {
    let report = sweep_field(
        &lone_dipole_params(),
        ParamagneticModel::default(),
        &constant_rate_descent(),
        &lone_dipole_sweep(true),
    )
    .unwrap();

    assert_eq!(report.failures, 0);
    assert_eq!(report.slips, 1);
    let k = report.points.iter().position(|pt| pt.slipped).unwrap();
    // Seeded at 0, each search falls into the copy of θ = ψ nearest to 0; the branch flips
    // when ψ crosses π.
    assert!(report.points[k - 1].psi < PI && report.points[k].psi > PI);
    for pt in &report.points {
        let x = pt.pole.unwrap().x;
        let d = (x - pt.psi + PI).rem_euclid(TAU) - PI;
        assert!(d.abs() < 0.01, "psi={} pole={}", pt.psi, x);
        assert!(x.abs() <= PI + 0.01);
    }
}

#[test]
fn lone_dipole_steps_with_field_torque_and_lone_mobility() {
    let p = lone_dipole_params();
    let run = RunParams {
        dt: 1.0e-3,
        cycles: 0.01,
        theta0: 0.3,
        field_mode: FieldMode::Rotating,
        output_stride: 1,
        ..RunParams::default()
    };
    let settings = SimulationSettings {
        body: SwimmerBody::SingleDipole,
        record_landscape: false,
        method: constant_rate_descent(),
        ..SimulationSettings::default()
    };
    let mut sim = Simulation::new(p, ParamagneticModel::default(), run, settings).unwrap();
    let (frames, _) = sim.collect_frames().unwrap();

    let first = &frames[0];
    assert_eq!(first.moments.len(), 1);
    assert_eq!(first.arrows(0.5, p.gamma).unwrap().len(), 1);
    // τ_z = α (m × B)_z = −α sin(θ − ψ) with ψ = 0.
    assert_relative_eq!(first.torque_z, -(0.3f64).sin(), epsilon = 1e-12);
    assert_relative_eq!(first.energy, -2.0 * (0.3f64).cos(), epsilon = 1e-12);
    // Pole of −2α m·B sits on the field direction.
    assert!(first.pole.unwrap().x.abs() < 0.01);

    let mu = Mobility::for_body(&p, SwimmerBody::SingleDipole);
    assert_relative_eq!(mu.value(), 0.1 / 0.027, epsilon = 1e-12);
    assert_relative_eq!(
        frames[1].theta,
        step_angle(0.3, first.torque_z, mu, run.dt),
        epsilon = 1e-15
    );
}

#[test]
fn triad_in_rotating_field_is_rejected() {
    let (run, settings) = small_run();
    let run = RunParams {
        field_mode: FieldMode::Rotating,
        ..run
    };
    let res = Simulation::new(scenario_params(), ParamagneticModel::default(), run, settings);
    assert!(matches!(res, Err(SwimmerError::InvalidParameter(_))));
}

#[test]
fn other_sink_errors_abort_the_run() {
    let (run, settings) = small_run();
    let mut sim = Simulation::new(
        scenario_params(),
        ParamagneticModel::SelfConsistent,
        run,
        settings,
    )
    .unwrap();

    let result = sim.run(|frame| {
        if frame.index == 3 {
            Err(SwimmerError::InvalidParameter("stop".to_string()))
        } else {
            Ok(())
        }
    });
    assert!(matches!(result, Err(SwimmerError::InvalidParameter(_))));
}

#[test]
fn invalid_configuration_is_rejected() {
    assert!(SwimmerParams::new(0.0, 4e-3, 10.0, 0.3).is_err());
    assert!(SwimmerParams::new(100.0, -1.0, 10.0, 0.3).is_err());
    assert!(SwimmerParams::new(100.0, 4e-3, f64::NAN, 0.3).is_err());
    assert!(SwimmerParams::new(100.0, 4e-3, 10.0, 0.0).is_err());

    let bad_run = RunParams {
        dt: 0.0,
        ..RunParams::default()
    };
    let (_, settings) = small_run();
    let err = Simulation::new(
        SwimmerParams::default(),
        ParamagneticModel::default(),
        bad_run,
        settings,
    );
    assert!(matches!(err, Err(SwimmerError::InvalidParameter(_))));

    assert!(ParamagneticModel::from_str("quantum").is_none());
}
