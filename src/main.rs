// src/main.rs
//
// Exploratory driver: one swimmer in the driving field.
//
// Outputs are written to `runs/` (or the directory given via `out=`) and are not committed.
// The quasi-static pole sweep lives in `src/bin/pole_tracking.rs`.
//
// Examples:
//
//   cargo run --release -- gamma=10 cycles=2 frames movie
//       -> two field periods, one PNG per recorded frame, assembled into an MP4.
//
//   cargo run --release -- model=simple settle=1 stride=50 method=newton
//       -> bare induced moment, one settling period at frozen phase, Newton pole tracking.
//
//   cargo run --release -- body=single field=rotating alpha=1 beta=0.1 cycles=4
//       -> a lone dipole chasing a rotating field.
//
//   cargo run --release -- config=runs/<run_id>/config.json run=repeat
//       -> rerun with the exact configuration of an earlier run.
//
// Typical outputs (per run directory):
//   runs/<run_id>/
//     ├── config.json
//     ├── trajectory.csv
//     ├── theta_vs_time.png
//     ├── frames/frame_*.png      (if `frames` or `movie` is set)
//     └── swimmer.mp4             (if `movie` is set)

use std::env;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use swimmer_sim::analysis::{characteristic_pole, external_field_pole};
use swimmer_sim::config::RunConfig;
use swimmer_sim::error::Result;
use swimmer_sim::output::TrajectoryWriter;
use swimmer_sim::params::SwimmerBody;
use swimmer_sim::simulation::{Simulation, SimulationSettings};
use swimmer_sim::visualisation::{
    make_movie_with_ffmpeg, save_frame_plot, save_trajectory_plot,
};

fn print_usage() {
    eprintln!(
        r#"Usage:
  cargo run -- [alpha=VAL] [beta=VAL] [gamma=VAL] [al=VAL] [model=simple|selfconsistent]
             [body=triad|single] [field=oscillating|rotating] [omega=VAL] [psi0=VAL]
             [dt=VAL] [cycles=VAL] [settle=VAL] [stride=N] [b0=VAL] [theta0=VAL]
             [method=descent|newton] [print=N] [minprint=N] [fps=N] [par]
             [frames] [movie] [config=FILE] [out=DIR] [run=RUN_ID]

Notes:
  - One CSV row is written every `stride` steps; frames (PNG) follow the same cadence.
  - `settle=` runs that many field periods with the phase frozen before recording.
  - `config=` loads a config.json from an earlier run; later arguments override it.
  - `print=` reports every N-th frame, `minprint=` every N-th iteration of each pole search.
  - A rotating field needs `body=single`.
"#
    );
}

fn sanitize_run_id(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn default_run_id(cfg: &RunConfig) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| std::time::Duration::from_secs(0));
    let ts = format!("{}{:03}", now.as_secs(), now.subsec_millis());
    format!(
        "{}_{}_{}_g{}_{}",
        ts, cfg.swimmer.body, cfg.swimmer.model, cfg.swimmer.gamma, cfg.minimizer.method
    )
}

fn unique_run_dir(out_root: &str, run_id: &str) -> PathBuf {
    let base = PathBuf::from(out_root);
    let dir = base.join(run_id);
    if !dir.exists() {
        return dir;
    }
    (1..1000)
        .map(|k| base.join(format!("{}_{}", run_id, k)))
        .find(|cand| !cand.exists())
        .unwrap_or(dir)
}

fn parse_f64(key: &str, v: &str, slot: &mut f64) {
    match v.parse::<f64>() {
        Ok(x) => *slot = x,
        Err(_) => eprintln!("Warning: could not parse {key} value '{v}', ignoring"),
    }
}

fn parse_usize(key: &str, v: &str, slot: &mut usize) {
    match v.parse::<usize>() {
        Ok(x) => *slot = x,
        Err(_) => eprintln!("Warning: could not parse {key} value '{v}', ignoring"),
    }
}

fn main() -> Result<()> {
    let argv: Vec<String> = env::args().collect();

    // A config file is the base layer; every other argument overrides it.
    let mut cfg = match argv.iter().skip(1).find_map(|a| a.strip_prefix("config=")) {
        Some(path) => {
            println!("Loading configuration from {path}");
            RunConfig::from_json_file(Path::new(path))?
        }
        None => RunConfig::default(),
    };

    let mut frames_flag = false;
    let mut movie_flag = false;
    let mut parallel = false;
    let mut print_every: usize = 0;
    let mut fps: u32 = 25;
    let mut out_root_override: Option<String> = None;
    let mut run_id_override: Option<String> = None;

    for arg in argv.iter().skip(1) {
        if arg == "-h" || arg == "--help" || arg == "help" {
            print_usage();
            return Ok(());
        }
        if arg.starts_with("config=") {
            continue;
        }
        if arg == "frames" {
            frames_flag = true;
            continue;
        }
        if arg == "movie" {
            movie_flag = true;
            frames_flag = true;
            continue;
        }
        if arg == "par" {
            parallel = true;
            continue;
        }

        let Some((key, v)) = arg.split_once('=') else {
            eprintln!("Warning: ignoring unknown argument '{arg}'");
            continue;
        };
        match key {
            "alpha" => parse_f64(key, v, &mut cfg.swimmer.alpha),
            "beta" => parse_f64(key, v, &mut cfg.swimmer.beta),
            "gamma" => parse_f64(key, v, &mut cfg.swimmer.gamma),
            "al" => parse_f64(key, v, &mut cfg.swimmer.a_l),
            "model" => cfg.swimmer.model = v.to_string(),
            "body" => cfg.swimmer.body = v.to_string(),
            "field" => cfg.field.mode = v.to_string(),
            "omega" => parse_f64(key, v, &mut cfg.field.omega),
            "psi0" => parse_f64(key, v, &mut cfg.field.psi0),
            "dt" => parse_f64(key, v, &mut cfg.numerics.dt),
            "cycles" => parse_f64(key, v, &mut cfg.numerics.cycles),
            "settle" => parse_f64(key, v, &mut cfg.numerics.settle_cycles),
            "stride" => parse_usize(key, v, &mut cfg.numerics.output_stride),
            "theta0" => parse_f64(key, v, &mut cfg.numerics.theta0),
            "b0" => parse_f64(key, v, &mut cfg.field.b0),
            "method" => cfg.minimizer.method = v.to_string(),
            "print" => parse_usize(key, v, &mut print_every),
            "minprint" => parse_usize(key, v, &mut cfg.minimizer.print_every),
            "fps" => match v.parse::<u32>() {
                Ok(x) => fps = x.max(1),
                Err(_) => eprintln!("Warning: could not parse fps value '{v}', ignoring"),
            },
            "out" => out_root_override = Some(v.to_string()),
            "run" => run_id_override = Some(v.to_string()),
            _ => eprintln!("Warning: ignoring unknown argument '{arg}'"),
        }
    }

    // Switching to Newton on the command line picks up its own stopping defaults.
    if argv.iter().any(|a| a == "method=newton") {
        let n = swimmer_sim::minimize::NewtonSettings::default();
        cfg.minimizer.tolerance = n.tolerance;
        cfg.minimizer.max_iters = n.max_iters;
    }

    // Validate everything before touching the filesystem.
    let params = cfg.swimmer_params()?;
    let model = cfg.model()?;
    let body = cfg.body()?;
    let run = cfg.run_params()?;
    body.check_field(run.field_mode)?;
    let method = cfg.method()?;
    let landscape = cfg.landscape();

    // -------- output directory setup --------
    let out_root = out_root_override.unwrap_or_else(|| "runs".to_string());
    create_dir_all(&out_root)?;

    let run_id = sanitize_run_id(&run_id_override.unwrap_or_else(|| default_run_id(&cfg)));
    let run_dir = unique_run_dir(&out_root, &run_id);
    create_dir_all(&run_dir)?;
    let frames_dir = run_dir.join("frames");
    if frames_flag {
        create_dir_all(&frames_dir)?;
    }

    cfg.run.binary = "swimmer_sim".to_string();
    cfg.run.run_id = run_id.clone();
    cfg.write_to_dir(&run_dir)?;

    println!("--- swimmer_sim run config ---");
    println!("run_dir: {}", run_dir.to_string_lossy());
    println!(
        "swimmer: alpha={:.3e} beta={:.3e} gamma={:.3e} a_l={:.3} k={}  model={} body={}",
        params.alpha,
        params.beta,
        params.gamma,
        params.a_l,
        params.field_energy_factor,
        model.as_str(),
        body.as_str()
    );
    println!(
        "field:   {} b0={:.3} omega={:.4} psi0={:.4}  (period {:.4})",
        run.field_mode.as_str(),
        run.b0,
        run.omega,
        run.psi0,
        run.period()
    );
    println!(
        "run:     dt={:.3e} steps={} settle_steps={} stride={} theta0={:.4}",
        run.dt,
        run.n_steps(),
        run.n_settle_steps(),
        run.output_stride,
        run.theta0
    );
    match body {
        SwimmerBody::Triad => println!(
            "poles:   characteristic={:.6} external={:.6}  method={}",
            characteristic_pole(&params),
            external_field_pole(&params),
            method.as_str()
        ),
        SwimmerBody::SingleDipole => println!("poles:   theta = psi  method={}", method.as_str()),
    }
    println!("------------------------------");

    let settings = SimulationSettings {
        body,
        landscape,
        record_landscape: frames_flag,
        method,
        parallel,
        print_every,
        ..SimulationSettings::default()
    };
    let mut sim = Simulation::new(params, model, run, settings)?;
    let thetas = sim.landscape_thetas().to_vec();

    let mut writer = TrajectoryWriter::create(&run_dir.join("trajectory.csv"))?;
    let mut times: Vec<f64> = Vec::new();
    let mut theta_vec: Vec<f64> = Vec::new();
    let mut pole_vec: Vec<Option<f64>> = Vec::new();

    // Keep frame ordering stable under glob
    let frame_pad: usize = 6;

    let report = sim.run(|frame| {
        writer.write_frame(frame)?;
        times.push(frame.time);
        theta_vec.push(frame.theta);
        pole_vec.push(frame.pole.map(|p| p.x));

        if frames_flag {
            let name = format!("frame_{:0width$}.png", frame.index, width = frame_pad);
            save_frame_plot(frame, &thetas, &params, &frames_dir.join(name))?;
        }
        Ok(())
    })?;
    let rows = writer.rows();
    writer.finish()?;

    save_trajectory_plot(
        &times,
        &theta_vec,
        &pole_vec,
        &run_dir.join("theta_vs_time.png"),
    )?;

    println!(
        "Recorded {} frames ({} rows, {} skipped) over {} steps after {} settling steps",
        report.frames, rows, report.skipped_frames, report.steps, report.settle_steps
    );
    println!(
        "Final: theta={:.6} psi={:.6} pole={}  (pole failures: {})",
        report.final_theta,
        report.final_psi,
        report
            .final_pole
            .map(|x| format!("{:.6}", x))
            .unwrap_or_else(|| "-".to_string()),
        report.pole_failures
    );

    if movie_flag {
        let pattern = frames_dir.join("frame_*.png").to_string_lossy().to_string();
        let movie_path = run_dir.join("swimmer.mp4");
        match make_movie_with_ffmpeg(&pattern, &movie_path, fps) {
            Ok(()) => println!("Saved movie to {}", movie_path.to_string_lossy()),
            Err(e) => eprintln!("Could not create movie with ffmpeg: {e}"),
        }
    }

    println!("Done. Outputs in {}", run_dir.to_string_lossy());
    Ok(())
}
