// src/bin/pole_tracking.rs
//
// Quasi-static pole sweep: the particle does not move, the field phase ψ is stepped over
// `frames` values and the minimum of the landscape is followed with warm starts.
//
// Run:
//   cargo run --release --bin pole_tracking -- gamma=10 frames=200 cycles=2 method=newton
//   cargo run --release --bin pole_tracking -- body=single field=rotating alpha=1 rate=1e-3 cold
//
// Output:
//   out/pole_tracking/
//     ├── config.json
//     └── poles.csv

use std::env;
use std::fs::{File, create_dir_all};
use std::io::BufWriter;
use std::path::Path;

use swimmer_sim::analysis::{characteristic_pole, external_field_pole, pole_offset};
use swimmer_sim::config::{RunConfig, RunInfo};
use swimmer_sim::error::Result;
use swimmer_sim::minimize::NewtonSettings;
use swimmer_sim::output::write_sweep_table;
use swimmer_sim::params::SwimmerBody;
use swimmer_sim::tracking::{SweepSettings, sweep_field};

fn main() -> Result<()> {
    let mut cfg = RunConfig::default();
    let mut sweep = SweepSettings::default();

    for arg in env::args().skip(1) {
        if arg == "cold" {
            sweep.cold_start = true;
            continue;
        }
        let Some((key, v)) = arg.split_once('=') else {
            eprintln!("Warning: ignoring unknown argument '{arg}'");
            continue;
        };
        let num = v.parse::<f64>().ok();
        match (key, num) {
            ("alpha", Some(x)) => cfg.swimmer.alpha = x,
            ("gamma", Some(x)) => cfg.swimmer.gamma = x,
            ("k", Some(x)) => cfg.swimmer.field_energy_factor = x,
            ("b0", Some(x)) => sweep.b0 = x,
            ("cycles", Some(x)) => sweep.cycles = x,
            ("x0", Some(x)) => sweep.x0 = x,
            ("threshold", Some(x)) => sweep.slip_threshold = x,
            ("frames", Some(x)) if x >= 0.0 => sweep.frames = x as usize,
            ("rate", Some(x)) => {
                cfg.minimizer.schedule = "constant".to_string();
                cfg.minimizer.rate = x;
            }
            ("print", Some(x)) if x >= 0.0 => cfg.minimizer.print_every = x as usize,
            ("model", _) => cfg.swimmer.model = v.to_string(),
            ("body", _) => cfg.swimmer.body = v.to_string(),
            ("field", _) => cfg.field.mode = v.to_string(),
            ("method", _) => {
                cfg.minimizer.method = v.to_string();
                if v == "newton" {
                    let n = NewtonSettings::default();
                    cfg.minimizer.tolerance = n.tolerance;
                    cfg.minimizer.max_iters = n.max_iters;
                }
            }
            _ => eprintln!("Warning: ignoring argument '{arg}'"),
        }
    }

    let params = cfg.swimmer_params()?;
    let model = cfg.model()?;
    let method = cfg.method()?;
    sweep.body = cfg.body()?;
    sweep.field_mode = cfg.field_mode()?;
    sweep.body.check_field(sweep.field_mode)?;

    // -------------------------------------------------
    // Output directory
    // -------------------------------------------------
    let out_dir = Path::new("out").join("pole_tracking");
    create_dir_all(&out_dir)?;

    cfg.field.b0 = sweep.b0;
    cfg.numerics.cycles = sweep.cycles;
    cfg.numerics.theta0 = sweep.x0;
    cfg.run = RunInfo {
        binary: "pole_tracking".to_string(),
        run_id: "pole_tracking".to_string(),
        git_commit: None,
        timestamp_utc: None,
    };
    cfg.write_to_dir(&out_dir)?;

    let report = sweep_field(&params, model, &method, &sweep)?;

    let file = File::create(out_dir.join("poles.csv"))?;
    write_sweep_table(BufWriter::new(file), &report)?;

    println!(
        "Swept {} frames over {} cycles (body={}, field={}, model={}, method={}, {} start)",
        report.points.len(),
        sweep.cycles,
        sweep.body.as_str(),
        sweep.field_mode.as_str(),
        model.as_str(),
        method.as_str(),
        if sweep.cold_start { "cold" } else { "warm" }
    );
    if sweep.body == SwimmerBody::Triad {
        println!(
            "Analytic poles: characteristic={:.6} external={:.6} offset={:.6}",
            characteristic_pole(&params),
            external_field_pole(&params),
            pole_offset(&params)
        );
    }
    println!("Slips: {}  failed searches: {}", report.slips, report.failures);
    println!("Wrote outputs to {:?}", out_dir);

    Ok(())
}
