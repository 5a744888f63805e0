// src/bin/energy_landscape.rs
//
// Energy landscape split into its four terms, at a few fixed field values.
// Useful to see which term places the wells and how far the field moves them.
//
// Run:
//   cargo run --release --bin energy_landscape -- gamma=10 f=1 f=0 f=-1
//
// Output:
//   out/energy_landscape/
//     ├── config.json
//     ├── landscape_f<f>.csv
//     └── landscape_f<f>.png

use std::env;
use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;

use swimmer_sim::config::{RunConfig, RunInfo};
use swimmer_sim::energy::{EnergyBreakdown, Potential};
use swimmer_sim::error::Result;
use swimmer_sim::minimize::Objective;
use swimmer_sim::visualisation::save_energy_components_plot;

fn main() -> Result<()> {
    let mut cfg = RunConfig::default();
    let mut fields: Vec<f64> = Vec::new();

    for arg in env::args().skip(1) {
        let Some((key, v)) = arg.split_once('=') else {
            eprintln!("Warning: ignoring unknown argument '{arg}'");
            continue;
        };
        let num = v.parse::<f64>().ok();
        match (key, num) {
            ("alpha", Some(x)) => cfg.swimmer.alpha = x,
            ("gamma", Some(x)) => cfg.swimmer.gamma = x,
            ("k", Some(x)) => cfg.swimmer.field_energy_factor = x,
            ("f", Some(x)) => fields.push(x),
            ("samples", Some(x)) if x >= 0.0 => cfg.landscape.samples = x as usize,
            ("model", _) => cfg.swimmer.model = v.to_string(),
            _ => eprintln!("Warning: ignoring argument '{arg}'"),
        }
    }
    if fields.is_empty() {
        fields = vec![1.0, 0.0, -1.0];
    }

    let params = cfg.swimmer_params()?;
    let model = cfg.model()?;
    let thetas = cfg.landscape().thetas();

    let out_dir = Path::new("out").join("energy_landscape");
    create_dir_all(&out_dir)?;

    cfg.run = RunInfo {
        binary: "energy_landscape".to_string(),
        run_id: "energy_landscape".to_string(),
        git_commit: None,
        timestamp_utc: None,
    };
    cfg.write_to_dir(&out_dir)?;

    for &f in &fields {
        let potential = Potential::new(params, model, f);
        let parts: Vec<EnergyBreakdown> = thetas.iter().map(|&t| potential.breakdown(t)).collect();

        let stem = format!("landscape_f{:+.3}", f);
        let file = File::create(out_dir.join(format!("{stem}.csv")))?;
        let mut w = BufWriter::new(file);
        writeln!(w, "theta,E_field,E_dipole,E_para_field,E_para_dipole,E_static,E_driven,E_total")?;
        for (&t, e) in thetas.iter().zip(parts.iter()) {
            writeln!(
                w,
                "{:.16e},{:.16e},{:.16e},{:.16e},{:.16e},{:.16e},{:.16e},{:.16e}",
                t,
                e.field,
                e.dipole,
                e.para_field,
                e.para_dipole,
                e.static_part(),
                e.driven_part(),
                e.total(),
            )?;
        }
        w.flush()?;

        save_energy_components_plot(&thetas, &parts, f, &out_dir.join(format!("{stem}.png")))?;

        // Lowest sample on the grid, as a rough locator of the global minimum.
        if let Some((t, e)) = thetas
            .iter()
            .map(|&t| (t, potential.value(t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
        {
            println!("f={:+.3}: lowest sample at theta={:.4} (E={:.6e})", f, t, e);
        }
    }

    println!("Wrote outputs to {:?}", out_dir);
    Ok(())
}
