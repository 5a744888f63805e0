// src/visualisation.rs
//
// PNG rendering of frame snapshots and trajectories. Read-only consumer of `Frame`.

use plotters::prelude::*;
use std::path::Path;
use std::process::Command;

use crate::energy::EnergyBreakdown;
use crate::error::{Result, SwimmerError};
use crate::moment::particle_positions;
use crate::params::SwimmerParams;
use crate::simulation::Frame;

/// Where the external-field arrow is drawn in the swimmer panel.
const FIELD_ANCHOR: (f64, f64) = (-2.0, -0.5);

/// Padded y-range of a curve, guarding against flat or non-finite data.
fn y_range(values: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values {
        if v.is_finite() {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    if (hi - lo).abs() < 1e-12 {
        let delta = if hi.abs() < 1e-12 { 1.0 } else { 0.1 * hi.abs() };
        return (lo - delta, hi + delta);
    }
    let margin = 0.1 * (hi - lo);
    (lo - margin, hi + margin)
}

fn circle_path(cx: f64, cy: f64, r: f64) -> Vec<(f64, f64)> {
    (0..=48)
        .map(|i| {
            let t = std::f64::consts::TAU * i as f64 / 48.0;
            (cx + r * t.cos(), cy + r * t.sin())
        })
        .collect()
}

/// Save one frame: swimmer with moment arrows (top) and energy landscape (bottom).
///
/// `thetas` are the angles the frame's landscape was sampled at. Fails with
/// `DegenerateField` before touching the file if a permanent moment has no direction.
pub fn save_frame_plot(
    frame: &Frame,
    thetas: &[f64],
    params: &SwimmerParams,
    filename: &Path,
) -> Result<()> {
    let a_l = params.a_l;
    let arrows = frame.arrows(0.8 * 2.0 * a_l, params.gamma)?;

    let root = BitMapBackend::new(filename, (900, 900)).into_drawing_area();
    root.fill(&WHITE).map_err(SwimmerError::plot)?;
    let (upper, lower) = root.split_vertically(400);

    // ---------- swimmer panel ----------
    let mut top = ChartBuilder::on(&upper)
        .margin(15)
        .caption(
            format!("t = {:.3}   theta = {:.4}", frame.time, frame.theta),
            ("sans-serif", 20),
        )
        .x_label_area_size(35)
        .y_label_area_size(45)
        .build_cartesian_2d(-3.0..3.0, -1.0..1.5)
        .map_err(SwimmerError::plot)?;

    top.configure_mesh()
        .disable_mesh()
        .x_desc("x/l")
        .y_desc("y/l")
        .draw()
        .map_err(SwimmerError::plot)?;

    for p in particle_positions(frame.body).iter() {
        top.draw_series(std::iter::once(PathElement::new(
            circle_path(p[0], p[1], a_l),
            &BLACK,
        )))
        .map_err(SwimmerError::plot)?;
    }

    // Arrows pivot about the particle centre; the head is a filled dot.
    let field = [0.6 * frame.b_ext[0], 0.6 * frame.b_ext[1], 0.0];
    let all = arrows
        .iter()
        .map(|(o, v)| ((o[0], o[1]), (v[0], v[1])))
        .chain(std::iter::once((FIELD_ANCHOR, (field[0], field[1]))));
    for ((ox, oy), (vx, vy)) in all {
        let tail = (ox - 0.5 * vx, oy - 0.5 * vy);
        let head = (ox + 0.5 * vx, oy + 0.5 * vy);
        top.draw_series(std::iter::once(PathElement::new(
            vec![tail, head],
            BLACK.stroke_width(2),
        )))
        .map_err(SwimmerError::plot)?;
        top.draw_series(std::iter::once(Circle::new(head, 3, BLACK.filled())))
            .map_err(SwimmerError::plot)?;
    }

    // ---------- landscape panel ----------
    if let Some(landscape) = &frame.landscape {
        if !thetas.is_empty() && thetas.len() == landscape.len() {
            let (y_min, y_max) = y_range(landscape);
            let x_min = thetas[0];
            let x_max = thetas[thetas.len() - 1];

            let mut chart = ChartBuilder::on(&lower)
                .margin(15)
                .caption("Potential energy", ("sans-serif", 20))
                .set_left_and_bottom_label_area_size(55)
                .build_cartesian_2d(x_min..x_max, y_min..y_max)
                .map_err(SwimmerError::plot)?;

            chart
                .configure_mesh()
                .x_desc("theta")
                .y_desc("energy")
                .draw()
                .map_err(SwimmerError::plot)?;

            chart
                .draw_series(LineSeries::new(
                    thetas.iter().zip(landscape.iter()).map(|(&t, &e)| (t, e)),
                    &CYAN,
                ))
                .map_err(SwimmerError::plot)?;

            chart
                .draw_series(std::iter::once(Circle::new(
                    (frame.theta, frame.energy),
                    6,
                    RED.filled(),
                )))
                .map_err(SwimmerError::plot)?;

            if let Some(pole) = frame.pole {
                chart
                    .draw_series(std::iter::once(Circle::new(
                        (pole.x, pole.energy),
                        5,
                        GREEN.filled(),
                    )))
                    .map_err(SwimmerError::plot)?;
            }
        }
    }

    root.present().map_err(SwimmerError::plot)?;
    Ok(())
}

/// Particle angle and tracked pole versus time.
pub fn save_trajectory_plot(
    times: &[f64],
    theta: &[f64],
    pole: &[Option<f64>],
    filename: &Path,
) -> Result<()> {
    if times.is_empty() {
        return Ok(()); // nothing to plot
    }

    let t_min = times[0];
    let t_max = times[times.len() - 1].max(t_min + f64::EPSILON);
    let all: Vec<f64> = theta.iter().copied().chain(pole.iter().flatten().copied()).collect();
    let (y_min, y_max) = y_range(&all);

    let root = BitMapBackend::new(filename, (1024, 768)).into_drawing_area();
    root.fill(&WHITE).map_err(SwimmerError::plot)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Particle angle and tracked minimum", ("sans-serif", 30))
        .set_left_and_bottom_label_area_size(60)
        .build_cartesian_2d(t_min..t_max, y_min..y_max)
        .map_err(SwimmerError::plot)?;

    chart
        .configure_mesh()
        .x_desc("time")
        .y_desc("angle (rad)")
        .draw()
        .map_err(SwimmerError::plot)?;

    chart
        .draw_series(LineSeries::new(
            times.iter().zip(theta.iter()).map(|(&t, &v)| (t, v)),
            &RED,
        ))
        .map_err(SwimmerError::plot)?
        .label("theta")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    chart
        .draw_series(
            times
                .iter()
                .zip(pole.iter())
                .filter_map(|(&t, p)| p.map(|x| Circle::new((t, x), 2, GREEN.filled()))),
        )
        .map_err(SwimmerError::plot)?
        .label("pole")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, GREEN.filled()));

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()
        .map_err(SwimmerError::plot)?;

    root.present().map_err(SwimmerError::plot)?;
    Ok(())
}

/// The four energy terms and their total against θ, at one field value `f`.
pub fn save_energy_components_plot(
    thetas: &[f64],
    parts: &[EnergyBreakdown],
    f: f64,
    filename: &Path,
) -> Result<()> {
    if thetas.is_empty() || thetas.len() != parts.len() {
        return Ok(()); // nothing to plot
    }

    let all: Vec<f64> = parts
        .iter()
        .flat_map(|e| [e.field, e.dipole, e.para_field, e.para_dipole, e.total()])
        .collect();
    let (y_min, y_max) = y_range(&all);
    let x_min = thetas[0];
    let x_max = thetas[thetas.len() - 1];

    let root = BitMapBackend::new(filename, (1024, 768)).into_drawing_area();
    root.fill(&WHITE).map_err(SwimmerError::plot)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(format!("Energy components at f = {:.3}", f), ("sans-serif", 30))
        .set_left_and_bottom_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(SwimmerError::plot)?;

    chart
        .configure_mesh()
        .x_desc("theta (rad)")
        .y_desc("Energy (arb. units)")
        .x_labels(10)
        .y_labels(10)
        .label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(SwimmerError::plot)?;

    let series: [(&str, RGBColor, fn(&EnergyBreakdown) -> f64); 5] = [
        ("Field", RED, |e| e.field),
        ("Dipole", BLUE, |e| e.dipole),
        ("Para/field", GREEN, |e| e.para_field),
        ("Para/dipole", MAGENTA, |e| e.para_dipole),
        ("Total", BLACK, |e| e.total()),
    ];

    for (label, color, pick) in series {
        chart
            .draw_series(LineSeries::new(
                thetas.iter().zip(parts.iter()).map(|(&t, e)| (t, pick(e))),
                &color,
            ))
            .map_err(SwimmerError::plot)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()
        .map_err(SwimmerError::plot)?;

    root.present().map_err(SwimmerError::plot)?;
    Ok(())
}

/// Use `ffmpeg` (from PATH) to stitch `pattern` frames (e.g. "frames/frame_*.png") into a movie.
pub fn make_movie_with_ffmpeg(pattern: &str, output: &Path, fps: u32) -> Result<()> {
    let status = Command::new("ffmpeg")
        .arg("-y")
        .args(["-framerate", &fps.to_string()])
        .args(["-pattern_type", "glob"])
        .args(["-i", pattern])
        .args(["-pix_fmt", "yuv420p"])
        .arg(output)
        .status()?;

    if !status.success() {
        eprintln!("ffmpeg exited with status {:?}", status);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_range_pads_flat_and_empty_data() {
        assert_eq!(y_range(&[]), (-1.0, 1.0));
        assert_eq!(y_range(&[f64::NAN]), (-1.0, 1.0));
        let (lo, hi) = y_range(&[2.0, 2.0]);
        assert!(lo < 2.0 && hi > 2.0);
        let (lo, hi) = y_range(&[0.0, 10.0]);
        assert_eq!((lo, hi), (-1.0, 11.0));
    }

    #[test]
    fn circle_path_is_closed() {
        let c = circle_path(1.0, 2.0, 0.3);
        let (a, b) = (c[0], c[c.len() - 1]);
        assert!((a.0 - b.0).abs() < 1e-12 && (a.1 - b.1).abs() < 1e-12);
    }
}
