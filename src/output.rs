// src/output.rs
//
// CSV tables. One row per recorded frame (trajectory) or per sweep point (poles).
// Missing poles are written as empty cells.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::simulation::Frame;
use crate::tracking::SweepReport;

pub const TRAJECTORY_HEADER: &str = "t,psi,b_x,b_y,theta,torque_z,energy,pole_x,pole_energy";
pub const SWEEP_HEADER: &str = "index,psi,b_x,b_y,pole_x,pole_energy,slipped";

fn opt(v: Option<f64>) -> String {
    v.map(|x| format!("{:.16e}", x)).unwrap_or_default()
}

pub struct TrajectoryWriter<W: Write> {
    w: W,
    rows: usize,
}

impl TrajectoryWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> TrajectoryWriter<W> {
    pub fn new(mut w: W) -> Result<Self> {
        writeln!(w, "{}", TRAJECTORY_HEADER)?;
        Ok(Self { w, rows: 0 })
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        writeln!(
            self.w,
            "{:.16e},{:.16e},{:.16e},{:.16e},{:.16e},{:.16e},{:.16e},{},{}",
            frame.time,
            frame.psi,
            frame.b_ext[0],
            frame.b_ext[1],
            frame.theta,
            frame.torque_z,
            frame.energy,
            opt(frame.pole.map(|p| p.x)),
            opt(frame.pole.map(|p| p.energy)),
        )?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> Result<W> {
        self.w.flush()?;
        Ok(self.w)
    }
}

pub fn write_sweep_table<W: Write>(mut w: W, report: &SweepReport) -> Result<()> {
    writeln!(w, "{}", SWEEP_HEADER)?;
    for p in &report.points {
        writeln!(
            w,
            "{},{:.16e},{:.16e},{:.16e},{},{},{}",
            p.index,
            p.psi,
            p.b_ext[0],
            p.b_ext[1],
            opt(p.pole.map(|q| q.x)),
            opt(p.pole.map(|q| q.energy)),
            u8::from(p.slipped),
        )?;
    }
    w.flush()?;
    Ok(())
}
