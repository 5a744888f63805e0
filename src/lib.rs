// src/lib.rs

pub mod analysis;
pub mod config;
pub mod effective_field;
pub mod energy;
pub mod error;
pub mod field;
pub mod integrator;
pub mod minimize;
pub mod moment;
pub mod output;
pub mod params;
pub mod simulation;
pub mod tracking;
pub mod vec3;
pub mod visualisation;

pub use error::{Result, SwimmerError};
