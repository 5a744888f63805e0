// src/error.rs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwimmerError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A zero (or non-finite) vector was asked for its direction.
    #[error("cannot take the direction of a degenerate vector {0:?}")]
    DegenerateField([f64; 3]),

    #[error("minimum search did not converge after {iterations} iterations (last x = {last_x})")]
    NonConvergence { last_x: f64, iterations: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("plot error: {0}")]
    Plot(String),
}

impl SwimmerError {
    pub(crate) fn plot<E: std::fmt::Display>(e: E) -> Self {
        Self::Plot(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SwimmerError>;
