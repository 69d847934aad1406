//! Error types for the rod solver

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RodError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Load step {step} is outside the load schedule (length {len})")]
    LoadStepOutOfRange { step: usize, len: usize },

    #[error("Singular stiffness matrix - boundary conditions may not remove all rigid-body modes")]
    SingularSystem,

    #[error(
        "Load step {step} did not converge after {iterations} iterations \
         (residual norm {residual_norm:e}, increment norm {increment_norm:e})"
    )]
    Diverged {
        step: usize,
        iterations: usize,
        residual_norm: f64,
        increment_norm: f64,
    },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type RodResult<T> = Result<T, RodError>;
