// Simulation errors: bad parameters and unknown map variants

use thiserror::Error;

/// Errors raised before a run starts. Nothing is mutated when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Unknown map variant '{0}'")]
    UnknownVariant(String),
}

pub type SimResult<T> = Result<T, SimError>;
