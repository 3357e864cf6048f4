use std::result::Result as StdResult;

use thiserror::Error;

/// Errors raised while interpreting tracking data.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = StdResult<T, CoreError>;
