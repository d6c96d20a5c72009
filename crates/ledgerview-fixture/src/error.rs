//! Error types for ledgerview-fixture

use ledgerview_core::CoreError;
use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Invalid fixture JSON at {location}: {message}")]
    SyntaxError {
        location: String,
        message: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("IO error")]
    IoError(#[from] io::Error),
}

impl From<FixtureError> for CoreError {
    fn from(error: FixtureError) -> Self {
        CoreError::Fixture { message: error.to_string() }
    }
}
