use std::fmt;
use std::panic::Location;

use thiserror::Error;

/// Detailed validation failure: which operation rejected the input,
/// where in the source it was raised, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    origin: &'static str,
    file: &'static str,
    line: u32,
    message: String,
}

impl ValidationError {
    /// Create a validation error located at the caller.
    #[track_caller]
    pub fn new(origin: &'static str, message: impl Into<String>) -> Self {
        let location = Location::caller();
        Self {
            origin,
            file: location.file(),
            line: location.line(),
            message: message.into(),
        }
    }

    pub fn origin(&self) -> &'static str {
        self.origin
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error in '{}' ({}:{}): {}",
            self.origin, self.file, self.line, self.message
        )
    }
}

impl std::error::Error for ValidationError {}

/// Dead reckoning error types
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// The validation failure behind this error, if that is what it is.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
