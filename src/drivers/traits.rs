// Radio driver errors and shared types

use crate::bitwise::BcdError;
use crate::memmap::MemoryMapError;
use crate::serial::SerialError;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadioError {
    #[error("Serial communication error: {0}")]
    Serial(#[from] SerialError),

    #[error("{port}: short read? {got} bytes < {expected} expected")]
    ShortResponse {
        port: String,
        expected: usize,
        got: usize,
    },

    #[error("Radio error: {0}")]
    Radio(String),
}

impl From<BcdError> for RadioError {
    fn from(err: BcdError) -> Self {
        RadioError::Radio(format!("BCD field error: {}", err))
    }
}

impl From<MemoryMapError> for RadioError {
    fn from(err: MemoryMapError) -> Self {
        RadioError::Radio(err.to_string())
    }
}

pub type RadioResult<T> = std::result::Result<T, RadioError>;

/// Status information for progress reporting
#[derive(Debug, Clone)]
pub struct Status {
    pub current: usize,
    pub max: usize,
    pub message: String,
}

impl Status {
    pub fn new(current: usize, max: usize, message: impl Into<String>) -> Self {
        Self {
            current,
            max,
            message: message.into(),
        }
    }

    pub fn percent(&self) -> f32 {
        if self.max == 0 {
            return 100.0;
        }
        (self.current as f32 / self.max as f32) * 100.0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{}  - {:.1}%)",
            self.message,
            self.current,
            self.max,
            self.percent()
        )
    }
}
