//! Error types and handling for `tempcast`

use thiserror::Error;

/// Main error type for the temperature prediction pipeline
#[derive(Error, Debug)]
pub enum TempcastError {
    /// Geocoding returned no match for the queried name
    #[error("could not geocode '{name}'. Try a different spelling.")]
    NotFound { name: String },

    /// Network failure, timeout or non-success status from an external service
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The archive answered successfully but carried no usable days
    #[error("No historical data available.")]
    NoHistory,

    /// The trend predictor was handed an empty series
    #[error("Cannot fit a trend over an empty history")]
    EmptyHistory,

    /// Too few distinct days to determine every polynomial coefficient
    #[error("Need at least {required} distinct days of history to fit the trend, got {distinct}")]
    InsufficientHistory { required: usize, distinct: usize },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TempcastError {
    /// Create a new not-found error for a geocoding query
    pub fn not_found<S: Into<String>>(name: S) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TempcastError::NotFound { .. } | TempcastError::NoHistory => self.to_string(),
            TempcastError::Transport { message } => {
                format!("Unable to reach the weather service: {message}")
            }
            TempcastError::EmptyHistory | TempcastError::InsufficientHistory { .. } => {
                format!("Not enough history to predict: {self}")
            }
            TempcastError::Validation { message } => format!("Invalid input: {message}"),
            TempcastError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            TempcastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for TempcastError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::transport(format!("request timed out: {err}"))
        } else if let Some(status) = err.status() {
            Self::transport(format!("service responded with status {status}"))
        } else {
            Self::transport(err.to_string())
        }
    }
}
