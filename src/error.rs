//! Error types and Result aliases for horizons-expect

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Result type alias for horizons-expect operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for horizons-expect
#[derive(Debug)]
pub enum Error {
    // === Protocol errors ===
    /// An expected pattern did not appear within its allotted window
    ProtocolTimeout {
        /// Session state or record field that was waiting
        state: String,
        duration: Duration,
    },

    /// A labeled field matched but its value is not a number
    MalformedRecord {
        field: String,
        value: String,
    },

    /// The underlying stream closed or errored
    TransportFailure {
        reason: String,
    },

    /// The request parameters were rejected before the session started
    InvalidRequest {
        reason: String,
    },

    // === Transport setup errors ===
    /// Failed to create PTY
    PtyCreationFailed {
        command: String,
        reason: String,
    },

    /// Failed to spawn command in PTY
    CommandSpawnFailed {
        command: String,
        reason: String,
    },

    /// Failed to clone PTY reader
    PtyReaderCloneFailed {
        reason: String,
    },

    /// Failed to take PTY writer
    PtyWriterTakeFailed {
        reason: String,
    },

    // === Configuration errors ===
    /// Failed to load configuration file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Configuration file not found
    ConfigNotFound,

    /// Configuration validation failed
    ConfigValidationFailed {
        field: String,
        reason: String,
    },

    /// Failed to parse configuration
    ConfigParseFailed {
        format: String,
        reason: String,
    },

    // === I/O and serialization errors ===
    /// I/O errors
    Io(std::io::Error),

    /// Serialization errors
    Serde(serde_json::Error),

    /// Regex compilation errors
    Regex(regex::Error),
}

impl Error {
    /// Build a timeout error for the named state or field
    pub fn timeout(state: impl Into<String>, duration: Duration) -> Self {
        Error::ProtocolTimeout {
            state: state.into(),
            duration,
        }
    }

    /// Build a transport failure from anything printable
    pub fn transport(reason: impl fmt::Display) -> Self {
        Error::TransportFailure {
            reason: reason.to_string(),
        }
    }

    /// Whether this error came from a pattern that never appeared
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::ProtocolTimeout { .. })
    }

    /// The state or field name carried by a timeout
    pub fn timed_out_at(&self) -> Option<&str> {
        match self {
            Error::ProtocolTimeout { state, .. } => Some(state),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Protocol errors
            Error::ProtocolTimeout { state, duration } => {
                write!(f, "Timed out after {:?} waiting in '{}'", duration, state)
            }
            Error::MalformedRecord { field, value } => {
                write!(f, "Malformed value for field '{}': '{}'", field, value)
            }
            Error::TransportFailure { reason } => {
                write!(f, "Transport failure: {}", reason)
            }
            Error::InvalidRequest { reason } => {
                write!(f, "Invalid ephemeris request: {}", reason)
            }

            // Transport setup errors
            Error::PtyCreationFailed { command, reason } => {
                write!(f, "Failed to create PTY for command '{}': {}", command, reason)
            }
            Error::CommandSpawnFailed { command, reason } => {
                write!(f, "Failed to spawn command '{}': {}", command, reason)
            }
            Error::PtyReaderCloneFailed { reason } => {
                write!(f, "Failed to clone PTY reader: {}", reason)
            }
            Error::PtyWriterTakeFailed { reason } => {
                write!(f, "Failed to take PTY writer: {}", reason)
            }

            // Configuration errors
            Error::ConfigLoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path.display(), reason)
            }
            Error::ConfigNotFound => {
                write!(f, "Configuration file not found")
            }
            Error::ConfigValidationFailed { field, reason } => {
                write!(f, "Configuration validation failed for '{}': {}", field, reason)
            }
            Error::ConfigParseFailed { format, reason } => {
                write!(f, "Failed to parse {} config: {}", format, reason)
            }

            // I/O and serialization errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Serde(err) => write!(f, "Serialization error: {}", err),
            Error::Regex(err) => write!(f, "Regex compilation error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Regex(err)
    }
}
