//! Configuration management for horizons-expect
//!
//! Timeouts for each stage of the scripted dialogue, the client used to
//! reach the service, and the default values for request parameters the
//! caller leaves out.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::horizons::request::{EphemerisRequest, ReferencePlane};

pub use loader::{ConfigFormat, ConfigLoader, LoadOptions};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Expect timeouts and buffering
    pub session: SessionConfig,

    /// How the remote service is reached
    pub transport: TransportConfig,

    /// Defaults for request parameters
    pub request: RequestDefaults,
}

impl Config {
    /// Check values that would make every session fail
    pub fn validate(&self) -> Result<()> {
        self.session.validate()?;
        self.transport.validate()
    }
}

/// Expect timeouts, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// First `Horizons>` prompt, includes connection setup
    pub banner_timeout_ms: u64,

    /// Disambiguation prompt or resolved-body menu after a lookup
    pub lookup_timeout_ms: u64,

    /// Any steady-state prompt of the dialogue
    pub prompt_timeout_ms: u64,

    /// `$$SOE` marker, the service computes the ephemeris meanwhile
    pub data_start_timeout_ms: u64,

    /// Each record header / element field inside the data region
    pub field_timeout_ms: u64,

    /// Menu shown after `$$EOE`
    pub menu_return_timeout_ms: u64,

    /// Upper bound on unconsumed output kept in memory
    pub max_buffer_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            banner_timeout_ms: 30_000,
            lookup_timeout_ms: 15_000,
            prompt_timeout_ms: 5_000,
            data_start_timeout_ms: 60_000,
            field_timeout_ms: 5_000,
            menu_return_timeout_ms: 5_000,
            max_buffer_bytes: crate::expect::DEFAULT_MAX_BUFFER_BYTES,
        }
    }
}

impl SessionConfig {
    /// Same timeout for every stage; handy for tests against canned output
    pub fn uniform(timeout_ms: u64) -> Self {
        Self {
            banner_timeout_ms: timeout_ms,
            lookup_timeout_ms: timeout_ms,
            prompt_timeout_ms: timeout_ms,
            data_start_timeout_ms: timeout_ms,
            field_timeout_ms: timeout_ms,
            menu_return_timeout_ms: timeout_ms,
            ..Self::default()
        }
    }

    pub fn banner_timeout(&self) -> Duration {
        Duration::from_millis(self.banner_timeout_ms)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_millis(self.prompt_timeout_ms)
    }

    pub fn data_start_timeout(&self) -> Duration {
        Duration::from_millis(self.data_start_timeout_ms)
    }

    pub fn field_timeout(&self) -> Duration {
        Duration::from_millis(self.field_timeout_ms)
    }

    pub fn menu_return_timeout(&self) -> Duration {
        Duration::from_millis(self.menu_return_timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        let timeouts = [
            ("session.banner_timeout_ms", self.banner_timeout_ms),
            ("session.lookup_timeout_ms", self.lookup_timeout_ms),
            ("session.prompt_timeout_ms", self.prompt_timeout_ms),
            ("session.data_start_timeout_ms", self.data_start_timeout_ms),
            ("session.field_timeout_ms", self.field_timeout_ms),
            ("session.menu_return_timeout_ms", self.menu_return_timeout_ms),
        ];
        for (field, value) in timeouts {
            if value == 0 {
                return Err(Error::ConfigValidationFailed {
                    field: field.to_string(),
                    reason: "timeout must be greater than zero".to_string(),
                });
            }
        }

        if self.max_buffer_bytes < 1024 {
            return Err(Error::ConfigValidationFailed {
                field: "session.max_buffer_bytes".to_string(),
                reason: format!("{} is below the 1024 byte minimum", self.max_buffer_bytes),
            });
        }

        Ok(())
    }
}

/// Client used to reach the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Executable spawned in the PTY
    pub command: String,

    /// Arguments passed to the command
    pub args: Vec<String>,

    /// PTY rows
    pub rows: u16,

    /// PTY columns
    pub cols: u16,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            command: "telnet".to_string(),
            args: vec!["ssd.jpl.nasa.gov".to_string(), "6775".to_string()],
            rows: 24,
            cols: 132,
        }
    }
}

impl TransportConfig {
    fn validate(&self) -> Result<()> {
        if self.command.trim().is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "transport.command".to_string(),
                reason: "command cannot be empty".to_string(),
            });
        }
        if self.cols < 80 {
            return Err(Error::ConfigValidationFailed {
                field: "transport.cols".to_string(),
                reason: "element lines need at least 80 columns".to_string(),
            });
        }
        Ok(())
    }
}

/// Defaults for the request parameters that may be omitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestDefaults {
    pub center: String,
    pub reference_plane: ReferencePlane,
    pub start: String,
    pub end: String,
    pub interval: String,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            center: "Sun".to_string(),
            reference_plane: ReferencePlane::Ecliptic,
            start: "01-Sep-2012".to_string(),
            end: "31-Dec-2012".to_string(),
            interval: "1d".to_string(),
        }
    }
}

impl RequestDefaults {
    /// Build a request for `designation` filled with these defaults
    pub fn request_for(&self, designation: impl Into<String>) -> EphemerisRequest {
        EphemerisRequest {
            designation: designation.into(),
            center: self.center.clone(),
            reference_plane: self.reference_plane,
            start: self.start.clone(),
            end: self.end.clone(),
            interval: self.interval.clone(),
        }
    }
}
