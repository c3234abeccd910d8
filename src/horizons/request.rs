//! Ephemeris request parameters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Reference plane for the osculating elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReferencePlane {
    /// Ecliptic and mean equinox of the reference epoch
    #[default]
    #[serde(rename = "eclip")]
    Ecliptic,
    /// Earth mean equator and equinox of the reference epoch
    #[serde(rename = "frame")]
    Frame,
    /// Body mean equator and node of date
    #[serde(rename = "body")]
    BodyEquator,
}

impl ReferencePlane {
    /// The answer the service expects at the reference plane prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferencePlane::Ecliptic => "eclip",
            ReferencePlane::Frame => "frame",
            ReferencePlane::BodyEquator => "body",
        }
    }
}

impl fmt::Display for ReferencePlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferencePlane {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eclip" | "ecliptic" => Ok(ReferencePlane::Ecliptic),
            "frame" => Ok(ReferencePlane::Frame),
            "body" => Ok(ReferencePlane::BodyEquator),
            other => Err(RequestError::UnknownReferencePlane(other.to_string())),
        }
    }
}

/// Request validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    #[error("Target designation cannot be empty")]
    EmptyDesignation,

    #[error("Parameter '{0}' cannot be empty")]
    EmptyParameter(&'static str),

    #[error("Parameter '{0}' contains a line break")]
    LineBreak(&'static str),

    #[error("Unknown reference plane: {0} (expected eclip, frame or body)")]
    UnknownReferencePlane(String),
}

impl From<RequestError> for Error {
    fn from(err: RequestError) -> Self {
        Error::InvalidRequest {
            reason: err.to_string(),
        }
    }
}

/// Parameters of one ephemeris request. Never mutated once a session
/// has started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemerisRequest {
    /// Target body, sent verbatim (e.g. `DES=C/2012 S1;`)
    pub designation: String,
    /// Coordinate system center body
    pub center: String,
    pub reference_plane: ReferencePlane,
    /// Start time, in a format the service accepts
    pub start: String,
    /// End time
    pub end: String,
    /// Sampling interval (e.g. `1d`, `6h`)
    pub interval: String,
}

impl EphemerisRequest {
    pub fn with_center(mut self, center: impl Into<String>) -> Self {
        self.center = center.into();
        self
    }

    pub fn with_reference_plane(mut self, plane: ReferencePlane) -> Self {
        self.reference_plane = plane;
        self
    }

    pub fn with_span(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start = start.into();
        self.end = end.into();
        self
    }

    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = interval.into();
        self
    }

    /// Reject values that would desynchronise the dialogue
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.designation.trim().is_empty() {
            return Err(RequestError::EmptyDesignation);
        }

        let params = [
            ("designation", &self.designation),
            ("center", &self.center),
            ("start", &self.start),
            ("end", &self.end),
            ("interval", &self.interval),
        ];
        for (name, value) in params {
            if value.trim().is_empty() {
                return Err(RequestError::EmptyParameter(name));
            }
            // every value is sent as exactly one line
            if value.contains(['\n', '\r']) {
                return Err(RequestError::LineBreak(name));
            }
        }

        Ok(())
    }
}
