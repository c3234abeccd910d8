//! Osculating orbital element records

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// The twelve labeled element fields of one ephemeris block, in the
/// order the service prints them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementField {
    Eccentricity,
    PeriapsisDistance,
    Inclination,
    AscendingNode,
    ArgumentOfPeriapsis,
    PeriapsisTime,
    MeanMotion,
    MeanAnomaly,
    TrueAnomaly,
    SemiMajorAxis,
    ApoapsisDistance,
    OrbitalPeriod,
}

impl ElementField {
    /// All fields in scan order
    pub const ALL: [ElementField; 12] = [
        ElementField::Eccentricity,
        ElementField::PeriapsisDistance,
        ElementField::Inclination,
        ElementField::AscendingNode,
        ElementField::ArgumentOfPeriapsis,
        ElementField::PeriapsisTime,
        ElementField::MeanMotion,
        ElementField::MeanAnomaly,
        ElementField::TrueAnomaly,
        ElementField::SemiMajorAxis,
        ElementField::ApoapsisDistance,
        ElementField::OrbitalPeriod,
    ];

    /// Label printed in front of the value
    pub fn label(&self) -> &'static str {
        match self {
            ElementField::Eccentricity => "EC",
            ElementField::PeriapsisDistance => "QR",
            ElementField::Inclination => "IN",
            ElementField::AscendingNode => "OM",
            ElementField::ArgumentOfPeriapsis => "W",
            ElementField::PeriapsisTime => "Tp",
            ElementField::MeanMotion => "N",
            ElementField::MeanAnomaly => "MA",
            ElementField::TrueAnomaly => "TA",
            ElementField::SemiMajorAxis => "A",
            ElementField::ApoapsisDistance => "AD",
            ElementField::OrbitalPeriod => "PR",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ElementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One ephemeris sample. Serialized with the service's labels as keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElementRecord {
    #[serde(rename = "JD")]
    pub julian_date: f64,
    /// Calendar date as printed, e.g. `A.D. 2012-Sep-01 00:00:00.0000`
    #[serde(rename = "date")]
    pub calendar_date: String,
    /// Time scale flag from the header line, e.g. `CT`
    #[serde(rename = "scale")]
    pub time_scale: String,
    #[serde(rename = "EC")]
    pub eccentricity: f64,
    #[serde(rename = "QR")]
    pub periapsis_distance: f64,
    #[serde(rename = "IN")]
    pub inclination: f64,
    #[serde(rename = "OM")]
    pub ascending_node: f64,
    #[serde(rename = "W")]
    pub argument_of_periapsis: f64,
    #[serde(rename = "Tp")]
    pub periapsis_time: f64,
    #[serde(rename = "N")]
    pub mean_motion: f64,
    #[serde(rename = "MA")]
    pub mean_anomaly: f64,
    #[serde(rename = "TA")]
    pub true_anomaly: f64,
    #[serde(rename = "A")]
    pub semi_major_axis: f64,
    #[serde(rename = "AD")]
    pub apoapsis_distance: f64,
    #[serde(rename = "PR")]
    pub orbital_period: f64,
}

impl OrbitalElementRecord {
    /// Value of one element field
    pub fn get(&self, field: ElementField) -> f64 {
        match field {
            ElementField::Eccentricity => self.eccentricity,
            ElementField::PeriapsisDistance => self.periapsis_distance,
            ElementField::Inclination => self.inclination,
            ElementField::AscendingNode => self.ascending_node,
            ElementField::ArgumentOfPeriapsis => self.argument_of_periapsis,
            ElementField::PeriapsisTime => self.periapsis_time,
            ElementField::MeanMotion => self.mean_motion,
            ElementField::MeanAnomaly => self.mean_anomaly,
            ElementField::TrueAnomaly => self.true_anomaly,
            ElementField::SemiMajorAxis => self.semi_major_axis,
            ElementField::ApoapsisDistance => self.apoapsis_distance,
            ElementField::OrbitalPeriod => self.orbital_period,
        }
    }
}

/// Collects the fields of one block. A record only comes out of
/// [`RecordBuilder::build`] once every field is present.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    julian_date: f64,
    calendar_date: String,
    time_scale: String,
    values: [Option<f64>; 12],
}

impl RecordBuilder {
    pub fn new(
        julian_date: f64,
        calendar_date: impl Into<String>,
        time_scale: impl Into<String>,
    ) -> Self {
        Self {
            julian_date,
            calendar_date: calendar_date.into(),
            time_scale: time_scale.into(),
            values: [None; 12],
        }
    }

    pub fn set(&mut self, field: ElementField, value: f64) -> &mut Self {
        self.values[field.index()] = Some(value);
        self
    }

    /// Fields still missing, in scan order
    pub fn missing(&self) -> Vec<ElementField> {
        ElementField::ALL
            .iter()
            .copied()
            .filter(|f| self.values[f.index()].is_none())
            .collect()
    }

    /// Finish the record, or `None` while any field is missing
    pub fn build(&self) -> Option<OrbitalElementRecord> {
        let v = |field: ElementField| self.values[field.index()];

        Some(OrbitalElementRecord {
            julian_date: self.julian_date,
            calendar_date: self.calendar_date.clone(),
            time_scale: self.time_scale.clone(),
            eccentricity: v(ElementField::Eccentricity)?,
            periapsis_distance: v(ElementField::PeriapsisDistance)?,
            inclination: v(ElementField::Inclination)?,
            ascending_node: v(ElementField::AscendingNode)?,
            argument_of_periapsis: v(ElementField::ArgumentOfPeriapsis)?,
            periapsis_time: v(ElementField::PeriapsisTime)?,
            mean_motion: v(ElementField::MeanMotion)?,
            mean_anomaly: v(ElementField::MeanAnomaly)?,
            true_anomaly: v(ElementField::TrueAnomaly)?,
            semi_major_axis: v(ElementField::SemiMajorAxis)?,
            apoapsis_distance: v(ElementField::ApoapsisDistance)?,
            orbital_period: v(ElementField::OrbitalPeriod)?,
        })
    }
}

/// Parse the text captured for a labeled value.
///
/// Never defaults: an empty or non-numeric capture is a
/// [`Error::MalformedRecord`].
pub fn parse_value(label: &str, raw: &str) -> Result<f64> {
    let text = raw.trim();
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::MalformedRecord {
            field: label.to_string(),
            value: text.to_string(),
        })
}
