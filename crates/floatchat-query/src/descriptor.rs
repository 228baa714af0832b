//! Structured representation of what a user asked for

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Measured quantity a query is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    Temperature,
    Salinity,
    Pressure,
}

impl Parameter {
    pub const ALL: [Parameter; 3] = [
        Parameter::Temperature,
        Parameter::Salinity,
        Parameter::Pressure,
    ];

    /// Column name in the measurement table
    pub fn as_str(&self) -> &'static str {
        match self {
            Parameter::Temperature => "temperature",
            Parameter::Salinity => "salinity",
            Parameter::Pressure => "pressure",
        }
    }

    /// Display unit
    pub fn unit(&self) -> &'static str {
        match self {
            Parameter::Temperature => "°C",
            Parameter::Salinity => "PSU",
            Parameter::Pressure => "dbar",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Parameter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "temperature" => Ok(Parameter::Temperature),
            "salinity" => Ok(Parameter::Salinity),
            "pressure" => Ok(Parameter::Pressure),
            other => Err(format!("unknown parameter: {}", other)),
        }
    }
}

/// Temporal part of a query.
///
/// A query carries either a single anchor date or an explicit range, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemporalFilter {
    /// Rows near this date (the pipeline applies a symmetric window)
    Anchor { date: NaiveDate },
    /// Rows between `start` and `end`, both inclusive
    Range { start: NaiveDate, end: NaiveDate },
}

/// Pressure range in decibars (≈ metres of depth).
///
/// A missing bound is open: the lower one defaults to 0, the upper one to +∞.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl DepthRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn lower(&self) -> f64 {
        self.min.unwrap_or(0.0)
    }

    pub fn upper(&self) -> f64 {
        self.max.unwrap_or(f64::INFINITY)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower() && value <= self.upper()
    }

    /// Both bounds as a pair, with open bounds filled in
    pub fn bounds(&self) -> (f64, f64) {
        (self.lower(), self.upper())
    }
}

/// Partially-populated filtering intent extracted from free text.
///
/// Every field is independently optional; the empty descriptor means "no
/// filtering beyond existence".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub parameter: Option<Parameter>,
    pub location: Option<String>,
    pub temporal: Option<TemporalFilter>,
    pub depth_range: Option<DepthRange>,
}

impl QueryDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameter = Some(parameter);
        self
    }

    /// Location names are stored lower-cased
    pub fn with_location(mut self, location: impl AsRef<str>) -> Self {
        let location = location.as_ref().trim().to_lowercase();
        self.location = if location.is_empty() {
            None
        } else {
            Some(location)
        };
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.temporal = Some(TemporalFilter::Anchor { date });
        self
    }

    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.temporal = Some(TemporalFilter::Range { start, end });
        self
    }

    pub fn with_depth_range(mut self, range: DepthRange) -> Self {
        self.depth_range = Some(range);
        self
    }

    /// Anchor date, if the query names a single date
    pub fn date(&self) -> Option<NaiveDate> {
        match self.temporal {
            Some(TemporalFilter::Anchor { date }) => Some(date),
            _ => None,
        }
    }

    /// Explicit date range, if the query names one
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match self.temporal {
            Some(TemporalFilter::Range { start, end }) => Some((start, end)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parameter.is_none()
            && self.location.is_none()
            && self.temporal.is_none()
            && self.depth_range.is_none()
    }
}

/// Renders the confirmation line shown to users, e.g.
/// "Looking for temperature in arabian sea from 2010-01-01 to 2015-12-31".
impl fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parameter {
            Some(parameter) => write!(f, "Looking for {}", parameter)?,
            None => f.write_str("Looking for all parameters")?,
        }
        if let Some(location) = &self.location {
            write!(f, " in {}", location)?;
        }
        match self.temporal {
            Some(TemporalFilter::Anchor { date }) => write!(f, " around {}", date)?,
            Some(TemporalFilter::Range { start, end }) => write!(f, " from {} to {}", start, end)?,
            None => {}
        }
        if let Some(depth) = &self.depth_range {
            match (depth.min, depth.max) {
                (Some(min), Some(max)) => write!(f, " between {}-{} m", min, max)?,
                (Some(min), None) => write!(f, " below {} m", min)?,
                (None, Some(max)) => write!(f, " above {} m", max)?,
                (None, None) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parameter_parsing() {
        assert_eq!("Temperature".parse::<Parameter>(), Ok(Parameter::Temperature));
        assert_eq!(" salinity ".parse::<Parameter>(), Ok(Parameter::Salinity));
        assert!("oxygen".parse::<Parameter>().is_err());
    }

    #[test]
    fn test_empty_descriptor() {
        let descriptor = QueryDescriptor::new();
        assert!(descriptor.is_empty());
        assert_eq!(descriptor.date(), None);
        assert_eq!(descriptor.date_range(), None);
        assert_eq!(descriptor.to_string(), "Looking for all parameters");
    }

    #[test]
    fn test_location_is_lowercased() {
        let descriptor = QueryDescriptor::new().with_location("  Arabian Sea ");
        assert_eq!(descriptor.location.as_deref(), Some("arabian sea"));

        let blank = QueryDescriptor::new().with_location("   ");
        assert_eq!(blank.location, None);
    }

    #[test]
    fn test_date_and_range_are_exclusive() {
        let descriptor = QueryDescriptor::new()
            .with_date_range(ymd(2010, 1, 1), ymd(2015, 12, 31))
            .with_date(ymd(2012, 6, 1));
        assert_eq!(descriptor.date(), Some(ymd(2012, 6, 1)));
        assert_eq!(descriptor.date_range(), None);
    }

    #[test]
    fn test_depth_range_open_bounds() {
        let open = DepthRange {
            min: None,
            max: None,
        };
        assert_eq!(open.lower(), 0.0);
        assert!(open.upper().is_infinite());
        assert!(open.contains(5000.0));
        assert!(!open.contains(-1.0));

        let closed = DepthRange::new(100.0, 500.0);
        assert!(closed.contains(100.0));
        assert!(closed.contains(500.0));
        assert!(!closed.contains(500.5));
    }

    #[test]
    fn test_confirmation_line() {
        let descriptor = QueryDescriptor::new()
            .with_parameter(Parameter::Temperature)
            .with_location("Arabian Sea")
            .with_date_range(ymd(2010, 1, 1), ymd(2015, 12, 31))
            .with_depth_range(DepthRange::new(100.0, 500.0));
        assert_eq!(
            descriptor.to_string(),
            "Looking for temperature in arabian sea from 2010-01-01 to 2015-12-31 between 100-500 m"
        );
    }

    #[test]
    fn test_serializes_temporal_as_tagged() {
        let descriptor = QueryDescriptor::new().with_date(ymd(2012, 3, 4));
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["temporal"]["kind"], "anchor");
        assert_eq!(json["temporal"]["date"], "2012-03-04");
    }
}
