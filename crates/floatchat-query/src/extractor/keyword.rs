//! Deterministic keyword/regex extraction
//!
//! Runs without any network access. Keyword lists are scanned in order and the
//! first hit wins, so more specific names sit before the names they contain.

use async_trait::async_trait;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use super::{ExtractionStrategy, StrategyKind};
use crate::{
    descriptor::{DepthRange, Parameter, QueryDescriptor},
    Result,
};

lazy_static! {
    static ref YEAR_REGEX: Regex = Regex::new(r"\b(?:19|20)\d{2}\b").unwrap();
    static ref DEPTH_REGEX: Regex =
        Regex::new(r"(\d+(?:\.\d+)?)\s*-\s*(\d+(?:\.\d+)?)\s*m").unwrap();
}

/// Parameter keywords, scanned in order
const PARAMETER_KEYWORDS: &[(Parameter, &[&str])] = &[
    (Parameter::Temperature, &["temperature", "temp", "thermal", "heat"]),
    (Parameter::Salinity, &["salinity", "salt", "saline"]),
    (Parameter::Pressure, &["pressure", "depth", "deep"]),
];

/// Region keywords, scanned in order; the first element is the canonical name
const LOCATION_KEYWORDS: &[(&str, &[&str])] = &[
    ("arabian sea", &["arabian sea", "arabia"]),
    ("bay of bengal", &["bay of bengal", "bengal"]),
    ("equatorial indian ocean", &["equatorial indian ocean", "equatorial indian"]),
    ("southern ocean", &["southern ocean", "antarctic"]),
    ("indian ocean", &["indian ocean", "indian"]),
    ("madagascar", &["madagascar"]),
    ("maldives", &["maldives"]),
    ("sri lanka", &["sri lanka", "ceylon"]),
];

/// Fallback extraction strategy
#[derive(Debug, Clone, Default)]
pub struct KeywordStrategy;

impl KeywordStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Total, synchronous extraction
    pub fn extract_sync(&self, text: &str) -> QueryDescriptor {
        let lowered = text.to_lowercase();

        let mut descriptor = QueryDescriptor::new();
        if let Some(parameter) = match_parameter(&lowered) {
            descriptor = descriptor.with_parameter(parameter);
        }
        if let Some(location) = match_location(&lowered) {
            descriptor = descriptor.with_location(location);
        }

        let years = find_years(text);
        descriptor = match years.as_slice() {
            [] => descriptor,
            [year] => match NaiveDate::from_ymd_opt(*year, 1, 1) {
                Some(date) => descriptor.with_date(date),
                None => descriptor,
            },
            [first, second, ..] => {
                match (
                    NaiveDate::from_ymd_opt(*first, 1, 1),
                    NaiveDate::from_ymd_opt(*second, 12, 31),
                ) {
                    (Some(start), Some(end)) => descriptor.with_date_range(start, end),
                    _ => descriptor,
                }
            }
        };

        if let Some(range) = match_depth(&lowered) {
            descriptor = descriptor.with_depth_range(range);
        }

        descriptor
    }
}

#[async_trait]
impl ExtractionStrategy for KeywordStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Keyword
    }

    async fn extract(&self, text: &str) -> Result<QueryDescriptor> {
        Ok(self.extract_sync(text))
    }
}

fn match_parameter(lowered: &str) -> Option<Parameter> {
    PARAMETER_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(parameter, _)| *parameter)
}

fn match_location(lowered: &str) -> Option<&'static str> {
    LOCATION_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(name, _)| *name)
}

/// Four-digit years 1900-2099 in order of appearance
fn find_years(text: &str) -> Vec<i32> {
    YEAR_REGEX
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

fn match_depth(lowered: &str) -> Option<DepthRange> {
    let captures = DEPTH_REGEX.captures(lowered)?;
    let min = captures.get(1)?.as_str().parse().ok()?;
    let max = captures.get(2)?.as_str().parse().ok()?;
    Some(DepthRange::new(min, max))
}
