//! Dataset-level and per-parameter statistics

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::dataset::{Column, MeasurementTable, TableView};
use crate::descriptor::Parameter;

/// Earliest and latest measurement timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Latitude/longitude extent of the measurements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicExtent {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

/// Summary of the whole dataset, independent of any query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub float_count: usize,
    pub date_range: Option<DateSpan>,
    pub parameter_counts: BTreeMap<Parameter, usize>,
    pub geographic_bounds: Option<GeographicExtent>,
}

impl DatasetSummary {
    pub fn compute(table: &MeasurementTable) -> Self {
        let float_count = table
            .float_ids()
            .map(|ids| ids.iter().flatten().collect::<HashSet<_>>().len())
            .unwrap_or(0);

        let date_range = table.dates().and_then(|dates| {
            let mut present = dates.iter().flatten();
            let first = *present.next()?;
            let (start, end) = present.fold((first, first), |(lo, hi), d| (lo.min(*d), hi.max(*d)));
            Some(DateSpan { start, end })
        });

        let parameter_counts = Parameter::ALL
            .into_iter()
            .filter_map(|p| {
                let cells = table.numeric(Column::from(p))?;
                Some((p, cells.iter().flatten().count()))
            })
            .collect();

        let geographic_bounds = match (
            min_max(table.numeric(Column::Latitude)),
            min_max(table.numeric(Column::Longitude)),
        ) {
            (Some((lat_min, lat_max)), Some((lon_min, lon_max))) => Some(GeographicExtent {
                lat_min,
                lat_max,
                lon_min,
                lon_max,
            }),
            _ => None,
        };

        Self {
            total_records: table.len(),
            float_count,
            date_range,
            parameter_counts,
            geographic_bounds,
        }
    }
}

fn min_max(cells: Option<&[Option<f64>]>) -> Option<(f64, f64)> {
    let mut values = cells?.iter().flatten();
    let first = *values.next()?;
    Some(values.fold((first, first), |(lo, hi), v| (lo.min(*v), hi.max(*v))))
}

/// Descriptive statistics for one parameter over a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterStats {
    pub parameter: Parameter,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; needs at least two values
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub unit: String,
}

impl ParameterStats {
    /// `None` when the column is absent or every cell is missing
    pub fn compute(view: &TableView, parameter: Parameter) -> Option<Self> {
        let mut values = view.values(Column::from(parameter))?;
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_cmp(b));

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std_dev = (count >= 2).then(|| {
            let variance =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            variance.sqrt()
        });
        let median = if count % 2 == 1 {
            values[count / 2]
        } else {
            (values[count / 2 - 1] + values[count / 2]) / 2.0
        };

        Some(Self {
            parameter,
            count,
            mean,
            std_dev,
            min: values[0],
            max: values[count - 1],
            median,
            unit: parameter.unit().to_string(),
        })
    }
}
