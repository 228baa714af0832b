//! In-memory columnar measurement table
//!
//! The table is loaded once and shared read-only (`Arc`) between requests.
//! Filtering never copies column data: a [`TableView`] is the shared table plus
//! an ordered list of row indices.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{descriptor::Parameter, error::QueryError, Result};

/// Columns the core knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Latitude,
    Longitude,
    Date,
    Pressure,
    Temperature,
    Salinity,
    FloatId,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Latitude,
        Column::Longitude,
        Column::Date,
        Column::Pressure,
        Column::Temperature,
        Column::Salinity,
        Column::FloatId,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Latitude => "latitude",
            Column::Longitude => "longitude",
            Column::Date => "date",
            Column::Pressure => "pressure",
            Column::Temperature => "temperature",
            Column::Salinity => "salinity",
            Column::FloatId => "float_id",
        }
    }

    /// Case-insensitive header match
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim().to_lowercase();
        Column::ALL.into_iter().find(|c| c.name() == header)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Parameter> for Column {
    fn from(parameter: Parameter) -> Self {
        match parameter {
            Parameter::Temperature => Column::Temperature,
            Parameter::Salinity => Column::Salinity,
            Parameter::Pressure => Column::Pressure,
        }
    }
}

/// One row, materialised for output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub float_id: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub salinity: Option<f64>,
}

type NumericColumn = Option<Vec<Option<f64>>>;

/// Columnar measurement storage.
///
/// A column is `None` when the source had no such column (schema), and a cell
/// is `None` when that row's value is missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementTable {
    len: usize,
    latitude: NumericColumn,
    longitude: NumericColumn,
    pressure: NumericColumn,
    temperature: NumericColumn,
    salinity: NumericColumn,
    date: Option<Vec<Option<NaiveDateTime>>>,
    float_id: Option<Vec<Option<String>>>,
}

impl MeasurementTable {
    /// No rows, no columns
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every column present
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = MeasurementRecord>,
    {
        let mut table = Self {
            len: 0,
            latitude: Some(Vec::new()),
            longitude: Some(Vec::new()),
            pressure: Some(Vec::new()),
            temperature: Some(Vec::new()),
            salinity: Some(Vec::new()),
            date: Some(Vec::new()),
            float_id: Some(Vec::new()),
        };

        for record in records {
            push(&mut table.latitude, record.latitude);
            push(&mut table.longitude, record.longitude);
            push(&mut table.pressure, record.pressure);
            push(&mut table.temperature, record.temperature);
            push(&mut table.salinity, record.salinity);
            push(&mut table.date, record.date);
            push(&mut table.float_id, record.float_id);
            table.len += 1;
        }

        table
    }

    /// Drop `column` from the schema
    pub fn without_column(mut self, column: Column) -> Self {
        match column {
            Column::Latitude => self.latitude = None,
            Column::Longitude => self.longitude = None,
            Column::Date => self.date = None,
            Column::Pressure => self.pressure = None,
            Column::Temperature => self.temperature = None,
            Column::Salinity => self.salinity = None,
            Column::FloatId => self.float_id = None,
        }
        self
    }

    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            QueryError::DatasetError(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let table = Self::from_csv_reader(file)?;
        info!("Loaded dataset with {} records from {}", table.len(), path.display());
        Ok(table)
    }

    /// Header-driven CSV parsing; unknown columns are ignored
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let positions: HashMap<Column, usize> = headers
            .iter()
            .enumerate()
            .filter_map(|(i, h)| Column::from_header(h).map(|c| (c, i)))
            .collect();

        if positions.is_empty() {
            return Err(QueryError::DatasetError(
                "CSV header has no recognised measurement columns".to_string(),
            ));
        }

        let has = |c: Column| positions.contains_key(&c);
        let mut table = Self {
            len: 0,
            latitude: has(Column::Latitude).then(Vec::new),
            longitude: has(Column::Longitude).then(Vec::new),
            pressure: has(Column::Pressure).then(Vec::new),
            temperature: has(Column::Temperature).then(Vec::new),
            salinity: has(Column::Salinity).then(Vec::new),
            date: has(Column::Date).then(Vec::new),
            float_id: has(Column::FloatId).then(Vec::new),
        };

        let mut bad_cells = 0usize;
        for row in csv_reader.records() {
            let row = row?;
            let cell = |c: Column| positions.get(&c).and_then(|&i| row.get(i)).unwrap_or("");

            for (column, slot) in [
                (Column::Latitude, &mut table.latitude),
                (Column::Longitude, &mut table.longitude),
                (Column::Pressure, &mut table.pressure),
                (Column::Temperature, &mut table.temperature),
                (Column::Salinity, &mut table.salinity),
            ] {
                if let Some(values) = slot {
                    let raw = cell(column);
                    let value = parse_number(raw);
                    if value.is_none() && !is_missing(raw) {
                        bad_cells += 1;
                    }
                    values.push(value);
                }
            }

            if let Some(values) = &mut table.date {
                let raw = cell(Column::Date);
                let value = parse_timestamp(raw);
                if value.is_none() && !is_missing(raw) {
                    bad_cells += 1;
                }
                values.push(value);
            }

            if let Some(values) = &mut table.float_id {
                let raw = cell(Column::FloatId);
                values.push((!is_missing(raw)).then(|| raw.to_string()));
            }

            table.len += 1;
        }

        if bad_cells > 0 {
            warn!("{} unparseable cells were treated as missing", bad_cells);
        }

        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn has_column(&self, column: Column) -> bool {
        match column {
            Column::Latitude => self.latitude.is_some(),
            Column::Longitude => self.longitude.is_some(),
            Column::Date => self.date.is_some(),
            Column::Pressure => self.pressure.is_some(),
            Column::Temperature => self.temperature.is_some(),
            Column::Salinity => self.salinity.is_some(),
            Column::FloatId => self.float_id.is_some(),
        }
    }

    /// Present columns, in [`Column::ALL`] order
    pub fn columns(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| self.has_column(*c))
            .collect()
    }

    /// Cells of a numeric column; `None` for absent or non-numeric columns
    pub fn numeric(&self, column: Column) -> Option<&[Option<f64>]> {
        match column {
            Column::Latitude => self.latitude.as_deref(),
            Column::Longitude => self.longitude.as_deref(),
            Column::Pressure => self.pressure.as_deref(),
            Column::Temperature => self.temperature.as_deref(),
            Column::Salinity => self.salinity.as_deref(),
            Column::Date | Column::FloatId => None,
        }
    }

    pub fn dates(&self) -> Option<&[Option<NaiveDateTime>]> {
        self.date.as_deref()
    }

    pub fn float_ids(&self) -> Option<&[Option<String>]> {
        self.float_id.as_deref()
    }

    /// Whether `column` has a value at `row`
    pub fn is_present(&self, column: Column, row: usize) -> bool {
        match column {
            Column::Date => matches!(self.date.as_ref().and_then(|v| v.get(row)), Some(Some(_))),
            Column::FloatId => {
                matches!(self.float_id.as_ref().and_then(|v| v.get(row)), Some(Some(_)))
            }
            numeric => matches!(self.numeric(numeric).and_then(|v| v.get(row)), Some(Some(_))),
        }
    }

    pub fn record(&self, row: usize) -> MeasurementRecord {
        let num = |c: Column| self.numeric(c).and_then(|v| v.get(row).copied().flatten());
        MeasurementRecord {
            float_id: self
                .float_id
                .as_ref()
                .and_then(|v| v.get(row).cloned().flatten()),
            date: self.date.as_ref().and_then(|v| v.get(row).copied().flatten()),
            latitude: num(Column::Latitude),
            longitude: num(Column::Longitude),
            pressure: num(Column::Pressure),
            temperature: num(Column::Temperature),
            salinity: num(Column::Salinity),
        }
    }
}

fn push<T>(column: &mut Option<Vec<T>>, value: T) {
    if let Some(values) = column {
        values.push(value);
    }
}

fn is_missing(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "" | "nan" | "nat" | "null" | "none" | "na"
    )
}

fn parse_number(raw: &str) -> Option<f64> {
    if is_missing(raw) {
        return None;
    }
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Accepts plain dates, `T`- or space-separated timestamps and RFC 3339
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if is_missing(raw) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Shared handle to the process-wide dataset, possibly not loaded
#[derive(Debug, Clone, Default)]
pub struct DatasetHandle {
    table: Option<Arc<MeasurementTable>>,
}

impl DatasetHandle {
    pub fn loaded(table: MeasurementTable) -> Self {
        Self {
            table: Some(Arc::new(table)),
        }
    }

    pub fn from_shared(table: Arc<MeasurementTable>) -> Self {
        Self { table: Some(table) }
    }

    pub fn unloaded() -> Self {
        Self { table: None }
    }

    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::loaded(MeasurementTable::load_csv(path)?))
    }

    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }

    pub fn table(&self) -> Option<&Arc<MeasurementTable>> {
        self.table.as_ref()
    }
}

/// Ordered selection of rows from a shared table
#[derive(Debug, Clone)]
pub struct TableView {
    table: Arc<MeasurementTable>,
    rows: Vec<usize>,
}

impl TableView {
    /// Every row, in table order
    pub fn full(table: Arc<MeasurementTable>) -> Self {
        let rows = (0..table.len()).collect();
        Self { table, rows }
    }

    pub fn empty() -> Self {
        Self {
            table: Arc::new(MeasurementTable::empty()),
            rows: Vec::new(),
        }
    }

    pub fn table(&self) -> &MeasurementTable {
        &self.table
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep rows for which `keep` holds, preserving order
    pub fn retain<F>(mut self, mut keep: F) -> Self
    where
        F: FnMut(&MeasurementTable, usize) -> bool,
    {
        let table = Arc::clone(&self.table);
        self.rows.retain(|&row| keep(&table, row));
        self
    }

    /// Same table, different rows
    pub fn with_rows(&self, rows: Vec<usize>) -> Self {
        Self {
            table: Arc::clone(&self.table),
            rows,
        }
    }

    pub fn records(&self) -> impl Iterator<Item = MeasurementRecord> + '_ {
        self.rows.iter().map(move |&row| self.table.record(row))
    }

    /// Non-missing values of a numeric column over the selected rows
    pub fn values(&self, column: Column) -> Option<Vec<f64>> {
        let cells = self.table.numeric(column)?;
        Some(
            self.rows
                .iter()
                .filter_map(|&row| cells.get(row).copied().flatten())
                .collect(),
        )
    }
}

/// Views are equal when they select the same rows of the same table
impl PartialEq for TableView {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.table, &other.table) || *self.table == *other.table)
            && self.rows == other.rows
    }
}
