//! Descriptor-driven filtering of the measurement table
//!
//! Stages run in a fixed order (parameter, location, date, depth) and each one
//! only narrows the row selection. A stage whose column is missing from the
//! schema, or whose filter value is unusable, passes its input through.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration as ChronoDuration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::dataset::{Column, DatasetHandle, TableView};
use crate::descriptor::{QueryDescriptor, TemporalFilter};
use crate::geo::GeoResolver;

/// Default maximum number of rows returned
pub const DEFAULT_RESULT_CAP: usize = 10_000;

/// Default half-width of the window around an anchor date
pub const DEFAULT_ANCHOR_WINDOW_DAYS: i64 = 30;

/// One narrowing step
#[async_trait]
pub trait FilterStage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn apply(&self, view: TableView, descriptor: &QueryDescriptor) -> TableView;
}

/// Keeps rows where the requested parameter has a value
#[derive(Debug, Default)]
pub struct ParameterStage;

#[async_trait]
impl FilterStage for ParameterStage {
    fn name(&self) -> &'static str {
        "parameter"
    }

    async fn apply(&self, view: TableView, descriptor: &QueryDescriptor) -> TableView {
        let Some(parameter) = descriptor.parameter else {
            return view;
        };
        let column = Column::from(parameter);
        if !view.table().has_column(column) {
            warn!("Column '{}' not in dataset, skipping parameter filter", column);
            return view;
        }
        view.retain(|table, row| table.is_present(column, row))
    }
}

/// Keeps rows inside the resolved bounds of the requested location
pub struct LocationStage {
    resolver: Arc<GeoResolver>,
}

impl LocationStage {
    pub fn new(resolver: Arc<GeoResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl FilterStage for LocationStage {
    fn name(&self) -> &'static str {
        "location"
    }

    async fn apply(&self, view: TableView, descriptor: &QueryDescriptor) -> TableView {
        let Some(location) = descriptor.location.as_deref() else {
            return view;
        };
        let Some(bounds) = self.resolver.resolve(location).await else {
            warn!("Could not resolve location '{}', skipping location filter", location);
            return view;
        };

        if !view.table().has_column(Column::Latitude) || !view.table().has_column(Column::Longitude) {
            warn!("Dataset has no latitude/longitude columns, skipping location filter");
            return view;
        }

        debug!("Applying location bounds {:?} for '{}'", bounds, location);
        view.retain(|table, row| {
            let cell = |column| table.numeric(column).and_then(|cells| cells[row]);
            match (cell(Column::Latitude), cell(Column::Longitude)) {
                (Some(lat), Some(lon)) => bounds.contains(lat, lon),
                _ => false,
            }
        })
    }
}

/// Keeps rows within the anchor window or the explicit range
#[derive(Debug)]
pub struct DateStage {
    window_days: i64,
}

impl DateStage {
    pub fn new(window_days: i64) -> Self {
        Self { window_days }
    }
}

impl Default for DateStage {
    fn default() -> Self {
        Self::new(DEFAULT_ANCHOR_WINDOW_DAYS)
    }
}

#[async_trait]
impl FilterStage for DateStage {
    fn name(&self) -> &'static str {
        "date"
    }

    async fn apply(&self, view: TableView, descriptor: &QueryDescriptor) -> TableView {
        let Some(temporal) = descriptor.temporal else {
            return view;
        };
        if !view.table().has_column(Column::Date) {
            warn!("Dataset has no date column, skipping date filter");
            return view;
        }

        let (start, end) = match temporal {
            TemporalFilter::Anchor { date } => {
                let window = ChronoDuration::try_days(self.window_days);
                match window.map(|w| (date.checked_sub_signed(w), date.checked_add_signed(w))) {
                    Some((Some(start), Some(end))) => (start, end),
                    _ => {
                        warn!("Date window around {} is out of range, skipping date filter", date);
                        return view;
                    }
                }
            }
            TemporalFilter::Range { start, end } => (start, end),
        };
        if start > end {
            debug!("Date range {} to {} is empty", start, end);
        }

        view.retain(|table, row| {
            table
                .dates()
                .and_then(|dates| dates[row])
                .map(|dt| {
                    let day = dt.date();
                    day >= start && day <= end
                })
                .unwrap_or(false)
        })
    }
}

/// Keeps rows whose pressure lies in the requested depth range
#[derive(Debug, Default)]
pub struct DepthStage;

#[async_trait]
impl FilterStage for DepthStage {
    fn name(&self) -> &'static str {
        "depth"
    }

    async fn apply(&self, view: TableView, descriptor: &QueryDescriptor) -> TableView {
        let Some(range) = descriptor.depth_range else {
            return view;
        };
        if !view.table().has_column(Column::Pressure) {
            warn!("Dataset has no pressure column, skipping depth filter");
            return view;
        }
        let (lower, upper) = range.bounds();
        if lower.is_nan() || upper.is_nan() {
            warn!("Depth range {:?} is unusable, skipping depth filter", range);
            return view;
        }

        view.retain(|table, row| {
            table
                .numeric(Column::Pressure)
                .and_then(|cells| cells[row])
                .map(|pressure| range.contains(pressure))
                .unwrap_or(false)
        })
    }
}

/// Whether a query ran against a loaded dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetStatus {
    Available,
    Unavailable,
}

/// Filtered rows plus how many matched before the cap
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub status: DatasetStatus,
    pub rows: TableView,
    /// Rows that passed every stage
    pub matched: usize,
}

impl QueryResult {
    pub fn unavailable() -> Self {
        Self {
            status: DatasetStatus::Unavailable,
            rows: TableView::empty(),
            matched: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_unavailable(&self) -> bool {
        self.status == DatasetStatus::Unavailable
    }

    pub fn truncated(&self) -> bool {
        self.matched > self.rows.len()
    }

    /// Matching rows removed by the cap
    pub fn dropped(&self) -> usize {
        self.matched.saturating_sub(self.rows.len())
    }
}

/// Keep the `cap` most recent rows.
///
/// Rows without a date rank after every dated row; equal dates keep their
/// original order. Output is most-recent-first. Views at or under the cap are
/// returned untouched, as are capped views of tables without a date column
/// (those keep their first `cap` rows).
pub fn cap_most_recent(view: TableView, cap: usize) -> TableView {
    if view.len() <= cap {
        return view;
    }

    let Some(dates) = view.table().dates() else {
        let rows = view.rows()[..cap].to_vec();
        return view.with_rows(rows);
    };

    let mut rows = view.rows().to_vec();
    rows.sort_by(|&a, &b| match (dates[a], dates[b]) {
        (Some(da), Some(db)) => db.cmp(&da).then(a.cmp(&b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(&b),
    });
    rows.truncate(cap);
    view.with_rows(rows)
}

/// The fixed sequence of filter stages plus the result cap
pub struct FilterPipeline {
    stages: Vec<Box<dyn FilterStage>>,
    result_cap: usize,
}

impl FilterPipeline {
    pub fn new(resolver: Arc<GeoResolver>, config: &PipelineConfig) -> Self {
        Self {
            stages: vec![
                Box::new(ParameterStage),
                Box::new(LocationStage::new(resolver)),
                Box::new(DateStage::new(config.anchor_window_days)),
                Box::new(DepthStage),
            ],
            result_cap: config.result_cap,
        }
    }

    /// Static region table only, default tuning
    pub fn offline() -> Self {
        Self::new(Arc::new(GeoResolver::static_only()), &PipelineConfig::default())
    }

    pub fn with_result_cap(mut self, cap: usize) -> Self {
        self.result_cap = cap;
        self
    }

    pub fn result_cap(&self) -> usize {
        self.result_cap
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Never fails; an unloaded dataset gives an empty `Unavailable` result
    pub async fn apply(&self, dataset: &DatasetHandle, descriptor: &QueryDescriptor) -> QueryResult {
        let Some(table) = dataset.table() else {
            warn!("No dataset loaded, returning empty result");
            return QueryResult::unavailable();
        };

        let mut view = TableView::full(Arc::clone(table));
        for stage in &self.stages {
            let before = view.len();
            view = stage.apply(view, descriptor).await;
            if view.len() != before {
                info!("Filtered by {}: {} -> {} records", stage.name(), before, view.len());
            }
        }

        let matched = view.len();
        let rows = cap_most_recent(view, self.result_cap);
        if rows.len() < matched {
            info!(
                "Limited results to {} most recent of {} records",
                rows.len(),
                matched
            );
        }

        QueryResult {
            status: DatasetStatus::Available,
            rows,
            matched,
        }
    }
}
