// Result rendering: aligned table, JSON and CSV

use clap::ValueEnum;
use floatchat_query::{
    DatasetSummary, Interpretation, MeasurementRecord, ParameterStats, QueryResponse,
};
use serde::Serialize;

use crate::error::CliResult;

/// How `query` prints rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

const HEADERS: [&str; 7] = [
    "float_id",
    "date",
    "latitude",
    "longitude",
    "pressure",
    "temperature",
    "salinity",
];

fn cells(record: &MeasurementRecord) -> [String; 7] {
    let num = |v: Option<f64>| v.map(|v| format!("{:.3}", v)).unwrap_or_else(|| "-".to_string());
    [
        record.float_id.clone().unwrap_or_else(|| "-".to_string()),
        record
            .date
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string()),
        num(record.latitude),
        num(record.longitude),
        num(record.pressure),
        num(record.temperature),
        num(record.salinity),
    ]
}

/// Space-aligned table; numbers right-aligned
pub fn render_table(records: &[MeasurementRecord]) -> String {
    let rows: Vec<[String; 7]> = records.iter().map(cells).collect();
    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths.iter())
        .map(|(h, w)| format!("{:<width$}", h, width = *w))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');

    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(widths.iter())
            .enumerate()
            .map(|(i, (cell, w))| {
                if i < 2 {
                    format!("{:<width$}", cell, width = *w)
                } else {
                    format!("{:>width$}", cell, width = *w)
                }
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// RFC 4180 CSV with a header row; missing cells are empty
pub fn render_csv(records: &[MeasurementRecord]) -> CliResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;
    for record in records {
        writer.write_record([
            record.float_id.clone().unwrap_or_default(),
            record
                .date
                .map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string())
                .unwrap_or_default(),
            opt(record.latitude),
            opt(record.longitude),
            opt(record.pressure),
            opt(record.temperature),
            opt(record.salinity),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| crate::error::CliError::Output(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| crate::error::CliError::Output(e.to_string()))
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[derive(Serialize)]
struct QueryReport<'a> {
    interpretation: &'a Interpretation,
    status: floatchat_query::DatasetStatus,
    matched: usize,
    returned: usize,
    truncated: bool,
    statistics: Option<ParameterStats>,
    records: &'a [MeasurementRecord],
}

/// Whole response as pretty JSON, with at most `records` rows
pub fn render_json(response: &QueryResponse, records: &[MeasurementRecord]) -> CliResult<String> {
    let report = QueryReport {
        interpretation: &response.interpretation,
        status: response.result.status,
        matched: response.result.matched,
        returned: response.result.len(),
        truncated: response.result.truncated(),
        statistics: response.parameter_stats(),
        records,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn render_stats(stats: &ParameterStats) -> Vec<String> {
    let unit = &stats.unit;
    let mut lines = vec![
        format!("count: {}", stats.count),
        format!("mean: {:.3} {}", stats.mean, unit),
    ];
    if let Some(std_dev) = stats.std_dev {
        lines.push(format!("std: {:.3} {}", std_dev, unit));
    }
    lines.push(format!("min: {:.3} {}", stats.min, unit));
    lines.push(format!("median: {:.3} {}", stats.median, unit));
    lines.push(format!("max: {:.3} {}", stats.max, unit));
    lines
}

pub fn render_summary(summary: &DatasetSummary) -> Vec<(String, String)> {
    let mut lines = vec![
        ("Total records".to_string(), summary.total_records.to_string()),
        ("Floats".to_string(), summary.float_count.to_string()),
    ];
    if let Some(span) = &summary.date_range {
        lines.push((
            "Date range".to_string(),
            format!("{} to {}", span.start.date(), span.end.date()),
        ));
    }
    if let Some(bounds) = &summary.geographic_bounds {
        lines.push((
            "Latitude".to_string(),
            format!("{:.2} to {:.2}", bounds.lat_min, bounds.lat_max),
        ));
        lines.push((
            "Longitude".to_string(),
            format!("{:.2} to {:.2}", bounds.lon_min, bounds.lon_max),
        ));
    }
    for (parameter, count) in &summary.parameter_counts {
        lines.push((format!("{} values", parameter), count.to_string()));
    }
    lines
}
