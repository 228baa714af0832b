//! Performance benchmarks for extraction and filtering

use std::sync::Arc;

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use floatchat_query::pipeline::cap_most_recent;
use floatchat_query::{
    DatasetHandle, DepthRange, FilterPipeline, KeywordStrategy, MeasurementRecord,
    MeasurementTable, Parameter, QueryDescriptor, TableView,
};

/// Deterministic synthetic profiles spread over the Indian Ocean
fn synthetic_table(rows: usize) -> MeasurementTable {
    let epoch = NaiveDate::from_ymd_opt(2005, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();

    MeasurementTable::from_records((0..rows).map(|i| {
        let i = i as f64;
        MeasurementRecord {
            float_id: Some(format!("29{:05}", i as usize % 500)),
            date: Some(epoch + chrono::Duration::hours((i * 7.0) as i64)),
            latitude: Some(-40.0 + (i * 0.37) % 70.0),
            longitude: Some(40.0 + (i * 0.53) % 60.0),
            pressure: Some((i * 13.0) % 2000.0),
            temperature: (i as usize % 11 != 0).then(|| 30.0 - (i * 0.01) % 28.0),
            salinity: Some(34.0 + (i * 0.001) % 2.0),
        }
    }))
}

fn benchmark_keyword_extraction(c: &mut Criterion) {
    let strategy = KeywordStrategy::new();
    c.bench_function("keyword_extract", |b| {
        b.iter(|| {
            black_box(strategy.extract_sync(black_box(
                "Show me temperature in the Arabian Sea from 2010 to 2015 between 100-500 m",
            )))
        })
    });
}

fn benchmark_pipeline(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let pipeline = FilterPipeline::offline();
    let descriptor = QueryDescriptor::new()
        .with_parameter(Parameter::Temperature)
        .with_location("arabian sea")
        .with_date_range(
            NaiveDate::from_ymd_opt(2006, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2030, 12, 31).unwrap(),
        )
        .with_depth_range(DepthRange::new(0.0, 1000.0));

    let mut group = c.benchmark_group("filter_pipeline");
    for rows in [10_000usize, 100_000] {
        let dataset = DatasetHandle::loaded(synthetic_table(rows));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &dataset, |b, dataset| {
            b.iter(|| black_box(runtime.block_on(pipeline.apply(dataset, &descriptor))))
        });
    }
    group.finish();
}

fn benchmark_cap(c: &mut Criterion) {
    let table = Arc::new(synthetic_table(50_000));
    c.bench_function("cap_most_recent_50k_to_10k", |b| {
        b.iter(|| black_box(cap_most_recent(TableView::full(Arc::clone(&table)), 10_000)))
    });
}

criterion_group!(benches, benchmark_keyword_extraction, benchmark_pipeline, benchmark_cap);
criterion_main!(benches);
