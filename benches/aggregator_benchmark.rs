use chrono::{TimeDelta, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fitness_tracker::services::aggregator::{
    aggregate, AggregationWindow, GoalTable, MeasurementRecord, Metric,
};

const FOODS: &[&str] = &["Oats", "Eggs", "Rice", "Chicken", "Apple", "Yogurt", "Salmon"];

fn benchmark_aggregate(c: &mut Criterion) {
    let end = Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap();
    let window = AggregationWindow::trailing_days(end, 365);

    // A year of records, one every 37 minutes
    let records: Vec<MeasurementRecord> = (0..14_000)
        .map(|i| MeasurementRecord {
            timestamp: end - TimeDelta::minutes(37 * i),
            value: Some((i % 500) as f64),
            category: Some(FOODS[i as usize % FOODS.len()].to_string()),
        })
        .collect();

    let mut goals = GoalTable::new();
    goals.insert("water".to_string(), 2500.0);

    let mut group = c.benchmark_group("aggregate");

    group.bench_function("single_metric_year", |b| {
        b.iter(|| aggregate(black_box(&records), window, &[Metric::WaterMl], &goals))
    });

    group.bench_function("four_metrics_year", |b| {
        let metrics = [
            Metric::Calories,
            Metric::ProteinG,
            Metric::CarbsG,
            Metric::FatG,
        ];
        b.iter(|| aggregate(black_box(&records), window, &metrics, &goals))
    });

    group.finish();
}

criterion_group!(benches, benchmark_aggregate);
criterion_main!(benches);
