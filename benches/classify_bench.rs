//! Benchmarks for feed classification and the dashboard views
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use dac_status::dashboard::{HtmlRenderer, Renderer};
use dac_status::status::*;

const NOW_MS: i64 = 1_704_474_000_000;
const HOUR_MS: i64 = 3_600_000;

fn create_test_records(count: usize) -> Vec<RawRecord> {
    let institutions = ["Rutgers University", "Navy", "Skidaway", "UCSD", "Oregon State"];

    (0..count)
        .map(|i| {
            let age = (i as i64 % 96) * HOUR_MS;
            let record = RawRecord::new(format!("glider{:04}-20240105T0000", i))
                .group(GroupField::Institution, institutions[i % institutions.len()])
                .group(GroupField::Provider, format!("provider{}", i % 40))
                .created(NOW_MS - age)
                .updated(NOW_MS - age / 2)
                .coverage(NOW_MS - age - 10 * HOUR_MS, NOW_MS - age);

            if i % 7 == 0 {
                record
            } else {
                record.endpoints(
                    "https://gliders.ioos.us/thredds/dodsC/deployment.nc",
                    "https://gliders.ioos.us/erddap/tabledap/deployment.html",
                )
            }
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    for size in [100, 1000, 10000] {
        let raw = create_test_records(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("classify_{}", size), |b| {
            b.iter(|| classify(black_box(&raw), NOW_MS))
        });
    }

    group.finish();
}

fn bench_views(c: &mut Criterion) {
    let mut group = c.benchmark_group("views");
    let mut records = classify(&create_test_records(1000), NOW_MS);
    sort_by_name(&mut records);

    group.bench_function("latest_updated", |b| {
        b.iter(|| latest_updated(black_box(&records), LATEST_LIMIT))
    });

    group.bench_function("distinct_institutions", |b| {
        b.iter(|| distinct_group_values(black_box(&records), GroupField::Institution))
    });

    group.bench_function("filter_by_provider", |b| {
        b.iter(|| filter_by_field(black_box(&records), GroupField::Provider, "provider7"))
    });

    group.bench_function("render_all_datasets", |b| {
        b.iter(|| HtmlRenderer.datasets_table(black_box(&records)))
    });

    group.finish();
}

criterion_group!(benches, bench_classify, bench_views);
criterion_main!(benches);
