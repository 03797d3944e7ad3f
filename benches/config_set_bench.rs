use criterion::{criterion_group, criterion_main, Criterion};
use model_matrix_runner::models::{ConfigurationSet, ModelMetadata};
use serde_json::json;
use std::hint::black_box;

fn sample_document(count: usize) -> String {
    let entries: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "model_type": if i % 2 == 0 { "api" } else { "local" },
                "model_name": format!("model-{i}"),
                "class": "ApiModel",
                "config": {
                    "provider": "url",
                    "model_identifier": format!("model-{i}-id"),
                    "model_path": format!("/models/model-{i}"),
                    "concurrency": 4
                }
            })
        })
        .collect();
    serde_json::to_string(&entries).unwrap()
}

fn bench_parse_and_extract(c: &mut Criterion) {
    let document = sample_document(1000);

    c.bench_function("parse_config_set_1000", |b| {
        b.iter(|| ConfigurationSet::parse(black_box(&document)).unwrap());
    });

    let set = ConfigurationSet::parse(&document).unwrap();
    c.bench_function("extract_metadata_1000", |b| {
        b.iter(|| {
            set.iter()
                .map(ModelMetadata::from_value)
                .filter(|m| m.model_type == "api")
                .count()
        });
    });
}

criterion_group!(benches, bench_parse_and_extract);
criterion_main!(benches);
