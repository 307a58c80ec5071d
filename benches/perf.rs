use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use physio_terminal::artifacts::RiskModel;
use physio_terminal::features::build_feature_vector;
use physio_terminal::risk;
use physio_terminal::roster::{PlayerRecord, Position};

fn sample_record() -> PlayerRecord {
    PlayerRecord {
        age: 28,
        games: 24,
        minutes: 2100.0,
        minutes_90s: 23.3,
        shots: 31,
        n_injuries: 3,
        n_severe_injuries: 1,
        position: Some(Position::Midfielder),
    }
}

fn bench_feature_build(c: &mut Criterion) {
    let model = RiskModel::load().expect("artifact available");
    let record = sample_record();

    c.bench_function("feature_build", |b| {
        b.iter(|| {
            let fv = build_feature_vector(black_box(&record), model.feature_names()).unwrap();
            black_box(fv.len());
        })
    });
}

fn bench_predict_proba(c: &mut Criterion) {
    let model = RiskModel::load().expect("artifact available");
    let record = sample_record();
    let fv = build_feature_vector(&record, model.feature_names()).unwrap();

    c.bench_function("predict_proba", |b| {
        b.iter(|| {
            let p = model.predict_proba(black_box(&fv));
            black_box(p);
        })
    });
}

fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify", |b| {
        b.iter(|| {
            let out = risk::classify(black_box(0.42), black_box(6.5), black_box(3), black_box(1));
            black_box(out);
        })
    });
}

fn bench_full_assessment(c: &mut Criterion) {
    let model = RiskModel::load().expect("artifact available");
    let record = sample_record();

    c.bench_function("full_assessment", |b| {
        b.iter(|| {
            let assessment = risk::assess(black_box(&model), black_box(&record)).unwrap();
            black_box(assessment.probability);
        })
    });
}

criterion_group!(
    perf,
    bench_feature_build,
    bench_predict_proba,
    bench_classify,
    bench_full_assessment
);
criterion_main!(perf);
