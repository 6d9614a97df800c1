//! Benchmarks for pipeline execution.

use buildflow::complete;
use buildflow::core::StatusCode;
use buildflow::stages::{FnStage, Stage};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

fn stage(name: &str) -> Arc<dyn Stage> {
    Arc::new(FnStage::new(name, |args: &[String]| {
        black_box(args);
        StatusCode::SUCCESS
    }))
}

fn pipeline_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let pipeline = complete::pipeline_with(stage("gendeps"), stage("check"), stage("build"))
        .expect("valid pipeline");

    c.bench_function("complete_pipeline_in_process", |b| {
        b.iter(|| black_box(runtime.block_on(pipeline.run())));
    });
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
