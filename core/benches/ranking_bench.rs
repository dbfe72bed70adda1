use criterion::{criterion_group, criterion_main, Criterion};
use search_core::{DocumentStatus, ExecutionPolicy, SearchEngine};

fn build_engine() -> SearchEngine {
    let mut engine = SearchEngine::from_stop_words_text("and in on with the").unwrap();
    for id in 0..10_000 {
        let text: Vec<String> = (0..20).map(|k| format!("w{}", (id * 31 + k * 17) % 500)).collect();
        engine.add_document(id, &text.join(" "), DocumentStatus::Actual, &[id % 10]).unwrap();
    }
    engine
}

fn bench_ranking(c: &mut Criterion) {
    let engine = build_engine();
    let query = "w1 w7 w42 w99 w123 w256 w301 w444 -w13 -w77";
    c.bench_function("find_top_sequential", |b| {
        b.iter(|| engine.find_top_documents_actual(query, ExecutionPolicy::Sequential))
    });
    c.bench_function("find_top_parallel", |b| {
        b.iter(|| engine.find_top_documents_actual(query, ExecutionPolicy::Parallel))
    });
}

criterion_group!(benches, bench_ranking);
criterion_main!(benches);
