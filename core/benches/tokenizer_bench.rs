use criterion::{criterion_group, criterion_main, Criterion};
use subsearch_core::tokenizer::normalize;

fn synthetic_srt(cues: usize) -> String {
    let mut s = String::new();
    for i in 1..=cues {
        s.push_str(&format!("{i}\n00:{:02}:{:02},000 --> 00:{:02}:{:02},500\nLine number {i} of the dialogue, spoken loudly.\n\n", i / 60 % 60, i % 60, i / 60 % 60, i % 60));
    }
    s
}

fn bench_normalize(c: &mut Criterion) {
    let text = synthetic_srt(1_000);
    c.bench_function("normalize_srt_1000_cues", |b| b.iter(|| normalize(&text)));
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
