use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mockexam_core::ingest::{ingest, sample_csv};

const HEADER: &str =
    "question,option1,option2,option3,option4,correctAnswer,explanation,subject,difficulty\n";

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest_csv");

    let sample = sample_csv().expect("sample CSV renders");

    let large = {
        let mut s = String::from(HEADER);
        for i in 0..500 {
            s.push_str(&format!(
                "Question {i}?,alpha,beta,gamma,delta,{},because,Subject {},hard\n",
                i % 4 + 1,
                i % 8
            ));
        }
        s
    };

    let mostly_invalid = {
        let mut s = String::from(HEADER);
        for i in 0..500 {
            if i % 2 == 0 {
                s.push_str("Question?,alpha,,gamma,delta,9,,,\n");
            } else {
                s.push_str("Question?,alpha,beta,gamma,delta,2,,,\n");
            }
        }
        s
    };

    group.bench_function("sample", |b| {
        b.iter(|| ingest("sample.csv", black_box(sample.as_bytes())))
    });

    group.bench_function("500_rows", |b| {
        b.iter(|| ingest("large.csv", black_box(large.as_bytes())))
    });

    group.bench_function("500_rows_half_invalid", |b| {
        b.iter(|| ingest("mixed.csv", black_box(mostly_invalid.as_bytes())))
    });

    group.finish();
}

criterion_group!(benches, bench_ingest);
criterion_main!(benches);
