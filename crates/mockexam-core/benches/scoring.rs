use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mockexam_core::config::SessionConfig;
use mockexam_core::model::{Difficulty, Question};
use mockexam_core::scoring::{score, subject_breakdown, update_stats, Stats};
use mockexam_core::session::TestSession;

fn make_questions(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| Question {
            id: format!("q{i}"),
            question: format!("Question {i}"),
            options: ["a", "b", "c", "d"].map(String::from),
            correct_answer: i % 4,
            explanation: String::new(),
            subject: format!("Subject {}", i % 8),
            difficulty: Difficulty::Medium,
        })
        .collect()
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");

    for n in [10usize, 100] {
        let questions = make_questions(n);
        let answers: BTreeMap<usize, usize> = (0..n).map(|i| (i, (i * 7) % 4)).collect();
        group.bench_function(format!("n={n}"), |b| {
            b.iter(|| score(black_box(&questions), black_box(&answers)))
        });
    }

    group.finish();
}

fn bench_result(c: &mut Criterion) {
    let mut group = c.benchmark_group("result");
    let questions = make_questions(100);

    group.bench_function("submit_100", |b| {
        b.iter(|| {
            let mut session = TestSession::start(black_box(&questions), &SessionConfig::default());
            for i in 0..session.len() {
                session.jump_to(i);
                session.select_answer(i % 3);
            }
            session.submit()
        })
    });

    let mut session = TestSession::start(&questions, &SessionConfig::default());
    session.select_answer(0);
    let result = session.submit().expect("fresh session submits");

    group.bench_function("subject_breakdown_100", |b| {
        b.iter(|| subject_breakdown(black_box(&result)))
    });

    group.bench_function("update_stats", |b| {
        let stats = Stats::default();
        b.iter(|| update_stats(black_box(&stats), black_box(&result)))
    });

    group.finish();
}

criterion_group!(benches, bench_score, bench_result);
criterion_main!(benches);
