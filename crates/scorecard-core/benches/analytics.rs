use criterion::{black_box, criterion_group, criterion_main, Criterion};

use scorecard_core::aggregate::{summarize, unique_students};
use scorecard_core::ingest::parse_general;
use scorecard_core::model::Columns;
use scorecard_core::statistics::compute_analytics;

fn make_rows(n: usize) -> Vec<Columns> {
    let mut text = String::from("name,student_id,math,english,science,history,notes\n");
    for i in 0..n {
        text.push_str(&format!(
            "Student {i},{},{},{},{},{},ok\n",
            i % (n / 2 + 1),
            35 + i % 66,
            50 + i % 51,
            20 + i % 81,
            60 + i % 41
        ));
    }
    parse_general(&text)
        .map(|upload| upload.records.iter().map(|r| r.to_row()).collect())
        .unwrap_or_default()
}

fn bench_compute_analytics(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_analytics");

    for n in [10, 100, 1000] {
        let rows = make_rows(n);
        group.bench_function(format!("{n}_rows"), |b| {
            b.iter(|| compute_analytics(black_box(&rows)))
        });
    }

    group.finish();
}

fn bench_student_summaries(c: &mut Criterion) {
    let text = {
        let mut s = String::from("name,student_id,math,english\n");
        for i in 0..1000 {
            s.push_str(&format!("Student {},{},{},{}\n", i % 200, i % 200, i % 101, 100 - i % 101));
        }
        s
    };
    let records = parse_general(&text).map(|u| u.records).unwrap_or_default();

    c.bench_function("summarize_1000_records", |b| {
        b.iter(|| {
            unique_students(black_box(&records))
                .iter()
                .map(summarize)
                .count()
        })
    });
}

criterion_group!(benches, bench_compute_analytics, bench_student_summaries);
criterion_main!(benches);
