//! Benchmarks for hmm2parquet
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::io::Cursor;

/// Synthetic HMMER3 text: `profiles` models of `length` positions each
fn synthetic_hmm(profiles: usize, length: usize) -> String {
    let emissions: Vec<String> = (0..20)
        .map(|i| format!("{:.5}", 2.0 + i as f64 * 0.05))
        .collect();
    let emissions = emissions.join("  ");
    let transitions = "0.00834  5.19201  5.91436  0.61958  0.77255  0.48576  0.95510";

    let mut text = String::new();
    for p in 0..profiles {
        text.push_str("HMMER3/f [3.1b2 | February 2015]\n");
        text.push_str(&format!("NAME  bench{}\nLENG  {}\nALPH  amino\n", p, length));
        text.push_str("HMM          A        C        D\n");
        text.push_str("            m->m     m->i     m->d     i->m     i->i     d->m     d->d\n");
        text.push_str(&format!(
            "  COMPO   {}\n          {}\n          {}\n",
            emissions, emissions, transitions
        ));
        for node in 1..=length {
            text.push_str(&format!("  {:>5}   {}  {} x - - -\n", node, emissions, node));
            text.push_str(&format!("          {}\n", emissions));
            text.push_str(&format!("          {}\n", transitions));
        }
        text.push_str("//\n");
    }
    text
}

fn benchmark_parse(c: &mut Criterion) {
    use hmm2parquet::hmm::parse_reader;

    let text = synthetic_hmm(20, 200);
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("parse_reader_20x200", |b| {
        b.iter(|| {
            let collection = parse_reader(Cursor::new(text.as_bytes()), "bench.hmm").unwrap();
            black_box(collection);
        })
    });
    group.finish();
}

fn benchmark_parser_lines(c: &mut Criterion) {
    use hmm2parquet::hmm::ProfileParser;

    let text = synthetic_hmm(1, 500);
    c.bench_function("feed_line_500_positions", |b| {
        b.iter(|| {
            let mut parser = ProfileParser::new();
            for line in text.lines() {
                black_box(parser.feed_line(line).unwrap());
            }
            parser.finish().unwrap();
        })
    });
}

fn benchmark_record_batch(c: &mut Criterion) {
    use hmm2parquet::hmm::parse_reader;
    use hmm2parquet::parquet::{profile_to_batch, ExportConfig};

    let text = synthetic_hmm(1, 500);
    let collection = parse_reader(Cursor::new(text.as_bytes()), "bench.hmm").unwrap();
    let profile = collection.get("bench0").unwrap();
    let config = ExportConfig::default();

    c.bench_function("profile_to_batch_500_positions", |b| {
        b.iter(|| {
            let batch = profile_to_batch(profile, &config).unwrap();
            black_box(batch);
        })
    });
}

criterion_group!(
    benches,
    benchmark_parse,
    benchmark_parser_lines,
    benchmark_record_batch,
);
criterion_main!(benches);
