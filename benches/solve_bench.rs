//! Resolution benchmarks using Criterion.
//!
//! Run with: `cargo bench`
//!
//! Covers the fixed cost of a trivial query, list append over growing
//! inputs, and enumeration through backtracking.
//!
//! With `--features tracing`, setting `SLDLOG_FLAME=<path>` records folded
//! stacks for the whole run to `<path>`.

use criterion::{black_box, criterion_group, BenchmarkId, Criterion};
use sldlog::machine::Machine;
use sldlog::trace::init_flamegraph;

const APPEND: &str = "
    append([], A, A).
    append([A|B], C, [A|D]) :-
        append(B, C, D).
";

fn list_text(n: usize) -> String {
    let items: Vec<String> = (0..n).map(|i| format!("e{}", i)).collect();
    format!("[{}]", items.join(", "))
}

/// A query with no clauses to search.
fn bench_true(c: &mut Criterion) {
    let machine = Machine::new();
    c.bench_function("true", |b| {
        b.iter(|| black_box(machine.can_prove(black_box("true.")).unwrap()))
    });
}

/// Deterministic append of an n-element list onto a short one.
fn bench_append(c: &mut Criterion) {
    let mut machine = Machine::new();
    machine.consult(APPEND).unwrap();

    let mut group = c.benchmark_group("append");
    for n in [1usize, 10, 100, 1000] {
        let query = format!("append({}, [x, y], L).", list_text(n));
        group.bench_with_input(BenchmarkId::new("len", n), &query, |b, query| {
            b.iter(|| black_box(machine.prove_all(query).unwrap().len()))
        });
    }
    group.finish();
}

/// Every split of an n-element list, one choice point per split.
fn bench_append_split(c: &mut Criterion) {
    let mut machine = Machine::new();
    machine.consult(APPEND).unwrap();

    let mut group = c.benchmark_group("append_split");
    for n in [10usize, 100] {
        let query = format!("append(X, Y, {}).", list_text(n));
        group.bench_with_input(BenchmarkId::new("len", n), &query, |b, query| {
            b.iter(|| {
                let count = machine.query(query).unwrap().count();
                assert_eq!(count, n + 1);
                black_box(count)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_true, bench_append, bench_append_split);

fn main() {
    let _flame = match std::env::var("SLDLOG_FLAME") {
        Ok(path) => match init_flamegraph(&path) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Err(_) => None,
    };

    benches();
    Criterion::default().configure_from_args().final_summary();
}
