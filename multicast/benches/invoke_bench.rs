//! Delegate invocation benchmarks using criterion.
//!
//! Run with: cargo bench --bench invoke_bench

use std::cell::RefCell;
use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use multicast::{Delegate, OperationTable, Receiver};

struct Accumulator {
    sum: u64,
}

impl Receiver for Accumulator {
    fn operations() -> OperationTable<Self> {
        OperationTable::new()
            .method("add", |a: &mut Accumulator, (n,): (u64,)| {
                a.sum = a.sum.wrapping_add(n);
                a.sum
            })
            .method("label", |a: &mut Accumulator, (prefix,): (String,)| {
                format!("{}{}", prefix, a.sum)
            })
    }
}

fn receivers(count: usize) -> Vec<Rc<RefCell<Accumulator>>> {
    (0..count)
        .map(|_| Rc::new(RefCell::new(Accumulator { sum: 0 })))
        .collect()
}

/// Benchmark fan-out width
fn bench_invoke(c: &mut Criterion) {
    let mut group = c.benchmark_group("invoke");

    for count in [1usize, 8, 64] {
        let targets = receivers(count);
        let mut delegate = Delegate::new();
        for target in &targets {
            delegate.bind(target, "add").unwrap();
        }

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("add", count), &delegate, |b, d| {
            b.iter(|| d.invoke((black_box(1u64),)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("call_add", count), &delegate, |b, d| {
            b.iter(|| black_box(d.call::<u64, _>((black_box(1u64),)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark argument cloning for owned arguments
fn bench_owned_arguments(c: &mut Criterion) {
    let targets = receivers(8);
    let mut delegate = Delegate::new();
    for target in &targets {
        delegate.bind(target, "label").unwrap();
    }

    c.bench_function("call_label_8", |b| {
        b.iter(|| black_box(delegate.call::<String, _>((String::from("sum="),)).unwrap()));
    });
}

/// Benchmark bind-time resolution
fn bench_bind(c: &mut Criterion) {
    let targets = receivers(1);
    c.bench_function("bind_resolve", |b| {
        b.iter(|| {
            let mut delegate = Delegate::new();
            delegate.bind(&targets[0], black_box("label")).unwrap();
            black_box(delegate)
        });
    });
}

criterion_group!(benches, bench_invoke, bench_owned_arguments, bench_bind);
criterion_main!(benches);
