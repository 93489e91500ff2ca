//! Benchmarks for the commutation search
//!
//! Run with: cargo bench -p cadence-sched

use cadence_ir::{Circuit, QubitId};
use cadence_sched::{
    CommuteScheduler, DependencyGraph, ListScheduler, PlatformResources, SchedulerConfig,
    Variation, find_commuting_sets,
};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// A CZ fan-out from qubit 0 followed by a chain on every target.
fn fan_circuit(n: u32) -> Circuit {
    let mut circuit = Circuit::with_size("fan", n + 1, 0);
    for t in 1..=n {
        circuit.cz(QubitId(0), QubitId(t)).unwrap();
        for _ in 0..t {
            circuit.h(QubitId(t)).unwrap();
        }
    }
    circuit
}

/// Benchmark dependency graph construction
fn bench_graph_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");

    for num_qubits in &[5, 20, 50] {
        let circuit = Circuit::ghz(*num_qubits).unwrap();
        group.bench_with_input(
            BenchmarkId::new("ghz", num_qubits),
            &circuit,
            |b, circuit| {
                b.iter(|| DependencyGraph::build(black_box(circuit), true));
            },
        );
    }

    group.finish();
}

/// Benchmark one list scheduling pass over the base graph
fn bench_list_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_schedule");

    for num_qubits in &[5, 20, 50] {
        let circuit = Circuit::ghz(*num_qubits).unwrap();
        let dag = DependencyGraph::build(&circuit, true);
        group.bench_with_input(BenchmarkId::new("ghz", num_qubits), &dag, |b, dag| {
            b.iter(|| {
                let mut resources = PlatformResources::qubit_exclusive();
                ListScheduler::default().schedule(black_box(dag), &mut resources)
            });
        });
    }

    group.finish();
}

/// Benchmark variation decoding
fn bench_decode(c: &mut Criterion) {
    let circuit = fan_circuit(10);
    let dag = DependencyGraph::build(&circuit, true);
    let commutation = find_commuting_sets(&dag).unwrap();

    c.bench_function("decode_fan_10", |b| {
        let mut index = 0;
        b.iter(|| {
            index = (index + 7919) % commutation.total();
            black_box(Variation::decode(&commutation, index))
        });
    });
}

/// Benchmark the full pipeline over every variation
fn bench_full_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_search");
    group.sample_size(10);

    for n in &[3, 4, 5] {
        let circuit = fan_circuit(*n);
        group.bench_with_input(BenchmarkId::new("fan", n), &circuit, |b, circuit| {
            let scheduler =
                CommuteScheduler::new(SchedulerConfig::new(), PlatformResources::qubit_exclusive());
            b.iter(|| {
                let mut circuit = circuit.clone();
                scheduler.run(&mut circuit).unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_graph_build,
    bench_list_schedule,
    bench_decode,
    bench_full_search,
);

criterion_main!(benches);
