//! Property-based tests for the commutation search.
//!
//! Random small circuits over a gate set rich in commuting gates (CZ, CX,
//! RZZ) are scheduled with and without commutation.

use cadence_ir::{Circuit, QubitId};
use cadence_sched::{
    CommuteScheduler, DependencyGraph, Direction, ListScheduler, PlatformResources,
    SchedulerConfig, VariationEnumerator, commute::factorial, find_commuting_sets,
};
use proptest::prelude::*;

/// Gate operations that can be applied to a circuit.
#[derive(Debug, Clone)]
enum GateOp {
    H(u32),
    X(u32),
    CZ(u32, u32),
    CX(u32, u32),
    RZZ(u32, u32),
}

impl GateOp {
    fn apply(self, circuit: &mut Circuit) {
        match self {
            GateOp::H(q) => {
                let _ = circuit.h(QubitId(q));
            }
            GateOp::X(q) => {
                let _ = circuit.x(QubitId(q));
            }
            GateOp::CZ(a, b) => {
                let _ = circuit.cz(QubitId(a), QubitId(b));
            }
            GateOp::CX(a, b) => {
                let _ = circuit.cx(QubitId(a), QubitId(b));
            }
            GateOp::RZZ(a, b) => {
                let _ = circuit.rzz(0.25, QubitId(a), QubitId(b));
            }
        }
    }
}

fn arb_pair(num_qubits: u32) -> impl Strategy<Value = (u32, u32)> {
    (0..num_qubits, 0..num_qubits).prop_filter("Operands must differ", |(a, b)| a != b)
}

fn arb_gate_op(num_qubits: u32) -> impl Strategy<Value = GateOp> {
    prop_oneof![
        (0..num_qubits).prop_map(GateOp::H),
        (0..num_qubits).prop_map(GateOp::X),
        arb_pair(num_qubits).prop_map(|(a, b)| GateOp::CZ(a, b)),
        arb_pair(num_qubits).prop_map(|(a, b)| GateOp::CX(a, b)),
        arb_pair(num_qubits).prop_map(|(a, b)| GateOp::RZZ(a, b)),
    ]
}

/// Circuits of 2-4 qubits and up to 7 gates, so at most 7! variations.
fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (2_u32..=4).prop_flat_map(|num_qubits| {
        prop::collection::vec(arb_gate_op(num_qubits), 1..=7).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("random", num_qubits, 0);
            for op in ops {
                op.apply(&mut circuit);
            }
            circuit
        })
    })
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Forward), Just(Direction::Backward)]
}

fn run(circuit: &mut Circuit, config: SchedulerConfig) -> cadence_sched::ScheduleReport {
    CommuteScheduler::new(config, PlatformResources::qubit_exclusive())
        .run(circuit)
        .expect("scheduling failed")
}

proptest! {
    /// The selected variation is never worse than scheduling in program order.
    #[test]
    fn test_commutation_never_increases_depth(
        circuit in arb_circuit(),
        direction in arb_direction(),
    ) {
        let mut plain = circuit.clone();
        let direct = run(&mut plain, SchedulerConfig::new().with_direction(direction).with_commute(false));

        let mut searched = circuit;
        let report = run(&mut searched, SchedulerConfig::new().with_direction(direction));

        prop_assert!(report.depth <= direct.depth,
            "commutation depth {} exceeds direct depth {}", report.depth, direct.depth);
        prop_assert_eq!(searched.depth(), report.depth);
        prop_assert!(searched.is_scheduled());
    }

    /// Without commuting sets, the search reproduces direct scheduling.
    #[test]
    fn test_no_sets_matches_direct_scheduling(circuit in arb_circuit()) {
        let mut plain = circuit.clone();
        run(&mut plain, SchedulerConfig::new().with_commute(false));

        let mut searched = circuit;
        let report = run(&mut searched, SchedulerConfig::new());

        if report.total_variations == 1 {
            prop_assert_eq!(searched, plain);
        }
    }

    /// The variation count is the product of the set factorials.
    #[test]
    fn test_total_is_product_of_factorials(circuit in arb_circuit()) {
        let dag = DependencyGraph::build(&circuit, true);
        let commutation = find_commuting_sets(&dag).unwrap();

        let product: u64 = commutation
            .sets()
            .iter()
            .map(|s| factorial(s.len()).unwrap())
            .product();
        prop_assert_eq!(commutation.total(), product);
        prop_assert!(commutation.sets().iter().all(|s| s.len() >= 2));
    }

    /// Enumerating every variation leaves the graph as it was built.
    #[test]
    fn test_enumeration_restores_graph(circuit in arb_circuit()) {
        let mut dag = DependencyGraph::build(&circuit, true);
        let before = dag.snapshot();
        let commutation = find_commuting_sets(&dag).unwrap();

        let prototype = PlatformResources::qubit_exclusive();
        let enumeration = VariationEnumerator::new(ListScheduler::default(), &prototype)
            .with_traces(true)
            .enumerate(&mut dag, &commutation)
            .unwrap();

        prop_assert_eq!(dag.snapshot(), before);
        prop_assert_eq!(enumeration.evaluated(), commutation.total());
        // Program order is always feasible.
        prop_assert!(enumeration.traces[0].depth.is_some());
        prop_assert!(enumeration.best().is_some());
    }

    /// Scheduling is deterministic.
    #[test]
    fn test_scheduling_is_deterministic(
        circuit in arb_circuit(),
        direction in arb_direction(),
    ) {
        let config = SchedulerConfig::new().with_direction(direction).with_traces(true);

        let mut first = circuit.clone();
        let a = run(&mut first, config.clone());
        let mut second = circuit;
        let b = run(&mut second, config);

        prop_assert_eq!(a, b);
        prop_assert_eq!(first, second);
    }
}
