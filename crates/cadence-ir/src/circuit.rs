//! High-level circuit container and builder API.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// Default cycle time, in nanoseconds.
pub const DEFAULT_CYCLE_TIME: u64 = 20;

/// A quantum circuit: an ordered instruction list over a fixed set of
/// qubits and classical bits.
///
/// The instruction order is program order until a scheduler commits a
/// schedule, after which it is schedule order and every instruction carries
/// its start cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Number of qubits.
    num_qubits: u32,
    /// Number of classical bits.
    num_clbits: u32,
    /// Length of one cycle in nanoseconds.
    #[serde(default = "default_cycle_time")]
    cycle_time: u64,
    /// The instructions, in program (or schedule) order.
    #[serde(default)]
    instructions: Vec<Instruction>,
}

fn default_cycle_time() -> u64 {
    DEFAULT_CYCLE_TIME
}

impl Circuit {
    /// Create a new empty circuit without qubits.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_size(name, 0, 0)
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            cycle_time: DEFAULT_CYCLE_TIME,
            instructions: vec![],
        }
    }

    /// Add a single classical bit to the circuit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.num_clbits);
        self.num_clbits += 1;
        id
    }

    /// Set the cycle time in nanoseconds.
    pub fn set_cycle_time(&mut self, cycle_time: u64) -> IrResult<()> {
        if cycle_time == 0 {
            return Err(IrError::ZeroCycleTime);
        }
        self.cycle_time = cycle_time;
        Ok(())
    }

    /// Append an instruction after validating its operands.
    pub fn push(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        let gate_name = instruction.as_gate().map(|g| g.name().to_string());

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits();
            let got = u32::try_from(instruction.qubits.len()).unwrap_or(u32::MAX);
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected,
                    got,
                });
            }
        }

        if instruction.is_measure() && instruction.qubits.len() != instruction.clbits.len() {
            return Err(IrError::MeasureArity {
                qubits: instruction.qubits.len(),
                clbits: instruction.clbits.len(),
            });
        }

        for &qubit in &instruction.qubits {
            if qubit.0 >= self.num_qubits {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        for &clbit in &instruction.clbits {
            if clbit.0 >= self.num_clbits {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        self.instructions.push(instruction);
        Ok(self)
    }

    /// Append a standard gate.
    pub fn gate(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::gate(gate, qubits))
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::H, [qubit])
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::X, [qubit])
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Y, [qubit])
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Z, [qubit])
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::S, [qubit])
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::T, [qubit])
    }

    /// Apply Rx rotation.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Rx(theta), [qubit])
    }

    /// Apply Ry rotation.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Ry(theta), [qubit])
    }

    /// Apply Rz rotation.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Rz(theta), [qubit])
    }

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CX, [control, target])
    }

    /// Apply CY gate.
    pub fn cy(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CY, [control, target])
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CZ, [control, target])
    }

    /// Apply controlled phase gate.
    pub fn cp(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CP(theta), [control, target])
    }

    /// Apply controlled Rz gate.
    pub fn crz(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CRz(theta), [control, target])
    }

    /// Apply ZZ rotation.
    pub fn rzz(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::RZZ(theta), [q1, q2])
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Swap, [q1, q2])
    }

    /// Apply Toffoli gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CCX, [c1, c2, target])
    }

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.push(Instruction::measure(qubit, clbit))
    }

    /// Measure qubit `i` into classical bit `i` for every qubit.
    ///
    /// Adds classical bits if the circuit has fewer bits than qubits.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        while self.num_clbits < self.num_qubits {
            self.add_clbit();
        }
        for i in 0..self.num_qubits {
            self.measure(QubitId(i), ClbitId(i))?;
        }
        Ok(self)
    }

    /// Reset a qubit.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::reset(qubit))
    }

    /// Barrier on the given qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.push(Instruction::barrier(qubits))
    }

    /// Barrier fencing every qubit and classical bit.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        self.push(Instruction::barrier([]))
    }

    /// Idle the whole circuit for `duration` nanoseconds.
    pub fn wait(&mut self, duration: u64) -> IrResult<&mut Self> {
        self.push(Instruction::wait(duration))
    }

    /// Classical operation writing the given classical bits.
    pub fn classical(
        &mut self,
        name: impl Into<String>,
        clbits: impl IntoIterator<Item = ClbitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::classical(name, clbits))
    }

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits as usize
    }

    /// Get the cycle time in nanoseconds.
    pub fn cycle_time(&self) -> u64 {
        self.cycle_time
    }

    /// Get the instructions in their current order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Get mutable access to the instructions (order is fixed).
    pub fn instructions_mut(&mut self) -> &mut [Instruction] {
        &mut self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Check if the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Duration of an instruction in whole cycles, rounded up.
    pub fn duration_in_cycles(&self, instruction: &Instruction) -> u64 {
        instruction.duration.div_ceil(self.cycle_time.max(1))
    }

    /// Override instruction durations by instruction name.
    pub fn apply_durations(&mut self, durations: &FxHashMap<String, u64>) {
        for inst in &mut self.instructions {
            if let Some(&duration) = durations.get(inst.name()) {
                inst.duration = duration;
            }
        }
    }

    /// Check whether every instruction has an assigned cycle.
    pub fn is_scheduled(&self) -> bool {
        self.instructions.iter().all(|inst| inst.cycle.is_some())
    }

    /// Drop every assigned cycle.
    pub fn clear_schedule(&mut self) {
        for inst in &mut self.instructions {
            inst.cycle = None;
        }
    }

    /// Stable-sort the instructions by assigned cycle; unscheduled
    /// instructions go last and ties keep their current relative order.
    pub fn sort_by_cycle(&mut self) {
        self.instructions
            .sort_by_key(|inst| (inst.cycle.is_none(), inst.cycle.unwrap_or(0)));
    }

    /// Span in cycles from the earliest start to the latest end among the
    /// scheduled instructions; 0 when nothing is scheduled.
    pub fn depth(&self) -> u64 {
        let mut start = u64::MAX;
        let mut end = 0;
        for inst in &self.instructions {
            if let Some(cycle) = inst.cycle {
                start = start.min(cycle);
                end = end.max(cycle.saturating_add(self.duration_in_cycles(inst)));
            }
        }
        end.saturating_sub(start)
    }

    /// Create a Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        circuit.h(QubitId(0))?;
        circuit.cx(QubitId(0), QubitId(1))?;
        circuit.measure_all()?;
        Ok(circuit)
    }

    /// Create an n-qubit GHZ state circuit fanning out from qubit 0.
    ///
    /// All CNOTs share their control, so they are free to be reordered.
    pub fn ghz(n: u32) -> IrResult<Self> {
        let mut circuit = Self::with_size("ghz", n, n);
        if n == 0 {
            return Ok(circuit);
        }
        circuit.h(QubitId(0))?;
        for i in 1..n {
            circuit.cx(QubitId(0), QubitId(i))?;
        }
        circuit.measure_all()?;
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_circuit() {
        let mut circuit = Circuit::with_size("test", 2, 1);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.measure(QubitId(1), ClbitId(0)).unwrap();

        assert_eq!(circuit.len(), 3);
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 1);
        assert!(!circuit.is_scheduled());
        assert_eq!(circuit.depth(), 0);
    }

    #[test]
    fn test_operand_validation() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        assert!(matches!(
            circuit.cx(QubitId(0), QubitId(5)),
            Err(IrError::QubitNotFound { qubit: QubitId(5), .. })
        ));
        assert!(matches!(
            circuit.cx(QubitId(1), QubitId(1)),
            Err(IrError::DuplicateQubit { .. })
        ));
        assert!(matches!(
            circuit.gate(StandardGate::CX, [QubitId(0)]),
            Err(IrError::QubitCountMismatch {
                expected: 2,
                got: 1,
                ..
            })
        ));
        assert!(matches!(
            circuit.measure(QubitId(0), ClbitId(0)),
            Err(IrError::ClbitNotFound { .. })
        ));
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_duration_in_cycles_rounds_up() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit.set_cycle_time(20).unwrap();
        let h = Instruction::single_qubit_gate(StandardGate::H, QubitId(0));
        assert_eq!(circuit.duration_in_cycles(&h), 1);
        assert_eq!(circuit.duration_in_cycles(&h.clone().with_duration(50)), 3);
        assert_eq!(circuit.duration_in_cycles(&Instruction::barrier([])), 0);
        assert!(circuit.set_cycle_time(0).is_err());
    }

    #[test]
    fn test_depth_and_sort_by_cycle() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.x(QubitId(1)).unwrap();

        let cycles = [3, 1, 0];
        for (inst, cycle) in circuit.instructions_mut().iter_mut().zip(cycles) {
            inst.cycle = Some(cycle);
        }
        circuit.sort_by_cycle();

        let names: Vec<_> = circuit.instructions().iter().map(Instruction::name).collect();
        assert_eq!(names, vec!["x", "cx", "h"]);
        // h ends at 3 + 1, x starts at 0
        assert_eq!(circuit.depth(), 4);
    }

    #[test]
    fn test_apply_durations() {
        let mut circuit = Circuit::bell().unwrap();
        let mut table = FxHashMap::default();
        table.insert("cx".to_string(), 60);
        circuit.apply_durations(&table);
        let cx = circuit
            .instructions()
            .iter()
            .find(|inst| inst.name() == "cx")
            .unwrap();
        assert_eq!(cx.duration, 60);
    }

    #[test]
    fn test_ghz_shape() {
        let circuit = Circuit::ghz(4).unwrap();
        // h + 3 cx + 4 measure
        assert_eq!(circuit.len(), 8);
        assert_eq!(Circuit::ghz(0).unwrap().len(), 0);
    }

    #[test]
    fn test_json_roundtrip_keeps_cycles() {
        let mut circuit = Circuit::bell().unwrap();
        circuit.instructions_mut()[0].cycle = Some(0);
        let json = serde_json::to_string(&circuit).unwrap();
        let back: Circuit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, circuit);
    }

    #[test]
    fn test_three_qubit_and_swap_gates() {
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.swap(QubitId(0), QubitId(1)).unwrap();
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        circuit.barrier([QubitId(2)]).unwrap();

        assert_eq!(circuit.instructions()[0].to_string(), "swap q0, q1");
        assert_eq!(circuit.instructions()[1].duration, crate::instruction::THREE_QUBIT_DURATION);
        assert!(circuit.instructions()[2].is_barrier());
        assert!(!circuit.instructions()[2].is_full_barrier());
        assert!(matches!(
            circuit.ccx(QubitId(0), QubitId(0), QubitId(2)),
            Err(IrError::DuplicateQubit { .. })
        ));
    }

    #[test]
    fn test_clear_schedule() {
        let mut circuit = Circuit::bell().unwrap();
        for (i, inst) in circuit.instructions_mut().iter_mut().enumerate() {
            inst.cycle = Some(i as u64);
        }
        assert!(circuit.is_scheduled());

        circuit.clear_schedule();
        assert!(!circuit.is_scheduled());
        assert_eq!(circuit.depth(), 0);
    }
}
