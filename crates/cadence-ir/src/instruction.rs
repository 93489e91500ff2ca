//! Circuit instructions combining an operation with its operands.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gate::StandardGate;
use crate::qubit::{ClbitId, QubitId, WireId};

/// Default duration of a single-qubit gate, in nanoseconds.
pub const SINGLE_QUBIT_DURATION: u64 = 20;
/// Default duration of a two-qubit gate, in nanoseconds.
pub const TWO_QUBIT_DURATION: u64 = 40;
/// Default duration of a three-qubit gate, in nanoseconds.
pub const THREE_QUBIT_DURATION: u64 = 80;
/// Default duration of a measurement, in nanoseconds.
pub const MEASURE_DURATION: u64 = 300;
/// Default duration of a reset, in nanoseconds.
pub const RESET_DURATION: u64 = 200;

/// The kind of instruction in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionKind {
    /// A quantum gate operation.
    Gate(StandardGate),
    /// Measurement of qubits into classical bits.
    Measure,
    /// Reset qubit to |0⟩.
    Reset,
    /// Barrier (synchronization point). Without operands it fences the
    /// whole circuit.
    Barrier,
    /// Idle for the instruction's duration across the whole circuit.
    Wait,
    /// Classical operation on classical bits (e.g. register arithmetic,
    /// control flow). Without operands it fences the whole circuit.
    Classical {
        /// Mnemonic of the classical operation.
        name: String,
    },
}

/// How an instruction accesses one of its operands.
///
/// Two `Read` accesses of the same register commute, and so do two
/// `Controlled` accesses; every other combination is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessRole {
    /// Order-insensitive use, e.g. a CZ operand or a CNOT control.
    Read,
    /// Ordinary write; ordered against every other access.
    Write,
    /// Controlled-target use, e.g. a CNOT target.
    Controlled,
}

/// One operand access of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    /// The register accessed.
    pub wire: WireId,
    /// The role the instruction plays on it.
    pub role: AccessRole,
}

/// A complete instruction with operands, duration and assigned cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
    /// Qubits this instruction operates on.
    #[serde(default)]
    pub qubits: Vec<QubitId>,
    /// Classical bits this instruction operates on.
    #[serde(default)]
    pub clbits: Vec<ClbitId>,
    /// Duration in nanoseconds.
    pub duration: u64,
    /// Start cycle assigned by the scheduler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<u64>,
}

impl Instruction {
    /// Create an instruction of any kind with its default duration.
    pub fn new(kind: InstructionKind, qubits: Vec<QubitId>, clbits: Vec<ClbitId>) -> Self {
        let duration = Self::default_duration(&kind);
        Self {
            kind,
            qubits,
            clbits,
            duration,
            cycle: None,
        }
    }

    /// Create a gate instruction.
    pub fn gate(gate: StandardGate, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::new(
            InstructionKind::Gate(gate),
            qubits.into_iter().collect(),
            vec![],
        )
    }

    /// Create a gate instruction conditioned on classical bits.
    pub fn conditional_gate(
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
        condition: impl IntoIterator<Item = ClbitId>,
    ) -> Self {
        Self::new(
            InstructionKind::Gate(gate),
            qubits.into_iter().collect(),
            condition.into_iter().collect(),
        )
    }

    /// Create a single-qubit gate instruction.
    pub fn single_qubit_gate(gate: StandardGate, qubit: QubitId) -> Self {
        Self::gate(gate, [qubit])
    }

    /// Create a two-qubit gate instruction.
    pub fn two_qubit_gate(gate: StandardGate, q1: QubitId, q2: QubitId) -> Self {
        Self::gate(gate, [q1, q2])
    }

    /// Create a measurement instruction.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self::new(InstructionKind::Measure, vec![qubit], vec![clbit])
    }

    /// Create a reset instruction.
    pub fn reset(qubit: QubitId) -> Self {
        Self::new(InstructionKind::Reset, vec![qubit], vec![])
    }

    /// Create a barrier instruction. An empty operand list fences everything.
    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::new(InstructionKind::Barrier, qubits.into_iter().collect(), vec![])
    }

    /// Create a wait instruction idling the whole circuit for `duration` ns.
    pub fn wait(duration: u64) -> Self {
        Self::new(InstructionKind::Wait, vec![], vec![]).with_duration(duration)
    }

    /// Create a classical instruction writing the given classical bits.
    pub fn classical(name: impl Into<String>, clbits: impl IntoIterator<Item = ClbitId>) -> Self {
        Self::new(
            InstructionKind::Classical { name: name.into() },
            vec![],
            clbits.into_iter().collect(),
        )
    }

    /// Override the duration (nanoseconds).
    #[must_use]
    pub fn with_duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }

    /// Duration an instruction of this kind takes when none is given.
    pub fn default_duration(kind: &InstructionKind) -> u64 {
        match kind {
            InstructionKind::Gate(gate) => match gate.num_qubits() {
                1 => SINGLE_QUBIT_DURATION,
                2 => TWO_QUBIT_DURATION,
                _ => THREE_QUBIT_DURATION,
            },
            InstructionKind::Measure => MEASURE_DURATION,
            InstructionKind::Reset => RESET_DURATION,
            InstructionKind::Barrier | InstructionKind::Wait => 0,
            InstructionKind::Classical { .. } => SINGLE_QUBIT_DURATION,
        }
    }

    /// Check if this is a gate instruction.
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    /// Check if this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    /// Check if this is a barrier.
    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, InstructionKind::Barrier)
    }

    /// An instruction without any operand orders against everything before
    /// and after it.
    pub fn is_full_barrier(&self) -> bool {
        self.qubits.is_empty() && self.clbits.is_empty()
    }

    /// Get the gate if this is a gate instruction.
    pub fn as_gate(&self) -> Option<&StandardGate> {
        match &self.kind {
            InstructionKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// Get the name of the instruction.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Reset => "reset",
            InstructionKind::Barrier => "barrier",
            InstructionKind::Wait => "wait",
            InstructionKind::Classical { name } => name,
        }
    }

    /// Classify every operand into its access role.
    ///
    /// With `commute` unset, `Read` and `Controlled` are downgraded to
    /// `Write` so that all accesses stay in program order. Full barriers
    /// return no accesses; callers treat them separately.
    pub fn accesses(&self, commute: bool) -> Vec<Access> {
        let (qubit_roles, clbit_role) = match &self.kind {
            InstructionKind::Gate(gate) => (gate.qubit_roles(), AccessRole::Read),
            InstructionKind::Measure
            | InstructionKind::Reset
            | InstructionKind::Barrier
            | InstructionKind::Wait
            | InstructionKind::Classical { .. } => {
                (vec![AccessRole::Write; self.qubits.len()], AccessRole::Write)
            }
        };

        let demote = |role: AccessRole| if commute { role } else { AccessRole::Write };

        self.qubits
            .iter()
            .zip(qubit_roles.into_iter().chain(std::iter::repeat(AccessRole::Write)))
            .map(|(&q, role)| Access {
                wire: WireId::Qubit(q),
                role: demote(role),
            })
            .chain(self.clbits.iter().map(|&c| Access {
                wire: WireId::Clbit(c),
                role: demote(clbit_role),
            }))
            .collect()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if let Some(theta) = self.as_gate().and_then(StandardGate::angle) {
            write!(f, "({theta})")?;
        }
        let operands: Vec<String> = self
            .qubits
            .iter()
            .map(ToString::to_string)
            .chain(self.clbits.iter().map(ToString::to_string))
            .collect();
        if !operands.is_empty() {
            write!(f, " {}", operands.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_instruction() {
        let inst = Instruction::single_qubit_gate(StandardGate::H, QubitId(0));
        assert!(inst.is_gate());
        assert_eq!(inst.qubits.len(), 1);
        assert_eq!(inst.name(), "h");
        assert_eq!(inst.duration, SINGLE_QUBIT_DURATION);
        assert_eq!(inst.cycle, None);
    }

    #[test]
    fn test_measure_instruction() {
        let inst = Instruction::measure(QubitId(0), ClbitId(0));
        assert!(inst.is_measure());
        assert_eq!(inst.qubits.len(), 1);
        assert_eq!(inst.clbits.len(), 1);
        assert_eq!(inst.duration, MEASURE_DURATION);
    }

    #[test]
    fn test_full_barrier() {
        assert!(Instruction::barrier([]).is_full_barrier());
        assert!(!Instruction::barrier([QubitId(0)]).is_full_barrier());
        assert!(Instruction::wait(100).is_full_barrier());
        assert!(Instruction::classical("br", []).is_full_barrier());
        assert!(!Instruction::classical("ldi", [ClbitId(0)]).is_full_barrier());
    }

    #[test]
    fn test_cnot_accesses() {
        let inst = Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1));
        let accesses = inst.accesses(true);
        assert_eq!(accesses.len(), 2);
        assert_eq!(accesses[0].wire, WireId::Qubit(QubitId(0)));
        assert_eq!(accesses[0].role, AccessRole::Read);
        assert_eq!(accesses[1].wire, WireId::Qubit(QubitId(1)));
        assert_eq!(accesses[1].role, AccessRole::Controlled);

        let ordered = inst.accesses(false);
        assert!(ordered.iter().all(|a| a.role == AccessRole::Write));
    }

    #[test]
    fn test_conditional_gate_reads_condition() {
        let inst = Instruction::conditional_gate(StandardGate::X, [QubitId(2)], [ClbitId(0)]);
        let accesses = inst.accesses(true);
        assert_eq!(accesses[0].role, AccessRole::Write);
        assert_eq!(
            accesses[1],
            Access {
                wire: WireId::Clbit(ClbitId(0)),
                role: AccessRole::Read,
            }
        );
    }

    #[test]
    fn test_display() {
        let cx = Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1));
        assert_eq!(cx.to_string(), "cx q0, q1");
        let m = Instruction::measure(QubitId(2), ClbitId(1));
        assert_eq!(m.to_string(), "measure q2, c1");
        let rz = Instruction::single_qubit_gate(StandardGate::Rz(0.5), QubitId(0));
        assert_eq!(rz.to_string(), "rz(0.5) q0");
        assert_eq!(Instruction::barrier([]).to_string(), "barrier");
    }
}
