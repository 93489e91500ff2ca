//! Quantum gate types.

use serde::{Deserialize, Serialize};

use crate::instruction::AccessRole;

/// Standard gates with known semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled phase gate.
    CP(f64),
    /// Controlled rotation around Z.
    CRz(f64),
    /// ZZ rotation gate.
    RZZ(f64),
    /// SWAP gate.
    Swap,

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CP(_) => "cp",
            StandardGate::CRz(_) => "crz",
            StandardGate::RZZ(_) => "rzz",
            StandardGate::Swap => "swap",
            StandardGate::CCX => "ccx",
        }
    }

    /// Look up a gate by name, case-insensitively. Parameterized gates take
    /// `angle`, defaulting to 0.
    pub fn from_name(name: &str, angle: Option<f64>) -> Option<Self> {
        let theta = angle.unwrap_or(0.0);
        let gate = match name.to_lowercase().as_str() {
            "id" | "i" => StandardGate::I,
            "x" => StandardGate::X,
            "y" => StandardGate::Y,
            "z" => StandardGate::Z,
            "h" => StandardGate::H,
            "s" => StandardGate::S,
            "sdg" => StandardGate::Sdg,
            "t" => StandardGate::T,
            "tdg" => StandardGate::Tdg,
            "rx" => StandardGate::Rx(theta),
            "ry" => StandardGate::Ry(theta),
            "rz" => StandardGate::Rz(theta),
            "cx" | "cnot" => StandardGate::CX,
            "cy" => StandardGate::CY,
            "cz" => StandardGate::CZ,
            "cp" | "cphase" => StandardGate::CP(theta),
            "crz" => StandardGate::CRz(theta),
            "rzz" => StandardGate::RZZ(theta),
            "swap" => StandardGate::Swap,
            "ccx" | "toffoli" => StandardGate::CCX,
            _ => return None,
        };
        Some(gate)
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_) => 1,

            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CP(_)
            | StandardGate::CRz(_)
            | StandardGate::RZZ(_)
            | StandardGate::Swap => 2,

            StandardGate::CCX => 3,
        }
    }

    /// Rotation angle, for the parameterized gates.
    pub fn angle(&self) -> Option<f64> {
        match self {
            StandardGate::Rx(theta)
            | StandardGate::Ry(theta)
            | StandardGate::Rz(theta)
            | StandardGate::CP(theta)
            | StandardGate::CRz(theta)
            | StandardGate::RZZ(theta) => Some(*theta),
            _ => None,
        }
    }

    /// Whether the gate is diagonal in the computational basis on all of its
    /// qubits. Such gates commute with each other on every shared operand.
    pub fn is_diagonal_two_qubit(&self) -> bool {
        matches!(
            self,
            StandardGate::CZ | StandardGate::CP(_) | StandardGate::CRz(_) | StandardGate::RZZ(_)
        )
    }

    /// How each qubit operand is accessed, in operand order.
    ///
    /// Controls (and both operands of diagonal gates) are `Read`: gates that
    /// only read a qubit commute on it. The CNOT/Toffoli target is
    /// `Controlled`: X-type targets commute with each other but not with reads.
    /// The CY target and everything else is a `Write`.
    pub fn qubit_roles(&self) -> Vec<AccessRole> {
        match self {
            _ if self.is_diagonal_two_qubit() => vec![AccessRole::Read, AccessRole::Read],
            StandardGate::CX => vec![AccessRole::Read, AccessRole::Controlled],
            StandardGate::CY => vec![AccessRole::Read, AccessRole::Write],
            StandardGate::CCX => vec![AccessRole::Read, AccessRole::Read, AccessRole::Controlled],
            _ => vec![AccessRole::Write; self.num_qubits() as usize],
        }
    }
}
