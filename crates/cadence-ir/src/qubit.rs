//! Qubit, classical bit and wire identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a qubit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QubitId(pub u32);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Unique identifier for a classical bit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClbitId(pub u32);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

/// A register an instruction touches: either a qubit or a classical bit.
///
/// Dependency edges record the wire that caused them, so commuting gates can
/// later be grouped per operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireId::Qubit(q) => q.fmt(f),
            WireId::Clbit(c) => c.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(format!("{}", QubitId(3)), "q3");
        assert_eq!(format!("{}", ClbitId(1)), "c1");
        assert_eq!(format!("{}", WireId::from(QubitId(0))), "q0");
        assert_eq!(format!("{}", WireId::from(ClbitId(2))), "c2");
    }

    #[test]
    fn test_wire_ordering_puts_qubits_first() {
        let mut wires = vec![
            WireId::Clbit(ClbitId(0)),
            WireId::Qubit(QubitId(1)),
            WireId::Qubit(QubitId(0)),
        ];
        wires.sort();
        assert_eq!(
            wires,
            vec![
                WireId::Qubit(QubitId(0)),
                WireId::Qubit(QubitId(1)),
                WireId::Clbit(ClbitId(0)),
            ]
        );
    }
}
