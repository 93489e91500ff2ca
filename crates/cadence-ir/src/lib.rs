//! Cadence Circuit Intermediate Representation
//!
//! This crate provides the instruction-level data structures that the
//! Cadence scheduler consumes and mutates.
//!
//! # Overview
//!
//! A [`Circuit`] is an ordered list of [`Instruction`]s over a fixed number
//! of qubits and classical bits. Each instruction carries a duration in
//! nanoseconds and, once scheduled, the cycle it starts in. Every
//! instruction kind classifies its operands into [`AccessRole`]s, which is
//! what the dependency analysis is built on:
//!
//! - `Read`: order-insensitive use (CZ operands, CNOT controls)
//! - `Controlled`: controlled-target use (CNOT targets)
//! - `Write`: everything else
//!
//! # Example
//!
//! ```rust
//! use cadence_ir::{AccessRole, Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("fanout", 3, 0);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.cx(QubitId(0), QubitId(2)).unwrap();
//!
//! let roles: Vec<_> = circuit.instructions()[1]
//!     .accesses(true)
//!     .into_iter()
//!     .map(|a| a.role)
//!     .collect();
//! assert_eq!(roles, vec![AccessRole::Read, AccessRole::Controlled]);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Operand roles |
//! |------|--------|---------------|
//! | `H`, `X`, `Y`, `Z`, `S`, `Sdg`, `T`, `Tdg`, `Rx`, `Ry`, `Rz` | 1 | write |
//! | `CX` | 2 | read, controlled |
//! | `CZ`, `CP`, `CRz`, `RZZ` | 2 | read, read |
//! | `CY` | 2 | read, write |
//! | `Swap` | 2 | write, write |
//! | `CCX` | 3 | read, read, controlled |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::{Circuit, DEFAULT_CYCLE_TIME};
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Access, AccessRole, Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId, WireId};
