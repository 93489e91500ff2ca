//! Cadence Commutation-Aware Scheduler
//!
//! This crate assigns a start cycle to every instruction of a
//! [`cadence_ir::Circuit`] under hardware resource constraints, and uses the
//! freedom that commuting two-qubit gates give to look for the shortest
//! schedule.
//!
//! # Overview
//!
//! Gates such as CZ, or CNOTs sharing a control, may be executed in any
//! order. The dependency graph leaves those groups unordered; every way of
//! ordering all of them is a *variation*. The scheduler tries each variation,
//! keeps the shortest, and writes it back to the circuit.
//!
//! # Architecture
//!
//! ```text
//! Circuit
//!    │
//!    ▼
//! DependencyGraph::build ──► find_commuting_sets ──► Commutation (sets, total)
//!    │                                                   │
//!    ▼                                                   ▼
//! VariationEnumerator ◄── PlatformResources   Variation::decode / Trial
//!    │
//!    ▼
//! select_variation ──► realize ──► Schedule::commit ──► scheduled Circuit
//! ```
//!
//! # Example
//!
//! ```rust
//! use cadence_ir::{Circuit, QubitId};
//! use cadence_sched::{CommuteScheduler, Direction, PlatformResources, SchedulerConfig};
//!
//! let mut circuit = Circuit::ghz(4).unwrap();
//!
//! let config = SchedulerConfig::new().with_direction(Direction::Backward);
//! let scheduler = CommuteScheduler::new(config, PlatformResources::qubit_exclusive());
//! let report = scheduler.run(&mut circuit).unwrap();
//!
//! println!("depth {} after {} variations", report.depth, report.evaluated);
//! assert_eq!(circuit.depth(), report.depth);
//! ```
//!
//! # Dependency Types
//!
//! | Earlier \ Later | Write | Read | Controlled |
//! |-----------------|-------|------|------------|
//! | Write           | WAW   | RAW  | DAW        |
//! | Read            | WAR   | RAR  | DAR        |
//! | Controlled      | WAD   | RAD  | DAD        |
//!
//! `RAR` and `DAD` edges only exist while a variation is being tried.

pub mod commute;
pub mod config;
pub mod depgraph;
pub mod error;
pub mod list;
pub mod pipeline;
pub mod resource;
pub mod select;
pub mod variation;

pub use commute::{CommuteClass, Commutation, CommutingSet, find_commuting_sets};
pub use config::{Direction, SchedulerConfig};
pub use depgraph::{DepEdge, DepNode, DepType, DependencyGraph, EdgeSnapshot};
pub use error::{SchedError, SchedResult};
pub use list::{ListScheduler, Schedule};
pub use pipeline::{CommuteScheduler, ScheduleReport};
pub use resource::{ConcurrencyLimit, GateClass, PlatformResources, ResourceConfig, ResourceManager};
pub use select::{realize, select_variation};
pub use variation::{
    Enumeration, Trial, Variation, VariationEnumerator, VariationOutcome, VariationTrace,
};
