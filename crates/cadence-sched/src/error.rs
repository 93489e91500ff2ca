//! Error handling for the scheduler.

use cadence_ir::IrError;
use thiserror::Error;

/// Result type for scheduler operations.
pub type SchedResult<T> = Result<T, SchedError>;

/// Errors that abort scheduling of the current circuit.
///
/// An infeasible variation is not an error; it is recorded in the
/// enumeration and skipped.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SchedError {
    /// Scheduling direction is not one of the recognized values.
    #[error("Unknown scheduling direction '{0}' (expected forward/asap or backward/alap)")]
    UnknownDirection(String),

    /// Other configuration error.
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// The product of the commuting-set factorials does not fit the counter.
    #[error("Number of variations exceeds {} after {sets} commuting sets", u64::MAX)]
    VariationOverflow {
        /// Commuting sets accumulated when the overflow was detected.
        sets: usize,
    },

    /// Every evaluated variation produced a dependency cycle.
    #[error("Internal error: none of {evaluated} variations is acyclic")]
    NoFeasibleVariation {
        /// Number of variations that were evaluated.
        evaluated: u64,
    },

    /// The scheduler was handed a cyclic dependency graph.
    #[error("Internal error: dependency graph contains a cycle")]
    CyclicDependencies,

    /// The instruction durations add up to more cycles than can be scheduled.
    #[error("Total instruction duration exceeds {} cycles", crate::list::MAX_SPAN)]
    DurationOverflow,

    /// The resource manager rejected an instruction at every cycle.
    #[error("Resource manager cannot place '{instruction}' at or beyond cycle {cycle}")]
    Unplaceable {
        /// The instruction, in assembly form.
        instruction: String,
        /// The cycle at which probing gave up.
        cycle: i64,
    },

    /// Error from the circuit representation.
    #[error(transparent)]
    Ir(#[from] IrError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SchedError::UnknownDirection("sideways".to_string());
        assert_eq!(
            err.to_string(),
            "Unknown scheduling direction 'sideways' (expected forward/asap or backward/alap)"
        );

        let err = SchedError::VariationOverflow { sets: 3 };
        assert_eq!(
            err.to_string(),
            "Number of variations exceeds 18446744073709551615 after 3 commuting sets"
        );

        let err = SchedError::NoFeasibleVariation { evaluated: 2 };
        assert_eq!(
            err.to_string(),
            "Internal error: none of 2 variations is acyclic"
        );
    }

    #[test]
    fn test_from_ir_error() {
        let err: SchedError = IrError::ZeroCycleTime.into();
        assert!(matches!(err, SchedError::Ir(IrError::ZeroCycleTime)));
    }
}
