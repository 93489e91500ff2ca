//! Choosing the best variation.

use tracing::debug;

use crate::commute::Commutation;
use crate::depgraph::DependencyGraph;
use crate::error::{SchedError, SchedResult};
use crate::list::Schedule;
use crate::resource::ResourceManager;
use crate::variation::{Enumeration, Variation, VariationEnumerator, VariationOutcome};

/// Feasible outcome with the smallest depth; the lowest index wins ties.
pub fn select_variation(enumeration: &Enumeration) -> SchedResult<VariationOutcome> {
    enumeration
        .best()
        .ok_or(SchedError::NoFeasibleVariation {
            evaluated: enumeration.evaluated(),
        })
}

/// Schedule the chosen variation once more.
///
/// The synthetic edges are removed again before this returns; the caller
/// commits the schedule to the circuit.
pub fn realize<R: ResourceManager + Clone>(
    enumerator: &VariationEnumerator<'_, R>,
    dag: &mut DependencyGraph<'_>,
    commutation: &Commutation,
    chosen: VariationOutcome,
) -> SchedResult<Schedule> {
    let variation = Variation::decode(commutation, chosen.index);
    debug!(
        "Realizing variation {} [{}]",
        chosen.index,
        variation.encoding()
    );
    enumerator
        .try_variation(dag, commutation, &variation)?
        .ok_or(SchedError::NoFeasibleVariation { evaluated: 1 })
}
