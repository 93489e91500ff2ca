//! Commutation analysis.
//!
//! Instructions that access a register in the same unordered role (several
//! reads, or several controlled accesses) may run in any order. In the
//! dependency graph such a group shows up as the incoming edges of the node
//! that closes the group: `WAR`/`DAR` edges for reads, `WAD`/`RAD` edges for
//! controlled accesses. Each group of two or more is a [`CommutingSet`]; a
//! set of `k` members can be ordered in `k!` ways, and the orderings of all
//! sets combine into `prod(k!)` variations.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::debug;

use cadence_ir::WireId;

use crate::depgraph::{DepNodeIndex, DepType, DependencyGraph};
use crate::error::{SchedError, SchedResult};

/// Which unordered role a commuting set is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CommuteClass {
    /// Reads, closed by `WAR` or `DAR` edges.
    Ordinary,
    /// Controlled accesses, closed by `WAD` or `RAD` edges.
    Controlled,
}

impl CommuteClass {
    /// Class of an edge type, if edges of that type can commute.
    pub fn of(kind: DepType) -> Option<Self> {
        match kind {
            DepType::War | DepType::Dar => Some(CommuteClass::Ordinary),
            DepType::Wad | DepType::Rad => Some(CommuteClass::Controlled),
            _ => None,
        }
    }

    /// Edge type used to impose an order inside a set of this class.
    pub fn synthetic_kind(self) -> DepType {
        match self {
            CommuteClass::Ordinary => DepType::Rar,
            CommuteClass::Controlled => DepType::Dad,
        }
    }
}

impl fmt::Display for CommuteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommuteClass::Ordinary => write!(f, "ordinary"),
            CommuteClass::Controlled => write!(f, "controlled"),
        }
    }
}

/// Instructions that access one register in the same unordered role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommutingSet {
    /// Role class of the members.
    pub class: CommuteClass,
    /// The shared register.
    pub cause: WireId,
    /// First node found closing the set.
    pub target: DepNodeIndex,
    /// Members in program order.
    pub members: Vec<DepNodeIndex>,
}

impl CommutingSet {
    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; sets have at least two members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of orderings, `k!`, or `None` on overflow.
    pub fn orderings(&self) -> Option<u64> {
        factorial(self.members.len())
    }
}

/// `n!`, or `None` if it does not fit in a `u64`.
pub fn factorial(n: usize) -> Option<u64> {
    (2..=n as u64).try_fold(1u64, |acc, i| acc.checked_mul(i))
}

/// All commuting sets of a graph and the number of variations they span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commutation {
    sets: Vec<CommutingSet>,
    total: u64,
}

impl Commutation {
    /// The commuting sets, in discovery order.
    pub fn sets(&self) -> &[CommutingSet] {
        &self.sets
    }

    /// Product of `k!` over all sets; 1 when there is none.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Whether no set has two or more members.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Find every commuting set of `dag`.
///
/// Nodes are visited in index order and only non-synthetic edges are
/// considered. A set found again at a later node (the same members, role and
/// register) is kept once.
///
/// Fails with [`SchedError::VariationOverflow`] when the number of
/// variations does not fit in a `u64`.
pub fn find_commuting_sets(dag: &DependencyGraph<'_>) -> SchedResult<Commutation> {
    let mut sets = Vec::new();
    let mut seen: FxHashSet<(CommuteClass, WireId, Vec<DepNodeIndex>)> = FxHashSet::default();
    let mut total: u64 = 1;

    for node in dag.nodes() {
        let mut groups: BTreeMap<(CommuteClass, WireId), Vec<DepNodeIndex>> = BTreeMap::new();
        for (_, source, edge) in dag.incoming(node) {
            if edge.synthetic {
                continue;
            }
            if let Some(class) = CommuteClass::of(edge.kind) {
                groups.entry((class, edge.cause)).or_default().push(source);
            }
        }

        for ((class, cause), mut members) in groups {
            if members.len() < 2 {
                continue;
            }
            members.sort_unstable();
            if !seen.insert((class, cause, members.clone())) {
                continue;
            }

            let set = CommutingSet {
                class,
                cause,
                target: node,
                members,
            };
            let count = set
                .orderings()
                .and_then(|k| total.checked_mul(k))
                .ok_or(SchedError::VariationOverflow {
                    sets: sets.len() + 1,
                })?;
            total = count;

            debug!(
                "Commuting set {} on {} at {}: {} members, {} orderings",
                sets.len(),
                cause,
                dag.label(node),
                set.len(),
                set.orderings().unwrap_or(0)
            );
            sets.push(set);
        }
    }

    debug!("{} commuting sets, {} variations", sets.len(), total);
    Ok(Commutation { sets, total })
}
