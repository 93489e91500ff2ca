//! Enumeration of commutation variations.
//!
//! A variation index is a mixed-radix number: for a set of `k` members the
//! digits have bases `k, k - 1, ..., 1`, and digit `d` picks the `d`-th
//! member not chosen yet. Sets are decoded in discovery order. Index 0 keeps
//! every set in program order.
//!
//! Trying a variation adds one synthetic edge between each pair of
//! consecutive members of each set. The edges live exactly as long as the
//! [`Trial`] that added them.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::commute::Commutation;
use crate::depgraph::{DepEdgeIndex, DepNodeIndex, DependencyGraph};
use crate::error::SchedResult;
use crate::list::{ListScheduler, Schedule};
use crate::resource::ResourceManager;

/// One decoded variation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variation {
    index: u64,
    orders: Vec<Vec<DepNodeIndex>>,
    digits: Vec<Vec<u64>>,
}

impl Variation {
    /// Decode `index` against the sets of `commutation`.
    ///
    /// Indices past the total wrap around; callers stay below
    /// [`Commutation::total`].
    pub fn decode(commutation: &Commutation, index: u64) -> Self {
        let mut rest = index;
        let mut orders = Vec::with_capacity(commutation.sets().len());
        let mut digits = Vec::with_capacity(commutation.sets().len());

        for set in commutation.sets() {
            let k = set.len();
            let mut used = vec![false; k];
            let mut order = Vec::with_capacity(k);
            let mut set_digits = Vec::with_capacity(k);

            for base in (1..=k as u64).rev() {
                let digit = rest % base;
                rest /= base;
                let pick = used
                    .iter()
                    .enumerate()
                    .filter(|(_, u)| !**u)
                    .nth(digit as usize)
                    .map_or(0, |(i, _)| i);
                used[pick] = true;
                order.push(set.members[pick]);
                set_digits.push(digit);
            }

            orders.push(order);
            digits.push(set_digits);
        }

        Self {
            index,
            orders,
            digits,
        }
    }

    /// The variation index.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Chosen order of each set.
    pub fn orders(&self) -> &[Vec<DepNodeIndex>] {
        &self.orders
    }

    /// Digits per set joined by `-`, sets joined by `|`, e.g. `0-1-0|1-0`.
    pub fn encoding(&self) -> String {
        self.digits
            .iter()
            .map(|set| {
                set.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("-")
            })
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Synthetic edges of one variation, removed from the graph on drop.
pub struct Trial<'g, 'c> {
    dag: &'g mut DependencyGraph<'c>,
    edges: Vec<DepEdgeIndex>,
}

impl<'g, 'c> Trial<'g, 'c> {
    /// Add the ordering edges of `variation` to `dag`.
    pub fn new(
        dag: &'g mut DependencyGraph<'c>,
        commutation: &Commutation,
        variation: &Variation,
    ) -> Self {
        let mut edges = Vec::new();
        for (set, order) in commutation.sets().iter().zip(variation.orders()) {
            let kind = set.class.synthetic_kind();
            for pair in order.windows(2) {
                edges.push(dag.add_synthetic_edge(pair[0], pair[1], kind, set.cause));
            }
        }
        Self { dag, edges }
    }

    /// The graph with this variation's edges in place.
    pub fn graph(&self) -> &DependencyGraph<'c> {
        self.dag
    }

    /// Number of synthetic edges this trial added.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the ordering is consistent with the base dependencies.
    pub fn is_feasible(&self) -> bool {
        self.dag.is_acyclic()
    }
}

impl Drop for Trial<'_, '_> {
    fn drop(&mut self) {
        for edge in self.edges.drain(..).rev() {
            self.dag.remove_edge(edge);
        }
    }
}

/// Result of trying one variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VariationOutcome {
    /// The variation index.
    pub index: u64,
    /// Schedule depth, `None` if the variation has a dependency cycle.
    pub depth: Option<u64>,
}

/// Outcome of one variation together with its encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariationTrace {
    /// The variation index.
    pub index: u64,
    /// Digit encoding, see [`Variation::encoding`].
    pub encoding: String,
    /// Schedule depth, `None` if infeasible.
    pub depth: Option<u64>,
}

/// Summary of the evaluated variations.
///
/// Only the running best outcome and per-depth counts are kept; per-index
/// entries exist only as traces, when recording was requested.
#[derive(Debug, Clone, Default)]
pub struct Enumeration {
    best: Option<VariationOutcome>,
    evaluated: u64,
    feasible: u64,
    histogram: BTreeMap<u64, u64>,
    /// Traces, when recording was requested.
    pub traces: Vec<VariationTrace>,
    /// Number of variations in total.
    pub total: u64,
    /// Whether the limit stopped the search before `total`.
    pub truncated: bool,
}

impl Enumeration {
    /// An empty enumeration over `total` variations.
    pub fn new(total: u64, truncated: bool) -> Self {
        Self {
            total,
            truncated,
            ..Self::default()
        }
    }

    /// Account for one evaluated variation.
    ///
    /// The best outcome has the smallest depth; among equal depths the one
    /// with the lowest index is kept.
    pub fn record(&mut self, outcome: VariationOutcome) {
        self.evaluated += 1;
        let Some(depth) = outcome.depth else {
            return;
        };
        self.feasible += 1;
        *self.histogram.entry(depth).or_insert(0) += 1;

        let better = match self.best {
            Some(best) => (Some(depth), outcome.index) < (best.depth, best.index),
            None => true,
        };
        if better {
            self.best = Some(outcome);
        }
    }

    /// The best feasible outcome so far.
    pub fn best(&self) -> Option<VariationOutcome> {
        self.best
    }

    /// Number of evaluated variations.
    pub fn evaluated(&self) -> u64 {
        self.evaluated
    }

    /// Number of evaluated variations without a dependency cycle.
    pub fn feasible(&self) -> u64 {
        self.feasible
    }

    /// Number of feasible variations per depth.
    pub fn depth_histogram(&self) -> &BTreeMap<u64, u64> {
        &self.histogram
    }
}

/// Tries variations one after another against a single graph.
///
/// Each feasible variation is scheduled with a fresh clone of the resource
/// prototype.
pub struct VariationEnumerator<'r, R> {
    scheduler: ListScheduler,
    prototype: &'r R,
    limit: Option<u64>,
    record_traces: bool,
}

impl<'r, R: ResourceManager + Clone> VariationEnumerator<'r, R> {
    /// Create an enumerator.
    pub fn new(scheduler: ListScheduler, prototype: &'r R) -> Self {
        Self {
            scheduler,
            prototype,
            limit: None,
            record_traces: false,
        }
    }

    /// Evaluate at most `limit` variations.
    #[must_use]
    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    /// Keep a [`VariationTrace`] per evaluated variation.
    #[must_use]
    pub fn with_traces(mut self, record: bool) -> Self {
        self.record_traces = record;
        self
    }

    /// Schedule `dag` under one variation, or `None` if it is cyclic.
    pub fn try_variation(
        &self,
        dag: &mut DependencyGraph<'_>,
        commutation: &Commutation,
        variation: &Variation,
    ) -> SchedResult<Option<Schedule>> {
        let trial = Trial::new(dag, commutation, variation);
        if !trial.is_feasible() {
            return Ok(None);
        }
        let mut resources = self.prototype.clone();
        let schedule = self.scheduler.schedule(trial.graph(), &mut resources)?;
        Ok(Some(schedule))
    }

    /// Evaluate variations `0..total` (or up to the limit) in index order.
    ///
    /// The graph is left exactly as it was on return, whether or not an
    /// error occurred.
    pub fn enumerate(
        &self,
        dag: &mut DependencyGraph<'_>,
        commutation: &Commutation,
    ) -> SchedResult<Enumeration> {
        let total = commutation.total();
        let count = self.limit.map_or(total, |limit| limit.clamp(1, total));

        let mut enumeration = Enumeration::new(total, count < total);

        for index in 0..count {
            let variation = Variation::decode(commutation, index);
            let depth = self
                .try_variation(dag, commutation, &variation)?
                .map(|s| s.depth());

            match depth {
                Some(depth) => debug!("Variation {index} [{}]: depth {depth}", variation.encoding()),
                None => debug!("Variation {index} [{}]: cyclic, skipped", variation.encoding()),
            }

            enumeration.record(VariationOutcome { index, depth });
            if self.record_traces {
                enumeration.traces.push(VariationTrace {
                    index,
                    encoding: variation.encoding(),
                    depth,
                });
            }
        }

        for (depth, n) in enumeration.depth_histogram() {
            debug!("{n} variations with depth {depth}");
        }

        Ok(enumeration)
    }
}
