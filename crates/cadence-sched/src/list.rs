//! Resource-constrained list scheduling of a dependency graph.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::trace;

use cadence_ir::Circuit;

use crate::config::Direction;
use crate::depgraph::{DepNode, DepNodeIndex, DependencyGraph};
use crate::error::{SchedError, SchedResult};
use crate::resource::ResourceManager;

/// Largest sum of instruction durations, in cycles, the scheduler accepts.
///
/// Keeps every bound, priority and probed cycle well inside `i64`.
pub const MAX_SPAN: u64 = (i64::MAX / 4) as u64;

/// Start cycles of every instruction of one circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    cycles: Vec<u64>,
    depth: u64,
}

impl Schedule {
    /// Start cycle of each instruction, by position in the circuit.
    pub fn cycles(&self) -> &[u64] {
        &self.cycles
    }

    /// Start cycle of the instruction at `index`.
    pub fn cycle(&self, index: usize) -> Option<u64> {
        self.cycles.get(index).copied()
    }

    /// Cycles from the first start to the last end.
    pub fn depth(&self) -> u64 {
        self.depth
    }

    /// Write the cycles into the circuit and reorder its instructions by
    /// start cycle. Instructions starting in the same cycle keep their
    /// relative order.
    pub fn commit(&self, circuit: &mut Circuit) {
        for (inst, &cycle) in circuit.instructions_mut().iter_mut().zip(&self.cycles) {
            inst.cycle = Some(cycle);
        }
        circuit.sort_by_cycle();
    }
}

/// List scheduler over a [`DependencyGraph`].
///
/// Ready nodes are taken by the longest weighted path to the far sentinel,
/// lowest node index first on ties. Each node starts at its dependency
/// bound, or the first cycle past it the resource manager accepts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListScheduler {
    direction: Direction,
}

impl ListScheduler {
    /// Create a scheduler for `direction`.
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }

    /// Schedule every node of `dag`, reserving resources as nodes are placed.
    ///
    /// Every edge in the graph is respected, synthetic ones included.
    pub fn schedule<R: ResourceManager + ?Sized>(
        &self,
        dag: &DependencyGraph<'_>,
        resources: &mut R,
    ) -> SchedResult<Schedule> {
        let total = dag
            .nodes()
            .try_fold(0u64, |sum, n| sum.checked_add(dag.node(n).duration()))
            .filter(|&sum| sum <= MAX_SPAN)
            .ok_or(SchedError::DurationOverflow)?;
        // Lossless below MAX_SPAN.
        let horizon = i64::try_from(total).map_err(|_| SchedError::DurationOverflow)? + 1;

        let forward = self.direction == Direction::Forward;
        let mut order = dag
            .topological_order()
            .ok_or(SchedError::CyclicDependencies)?;
        let bound = dag.node_bound();

        // Longest weighted path to the far sentinel, computed against the
        // scheduling direction.
        let mut priority = vec![0u64; bound];
        if forward {
            order.reverse();
        }
        for &node in &order {
            let longest = self
                .after(dag, node)
                .map(|(next, weight)| weight + priority[next.index()])
                .max()
                .unwrap_or(0);
            priority[node.index()] = longest;
        }

        let mut waiting = vec![0usize; bound];
        let mut ready = BinaryHeap::new();
        for node in dag.nodes() {
            waiting[node.index()] = self.before(dag, node).count();
            if waiting[node.index()] == 0 {
                ready.push((priority[node.index()], Reverse(node.index()), node));
            }
        }

        let mut cycle: Vec<Option<i64>> = vec![None; bound];
        while let Some((_, _, node)) = ready.pop() {
            let start = match dag.node(node) {
                DepNode::Op { duration, .. } => {
                    let placed = self.place(dag, node, duration, &cycle, horizon, resources)?;
                    trace!(node = node.index(), cycle = placed, "placed {}", dag.label(node));
                    placed
                }
                DepNode::Source | DepNode::Sink => self.dependency_bound(dag, node, &cycle),
            };
            cycle[node.index()] = Some(start);

            for (next, _) in self.after(dag, node) {
                let count = &mut waiting[next.index()];
                *count -= 1;
                if *count == 0 {
                    ready.push((priority[next.index()], Reverse(next.index()), next));
                }
            }
        }

        let mut starts = Vec::with_capacity(dag.num_ops());
        for index in 0..dag.num_ops() {
            let start = dag
                .op_node(index)
                .and_then(|n| cycle[n.index()])
                .ok_or(SchedError::CyclicDependencies)?;
            starts.push(start);
        }

        let first = starts.iter().copied().min().unwrap_or(0);
        let cycles: Vec<u64> = starts.iter().map(|&c| (c - first).unsigned_abs()).collect();
        let depth = (0..dag.num_ops())
            .filter_map(|i| Some(cycles[i] + dag.node(dag.op_node(i)?).duration()))
            .max()
            .unwrap_or(0);

        Ok(Schedule { cycles, depth })
    }

    /// Neighbours that must be placed before `node`, with the edge weight.
    fn before<'a>(
        &self,
        dag: &'a DependencyGraph<'_>,
        node: DepNodeIndex,
    ) -> Box<dyn Iterator<Item = (DepNodeIndex, u64)> + 'a> {
        match self.direction {
            Direction::Forward => Box::new(dag.incoming(node).map(|(_, n, e)| (n, e.weight))),
            Direction::Backward => Box::new(dag.outgoing(node).map(|(_, n, e)| (n, e.weight))),
        }
    }

    /// Neighbours that are placed after `node`, with the edge weight.
    fn after<'a>(
        &self,
        dag: &'a DependencyGraph<'_>,
        node: DepNodeIndex,
    ) -> Box<dyn Iterator<Item = (DepNodeIndex, u64)> + 'a> {
        match self.direction {
            Direction::Forward => Box::new(dag.outgoing(node).map(|(_, n, e)| (n, e.weight))),
            Direction::Backward => Box::new(dag.incoming(node).map(|(_, n, e)| (n, e.weight))),
        }
    }

    /// Earliest (forward) or latest (backward) start allowed by the already
    /// placed neighbours.
    fn dependency_bound(
        &self,
        dag: &DependencyGraph<'_>,
        node: DepNodeIndex,
        cycle: &[Option<i64>],
    ) -> i64 {
        let placed = self
            .before(dag, node)
            .filter_map(|(n, weight)| Some((cycle[n.index()]?, i64::try_from(weight).ok()?)));
        match self.direction {
            Direction::Forward => placed.map(|(c, w)| c.saturating_add(w)).max().unwrap_or(0),
            Direction::Backward => placed.map(|(c, w)| c.saturating_sub(w)).min().unwrap_or(0),
        }
    }

    fn place<R: ResourceManager + ?Sized>(
        &self,
        dag: &DependencyGraph<'_>,
        node: DepNodeIndex,
        duration: u64,
        cycle: &[Option<i64>],
        horizon: i64,
        resources: &mut R,
    ) -> SchedResult<i64> {
        let Some(inst) = dag.instruction(node) else {
            return Err(SchedError::CyclicDependencies);
        };
        let bound = self.dependency_bound(dag, node, cycle);
        let step = match self.direction {
            Direction::Forward => 1,
            Direction::Backward => -1,
        };

        let mut c = bound;
        for _ in 0..=horizon {
            if resources.available(c, inst, duration) {
                resources.reserve(c, inst, duration);
                return Ok(c);
            }
            c += step;
        }
        Err(SchedError::Unplaceable {
            instruction: inst.to_string(),
            cycle: c - step,
        })
    }
}
