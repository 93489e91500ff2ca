//! Dependency graph over the instructions of a circuit.
//!
//! Every instruction becomes one node; a `Source` and a `Sink` sentinel
//! bound the graph. Edges are typed by the access roles of the two
//! instructions on the register that caused them:
//!
//! | Earlier \ Later | Write | Read | Controlled |
//! |-----------------|-------|------|------------|
//! | Write           | WAW   | RAW  | DAW        |
//! | Read            | WAR   | RAR  | DAR        |
//! | Controlled      | WAD   | RAD  | DAD        |
//!
//! Consecutive reads of a register are left unordered, and so are
//! consecutive controlled accesses; the base graph never contains `RAR` or
//! `DAD` edges. Those are only added as synthetic edges while a variation is
//! being tried.
//!
//! The graph is a [`StableDiGraph`] so edges can be removed by id without
//! invalidating any other node or edge index.

use petgraph::Direction as EdgeDirection;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences, NodeIndexable};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;

use cadence_ir::{AccessRole, Circuit, ClbitId, Instruction, QubitId, WireId};

/// Node index type for the dependency graph.
pub type DepNodeIndex = NodeIndex<u32>;

/// Edge index type for the dependency graph.
pub type DepEdgeIndex = EdgeIndex<u32>;

/// Dependency type of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DepType {
    /// Write after write.
    Waw,
    /// Read after write.
    Raw,
    /// Write after read.
    War,
    /// Read after read; synthetic only.
    Rar,
    /// Controlled after write.
    Daw,
    /// Controlled after read.
    Dar,
    /// Write after controlled.
    Wad,
    /// Read after controlled.
    Rad,
    /// Controlled after controlled; synthetic only.
    Dad,
}

impl DepType {
    /// The dependency of a `later` access on an `earlier` one.
    pub fn between(earlier: AccessRole, later: AccessRole) -> Self {
        use AccessRole::{Controlled, Read, Write};
        match (earlier, later) {
            (Write, Write) => DepType::Waw,
            (Write, Read) => DepType::Raw,
            (Write, Controlled) => DepType::Daw,
            (Read, Write) => DepType::War,
            (Read, Read) => DepType::Rar,
            (Read, Controlled) => DepType::Dar,
            (Controlled, Write) => DepType::Wad,
            (Controlled, Read) => DepType::Rad,
            (Controlled, Controlled) => DepType::Dad,
        }
    }

    /// Short upper-case name, e.g. `WAR`.
    pub fn name(self) -> &'static str {
        match self {
            DepType::Waw => "WAW",
            DepType::Raw => "RAW",
            DepType::War => "WAR",
            DepType::Rar => "RAR",
            DepType::Daw => "DAW",
            DepType::Dar => "DAR",
            DepType::Wad => "WAD",
            DepType::Rad => "RAD",
            DepType::Dad => "DAD",
        }
    }
}

impl fmt::Display for DepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepNode {
    /// Sentinel preceding every instruction.
    Source,
    /// Sentinel following every instruction.
    Sink,
    /// An instruction, by position in the circuit.
    Op {
        /// Index into the circuit's instruction list.
        index: usize,
        /// Duration in cycles.
        duration: u64,
    },
}

impl DepNode {
    /// Duration in cycles; zero for the sentinels.
    #[inline]
    pub fn duration(&self) -> u64 {
        match self {
            DepNode::Op { duration, .. } => *duration,
            DepNode::Source | DepNode::Sink => 0,
        }
    }

    /// Instruction index if this is an operation node.
    #[inline]
    pub fn op_index(&self) -> Option<usize> {
        match self {
            DepNode::Op { index, .. } => Some(*index),
            DepNode::Source | DepNode::Sink => None,
        }
    }
}

/// An edge in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepEdge {
    /// The dependency type.
    pub kind: DepType,
    /// The register that causes the dependency.
    pub cause: WireId,
    /// Minimum cycle distance between the two start cycles.
    pub weight: u64,
    /// Added for one variation trial and removed afterwards.
    pub synthetic: bool,
}

/// Comparable view of one edge, used to check that the graph is restored
/// after a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeSnapshot {
    /// Source node index.
    pub source: usize,
    /// Target node index.
    pub target: usize,
    /// The dependency type.
    pub kind: DepType,
    /// The causing register.
    pub cause: WireId,
}

/// Per-register bookkeeping while the graph is built.
///
/// `run` is the current group of mutually unordered `Read` (or
/// `Controlled`) accesses, `before_run` the group of the other unordered role
/// that immediately preceded it.
struct WireState {
    last_writer: DepNodeIndex,
    run_role: AccessRole,
    run: Vec<DepNodeIndex>,
    before_role: AccessRole,
    before_run: Vec<DepNodeIndex>,
}

impl WireState {
    fn new(writer: DepNodeIndex) -> Self {
        Self {
            last_writer: writer,
            run_role: AccessRole::Write,
            run: vec![],
            before_role: AccessRole::Write,
            before_run: vec![],
        }
    }
}

/// Dependency graph of one circuit.
///
/// The graph borrows the circuit: nodes refer to instructions by index and
/// the circuit cannot change while the graph exists.
#[derive(Debug)]
pub struct DependencyGraph<'c> {
    circuit: &'c Circuit,
    graph: StableDiGraph<DepNode, DepEdge, u32>,
    source: DepNodeIndex,
    sink: DepNodeIndex,
    ops: Vec<DepNodeIndex>,
    commute: bool,
}

impl<'c> DependencyGraph<'c> {
    /// Build the dependency graph of `circuit`.
    ///
    /// With `commute` unset every access is treated as a write, so no two
    /// accesses to a register are left unordered.
    pub fn build(circuit: &'c Circuit, commute: bool) -> Self {
        let mut graph = StableDiGraph::with_capacity(circuit.len() + 2, circuit.len() * 2);
        let source = graph.add_node(DepNode::Source);

        let wires: Vec<WireId> = (0..circuit.num_qubits())
            .map(|q| WireId::Qubit(QubitId(q as u32)))
            .chain((0..circuit.num_clbits()).map(|c| WireId::Clbit(ClbitId(c as u32))))
            .collect();

        let mut dag = Self {
            circuit,
            graph,
            source,
            sink: source,
            ops: Vec::with_capacity(circuit.len()),
            commute,
        };

        let mut states: FxHashMap<WireId, WireState> = wires
            .iter()
            .map(|&wire| (wire, WireState::new(source)))
            .collect();

        for (index, inst) in circuit.instructions().iter().enumerate() {
            let node = dag.graph.add_node(DepNode::Op {
                index,
                duration: circuit.duration_in_cycles(inst),
            });
            dag.ops.push(node);

            if inst.is_full_barrier() {
                for wire in &wires {
                    dag.access(&mut states, node, *wire, AccessRole::Write);
                }
            } else {
                for access in inst.accesses(commute) {
                    debug_assert!(
                        states.contains_key(&access.wire),
                        "operand {} of '{inst}' is outside the circuit",
                        access.wire
                    );
                    dag.access(&mut states, node, access.wire, access.role);
                }
            }
        }

        let sink = dag.graph.add_node(DepNode::Sink);
        dag.sink = sink;
        for wire in &wires {
            dag.access(&mut states, sink, *wire, AccessRole::Write);
        }

        dag
    }

    /// Record one access of `node` to `wire` and add the edges it implies.
    fn access(
        &mut self,
        states: &mut FxHashMap<WireId, WireState>,
        node: DepNodeIndex,
        wire: WireId,
        role: AccessRole,
    ) {
        let Some(state) = states.get_mut(&wire) else {
            return;
        };

        // Every access is ordered after the last write.
        self.add_base_edge(state.last_writer, node, DepType::between(AccessRole::Write, role), wire);

        match role {
            AccessRole::Write => {
                if state.run_role != AccessRole::Write {
                    let kind = DepType::between(state.run_role, AccessRole::Write);
                    for &prev in &state.run {
                        self.add_base_edge(prev, node, kind, wire);
                    }
                }
                state.last_writer = node;
                state.run_role = AccessRole::Write;
                state.run.clear();
                state.before_role = AccessRole::Write;
                state.before_run.clear();
            }
            AccessRole::Read | AccessRole::Controlled => {
                if state.run_role == AccessRole::Write {
                    state.before_role = AccessRole::Write;
                    state.before_run.clear();
                } else if state.run_role != role {
                    // The open run of the other role closes and becomes the
                    // group this new run is ordered after.
                    state.before_role = state.run_role;
                    state.before_run = std::mem::take(&mut state.run);
                }
                if state.before_role != AccessRole::Write {
                    let kind = DepType::between(state.before_role, role);
                    for &prev in &state.before_run {
                        self.add_base_edge(prev, node, kind, wire);
                    }
                }
                state.run_role = role;
                state.run.push(node);
            }
        }
    }

    fn add_base_edge(&mut self, from: DepNodeIndex, to: DepNodeIndex, kind: DepType, cause: WireId) {
        let weight = self.graph[from].duration();
        self.graph.add_edge(
            from,
            to,
            DepEdge {
                kind,
                cause,
                weight,
                synthetic: false,
            },
        );
    }

    /// Add a synthetic ordering edge; its weight is the duration of `from`.
    pub fn add_synthetic_edge(
        &mut self,
        from: DepNodeIndex,
        to: DepNodeIndex,
        kind: DepType,
        cause: WireId,
    ) -> DepEdgeIndex {
        let weight = self.graph[from].duration();
        self.graph.add_edge(
            from,
            to,
            DepEdge {
                kind,
                cause,
                weight,
                synthetic: true,
            },
        )
    }

    /// Remove an edge by id.
    pub fn remove_edge(&mut self, edge: DepEdgeIndex) -> Option<DepEdge> {
        self.graph.remove_edge(edge)
    }

    /// The circuit this graph was built from.
    pub fn circuit(&self) -> &'c Circuit {
        self.circuit
    }

    /// Whether commuting accesses were left unordered.
    pub fn commute(&self) -> bool {
        self.commute
    }

    /// The source sentinel.
    pub fn source(&self) -> DepNodeIndex {
        self.source
    }

    /// The sink sentinel.
    pub fn sink(&self) -> DepNodeIndex {
        self.sink
    }

    /// Node of the instruction at `index`.
    pub fn op_node(&self, index: usize) -> Option<DepNodeIndex> {
        self.ops.get(index).copied()
    }

    /// Number of instruction nodes.
    pub fn num_ops(&self) -> usize {
        self.ops.len()
    }

    /// Get a node.
    #[inline]
    pub fn node(&self, node: DepNodeIndex) -> DepNode {
        self.graph[node]
    }

    /// Get the instruction of an operation node.
    pub fn instruction(&self, node: DepNodeIndex) -> Option<&'c Instruction> {
        let index = self.graph.node_weight(node)?.op_index()?;
        self.circuit.instructions().get(index)
    }

    /// Get an edge.
    pub fn edge(&self, edge: DepEdgeIndex) -> Option<&DepEdge> {
        self.graph.edge_weight(edge)
    }

    /// Source and target of an edge.
    pub fn endpoints(&self, edge: DepEdgeIndex) -> Option<(DepNodeIndex, DepNodeIndex)> {
        self.graph.edge_endpoints(edge)
    }

    /// Iterate over all nodes in creation order: source, instructions, sink.
    pub fn nodes(&self) -> impl Iterator<Item = DepNodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Upper bound of node indices, for index-addressed side tables.
    pub fn node_bound(&self) -> usize {
        self.graph.node_bound()
    }

    /// Incoming edges of a node as `(edge, source node, weight)`.
    pub fn incoming(
        &self,
        node: DepNodeIndex,
    ) -> impl Iterator<Item = (DepEdgeIndex, DepNodeIndex, &DepEdge)> + '_ {
        self.graph
            .edges_directed(node, EdgeDirection::Incoming)
            .map(|e| (e.id(), e.source(), e.weight()))
    }

    /// Outgoing edges of a node as `(edge, target node, weight)`.
    pub fn outgoing(
        &self,
        node: DepNodeIndex,
    ) -> impl Iterator<Item = (DepEdgeIndex, DepNodeIndex, &DepEdge)> + '_ {
        self.graph
            .edges_directed(node, EdgeDirection::Outgoing)
            .map(|e| (e.id(), e.target(), e.weight()))
    }

    /// Number of edges, synthetic ones included.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of synthetic edges currently in the graph.
    pub fn synthetic_edge_count(&self) -> usize {
        self.graph
            .edge_indices()
            .filter(|&e| self.graph[e].synthetic)
            .count()
    }

    /// Check whether the graph, synthetic edges included, has no cycle.
    pub fn is_acyclic(&self) -> bool {
        !petgraph::algo::is_cyclic_directed(&self.graph)
    }

    /// Nodes in topological order, or `None` if the graph has a cycle.
    pub fn topological_order(&self) -> Option<Vec<DepNodeIndex>> {
        petgraph::algo::toposort(&self.graph, None).ok()
    }

    /// Sorted list of all edges by endpoints, type and cause.
    pub fn snapshot(&self) -> Vec<EdgeSnapshot> {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| EdgeSnapshot {
                source: e.source().index(),
                target: e.target().index(),
                kind: e.weight().kind,
                cause: e.weight().cause,
            })
            .collect();
        edges.sort();
        edges
    }

    /// Human-readable label of a node.
    pub fn label(&self, node: DepNodeIndex) -> String {
        match self.graph[node] {
            DepNode::Source => "SOURCE".to_string(),
            DepNode::Sink => "SINK".to_string(),
            DepNode::Op { index, .. } => self
                .circuit
                .instructions()
                .get(index)
                .map_or_else(|| format!("#{index}"), ToString::to_string),
        }
    }
}
