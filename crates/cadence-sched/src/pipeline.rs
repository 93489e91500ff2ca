//! The scheduling pipeline: build, analyze, enumerate, select, commit.

use serde::Serialize;
use tracing::{debug, info, instrument};

use cadence_ir::Circuit;

use crate::commute::find_commuting_sets;
use crate::config::{Direction, SchedulerConfig};
use crate::depgraph::DependencyGraph;
use crate::error::SchedResult;
use crate::list::ListScheduler;
use crate::resource::{PlatformResources, ResourceManager};
use crate::select::{realize, select_variation};
use crate::variation::{Variation, VariationEnumerator, VariationTrace};

/// Summary of one scheduling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleReport {
    /// Scheduling direction used.
    pub direction: Direction,
    /// Depth of the committed schedule, in cycles.
    pub depth: u64,
    /// Number of commuting sets found.
    pub commuting_sets: usize,
    /// Number of variations in total.
    pub total_variations: u64,
    /// Number of variations evaluated.
    pub evaluated: u64,
    /// Number of evaluated variations without a dependency cycle.
    pub feasible: u64,
    /// Whether the variation limit cut the search short.
    pub truncated: bool,
    /// Index of the committed variation.
    pub selected: u64,
    /// Digit encoding of the committed variation.
    pub encoding: String,
    /// Depth of scheduling the graph with every commuting set left open.
    pub baseline_depth: u64,
    /// Per-variation traces, if requested.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub traces: Vec<VariationTrace>,
}

impl ScheduleReport {
    fn single(direction: Direction, depth: u64) -> Self {
        Self {
            direction,
            depth,
            commuting_sets: 0,
            total_variations: 1,
            evaluated: 1,
            feasible: 1,
            truncated: false,
            selected: 0,
            encoding: String::new(),
            baseline_depth: depth,
            traces: vec![],
        }
    }
}

/// Commutation-aware scheduler.
///
/// ```
/// use cadence_ir::{Circuit, QubitId};
/// use cadence_sched::{CommuteScheduler, PlatformResources, SchedulerConfig};
///
/// let mut circuit = Circuit::with_size("fan", 4, 0);
/// for t in 1..4 {
///     circuit.cz(QubitId(0), QubitId(t)).unwrap();
/// }
///
/// let scheduler = CommuteScheduler::new(
///     SchedulerConfig::new(),
///     PlatformResources::qubit_exclusive(),
/// );
/// let report = scheduler.run(&mut circuit).unwrap();
///
/// assert_eq!(report.total_variations, 6);
/// assert_eq!(report.depth, 6);
/// assert!(circuit.is_scheduled());
/// ```
#[derive(Debug, Clone)]
pub struct CommuteScheduler<R = PlatformResources> {
    config: SchedulerConfig,
    resources: R,
}

impl<R: ResourceManager + Clone> CommuteScheduler<R> {
    /// Create a scheduler from a configuration and a resource prototype.
    pub fn new(config: SchedulerConfig, resources: R) -> Self {
        Self { config, resources }
    }

    /// Schedule `circuit` in place.
    ///
    /// On success every instruction has its cycle assigned and the
    /// instruction list is ordered by cycle. On error the circuit is left
    /// untouched.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    pub fn run(&self, circuit: &mut Circuit) -> SchedResult<ScheduleReport> {
        self.config.validate()?;
        let direction = self.config.direction;
        let scheduler = ListScheduler::new(direction);

        info!(
            "Scheduling {} instructions on {} qubits ({direction}, commutation {})",
            circuit.len(),
            circuit.num_qubits(),
            if self.config.commute { "on" } else { "off" }
        );

        if circuit.is_empty() {
            info!("Empty circuit, nothing to schedule");
            return Ok(ScheduleReport::single(direction, 0));
        }

        if !self.config.commute {
            let schedule = {
                let dag = DependencyGraph::build(circuit, false);
                scheduler.schedule(&dag, &mut self.resources.clone())?
            };
            schedule.commit(circuit);
            info!("Scheduled without commutation, depth: {}", schedule.depth());
            return Ok(ScheduleReport::single(direction, schedule.depth()));
        }

        let (schedule, report) = {
            let mut dag = DependencyGraph::build(circuit, true);
            let commutation = find_commuting_sets(&dag)?;
            info!(
                "{} commuting sets, {} variations",
                commutation.sets().len(),
                commutation.total()
            );

            let baseline_depth = scheduler.schedule(&dag, &mut self.resources.clone())?.depth();
            debug!("Depth without ordering the commuting sets: {baseline_depth}");

            let enumerator = VariationEnumerator::new(scheduler, &self.resources)
                .with_limit(self.config.variation_limit)
                .with_traces(self.config.record_traces);
            let enumeration = enumerator.enumerate(&mut dag, &commutation)?;
            if enumeration.truncated {
                info!(
                    "Variation limit reached: evaluated {} of {}",
                    enumeration.evaluated(),
                    enumeration.total
                );
            }

            let chosen = select_variation(&enumeration)?;
            let schedule = realize(&enumerator, &mut dag, &commutation, chosen)?;
            let encoding = Variation::decode(&commutation, chosen.index).encoding();

            let report = ScheduleReport {
                direction,
                depth: schedule.depth(),
                commuting_sets: commutation.sets().len(),
                total_variations: enumeration.total,
                evaluated: enumeration.evaluated(),
                feasible: enumeration.feasible(),
                truncated: enumeration.truncated,
                selected: chosen.index,
                encoding,
                baseline_depth,
                traces: enumeration.traces,
            };
            (schedule, report)
        };

        schedule.commit(circuit);
        info!(
            "Selected variation {} of {} ({} feasible), depth: {}",
            report.selected, report.evaluated, report.feasible, report.depth
        );
        Ok(report)
    }
}
