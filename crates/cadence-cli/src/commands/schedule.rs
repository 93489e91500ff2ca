//! Schedule command implementation.

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;
use std::fs;
use tracing::debug;

use cadence_ir::Circuit;
use cadence_sched::{CommuteScheduler, Direction, ResourceConfig, ScheduleReport, SchedulerConfig};

use super::common::{CircuitFile, load_circuit, load_platform};

/// Options of the schedule command.
#[derive(Debug, Clone)]
pub struct ScheduleOptions<'a> {
    /// Circuit file (JSON).
    pub input: &'a str,
    /// Platform file (YAML or JSON).
    pub platform: Option<&'a str>,
    /// Output file; the schedule is printed when absent.
    pub output: Option<&'a str>,
    /// Scheduling direction name.
    pub direction: &'a str,
    /// Search over commutation variations.
    pub commute: bool,
    /// Maximum number of variations to evaluate.
    pub limit: Option<u64>,
    /// Print one line per evaluated variation.
    pub trace: bool,
}

/// What `-o` writes: the report and the scheduled circuit.
#[derive(Debug, Serialize)]
struct ScheduleOutput {
    report: ScheduleReport,
    circuit: CircuitFile,
}

/// Execute the schedule command.
pub fn execute(options: &ScheduleOptions<'_>) -> Result<()> {
    let direction: Direction = options.direction.parse()?;
    let mut config = SchedulerConfig::new()
        .with_direction(direction)
        .with_commute(options.commute)
        .with_traces(options.trace);
    if let Some(limit) = options.limit {
        config = config.with_variation_limit(limit);
    }

    println!(
        "{} Scheduling {} ({}, commutation {})",
        style("→").cyan().bold(),
        style(options.input).green(),
        style(direction).yellow(),
        if options.commute { "on" } else { "off" }
    );

    let mut circuit = load_circuit(options.input)?;
    println!(
        "  Loaded: {} qubits, {} instructions",
        circuit.num_qubits(),
        circuit.len()
    );

    let platform = match options.platform {
        Some(path) => {
            let platform = load_platform(path)?;
            println!("  Platform: {}", style(path).green());
            platform
        }
        None => ResourceConfig::default(),
    };
    platform.apply(&mut circuit)?;
    debug!(
        "Platform applied: cycle time {} ns, {} duration overrides, {} limits",
        circuit.cycle_time(),
        platform.durations.len(),
        platform.limits.len()
    );

    let scheduler = CommuteScheduler::new(config, platform.manager()?);
    let report = scheduler
        .run(&mut circuit)
        .with_context(|| format!("Failed to schedule {}", options.input))?;

    print_report(&report);

    match options.output {
        Some(path) => {
            let output = ScheduleOutput {
                report,
                circuit: CircuitFile::from_circuit(&circuit),
            };
            let json = serde_json::to_string_pretty(&output)?;
            fs::write(path, json).with_context(|| format!("Failed to write file: {path}"))?;
            println!("  Output: {}", style(path).green());
        }
        None => print_schedule(&circuit),
    }

    Ok(())
}

fn print_report(report: &ScheduleReport) {
    println!(
        "{} Scheduled: depth {} cycles",
        style("✓").green().bold(),
        style(report.depth).yellow()
    );
    if report.commuting_sets > 0 {
        println!(
            "  Commuting sets: {}, variations: {} ({} evaluated, {} feasible{})",
            report.commuting_sets,
            report.total_variations,
            report.evaluated,
            report.feasible,
            if report.truncated { ", truncated" } else { "" }
        );
        println!(
            "  Selected variation {} [{}], depth before ordering: {}",
            report.selected, report.encoding, report.baseline_depth
        );
    }
    for trace in &report.traces {
        let depth = trace
            .depth
            .map_or_else(|| style("cyclic".to_string()).red(), |d| style(d.to_string()).cyan());
        println!("    #{:<6} {:<24} {}", trace.index, trace.encoding, depth);
    }
}

fn print_schedule(circuit: &Circuit) {
    println!();
    for inst in circuit.instructions() {
        let cycle = inst.cycle.map_or_else(|| "-".to_string(), |c| c.to_string());
        println!("  {:>6}  {}", style(cycle).dim(), inst);
    }
}
