//! Inspect command implementation.

use anyhow::Result;
use console::style;

use cadence_sched::{DependencyGraph, SchedError, commute::factorial, find_commuting_sets};

use super::common::load_circuit;

/// Execute the inspect command: print the commuting sets of a circuit.
pub fn execute(input: &str) -> Result<()> {
    let circuit = load_circuit(input)?;
    println!(
        "{} {}: {} qubits, {} classical bits, {} instructions",
        style("→").cyan().bold(),
        style(circuit.name()).green(),
        circuit.num_qubits(),
        circuit.num_clbits(),
        circuit.len()
    );

    let dag = DependencyGraph::build(&circuit, true);
    println!("  Dependency graph: {} edges", dag.edge_count());

    let commutation = match find_commuting_sets(&dag) {
        Ok(commutation) => commutation,
        Err(SchedError::VariationOverflow { sets }) => {
            println!(
                "  {} variation count overflows after {sets} commuting sets",
                style("!").red().bold()
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if commutation.is_empty() {
        println!("  No commuting sets");
        return Ok(());
    }

    for (i, set) in commutation.sets().iter().enumerate() {
        println!(
            "  Set {i}: {} on {}, closed by {} ({} orderings)",
            style(set.class).yellow(),
            style(set.cause).cyan(),
            dag.label(set.target),
            factorial(set.len()).unwrap_or(0)
        );
        for &member in &set.members {
            println!("      {}", dag.label(member));
        }
    }
    println!(
        "{} {} variations",
        style("✓").green().bold(),
        style(commutation.total()).yellow()
    );

    Ok(())
}
