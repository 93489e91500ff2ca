//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - commutation-aware quantum circuit scheduling",
        style("Cadence").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  cadence-ir     Instructions, gates and circuits");
    println!("  cadence-sched  Dependency graph, list scheduler and commutation search");
    println!("  cadence-cli    Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
