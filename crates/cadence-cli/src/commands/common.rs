//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use cadence_ir::{
    Circuit, ClbitId, DEFAULT_CYCLE_TIME, Instruction, InstructionKind, QubitId, StandardGate,
};
use cadence_sched::ResourceConfig;

/// One instruction in the JSON circuit format.
///
/// ```json
/// { "name": "rz", "qubits": [0], "angle": 0.5 }
/// { "name": "measure", "qubits": [0], "clbits": [0], "duration": 400 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionSpec {
    /// Gate or operation name.
    pub name: String,
    /// Qubit operands.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qubits: Vec<u32>,
    /// Classical bit operands.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clbits: Vec<u32>,
    /// Rotation angle of parameterized gates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    /// Duration in nanoseconds; the kind's default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// Assigned start cycle, present in scheduled output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<u64>,
}

/// The JSON circuit format read and written by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitFile {
    /// Circuit name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Number of qubits.
    pub num_qubits: u32,
    /// Number of classical bits.
    #[serde(default)]
    pub num_clbits: u32,
    /// Cycle time in nanoseconds.
    #[serde(default = "default_cycle_time")]
    pub cycle_time: u64,
    /// Instructions in program order.
    pub instructions: Vec<InstructionSpec>,
}

fn default_name() -> String {
    "circuit".into()
}

fn default_cycle_time() -> u64 {
    DEFAULT_CYCLE_TIME
}

impl CircuitFile {
    /// Build a validated circuit.
    pub fn into_circuit(self) -> Result<Circuit> {
        let mut circuit = Circuit::with_size(self.name, self.num_qubits, self.num_clbits);
        circuit.set_cycle_time(self.cycle_time)?;

        for (i, spec) in self.instructions.into_iter().enumerate() {
            let kind = match spec.name.to_lowercase().as_str() {
                "measure" => InstructionKind::Measure,
                "reset" => InstructionKind::Reset,
                "barrier" => InstructionKind::Barrier,
                "wait" => InstructionKind::Wait,
                other => match StandardGate::from_name(other, spec.angle) {
                    Some(gate) => InstructionKind::Gate(gate),
                    None => InstructionKind::Classical { name: spec.name },
                },
            };

            let mut inst = Instruction::new(
                kind,
                spec.qubits.into_iter().map(QubitId).collect(),
                spec.clbits.into_iter().map(ClbitId).collect(),
            );
            if let Some(duration) = spec.duration {
                inst.duration = duration;
            }
            inst.cycle = spec.cycle;

            circuit
                .push(inst)
                .with_context(|| format!("Invalid instruction #{i}"))?;
        }

        Ok(circuit)
    }

    /// Describe a (possibly scheduled) circuit.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let instructions = circuit
            .instructions()
            .iter()
            .map(|inst| InstructionSpec {
                name: inst.name().to_string(),
                qubits: inst.qubits.iter().map(|q| q.0).collect(),
                clbits: inst.clbits.iter().map(|c| c.0).collect(),
                angle: inst.as_gate().and_then(StandardGate::angle),
                duration: Some(inst.duration),
                cycle: inst.cycle,
            })
            .collect();

        Self {
            name: circuit.name().to_string(),
            num_qubits: circuit.num_qubits() as u32,
            num_clbits: circuit.num_clbits() as u32,
            cycle_time: circuit.cycle_time(),
            instructions,
        }
    }
}

/// Load a circuit from a JSON file.
pub fn load_circuit(path: &str) -> Result<Circuit> {
    let source = read_file(path)?;
    let file: CircuitFile = serde_json::from_str(&source)
        .with_context(|| format!("Failed to parse circuit: {path}"))?;
    file.into_circuit()
}

/// Load a platform description from a YAML or JSON file.
pub fn load_platform(path: &str) -> Result<ResourceConfig> {
    let source = read_file(path)?;
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    let config: ResourceConfig = match ext.to_lowercase().as_str() {
        "json" => serde_json::from_str(&source)
            .with_context(|| format!("Failed to parse platform: {path}"))?,
        _ => serde_yaml_ng::from_str(&source)
            .with_context(|| format!("Failed to parse platform: {path}"))?,
    };
    config.validate()?;
    Ok(config)
}

fn read_file(path: &str) -> Result<String> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_sched::GateClass;

    const FAN: &str = r#"{
        "name": "fan",
        "num_qubits": 3,
        "num_clbits": 1,
        "instructions": [
            {"name": "h", "qubits": [0]},
            {"name": "cz", "qubits": [0, 1]},
            {"name": "CZ", "qubits": [0, 2], "duration": 60},
            {"name": "rz", "qubits": [1], "angle": 0.5},
            {"name": "measure", "qubits": [0], "clbits": [0]},
            {"name": "wait", "duration": 100},
            {"name": "flip", "clbits": [0]}
        ]
    }"#;

    #[test]
    fn test_parse_circuit_file() {
        let file: CircuitFile = serde_json::from_str(FAN).unwrap();
        let circuit = file.into_circuit().unwrap();

        assert_eq!(circuit.len(), 7);
        assert_eq!(circuit.cycle_time(), DEFAULT_CYCLE_TIME);
        assert_eq!(circuit.instructions()[2].duration, 60);
        assert_eq!(circuit.instructions()[3].to_string(), "rz(0.5) q1");
        assert!(circuit.instructions()[5].is_full_barrier());
        assert_eq!(circuit.instructions()[6].name(), "flip");
    }

    #[test]
    fn test_invalid_operand() {
        let file: CircuitFile = serde_json::from_str(
            r#"{"num_qubits": 1, "instructions": [{"name": "cz", "qubits": [0, 1]}]}"#,
        )
        .unwrap();
        let err = file.into_circuit().unwrap_err();
        assert!(err.to_string().contains("#0"));
    }

    #[test]
    fn test_circuit_file_roundtrip_keeps_cycles() {
        let mut circuit = Circuit::bell().unwrap();
        for (i, inst) in circuit.instructions_mut().iter_mut().enumerate() {
            inst.cycle = Some(i as u64);
        }

        let file = CircuitFile::from_circuit(&circuit);
        let json = serde_json::to_string(&file).unwrap();
        let back: CircuitFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.into_circuit().unwrap(), circuit);
    }

    #[test]
    fn test_platform_yaml() {
        let config: ResourceConfig = serde_yaml_ng::from_str(
            "cycle_time: 10\nlimits:\n  - { class: measure, max: 1 }\n",
        )
        .unwrap();
        assert_eq!(config.cycle_time, Some(10));
        assert!(config.qubit_exclusive);
        assert_eq!(config.limits[0].class, GateClass::Measure);
    }

    #[test]
    fn test_missing_file() {
        let err = load_circuit("/nonexistent/circuit.json").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
