//! Resource occupancy for the list scheduler.
//!
//! A [`ResourceManager`] answers one question: may this instruction occupy
//! the cycles `[cycle, cycle + duration)`? The scheduler probes it cycle by
//! cycle and commits the placement with [`ResourceManager::reserve`].
//! Managers are stateful, so every variation trial works on its own clone of
//! a prototype.
//!
//! [`PlatformResources`] is the built-in manager. It models two things:
//! qubits that can run only one instruction at a time, and per-class
//! concurrency limits (for example "at most two two-qubit gates at once").

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use cadence_ir::{Circuit, Instruction, QubitId};

use crate::error::{SchedError, SchedResult};

/// Occupancy contract used by the list scheduler.
///
/// Cycles are signed: backward scheduling places instructions at negative
/// cycles before the result is normalized. Implementations must accept any
/// instruction at a cycle past all of their reservations.
pub trait ResourceManager {
    /// Check whether `inst` may start at `cycle` and run for `duration`
    /// cycles.
    fn available(&self, cycle: i64, inst: &Instruction, duration: u64) -> bool;

    /// Record that `inst` occupies `[cycle, cycle + duration)`.
    fn reserve(&mut self, cycle: i64, inst: &Instruction, duration: u64);
}

/// Instruction class a concurrency limit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateClass {
    /// Gates acting on one qubit.
    SingleQubit,
    /// Gates acting on two or more qubits.
    TwoQubit,
    /// Measurements.
    Measure,
    /// Every instruction with a non-zero duration.
    Any,
}

impl GateClass {
    /// Check whether `inst` belongs to this class.
    pub fn matches(self, inst: &Instruction) -> bool {
        match self {
            GateClass::Any => true,
            GateClass::Measure => inst.is_measure(),
            GateClass::SingleQubit => inst.as_gate().is_some_and(|g| g.num_qubits() == 1),
            GateClass::TwoQubit => inst.as_gate().is_some_and(|g| g.num_qubits() >= 2),
        }
    }
}

/// At most `max` instructions of `class` in flight in any one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcurrencyLimit {
    /// The instruction class.
    pub class: GateClass,
    /// Maximum number of concurrent instructions, at least 1.
    pub max: usize,
}

/// Built-in resource manager: qubit exclusivity plus concurrency limits.
#[derive(Debug, Clone, Default)]
pub struct PlatformResources {
    qubit_exclusive: bool,
    limits: Vec<ConcurrencyLimit>,
    busy_qubits: FxHashSet<(QubitId, i64)>,
    in_flight: FxHashMap<(usize, i64), usize>,
}

impl PlatformResources {
    /// A manager that accepts every placement.
    pub fn unconstrained() -> Self {
        Self::default()
    }

    /// A manager where each qubit runs one instruction at a time.
    pub fn qubit_exclusive() -> Self {
        Self {
            qubit_exclusive: true,
            ..Self::default()
        }
    }

    /// Add a concurrency limit.
    pub fn with_limit(mut self, class: GateClass, max: usize) -> SchedResult<Self> {
        if max == 0 {
            return Err(SchedError::InvalidConfig(format!(
                "concurrency limit for {class:?} must be at least 1"
            )));
        }
        self.limits.push(ConcurrencyLimit { class, max });
        Ok(self)
    }

    /// Whether nothing has been reserved yet.
    pub fn is_empty(&self) -> bool {
        self.busy_qubits.is_empty() && self.in_flight.is_empty()
    }

    fn cycles(cycle: i64, duration: u64) -> impl Iterator<Item = i64> {
        let end = cycle.saturating_add(i64::try_from(duration).unwrap_or(i64::MAX));
        cycle..end
    }
}

impl ResourceManager for PlatformResources {
    fn available(&self, cycle: i64, inst: &Instruction, duration: u64) -> bool {
        if duration == 0 {
            return true;
        }
        for c in Self::cycles(cycle, duration) {
            if self.qubit_exclusive && inst.qubits.iter().any(|&q| self.busy_qubits.contains(&(q, c)))
            {
                return false;
            }
            for (i, limit) in self.limits.iter().enumerate() {
                if limit.class.matches(inst)
                    && self.in_flight.get(&(i, c)).copied().unwrap_or(0) >= limit.max
                {
                    return false;
                }
            }
        }
        true
    }

    fn reserve(&mut self, cycle: i64, inst: &Instruction, duration: u64) {
        if duration == 0 {
            return;
        }
        for c in Self::cycles(cycle, duration) {
            if self.qubit_exclusive {
                for &q in &inst.qubits {
                    self.busy_qubits.insert((q, c));
                }
            }
            for (i, limit) in self.limits.iter().enumerate() {
                if limit.class.matches(inst) {
                    *self.in_flight.entry((i, c)).or_insert(0) += 1;
                }
            }
        }
    }
}

/// Platform description as loaded from a YAML or JSON file.
///
/// ```yaml
/// cycle_time: 20
/// qubit_exclusive: true
/// durations:
///   cz: 60
///   measure: 400
/// limits:
///   - { class: two_qubit, max: 2 }
///   - { class: measure, max: 1 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Cycle time in nanoseconds; the circuit's own value when absent.
    pub cycle_time: Option<u64>,
    /// Whether a qubit can run only one instruction at a time.
    pub qubit_exclusive: bool,
    /// Instruction durations in nanoseconds, by instruction name.
    pub durations: FxHashMap<String, u64>,
    /// Concurrency limits.
    pub limits: Vec<ConcurrencyLimit>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            cycle_time: None,
            qubit_exclusive: true,
            durations: FxHashMap::default(),
            limits: vec![],
        }
    }
}

impl ResourceConfig {
    /// Check the description for values that cannot be scheduled against.
    pub fn validate(&self) -> SchedResult<()> {
        if self.cycle_time == Some(0) {
            return Err(SchedError::InvalidConfig(
                "cycle time must be positive".into(),
            ));
        }
        if let Some(limit) = self.limits.iter().find(|l| l.max == 0) {
            return Err(SchedError::InvalidConfig(format!(
                "concurrency limit for {:?} must be at least 1",
                limit.class
            )));
        }
        Ok(())
    }

    /// Build the resource manager prototype.
    pub fn manager(&self) -> SchedResult<PlatformResources> {
        self.validate()?;
        let mut resources = if self.qubit_exclusive {
            PlatformResources::qubit_exclusive()
        } else {
            PlatformResources::unconstrained()
        };
        for limit in &self.limits {
            resources = resources.with_limit(limit.class, limit.max)?;
        }
        Ok(resources)
    }

    /// Apply the cycle time and durations to a circuit.
    pub fn apply(&self, circuit: &mut Circuit) -> SchedResult<()> {
        self.validate()?;
        if let Some(cycle_time) = self.cycle_time {
            circuit.set_cycle_time(cycle_time)?;
        }
        circuit.apply_durations(&self.durations);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_ir::{ClbitId, StandardGate};

    #[test]
    fn test_unconstrained_accepts_everything() {
        let mut res = PlatformResources::unconstrained();
        let cz = Instruction::two_qubit_gate(StandardGate::CZ, QubitId(0), QubitId(1));
        res.reserve(0, &cz, 2);
        assert!(res.available(0, &cz, 2));
        assert!(res.available(-5, &cz, 100));
    }

    #[test]
    fn test_qubit_exclusive() {
        let mut res = PlatformResources::qubit_exclusive();
        let cz = Instruction::two_qubit_gate(StandardGate::CZ, QubitId(0), QubitId(1));
        let h = Instruction::single_qubit_gate(StandardGate::H, QubitId(1));
        let x = Instruction::single_qubit_gate(StandardGate::X, QubitId(2));

        res.reserve(0, &cz, 2);
        assert!(!res.available(1, &h, 1));
        assert!(res.available(2, &h, 1));
        assert!(!res.available(-1, &h, 2));
        assert!(res.available(-1, &h, 1));
        assert!(res.available(0, &x, 1));
    }

    #[test]
    fn test_zero_duration_is_always_available() {
        let mut res = PlatformResources::qubit_exclusive();
        let h = Instruction::single_qubit_gate(StandardGate::H, QubitId(0));
        res.reserve(0, &h, 1);
        let barrier = Instruction::barrier([QubitId(0)]);
        assert!(res.available(0, &barrier, 0));
        res.reserve(0, &barrier, 0);
        assert!(res.available(1, &h, 1));
    }

    #[test]
    fn test_concurrency_limit() {
        let mut res = PlatformResources::unconstrained()
            .with_limit(GateClass::Measure, 1)
            .unwrap();
        let m0 = Instruction::measure(QubitId(0), ClbitId(0));
        let m1 = Instruction::measure(QubitId(1), ClbitId(1));
        let h = Instruction::single_qubit_gate(StandardGate::H, QubitId(1));

        res.reserve(0, &m0, 15);
        assert!(!res.available(14, &m1, 15));
        assert!(res.available(15, &m1, 15));
        assert!(res.available(0, &h, 1));
    }

    #[test]
    fn test_zero_limit_rejected() {
        assert!(matches!(
            PlatformResources::unconstrained().with_limit(GateClass::Any, 0),
            Err(SchedError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_gate_classes() {
        let ccx = Instruction::gate(StandardGate::CCX, [QubitId(0), QubitId(1), QubitId(2)]);
        assert!(GateClass::TwoQubit.matches(&ccx));
        assert!(!GateClass::SingleQubit.matches(&ccx));
        assert!(GateClass::Any.matches(&ccx));
        let reset = Instruction::reset(QubitId(0));
        assert!(!GateClass::SingleQubit.matches(&reset));
    }

    #[test]
    fn test_resource_config_from_json() {
        let config: ResourceConfig = serde_json::from_str(
            r#"{
                "cycle_time": 10,
                "durations": {"cz": 60},
                "limits": [{"class": "two_qubit", "max": 1}]
            }"#,
        )
        .unwrap();
        assert!(config.qubit_exclusive);
        assert_eq!(config.cycle_time, Some(10));

        let mut circuit = Circuit::with_size("c", 3, 0);
        circuit.cz(QubitId(0), QubitId(1)).unwrap();
        config.apply(&mut circuit).unwrap();
        assert_eq!(circuit.cycle_time(), 10);
        assert_eq!(circuit.instructions()[0].duration, 60);

        let mut res = config.manager().unwrap();
        let a = Instruction::two_qubit_gate(StandardGate::CZ, QubitId(0), QubitId(1));
        let b = Instruction::two_qubit_gate(StandardGate::CZ, QubitId(2), QubitId(3));
        res.reserve(0, &a, 6);
        assert!(!res.available(3, &b, 6));
        assert!(res.available(6, &b, 6));
    }

    #[test]
    fn test_resource_config_validation() {
        let config = ResourceConfig {
            cycle_time: Some(0),
            ..ResourceConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ResourceConfig {
            limits: vec![ConcurrencyLimit {
                class: GateClass::Any,
                max: 0,
            }],
            ..ResourceConfig::default()
        };
        assert!(matches!(config.manager(), Err(SchedError::InvalidConfig(_))));
    }
}
