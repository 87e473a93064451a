//! Simulated device configuration.
//!
//! Loaded from a JSON file; every field is optional and falls back to the
//! defaults below. Times are in sequencer time units (nanoseconds).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Relaxation time applied when a qubit has no explicit entry.
pub const DEFAULT_COHERENCE: f64 = 4000.0;

/// Noise model of one qubit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QubitConfig {
    /// Energy relaxation time; `None` disables amplitude damping.
    pub t1: Option<f64>,
    /// Dephasing time; `None` disables phase damping.
    pub t2: Option<f64>,
    /// Depolarizing probability applied after every drive pulse.
    pub gate_error: f64,
    /// Probability that a measured bit is flipped.
    pub readout_error: f64,
}

impl Default for QubitConfig {
    fn default() -> Self {
        Self {
            t1: Some(DEFAULT_COHERENCE),
            t2: Some(DEFAULT_COHERENCE),
            gate_error: 0.0,
            readout_error: 0.0,
        }
    }
}

impl QubitConfig {
    pub const NOISELESS: Self = Self {
        t1: None,
        t2: None,
        gate_error: 0.0,
        readout_error: 0.0,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Per-qubit noise, indexed by logical qubit. Qubits past the end use
    /// `QubitConfig::default()`.
    pub qubits: Vec<QubitConfig>,
    /// Seed of the shot sampler.
    pub shot_seed: u64,
    /// Polls of the completion flag that report "busy" after each trigger.
    pub ready_latency_polls: u32,
    /// Duration of the calibrated π and π/2 pulses.
    pub pi_pulse_ns: f64,
    /// Rabi rate in rad/ns of a full-amplitude square drive.
    pub square_rabi_rate: f64,
    /// Detuning in rad/ns per unit of Z-line amplitude.
    pub z_detuning_scale: f64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            qubits: Vec::new(),
            shot_seed: 0,
            ready_latency_polls: 2,
            pi_pulse_ns: 20.0,
            square_rabi_rate: 0.05,
            z_detuning_scale: 0.1,
        }
    }
}

impl DeviceConfig {
    /// A device without decoherence, gate or readout errors.
    pub fn noiseless(num_qubits: usize) -> Self {
        Self {
            qubits: vec![QubitConfig::NOISELESS; num_qubits],
            ..Self::default()
        }
    }

    pub fn qubit(&self, index: usize) -> QubitConfig {
        self.qubits.get(index).copied().unwrap_or_default()
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid device configuration")
    }

    /// Loads `path`, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to open device file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("In {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg = DeviceConfig::from_json(r#"{"qubits": [{"t1": 1500.0}], "shot_seed": 7}"#)
            .unwrap();
        assert_eq!(cfg.shot_seed, 7);
        assert_eq!(cfg.qubit(0).t1, Some(1500.0));
        assert_eq!(cfg.qubit(0).t2, Some(DEFAULT_COHERENCE));
        assert_eq!(cfg.qubit(3), QubitConfig::default());
        assert_eq!(cfg.ready_latency_polls, 2);
    }

    #[test]
    fn null_disables_decay() {
        let cfg = DeviceConfig::from_json(r#"{"qubits": [{"t1": null, "t2": null}]}"#).unwrap();
        assert_eq!(cfg.qubit(0).t1, None);
        assert_eq!(cfg.qubit(0).t2, None);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(DeviceConfig::from_json("{").is_err());
    }

    #[test]
    fn no_file_means_defaults() {
        assert_eq!(DeviceConfig::load(None).unwrap(), DeviceConfig::default());
    }
}
