//! Host-side tooling for the pulse control unit.
//!
//! Runs the control programs against a simulated pulse device, sweeps
//! randomized benchmarking over many seeds in parallel and summarises the
//! survival statistics. The firmware and the host execute the exact same
//! program code from `yqe_core`; only the register binding differs.

/// JSON configuration of the simulated device.
pub mod config;

/// Parallel randomized benchmarking sweeps.
pub mod rb_sweep;

/// Single program runs from parameter files.
pub mod runner;

/// Register interface bound to an in-memory physical model.
pub mod sim;

/// Survival statistics per circuit length.
pub mod stats;
