//! Real-time pulse sequencing and randomized benchmarking for the pulse
//! control unit.
//!
//! This crate contains everything the control programs need to drive the
//! pulse-generation electronics: a register interface that hides the
//! address map behind a trait, channel addressing, the fixed waveform
//! catalog with custom envelope upload, the pulse sequencer, the host I/O
//! channel, the single-qubit Clifford group, the randomized benchmarking
//! driver and the calibration sweeps. Nothing here allocates, so the same
//! code runs in bare-metal firmware and in host-side simulation.

#![cfg_attr(not(test), no_std)]

use thiserror::Error;

/// Calibration sweeps built on the pulse sequencer.
///
/// T1, T2 Ramsey, Rabi (amplitude, pulse length, Z-line), transmission and
/// the five-qubit vector T1 sweep. Each program owns a fixed parameter
/// order and a fixed result record layout.
pub mod calibration;

/// Channel addressing.
///
/// Maps logical qubit, coupler and physical channel indices to the disjoint
/// register offset ranges used by the PLAY, PARAMS and FMR arrays.
pub mod channel;

/// Single-qubit Clifford group engine.
///
/// Hardcoded 24x24 multiplication table and inversion list, together with
/// the elementary rotation sequence realising each group element.
pub mod clifford;

/// Host I/O channel.
///
/// Ordered intake of host-supplied parameters from SRAM and ordered
/// emission of result values over the PCIe stream.
pub mod host_io;

/// Program entry points.
///
/// The `Program` trait binds a parameter-order contract to a run routine;
/// `ProgramKind` enumerates every program the control unit ships.
pub mod programs;

/// Single-qubit Clifford randomized benchmarking.
///
/// Generates random Clifford circuits per requested length, appends the
/// recovery gate, executes them through the sequencer and accumulates
/// survival statistics.
pub mod rb;

/// Register interface of the pulse-generation electronics.
///
/// A trait with one method per hardware register. Firmware binds it to the
/// physical addresses; tests and the host simulator bind it to memory.
pub mod regs;

/// Pulse sequencer.
///
/// Builds a timeline from PLAY, WAIT and SET_PARAM writes and executes it
/// with TRIGGER, blocking until the hardware reports completion.
pub mod sequencer;

/// Stack-allocated vector with compile-time fixed capacity.
pub mod static_vec;

/// Waveform catalog and custom envelope upload.
pub mod waveform;

#[cfg(test)]
mod fake;

/// Errors detected by the control programs before touching the hardware.
///
/// The hardware protocol itself has no error channel: a completion flag
/// that never asserts blocks forever and a misordered parameter stream is
/// silently misread. These variants cover the conditions the programs can
/// check cheaply on their own side of the register interface.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum YqeError {
    /// A custom envelope targeted a waveform index owned by the catalog.
    ///
    /// Indices 0-3, 64, 65 and 127-255 are fixed-purpose slots in the
    /// control electronics and cannot be overwritten.
    #[error("waveform index {0} is reserved by the catalog")]
    ReservedWaveform(u8),

    /// The envelope does not fit into the shared sample table.
    #[error("envelope of {len} samples exceeds the {capacity}-sample table")]
    EnvelopeTooLong { len: usize, capacity: usize },

    /// An upload was requested with no samples.
    #[error("envelope has no samples")]
    EmptyEnvelope,

    /// A Clifford index outside `[0, 24)`.
    #[error("clifford index {0} is outside the 24-element group")]
    InvalidClifford(u8),

    /// The hardcoded Clifford tables failed a group-law self-check.
    #[error("clifford table violates the {law} law at ({a}, {b})")]
    CorruptCliffordTable { law: &'static str, a: u8, b: u8 },

    /// More circuit lengths than the firmware can hold.
    #[error("{count} circuit lengths requested, at most {max} supported")]
    TooManyLengths { count: usize, max: usize },

    /// A count-like parameter read from the host was negative.
    #[error("parameter `{name}` must be non-negative, got {value}")]
    NegativeParameter { name: &'static str, value: i32 },

    /// A sweep step read from the host was zero or negative.
    #[error("sweep step `{name}` must be positive, got {value}")]
    NonPositiveStep { name: &'static str, value: i32 },

    /// A sweep bound whose points or durations do not fit the register
    /// width.
    #[error("sweep bound `{name}` = {value} is out of range")]
    SweepOutOfRange { name: &'static str, value: i32 },
}
