//! Common definitions shared by the pulse-control firmware and host tools.
//!
//! This crate holds the physical memory map of the pulse-generation
//! electronics. The firmware binds its register interface to these
//! addresses; host-side tools use them to label traces and to keep the
//! simulator's layout in step with the hardware.

#![no_std]

// Memory-mapped I/O address space of the pulse-generation electronics.
//
// Every register lives at a fixed physical address for the lifetime of the
// hardware. Array-shaped registers (PLAY, PARAMS, FMR, FMR_IQ, SRAM,
// ENVELOPE) are indexed by channel offset or sample index from their base.
// These values are a binary contract with the control electronics and must
// not change.
pub mod mmio {
    /// Trigger register (`i32`).
    ///
    /// Writing a repetition count starts that many physical executions of
    /// the compiled timeline. The completion flag drops until every
    /// repetition has finished and the result registers are aggregated.
    pub const TRIGGER: usize = 0x4000_1000;

    /// Time interval between two consecutive triggers (`i32`).
    pub const TRIGGER_INTERVAL: usize = TRIGGER + 4;

    /// Bitmask of the channels armed for upcoming triggers (`i32`).
    pub const TRIGGER_BITMASK: usize = TRIGGER + 8;

    /// Wait register (`i32`).
    ///
    /// Each write advances the virtual time cursor of the timeline being
    /// compiled by the written duration.
    pub const WAIT: usize = 0x4000_2000;

    /// Return address offset of fetched results, relative to `FMR` (`i32`).
    pub const FMR_OFFSET: usize = WAIT + 4;

    /// Base of the custom envelope sample table (`u16` per sample).
    ///
    /// Samples are 14-bit signed-magnitude values left in 16-bit slots. The
    /// table is shared by all channels; the target channel and slot are
    /// named by `WAVE_CHANNEL` and `WAVE_INDEX` when the upload commits.
    pub const ENVELOPE: usize = 0x4000_2400;

    /// Number of samples held by the envelope table.
    ///
    /// The table runs from `ENVELOPE` up to, but excluding, the completion
    /// flag at `FMR_READY`.
    pub const ENVELOPE_CAPACITY: usize = (FMR_READY - ENVELOPE) / 2;

    /// Address of envelope sample `index`, or `None` past the table end.
    pub const fn envelope_sample(index: usize) -> Option<usize> {
        if index < ENVELOPE_CAPACITY {
            Some(ENVELOPE + index * 2)
        } else {
            None
        }
    }

    /// Length of the uploaded waveform in samples (`i32`).
    ///
    /// Written last during an upload; the write commits the envelope to the
    /// channel and slot selected beforehand.
    pub const WAVE_LEN: usize = 0x4000_23F8;

    /// Destination channel of an envelope upload (`u16`).
    pub const WAVE_CHANNEL: usize = 0x4000_23FC;

    /// Destination waveform slot of an envelope upload (`u8`).
    pub const WAVE_INDEX: usize = 0x4000_23FE;

    /// Completion flag (`u8`), non-zero once a trigger has finished.
    pub const FMR_READY: usize = 0x4000_2FFF;

    /// Base of the accumulated measurement counts (`i32` per channel).
    pub const FMR: usize = 0x4000_3000;

    /// Base of the demodulated IQ results (`[f64; 2]` per channel).
    pub const FMR_IQ: usize = 0x4000_4000;

    /// Base of the PLAY registers (`u8` waveform index per channel).
    pub const PLAY: usize = 0x4000_8000;

    /// Base of the pulse parameter slots (`[f64; 4]` per channel).
    pub const PARAMS: usize = 0x4001_0000;

    /// Base of the host-supplied parameter stream (`f64` per entry).
    pub const SRAM: usize = 0x4010_0000;

    /// Result stream towards the host PC.
    ///
    /// Accepts both word (`i32`) and double (`f64`) writes at the same
    /// address; the host must know which one each experiment emits.
    pub const PCIE: usize = 0x4012_0000;

    /// Base address of the QEMU UART used for the firmware console.
    pub const UART0: usize = 0x1000_0000;

    /// Base address of high RAM, where firmware code and stacks reside.
    pub const RAM_BASE: usize = 0x8000_0000;
}

/// Channel offset ranges of the register arrays.
///
/// A logical index is turned into a register offset by adding one of these
/// bases. The ranges are disjoint for every supported topology.
pub mod topology {
    /// First offset of single-qubit drive channels.
    pub const QUBIT_BASE: u16 = 0x0000;

    /// First offset of two-qubit (coupler) channels.
    pub const COUPLER_BASE: u16 = 0x0400;

    /// First offset of raw physical channels.
    pub const PHYSICAL_BASE: u16 = 0x2000;
}

#[cfg(test)]
mod tests {
    use super::mmio::*;

    #[test]
    fn envelope_table_stops_before_ready_flag() {
        assert!(ENVELOPE + ENVELOPE_CAPACITY * 2 <= FMR_READY);
        assert_eq!(ENVELOPE_CAPACITY, 0x5FF);
    }

    #[test]
    fn envelope_samples_are_bounded_by_capacity() {
        assert_eq!(envelope_sample(0), Some(ENVELOPE));
        assert_eq!(envelope_sample(ENVELOPE_CAPACITY - 1), Some(FMR_READY - 3));
        assert_eq!(envelope_sample(ENVELOPE_CAPACITY), None);
        assert_eq!(envelope_sample(usize::MAX), None);
    }

    #[test]
    fn upload_registers_sit_below_envelope_table() {
        assert!(WAVE_LEN < WAVE_CHANNEL && WAVE_CHANNEL < WAVE_INDEX);
        assert!(WAVE_INDEX < ENVELOPE);
    }
}
