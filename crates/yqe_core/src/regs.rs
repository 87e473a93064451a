//! Register interface definitions for the pulse-generation electronics.
//!
//! The control electronics expose a fixed set of memory-mapped registers:
//! trigger, wait, play, pulse parameters, measurement fetch, host I/O and
//! the envelope upload side channel. `Registers` gives each of them one
//! method so that the sequencer and the experiment programs never depend on
//! a particular address map. The firmware binds the trait to volatile MMIO
//! accesses; tests and the host simulator bind it to in-memory state.

use crate::channel::Channel;
use crate::waveform::Waveform;

/// Pulse parameter slots of one channel.
///
/// The numeric values are the hardware slot indices inside the four-entry
/// PARAMS block of every channel.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSlot {
    /// Drive phase in radians; selects the rotation axis in the XY plane.
    Phase = 0,
    /// Intermediate-frequency detuning of the drive.
    Detuning = 1,
    /// Amplitude multiplier applied to the next pulse.
    Amplitude = 2,
    /// Pulse length hint used by stretched waveforms.
    Length = 3,
}

impl ParamSlot {
    pub const ALL: [ParamSlot; 4] = [
        ParamSlot::Phase,
        ParamSlot::Detuning,
        ParamSlot::Amplitude,
        ParamSlot::Length,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Parameter record held by the hardware for one channel.
///
/// The hardware keeps these values between PLAYs and never resets them on
/// its own: a SET_PARAM must precede the PLAY that is meant to consume it,
/// and any slot not rewritten carries over from the previous pulse.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelParams {
    slots: [f64; 4],
}

impl ChannelParams {
    pub fn get(&self, slot: ParamSlot) -> f64 {
        self.slots[slot.index()]
    }

    pub fn set(&mut self, slot: ParamSlot, value: f64) {
        self.slots[slot.index()] = value;
    }

    pub fn phase(&self) -> f64 {
        self.get(ParamSlot::Phase)
    }

    pub fn detuning(&self) -> f64 {
        self.get(ParamSlot::Detuning)
    }

    pub fn amplitude(&self) -> f64 {
        self.get(ParamSlot::Amplitude)
    }

    pub fn length(&self) -> f64 {
        self.get(ParamSlot::Length)
    }
}

/// Demodulated in-phase and quadrature components of a readout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Iq {
    pub i: f64,
    pub q: f64,
}

/// Trigger configuration written once at program start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerConfig {
    /// Time between two consecutive repetitions of the timeline.
    pub interval: u32,
    /// Channels armed for upcoming triggers.
    pub bitmask: u32,
    /// Offset of fetched results relative to the FMR base.
    pub fmr_offset: u32,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            interval: 1000,
            bitmask: 0xffff_ffff,
            fmr_offset: 0,
        }
    }
}

/// Register file of the pulse-generation electronics.
///
/// Writes take effect in program order. PLAY, WAIT and PARAMS writes only
/// compile the timeline; the trigger count write is what starts execution
/// on hardware. Reads take `&mut self` because reading a hardware register
/// may have side effects (the completion flag, the SRAM cursor of a fake).
///
/// No method reports errors: addresses are fixed by the topology, and an
/// out-of-range channel is a programming error.
pub trait Registers {
    /// Starts `repeat` executions of the compiled timeline.
    fn write_trigger_count(&mut self, repeat: u32);

    fn write_trigger_interval(&mut self, interval: u32);

    fn write_trigger_bitmask(&mut self, bitmask: u32);

    fn write_fmr_offset(&mut self, offset: u32);

    /// Advances the virtual time cursor of the timeline by `duration`.
    fn write_wait(&mut self, duration: u32);

    /// Schedules `waveform` on `channel` at the current time cursor.
    fn write_play(&mut self, channel: Channel, waveform: Waveform);

    /// Sets one parameter slot for the next PLAY on `channel`.
    fn write_param(&mut self, channel: Channel, slot: ParamSlot, value: f64);

    /// Accumulated survival count (shots measured in the reference state).
    fn read_fmr(&mut self, channel: Channel) -> i32;

    /// Accumulated demodulated IQ result.
    fn read_fmr_iq(&mut self, channel: Channel) -> Iq;

    /// Completion flag of the last trigger.
    fn fmr_ready(&mut self) -> bool;

    fn write_pcie_word(&mut self, value: i32);

    fn write_pcie_f64(&mut self, value: f64);

    /// Host-supplied parameter at `index` of the SRAM stream.
    fn read_sram(&mut self, index: usize) -> f64;

    fn write_envelope(&mut self, sample_index: usize, sample: u16);

    /// Commits the pending envelope upload.
    fn write_wave_len(&mut self, len: u32);

    fn write_wave_channel(&mut self, channel: Channel);

    fn write_wave_index(&mut self, index: Waveform);

    /// Spins on the completion flag until the hardware reports all
    /// repetitions finished.
    ///
    /// There is no timeout. The hardware completes in bounded time under
    /// normal operation; an unresponsive device hangs the program.
    fn await_completion(&mut self) {
        while !self.fmr_ready() {
            core::hint::spin_loop();
        }
    }
}

impl<R: Registers + ?Sized> Registers for &mut R {
    fn write_trigger_count(&mut self, repeat: u32) {
        (**self).write_trigger_count(repeat);
    }

    fn write_trigger_interval(&mut self, interval: u32) {
        (**self).write_trigger_interval(interval);
    }

    fn write_trigger_bitmask(&mut self, bitmask: u32) {
        (**self).write_trigger_bitmask(bitmask);
    }

    fn write_fmr_offset(&mut self, offset: u32) {
        (**self).write_fmr_offset(offset);
    }

    fn write_wait(&mut self, duration: u32) {
        (**self).write_wait(duration);
    }

    fn write_play(&mut self, channel: Channel, waveform: Waveform) {
        (**self).write_play(channel, waveform);
    }

    fn write_param(&mut self, channel: Channel, slot: ParamSlot, value: f64) {
        (**self).write_param(channel, slot, value);
    }

    fn read_fmr(&mut self, channel: Channel) -> i32 {
        (**self).read_fmr(channel)
    }

    fn read_fmr_iq(&mut self, channel: Channel) -> Iq {
        (**self).read_fmr_iq(channel)
    }

    fn fmr_ready(&mut self) -> bool {
        (**self).fmr_ready()
    }

    fn write_pcie_word(&mut self, value: i32) {
        (**self).write_pcie_word(value);
    }

    fn write_pcie_f64(&mut self, value: f64) {
        (**self).write_pcie_f64(value);
    }

    fn read_sram(&mut self, index: usize) -> f64 {
        (**self).read_sram(index)
    }

    fn write_envelope(&mut self, sample_index: usize, sample: u16) {
        (**self).write_envelope(sample_index, sample);
    }

    fn write_wave_len(&mut self, len: u32) {
        (**self).write_wave_len(len);
    }

    fn write_wave_channel(&mut self, channel: Channel) {
        (**self).write_wave_channel(channel);
    }

    fn write_wave_index(&mut self, index: Waveform) {
        (**self).write_wave_index(index);
    }

    fn await_completion(&mut self) {
        (**self).await_completion();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeRegisters;

    #[test]
    fn params_persist_until_rewritten() {
        let mut params = ChannelParams::default();
        params.set(ParamSlot::Amplitude, 0.5);
        params.set(ParamSlot::Phase, 1.0);
        params.set(ParamSlot::Phase, 2.0);
        assert_eq!(params.amplitude(), 0.5);
        assert_eq!(params.phase(), 2.0);
        assert_eq!(params.detuning(), 0.0);
    }

    #[test]
    fn slot_indices_match_hardware_layout() {
        let indices: Vec<usize> = ParamSlot::ALL.iter().map(|s| s.index()).collect();
        assert_eq!(indices, [0, 1, 2, 3]);
    }

    #[test]
    fn await_completion_polls_until_ready() {
        let mut fake = FakeRegisters::new();
        fake.ready_after_polls = 5;
        fake.write_trigger_count(1);
        fake.await_completion();
        assert_eq!(fake.polls, 6);
    }
}
