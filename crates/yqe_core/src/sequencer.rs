//! Pulse sequencer over the register interface.
//!
//! PLAY, WAIT and SET_PARAM writes compile a timeline without executing
//! anything. TRIGGER hands the compiled timeline to the hardware for a
//! number of independent repetitions and blocks until the aggregated
//! results are available. WAIT is the only instruction that advances
//! scheduled time, so pulse spacing is decided entirely by where the waits
//! are placed between plays.

use crate::YqeError;
use crate::channel::Channel;
use crate::host_io::{self, ParamCursor};
use crate::regs::{Iq, ParamSlot, Registers, TriggerConfig};
use crate::waveform::{self, Envelope, Waveform};

/// Timeline builder and executor owning the register binding.
///
/// The timeline executed by `trigger` is everything compiled since the
/// previous trigger; the virtual time cursor restarts at zero afterwards.
pub struct Sequencer<R: Registers> {
    regs: R,
    /// Virtual time of the timeline being compiled.
    cursor: u64,
    /// PLAY instructions compiled since the last trigger.
    plays: usize,
    params: ParamCursor,
}

impl<R: Registers> Sequencer<R> {
    pub fn new(regs: R) -> Self {
        Self {
            regs,
            cursor: 0,
            plays: 0,
            params: ParamCursor::new(),
        }
    }

    /// Writes the run-wide trigger configuration.
    pub fn configure(&mut self, config: &TriggerConfig) {
        self.regs.write_trigger_bitmask(config.bitmask);
        self.regs.write_trigger_interval(config.interval);
        self.regs.write_fmr_offset(config.fmr_offset);
        log::debug!(
            "trigger configured: interval={} bitmask={:#010x} offset={}",
            config.interval,
            config.bitmask,
            config.fmr_offset
        );
    }

    /// Sets a parameter slot for the next PLAY on `channel`.
    ///
    /// Must precede the PLAY that consumes it. Slots are sticky: a value
    /// stays in effect for every later PLAY until overwritten.
    pub fn set_param(&mut self, channel: Channel, slot: ParamSlot, value: f64) {
        log::trace!("t={} set {:?}={} on {}", self.cursor, slot, value, channel);
        self.regs.write_param(channel, slot, value);
    }

    /// Schedules `waveform` on `channel` at the current time cursor.
    pub fn play(&mut self, channel: Channel, waveform: Waveform) {
        log::trace!("t={} play {} on {}", self.cursor, waveform.index(), channel);
        self.regs.write_play(channel, waveform);
        self.plays += 1;
    }

    /// Advances the time cursor by `duration`.
    pub fn wait(&mut self, duration: u32) {
        self.regs.write_wait(duration);
        self.cursor += u64::from(duration);
    }

    /// Executes the compiled timeline `repeat` times and blocks until done.
    ///
    /// Result registers read right after this call reflect exactly these
    /// `repeat` shots.
    pub fn trigger(&mut self, repeat: u32) {
        log::debug!(
            "trigger x{}: {} plays over {} time units",
            repeat,
            self.plays,
            self.cursor
        );
        self.regs.write_trigger_count(repeat);
        self.regs.await_completion();
        self.cursor = 0;
        self.plays = 0;
    }

    /// Survival count of `channel`: shots measured in the reference state |0>.
    pub fn fetch(&mut self, channel: Channel) -> i32 {
        self.regs.read_fmr(channel)
    }

    pub fn fetch_iq(&mut self, channel: Channel) -> Iq {
        self.regs.read_fmr_iq(channel)
    }

    /// Uploads a custom envelope; see [`waveform::upload`].
    pub fn upload(
        &mut self,
        channel: Channel,
        waveform: Waveform,
        envelope: &Envelope<'_>,
    ) -> Result<(), YqeError> {
        waveform::upload(&mut self.regs, channel, waveform, envelope)
    }

    /// Virtual time of the timeline compiled since the last trigger.
    pub fn elapsed(&self) -> u64 {
        self.cursor
    }

    /// Number of PLAYs compiled since the last trigger.
    pub fn pending_plays(&self) -> usize {
        self.plays
    }

    pub fn param_f64(&mut self) -> f64 {
        self.params.next_f64(&mut self.regs)
    }

    pub fn param_int(&mut self) -> i32 {
        self.params.next_int(&mut self.regs)
    }

    pub fn param_rounded(&mut self) -> i32 {
        self.params.next_rounded(&mut self.regs)
    }

    /// Next parameter as a host-side unsigned int, rounded.
    pub fn param_u32(&mut self) -> u32 {
        self.params.next_u32_wrapping(&mut self.regs)
    }

    /// Next parameter as a non-negative count, truncated.
    pub fn param_count(&mut self, name: &'static str) -> Result<u32, YqeError> {
        let value = self.param_int();
        host_io::count(name, value)
    }

    /// Next parameter as a positive sweep step, truncated.
    pub fn param_step(&mut self, name: &'static str) -> Result<usize, YqeError> {
        let value = self.param_int();
        host_io::step(name, value)
    }

    pub fn emit_word(&mut self, value: i32) {
        self.regs.write_pcie_word(value);
    }

    pub fn emit_f64(&mut self, value: f64) {
        self.regs.write_pcie_f64(value);
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    pub fn into_inner(self) -> R {
        self.regs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeRegisters, Write};
    use crate::host_io::HostValue;

    #[test]
    fn timeline_records_gap_between_plays() {
        let ch = Channel::qubit(0);
        let mut fake = FakeRegisters::new();
        let mut seq = Sequencer::new(&mut fake);
        seq.play(ch, Waveform::PI);
        seq.wait(100);
        seq.play(ch, Waveform::MEAS);
        assert_eq!(seq.elapsed(), 100);
        assert_eq!(seq.pending_plays(), 2);
        seq.trigger(1);
        assert_eq!(seq.elapsed(), 0);

        assert_eq!(fake.triggers.len(), 1);
        let (repeat, timeline) = &fake.triggers[0];
        assert_eq!(*repeat, 1);
        assert_eq!(
            timeline.as_slice(),
            [(0, ch, Waveform::PI), (100, ch, Waveform::MEAS)]
        );
    }

    #[test]
    fn each_trigger_starts_a_fresh_timeline() {
        let ch = Channel::qubit(1);
        let mut fake = FakeRegisters::new();
        let mut seq = Sequencer::new(&mut fake);
        seq.play(ch, Waveform::RESET);
        seq.wait(50);
        seq.trigger(10);
        seq.wait(20);
        seq.play(ch, Waveform::MEAS);
        seq.trigger(3);

        assert_eq!(fake.triggers[1].0, 3);
        assert_eq!(fake.triggers[1].1, [(20, ch, Waveform::MEAS)]);
    }

    #[test]
    fn trigger_blocks_until_ready() {
        let mut fake = FakeRegisters::new();
        fake.ready_after_polls = 3;
        fake.fmr_script.push_back(42);
        let mut seq = Sequencer::new(&mut fake);
        seq.trigger(100);
        assert_eq!(seq.fetch(Channel::qubit(0)), 42);
        assert_eq!(fake.polls, 4);
    }

    #[test]
    fn configure_writes_defaults() {
        let mut fake = FakeRegisters::new();
        Sequencer::new(&mut fake).configure(&TriggerConfig::default());
        assert_eq!(
            fake.writes,
            [
                Write::Bitmask(0xffff_ffff),
                Write::Interval(1000),
                Write::FmrOffset(0)
            ]
        );
    }

    #[test]
    fn writes_keep_program_order() {
        let ch = Channel::qubit(0);
        let mut fake = FakeRegisters::with_params(&[7.0]);
        let mut seq = Sequencer::new(&mut fake);
        seq.set_param(ch, ParamSlot::Phase, 0.5);
        seq.play(ch, Waveform::PI_2);
        seq.wait(10);
        let p = seq.param_int();
        seq.emit_word(p);
        seq.emit_f64(1.5);

        assert_eq!(
            fake.writes,
            [
                Write::Param(ch, ParamSlot::Phase, 0.5),
                Write::Play(ch, Waveform::PI_2),
                Write::Wait(10),
                Write::Pcie(HostValue::Word(7)),
                Write::Pcie(HostValue::Double(1.5)),
            ]
        );
    }
}
