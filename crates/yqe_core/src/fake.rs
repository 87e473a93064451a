//! In-memory register file for unit tests.
//!
//! Records every write in order, reconstructs the compiled timeline as
//! `(time, channel, waveform)` tuples, serves a scripted parameter stream
//! and scripted fetch results, and can hold the completion flag low for a
//! number of polls after each trigger.

use std::collections::VecDeque;

use crate::channel::Channel;
use crate::host_io::HostValue;
use crate::regs::{Iq, ParamSlot, Registers};
use crate::waveform::Waveform;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Write {
    TriggerCount(u32),
    Interval(u32),
    Bitmask(u32),
    FmrOffset(u32),
    Wait(u32),
    Play(Channel, Waveform),
    Param(Channel, ParamSlot, f64),
    Pcie(HostValue),
    Envelope(usize, u16),
    WaveLen(u32),
    WaveChannel(Channel),
    WaveIndex(Waveform),
}

pub type Timeline = Vec<(u64, Channel, Waveform)>;

#[derive(Debug, Default)]
pub struct FakeRegisters {
    pub writes: Vec<Write>,
    pub sram: Vec<f64>,
    /// Results served by `read_fmr`, front first; `fmr_default` once empty.
    pub fmr_script: VecDeque<i32>,
    pub fmr_default: i32,
    pub iq: Iq,
    pub ready_after_polls: u32,
    pub polls: u32,
    /// `(repeat, timeline)` of every trigger issued so far.
    pub triggers: Vec<(u32, Timeline)>,
    timeline: Timeline,
    cursor: u64,
    not_ready: u32,
}

impl FakeRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: &[f64]) -> Self {
        Self {
            sram: params.to_vec(),
            ..Self::default()
        }
    }

    pub fn pcie(&self) -> Vec<HostValue> {
        self.writes
            .iter()
            .filter_map(|w| match w {
                Write::Pcie(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn plays(&self) -> Vec<(Channel, Waveform)> {
        self.writes
            .iter()
            .filter_map(|w| match w {
                Write::Play(c, wf) => Some((*c, *wf)),
                _ => None,
            })
            .collect()
    }
}

impl Registers for FakeRegisters {
    fn write_trigger_count(&mut self, repeat: u32) {
        self.writes.push(Write::TriggerCount(repeat));
        self.triggers
            .push((repeat, std::mem::take(&mut self.timeline)));
        self.cursor = 0;
        self.not_ready = self.ready_after_polls;
    }

    fn write_trigger_interval(&mut self, interval: u32) {
        self.writes.push(Write::Interval(interval));
    }

    fn write_trigger_bitmask(&mut self, bitmask: u32) {
        self.writes.push(Write::Bitmask(bitmask));
    }

    fn write_fmr_offset(&mut self, offset: u32) {
        self.writes.push(Write::FmrOffset(offset));
    }

    fn write_wait(&mut self, duration: u32) {
        self.writes.push(Write::Wait(duration));
        self.cursor += u64::from(duration);
    }

    fn write_play(&mut self, channel: Channel, waveform: Waveform) {
        self.writes.push(Write::Play(channel, waveform));
        self.timeline.push((self.cursor, channel, waveform));
    }

    fn write_param(&mut self, channel: Channel, slot: ParamSlot, value: f64) {
        self.writes.push(Write::Param(channel, slot, value));
    }

    fn read_fmr(&mut self, _channel: Channel) -> i32 {
        self.fmr_script.pop_front().unwrap_or(self.fmr_default)
    }

    fn read_fmr_iq(&mut self, _channel: Channel) -> Iq {
        self.iq
    }

    fn fmr_ready(&mut self) -> bool {
        self.polls += 1;
        if self.not_ready > 0 {
            self.not_ready -= 1;
            return false;
        }
        true
    }

    fn write_pcie_word(&mut self, value: i32) {
        self.writes.push(Write::Pcie(HostValue::Word(value)));
    }

    fn write_pcie_f64(&mut self, value: f64) {
        self.writes.push(Write::Pcie(HostValue::Double(value)));
    }

    fn read_sram(&mut self, index: usize) -> f64 {
        self.sram.get(index).copied().unwrap_or(0.0)
    }

    fn write_envelope(&mut self, sample_index: usize, sample: u16) {
        self.writes.push(Write::Envelope(sample_index, sample));
    }

    fn write_wave_len(&mut self, len: u32) {
        self.writes.push(Write::WaveLen(len));
    }

    fn write_wave_channel(&mut self, channel: Channel) {
        self.writes.push(Write::WaveChannel(channel));
    }

    fn write_wave_index(&mut self, index: Waveform) {
        self.writes.push(Write::WaveIndex(index));
    }
}
