//! In-memory pulse device.
//!
//! Implements the register interface on the host so that the control
//! programs run unchanged against a simple physical model. Every trigger
//! evolves one Bloch vector per measured qubit through the compiled
//! timeline, then samples `repeat` shots from the final excited-state
//! population.

use bitvec::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::mem;

use yqe_core::channel::{Channel, ChannelKind};
use yqe_core::host_io::HostValue;
use yqe_core::regs::{ChannelParams, Iq, ParamSlot, Registers, TriggerConfig};
use yqe_core::waveform::{FULL_AMP, Waveform, WaveformKind};
use yqe_common::mmio::ENVELOPE_CAPACITY;

use crate::config::{DeviceConfig, QubitConfig};

/// One PLAY of a compiled timeline with the parameters it consumed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineEvent {
    pub time: u64,
    pub channel: Channel,
    pub waveform: Waveform,
    pub params: ChannelParams,
}

/// Single-qubit state as a Bloch vector; `z = 1` is |0>.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bloch {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Bloch {
    pub const GROUND: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };

    /// Rotates by `angle` about the unit vector `axis`.
    pub fn rotate(&mut self, axis: [f64; 3], angle: f64) {
        let [kx, ky, kz] = axis;
        let (s, c) = angle.sin_cos();
        let dot = kx * self.x + ky * self.y + kz * self.z;
        let cross = [
            ky * self.z - kz * self.y,
            kz * self.x - kx * self.z,
            kx * self.y - ky * self.x,
        ];
        let t = dot * (1.0 - c);
        self.x = self.x * c + cross[0] * s + kx * t;
        self.y = self.y * c + cross[1] * s + ky * t;
        self.z = self.z * c + cross[2] * s + kz * t;
    }

    /// Evolves under a drive of Rabi rate `omega` at `phase` with detuning
    /// `delta` (both rad/ns) for `duration` ns.
    pub fn drive(&mut self, omega: f64, phase: f64, delta: f64, duration: f64) {
        let w = [omega * phase.cos(), omega * phase.sin(), delta];
        let norm = (w[0] * w[0] + w[1] * w[1] + w[2] * w[2]).sqrt();
        if norm == 0.0 || duration == 0.0 {
            return;
        }
        self.rotate([w[0] / norm, w[1] / norm, w[2] / norm], norm * duration);
    }

    /// Amplitude and phase damping over `dt`.
    pub fn relax(&mut self, dt: f64, qubit: &QubitConfig) {
        if dt <= 0.0 {
            return;
        }
        if let Some(t1) = qubit.t1 {
            self.z = 1.0 - (1.0 - self.z) * (-dt / t1).exp();
        }
        let transverse = match (qubit.t2, qubit.t1) {
            (Some(t2), _) => (-dt / t2).exp(),
            (None, Some(t1)) => (-dt / (2.0 * t1)).exp(),
            (None, None) => 1.0,
        };
        self.x *= transverse;
        self.y *= transverse;
    }

    pub fn depolarize(&mut self, p: f64) {
        let keep = 1.0 - p.clamp(0.0, 1.0);
        self.x *= keep;
        self.y *= keep;
        self.z *= keep;
    }

    /// Population of |1>.
    pub fn p1(&self) -> f64 {
        ((1.0 - self.z) / 2.0).clamp(0.0, 1.0)
    }
}

/// Evolution state of one qubit while a timeline executes.
#[derive(Debug, Clone, Copy)]
struct QubitRun {
    bloch: Bloch,
    last: u64,
    /// Detuning of the drive frame, rad/ns.
    detuning: f64,
    z_shift: f64,
    /// Rabi rate and phase of an open square pulse.
    square: Option<(f64, f64)>,
    /// Excited-state population at the last measurement.
    measured: Option<f64>,
}

impl QubitRun {
    fn new() -> Self {
        Self {
            bloch: Bloch::GROUND,
            last: 0,
            detuning: 0.0,
            z_shift: 0.0,
            square: None,
            measured: None,
        }
    }

    fn advance(&mut self, time: u64, qubit: &QubitConfig) {
        // Events that start while a pulse is still playing see no free time.
        let dt = time.saturating_sub(self.last) as f64;
        self.last = self.last.max(time);
        let delta = self.detuning + self.z_shift;
        match self.square {
            Some((omega, phase)) => self.bloch.drive(omega, phase, delta, dt),
            None => self.bloch.rotate([0.0, 0.0, 1.0], delta * dt),
        }
        self.bloch.relax(dt, qubit);
    }

    /// Occupies the qubit for a pulse of `duration` ns starting at `start`.
    fn hold(&mut self, start: u64, duration: f64, qubit: &QubitConfig) {
        self.bloch.relax(duration, qubit);
        self.last = self.last.max(start + duration.round() as u64);
    }
}

/// Detuning parameter (MHz) to angular frequency in rad/ns.
fn detuning_rad(mhz: f64) -> f64 {
    TAU * mhz * 1e-3
}

/// Simulated pulse-generation electronics.
pub struct SimulatedDevice {
    config: DeviceConfig,
    trigger: TriggerConfig,
    sram: Vec<f64>,
    output: Vec<HostValue>,
    params: HashMap<Channel, ChannelParams>,
    timeline: Vec<TimelineEvent>,
    last_timeline: Vec<TimelineEvent>,
    cursor: u64,
    fmr: HashMap<usize, i32>,
    fmr_iq: HashMap<usize, Iq>,
    shots: HashMap<Channel, BitVec>,
    busy: u32,
    polls: u64,
    triggers: u64,
    envelope: Vec<u16>,
    pending_channel: Option<Channel>,
    pending_index: Option<Waveform>,
    envelopes: HashMap<(Channel, Waveform), Vec<u16>>,
    rng: StdRng,
}

impl SimulatedDevice {
    /// A device with `params` preloaded into the SRAM parameter stream.
    pub fn new(config: DeviceConfig, params: Vec<f64>) -> Self {
        let rng = StdRng::seed_from_u64(config.shot_seed);
        Self {
            config,
            trigger: TriggerConfig::default(),
            sram: params,
            output: Vec::new(),
            params: HashMap::new(),
            timeline: Vec::new(),
            last_timeline: Vec::new(),
            cursor: 0,
            fmr: HashMap::new(),
            fmr_iq: HashMap::new(),
            shots: HashMap::new(),
            busy: 0,
            polls: 0,
            triggers: 0,
            envelope: vec![0; ENVELOPE_CAPACITY],
            pending_channel: None,
            pending_index: None,
            envelopes: HashMap::new(),
            rng,
        }
    }

    /// Values emitted on the PCIe stream so far.
    pub fn output(&self) -> &[HostValue] {
        &self.output
    }

    pub fn into_output(self) -> Vec<HostValue> {
        self.output
    }

    /// Timeline executed by the most recent trigger.
    pub fn last_timeline(&self) -> &[TimelineEvent] {
        &self.last_timeline
    }

    pub fn triggers(&self) -> u64 {
        self.triggers
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn trigger_config(&self) -> TriggerConfig {
        self.trigger
    }

    /// Per-shot outcomes of the last trigger on `channel`, `1` for |1>.
    pub fn shots(&self, channel: Channel) -> Option<&BitVec> {
        self.shots.get(&channel)
    }

    /// Committed envelope of `waveform` on `channel`.
    pub fn envelope(&self, channel: Channel, waveform: Waveform) -> Option<&[u16]> {
        self.envelopes.get(&(channel, waveform)).map(Vec::as_slice)
    }

    fn execute(&mut self, repeat: u32) {
        let mut runs: BTreeMap<Channel, QubitRun> = BTreeMap::new();

        for event in &self.timeline {
            let ChannelKind::Qubit(k) = event.channel.kind() else {
                log::trace!("ignoring {} on {}", event.waveform.index(), event.channel);
                continue;
            };
            let qubit = self.config.qubit(usize::from(k));
            let run = runs.entry(event.channel).or_insert_with(QubitRun::new);
            run.advance(event.time, &qubit);
            run.detuning = detuning_rad(event.params.detuning());
            self.apply(run, event, &qubit);
        }

        self.fmr.clear();
        self.fmr_iq.clear();
        self.shots.clear();
        for (channel, run) in runs {
            let Some(p1) = run.measured else { continue };
            let ChannelKind::Qubit(k) = channel.kind() else { continue };
            let e = self.config.qubit(usize::from(k)).readout_error.clamp(0.0, 1.0);
            let p = (p1 * (1.0 - e) + (1.0 - p1) * e).clamp(0.0, 1.0);

            let bits: BitVec = (0..repeat).map(|_| self.rng.gen_bool(p)).collect();
            let ones = bits.count_ones();
            let zeros = bits.len() - ones;
            let n = f64::from(repeat.max(1));
            log::trace!("{channel}: p1={p1:.4} ones={ones}/{repeat}");

            self.fmr.insert(channel.index(), zeros as i32);
            self.fmr_iq.insert(
                channel.index(),
                Iq {
                    i: ones as f64 / n,
                    q: zeros as f64 / n,
                },
            );
            self.shots.insert(channel, bits);
        }
    }

    fn apply(&self, run: &mut QubitRun, event: &TimelineEvent, qubit: &QubitConfig) {
        let params = &event.params;
        let delta = run.detuning + run.z_shift;
        let pulse = self.config.pi_pulse_ns;

        match event.waveform.kind() {
            WaveformKind::Reset => *run = QubitRun { last: run.last, ..QubitRun::new() },
            WaveformKind::Measure => run.measured = Some(run.bloch.p1()),
            WaveformKind::Pi | WaveformKind::HalfPi => {
                let angle = if event.waveform == Waveform::PI { PI } else { FRAC_PI_2 };
                let omega = angle * params.amplitude() / pulse;
                run.bloch.drive(omega, params.phase(), delta, pulse);
                run.bloch.depolarize(qubit.gate_error);
                run.hold(event.time, pulse, qubit);
            }
            WaveformKind::SquareUp => {
                run.square = Some((self.config.square_rabi_rate * params.amplitude(), params.phase()));
            }
            WaveformKind::SquareDown => {
                if run.square.take().is_some() {
                    run.bloch.depolarize(qubit.gate_error);
                }
            }
            WaveformKind::ZUp => run.z_shift = self.config.z_detuning_scale * params.amplitude(),
            WaveformKind::ZDown => run.z_shift = 0.0,
            WaveformKind::CustomXy => {
                let Some(samples) = self.envelope(event.channel, event.waveform) else {
                    log::warn!("{} plays waveform {} before any upload", event.channel, event.waveform.index());
                    return;
                };
                let n = samples.len() / 2;
                if n == 0 {
                    return;
                }
                let area: f64 = samples[..n].iter().map(|&s| f64::from(s) / f64::from(FULL_AMP)).sum();
                let omega = self.config.square_rabi_rate * params.amplitude() * area / n as f64;
                run.bloch.drive(omega, params.phase(), delta, n as f64);
                run.bloch.depolarize(qubit.gate_error);
                run.hold(event.time, n as f64, qubit);
            }
            WaveformKind::CustomZ => {
                let Some(samples) = self.envelope(event.channel, event.waveform) else {
                    log::warn!("{} plays waveform {} before any upload", event.channel, event.waveform.index());
                    return;
                };
                let area: f64 = samples.iter().map(|&s| f64::from(s) / f64::from(FULL_AMP)).sum();
                let kick = self.config.z_detuning_scale * params.amplitude() * area;
                run.bloch.rotate([0.0, 0.0, 1.0], kick);
            }
            WaveformKind::Unassigned => {
                log::warn!("{} plays unassigned waveform {}", event.channel, event.waveform.index());
            }
        }
    }
}

impl Registers for SimulatedDevice {
    fn write_trigger_count(&mut self, repeat: u32) {
        self.execute(repeat);
        self.last_timeline = mem::take(&mut self.timeline);
        self.cursor = 0;
        self.busy = self.config.ready_latency_polls;
        self.triggers += 1;
    }

    fn write_trigger_interval(&mut self, interval: u32) {
        self.trigger.interval = interval;
    }

    fn write_trigger_bitmask(&mut self, bitmask: u32) {
        self.trigger.bitmask = bitmask;
    }

    fn write_fmr_offset(&mut self, offset: u32) {
        self.trigger.fmr_offset = offset;
    }

    fn write_wait(&mut self, duration: u32) {
        self.cursor += u64::from(duration);
    }

    fn write_play(&mut self, channel: Channel, waveform: Waveform) {
        let params = self.params.get(&channel).copied().unwrap_or_default();
        self.timeline.push(TimelineEvent {
            time: self.cursor,
            channel,
            waveform,
            params,
        });
    }

    fn write_param(&mut self, channel: Channel, slot: ParamSlot, value: f64) {
        self.params.entry(channel).or_default().set(slot, value);
    }

    fn read_fmr(&mut self, channel: Channel) -> i32 {
        self.fmr.get(&channel.index()).copied().unwrap_or(0)
    }

    fn read_fmr_iq(&mut self, channel: Channel) -> Iq {
        self.fmr_iq.get(&channel.index()).copied().unwrap_or_default()
    }

    fn fmr_ready(&mut self) -> bool {
        self.polls += 1;
        if self.busy > 0 {
            self.busy -= 1;
            return false;
        }
        true
    }

    fn write_pcie_word(&mut self, value: i32) {
        self.output.push(HostValue::Word(value));
    }

    fn write_pcie_f64(&mut self, value: f64) {
        self.output.push(HostValue::Double(value));
    }

    fn read_sram(&mut self, index: usize) -> f64 {
        match self.sram.get(index) {
            Some(&value) => value,
            None => {
                log::warn!("parameter {} requested, only {} supplied", index, self.sram.len());
                0.0
            }
        }
    }

    fn write_envelope(&mut self, sample_index: usize, sample: u16) {
        match self.envelope.get_mut(sample_index) {
            Some(slot) => *slot = sample,
            None => log::warn!("envelope sample {} outside the table", sample_index),
        }
    }

    fn write_wave_len(&mut self, len: u32) {
        let (Some(channel), Some(index)) = (self.pending_channel, self.pending_index) else {
            log::warn!("envelope commit without destination");
            return;
        };
        let len = (len as usize).min(self.envelope.len());
        self.envelopes
            .insert((channel, index), self.envelope[..len].to_vec());
        log::debug!("committed {} samples to waveform {} on {}", len, index.index(), channel);
    }

    fn write_wave_channel(&mut self, channel: Channel) {
        self.pending_channel = Some(channel);
    }

    fn write_wave_index(&mut self, index: Waveform) {
        self.pending_index = Some(index);
    }
}
