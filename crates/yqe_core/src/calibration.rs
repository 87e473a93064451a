//! Calibration sweeps.
//!
//! Each program drives logical qubit 0 (the vector T1 sweep drives qubits
//! 0 to 4), reads its parameters with truncation to integers unless noted,
//! and emits one record per sweep point. Sweep steps must be positive.

use core::f64::consts::FRAC_PI_2;

use num_traits::Float;

use crate::YqeError;
use crate::channel::{Channel, channel_1q};
use crate::clifford::DELAY_X;
use crate::programs::Program;
use crate::rb::DELAY_RESET;
use crate::regs::{ParamSlot, Registers};
use crate::sequencer::Sequencer;
use crate::waveform::{Envelope, Waveform};

/// Shots per point for sweeps that do not take a repeat parameter.
pub const CALIBRATION_REPEAT: u32 = 1000;
/// Time unit of pulse-length sweeps.
pub const LENGTH_UNIT: u32 = 25;
/// Readout integration time of the transmission measurement.
pub const DELAY_READOUT: u32 = 200;
/// Qubits measured together by the vector T1 sweep.
pub const VECTOR_QUBITS: usize = 5;
/// Slot holding the square drive envelope of the pulse-length Rabi sweep.
pub const RABI_PULSE_SLOT: u8 = 4;

const DRIVE: Channel = channel_1q(0);

fn reset_drive<R: Registers>(seq: &mut Sequencer<R>, channel: Channel) {
    seq.set_param(channel, ParamSlot::Phase, 0.0);
    seq.set_param(channel, ParamSlot::Amplitude, 1.0);
}

/// `0, step, 2·step, ...` strictly below `max`.
fn delays(max: i32, step: usize) -> impl Iterator<Item = i32> {
    (0..max.max(0)).step_by(step)
}

/// `-range, -range + step, ...` up to and including `range`.
fn symmetric(
    name: &'static str,
    range: i32,
    step: usize,
) -> Result<impl Iterator<Item = i32>, YqeError> {
    let low = range
        .checked_neg()
        .ok_or(YqeError::SweepOutOfRange { name, value: range })?;
    Ok((low..=range).step_by(step))
}

/// `1, 1 + step, ...` up to and including `max`.
fn lengths(max: i32, step: usize) -> impl Iterator<Item = i32> {
    (1..=max).step_by(step)
}

fn duration(value: i32) -> u32 {
    value.max(0) as u32
}

/// Duration of a pulse `len` length units long.
fn pulse_length(name: &'static str, len: i32) -> Result<u32, YqeError> {
    duration(len)
        .checked_mul(LENGTH_UNIT)
        .ok_or(YqeError::SweepOutOfRange { name, value: len })
}

/// Energy relaxation: survival after a π pulse and a variable delay.
///
/// Parameters: `delay_max`, `delay_step`, `repeat`.
/// Record: delay, survival count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct T1 {
    pub delay_max: i32,
    pub delay_step: usize,
    pub repeat: u32,
}

impl T1 {
    fn load_params<R: Registers>(seq: &mut Sequencer<R>) -> Result<Self, YqeError> {
        Ok(Self {
            delay_max: seq.param_int(),
            delay_step: seq.param_step("delay_step")?,
            repeat: seq.param_count("repeat")?,
        })
    }

    /// Compiles and triggers one point on `channels`.
    fn shot<R: Registers>(&self, seq: &mut Sequencer<R>, channels: &[Channel], delay: i32) {
        for &ch in channels {
            seq.play(ch, Waveform::RESET);
        }
        seq.wait(DELAY_RESET);
        for &ch in channels {
            seq.play(ch, Waveform::PI);
        }
        seq.wait(DELAY_X);
        seq.wait(duration(delay));
        for &ch in channels {
            seq.play(ch, Waveform::MEAS);
        }
        seq.trigger(self.repeat);
    }
}

impl Program for T1 {
    const NAME: &'static str = "t1";

    fn load<R: Registers>(seq: &mut Sequencer<R>) -> Result<Self, YqeError> {
        Self::load_params(seq)
    }

    fn run<R: Registers>(&self, seq: &mut Sequencer<R>) -> Result<(), YqeError> {
        reset_drive(seq, DRIVE);
        for delay in delays(self.delay_max, self.delay_step) {
            self.shot(seq, &[DRIVE], delay);
            let count = seq.fetch(DRIVE);
            seq.emit_word(delay);
            seq.emit_word(count);
        }
        Ok(())
    }
}

/// T1 observed on the demodulated I quadrature instead of the count.
///
/// Usable before the readout discrimination is calibrated. Same
/// parameters as [`T1`]. Record: delay, I (double).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct T1Iq(pub T1);

impl Program for T1Iq {
    const NAME: &'static str = "t1-iq";

    fn load<R: Registers>(seq: &mut Sequencer<R>) -> Result<Self, YqeError> {
        T1::load_params(seq).map(T1Iq)
    }

    fn run<R: Registers>(&self, seq: &mut Sequencer<R>) -> Result<(), YqeError> {
        reset_drive(seq, DRIVE);
        for delay in delays(self.0.delay_max, self.0.delay_step) {
            self.0.shot(seq, &[DRIVE], delay);
            let iq = seq.fetch_iq(DRIVE);
            seq.emit_word(delay);
            seq.emit_f64(iq.i);
        }
        Ok(())
    }
}

/// Five-qubit T1 with the pulses of all qubits compiled side by side.
///
/// Same parameters as [`T1`]. Record: delay, then one count per qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorT1(pub T1);

impl Program for VectorT1 {
    const NAME: &'static str = "vector-t1";

    fn load<R: Registers>(seq: &mut Sequencer<R>) -> Result<Self, YqeError> {
        T1::load_params(seq).map(VectorT1)
    }

    fn run<R: Registers>(&self, seq: &mut Sequencer<R>) -> Result<(), YqeError> {
        let channels: [Channel; VECTOR_QUBITS] =
            core::array::from_fn(|k| channel_1q(k as u16));
        for &ch in &channels {
            reset_drive(seq, ch);
        }
        for delay in delays(self.0.delay_max, self.0.delay_step) {
            self.0.shot(seq, &channels, delay);
            let counts = channels.map(|ch| seq.fetch(ch));
            seq.emit_word(delay);
            for count in counts {
                seq.emit_word(count);
            }
        }
        Ok(())
    }
}

/// Ramsey T2: two π/2 pulses around a variable delay.
///
/// The second pulse is phase-shifted by `delay · fringe / 1000` to make the
/// decay oscillate. Parameters: `fringe` (double), `delay_max`,
/// `delay_step`, `repeat`. Record: delay, count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct T2 {
    pub fringe: f64,
    pub delay_max: i32,
    pub delay_step: usize,
    pub repeat: u32,
}

impl Program for T2 {
    const NAME: &'static str = "t2";

    fn load<R: Registers>(seq: &mut Sequencer<R>) -> Result<Self, YqeError> {
        Ok(Self {
            fringe: seq.param_f64(),
            delay_max: seq.param_int(),
            delay_step: seq.param_step("delay_step")?,
            repeat: seq.param_count("repeat")?,
        })
    }

    fn run<R: Registers>(&self, seq: &mut Sequencer<R>) -> Result<(), YqeError> {
        seq.set_param(DRIVE, ParamSlot::Amplitude, 1.0);
        for delay in delays(self.delay_max, self.delay_step) {
            seq.play(DRIVE, Waveform::RESET);
            seq.wait(DELAY_RESET);
            seq.set_param(DRIVE, ParamSlot::Phase, 0.0);
            seq.play(DRIVE, Waveform::PI_2);
            seq.wait(DELAY_X);
            seq.wait(duration(delay));
            seq.set_param(DRIVE, ParamSlot::Phase, f64::from(delay) * self.fringe / 1000.0);
            seq.play(DRIVE, Waveform::PI_2);
            seq.wait(DELAY_X);
            seq.play(DRIVE, Waveform::MEAS);
            seq.trigger(self.repeat);

            let count = seq.fetch(DRIVE);
            seq.emit_word(delay);
            seq.emit_word(count);
        }
        Ok(())
    }
}

/// Ramsey T2 without a fringe, read out in two complementary bases.
///
/// Each delay is measured twice: with the second π/2 pulse in phase with
/// the first (X basis) and shifted by π/2 (Y basis). The emitted purity
/// `sqrt(fx² + fy²)`, with `f = count / repeat - 1/2`, decays with the
/// coherence independently of any detuning. Parameters: `delay_max`,
/// `delay_step`, `repeat`. Record: delay, purity (double).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct T2NoFringe(pub T1);

impl T2NoFringe {
    fn ramsey<R: Registers>(&self, seq: &mut Sequencer<R>, delay: i32, phase: f64) -> f64 {
        seq.play(DRIVE, Waveform::RESET);
        seq.wait(DELAY_RESET);
        seq.set_param(DRIVE, ParamSlot::Phase, 0.0);
        seq.play(DRIVE, Waveform::PI_2);
        seq.wait(DELAY_X);
        seq.wait(duration(delay));
        seq.set_param(DRIVE, ParamSlot::Phase, phase);
        seq.play(DRIVE, Waveform::PI_2);
        seq.wait(DELAY_X);
        seq.play(DRIVE, Waveform::MEAS);
        seq.trigger(self.0.repeat);

        f64::from(seq.fetch(DRIVE)) / f64::from(self.0.repeat) - 0.5
    }
}

impl Program for T2NoFringe {
    const NAME: &'static str = "t2-no-fringe";

    fn load<R: Registers>(seq: &mut Sequencer<R>) -> Result<Self, YqeError> {
        T1::load_params(seq).map(T2NoFringe)
    }

    fn run<R: Registers>(&self, seq: &mut Sequencer<R>) -> Result<(), YqeError> {
        seq.set_param(DRIVE, ParamSlot::Amplitude, 1.0);
        for delay in delays(self.0.delay_max, self.0.delay_step) {
            let fx = self.ramsey(seq, delay, 0.0);
            let fy = self.ramsey(seq, delay, FRAC_PI_2);
            seq.emit_word(delay);
            seq.emit_f64(Float::hypot(fx, fy));
        }
        Ok(())
    }
}

/// Rabi chevron over drive detuning and π-pulse amplitude.
///
/// Detuning runs over `[-freq_range, freq_range] / 100`, amplitude over
/// `1..=amp_range` quarters of the calibrated π amplitude. Parameters:
/// `freq_range`, `freq_step`, `amp_range`, `amp_step`. Record: freq, amp,
/// count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RabiAmp {
    pub freq_range: i32,
    pub freq_step: usize,
    pub amp_range: i32,
    pub amp_step: usize,
}

impl Program for RabiAmp {
    const NAME: &'static str = "rabi-amp";

    fn load<R: Registers>(seq: &mut Sequencer<R>) -> Result<Self, YqeError> {
        Ok(Self {
            freq_range: seq.param_int(),
            freq_step: seq.param_step("freq_step")?,
            amp_range: seq.param_int(),
            amp_step: seq.param_step("amp_step")?,
        })
    }

    fn run<R: Registers>(&self, seq: &mut Sequencer<R>) -> Result<(), YqeError> {
        let freqs = symmetric("freq_range", self.freq_range, self.freq_step)?;
        reset_drive(seq, DRIVE);
        for freq in freqs {
            seq.set_param(DRIVE, ParamSlot::Detuning, f64::from(freq) / 100.0);
            for amp in lengths(self.amp_range, self.amp_step) {
                seq.play(DRIVE, Waveform::RESET);
                seq.wait(DELAY_RESET);
                seq.set_param(DRIVE, ParamSlot::Amplitude, f64::from(amp) / 4.0);
                seq.play(DRIVE, Waveform::PI);
                seq.wait(DELAY_X);
                seq.play(DRIVE, Waveform::MEAS);
                seq.trigger(CALIBRATION_REPEAT);

                let count = seq.fetch(DRIVE);
                seq.emit_word(freq);
                seq.emit_word(amp);
                seq.emit_word(count);
            }
        }
        Ok(())
    }
}

/// Rabi chevron over drive detuning and square-pulse length.
///
/// A square envelope of `len · 25` samples is uploaded to a custom slot
/// once per length and played for every detuning. Parameters:
/// `freq_range`, `freq_step`, `len_range`, `len_step`. Record: freq, len,
/// count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RabiPulse {
    pub freq_range: i32,
    pub freq_step: usize,
    pub len_range: i32,
    pub len_step: usize,
}

impl Program for RabiPulse {
    const NAME: &'static str = "rabi-pulse";

    fn load<R: Registers>(seq: &mut Sequencer<R>) -> Result<Self, YqeError> {
        Ok(Self {
            freq_range: seq.param_int(),
            freq_step: seq.param_step("freq_step")?,
            len_range: seq.param_int(),
            len_step: seq.param_step("len_step")?,
        })
    }

    fn run<R: Registers>(&self, seq: &mut Sequencer<R>) -> Result<(), YqeError> {
        let slot = Waveform::custom(RABI_PULSE_SLOT)?;
        // Reject the whole grid before the first trigger.
        let _ = symmetric("freq_range", self.freq_range, self.freq_step)?;
        pulse_length("len_range", self.len_range)?;

        reset_drive(seq, DRIVE);
        for len in lengths(self.len_range, self.len_step) {
            let samples = pulse_length("len_range", len)?;
            // Nothing compiled since the last trigger still refers to the slot.
            seq.upload(DRIVE, slot, &Envelope::square(samples as usize))?;
            for freq in symmetric("freq_range", self.freq_range, self.freq_step)? {
                seq.set_param(DRIVE, ParamSlot::Detuning, f64::from(freq) / 100.0);
                seq.play(DRIVE, Waveform::RESET);
                seq.wait(DELAY_RESET);
                seq.play(DRIVE, slot);
                seq.wait(samples);
                seq.wait(DELAY_X);
                seq.play(DRIVE, Waveform::MEAS);
                seq.trigger(CALIBRATION_REPEAT);

                let count = seq.fetch(DRIVE);
                seq.emit_word(freq);
                seq.emit_word(len);
                seq.emit_word(count);
            }
        }
        Ok(())
    }
}

/// Rabi chevron over Z-line amplitude and square drive length.
///
/// Z amplitude runs over `[-z_range, z_range] / 30`. Parameters:
/// `z_range`, `z_step`, `len_range`, `len_step`. Record: z, len, count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RabiZ {
    pub z_range: i32,
    pub z_step: usize,
    pub len_range: i32,
    pub len_step: usize,
}

impl Program for RabiZ {
    const NAME: &'static str = "rabi-z";

    fn load<R: Registers>(seq: &mut Sequencer<R>) -> Result<Self, YqeError> {
        Ok(Self {
            z_range: seq.param_int(),
            z_step: seq.param_step("z_step")?,
            len_range: seq.param_int(),
            len_step: seq.param_step("len_step")?,
        })
    }

    fn run<R: Registers>(&self, seq: &mut Sequencer<R>) -> Result<(), YqeError> {
        let zs = symmetric("z_range", self.z_range, self.z_step)?;
        pulse_length("len_range", self.len_range)?;

        reset_drive(seq, DRIVE);
        for z in zs {
            for len in lengths(self.len_range, self.len_step) {
                let drive = pulse_length("len_range", len)?;
                seq.play(DRIVE, Waveform::RESET);
                seq.wait(DELAY_RESET);
                seq.set_param(DRIVE, ParamSlot::Amplitude, f64::from(z) / 30.0);
                seq.play(DRIVE, Waveform::Z_UP);
                seq.set_param(DRIVE, ParamSlot::Amplitude, 1.0);
                seq.play(DRIVE, Waveform::SQUARE_UP);
                seq.wait(drive);
                seq.play(DRIVE, Waveform::Z_DOWN);
                seq.play(DRIVE, Waveform::SQUARE_DOWN);
                seq.wait(DELAY_X);
                seq.play(DRIVE, Waveform::MEAS);
                seq.trigger(CALIBRATION_REPEAT);

                let count = seq.fetch(DRIVE);
                seq.emit_word(z);
                seq.emit_word(len);
                seq.emit_word(count);
            }
        }
        Ok(())
    }
}

/// Single transmission point: Z bias, XY drive, then readout.
///
/// Parameters (all doubles except `repeat`): `ro_amp`, `ro_freq`, `z_amp`,
/// `xy_amp`, `xy_freq`, `repeat`. The frequencies are written to the phase
/// slot. Record: count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transmission {
    pub ro_amp: f64,
    pub ro_freq: f64,
    pub z_amp: f64,
    pub xy_amp: f64,
    pub xy_freq: f64,
    pub repeat: u32,
}

impl Program for Transmission {
    const NAME: &'static str = "transmission";

    fn load<R: Registers>(seq: &mut Sequencer<R>) -> Result<Self, YqeError> {
        Ok(Self {
            ro_amp: seq.param_f64(),
            ro_freq: seq.param_f64(),
            z_amp: seq.param_f64(),
            xy_amp: seq.param_f64(),
            xy_freq: seq.param_f64(),
            repeat: seq.param_count("repeat")?,
        })
    }

    fn run<R: Registers>(&self, seq: &mut Sequencer<R>) -> Result<(), YqeError> {
        seq.set_param(DRIVE, ParamSlot::Amplitude, self.z_amp);
        seq.play(DRIVE, Waveform::Z_UP);
        seq.set_param(DRIVE, ParamSlot::Phase, self.xy_freq);
        seq.set_param(DRIVE, ParamSlot::Amplitude, self.xy_amp);
        seq.play(DRIVE, Waveform::PI);
        seq.wait(DELAY_X);
        seq.play(DRIVE, Waveform::Z_DOWN);
        seq.wait(DELAY_X);
        seq.set_param(DRIVE, ParamSlot::Phase, self.ro_freq);
        seq.set_param(DRIVE, ParamSlot::Amplitude, self.ro_amp);
        seq.play(DRIVE, Waveform::MEAS);
        seq.wait(DELAY_READOUT);
        seq.trigger(self.repeat);

        let count = seq.fetch(DRIVE);
        seq.emit_word(count);
        Ok(())
    }
}
