//! Single-qubit Clifford randomized benchmarking.
//!
//! For every requested circuit length `L` the driver plays `num_circuit`
//! random circuits of `L - 1` uniformly drawn Clifford elements followed
//! by the element that inverts their product. A noiseless qubit returns to
//! |0> after each circuit, so every shot measured in |1> is a failure. The
//! driver emits, per length, the length itself and the number of failed
//! shots over all circuits of that length; fitting the exponential decay is
//! left to the host.

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::YqeError;
use crate::channel::{Channel, channel_1q};
use crate::clifford::{Clifford, GROUP_ORDER};
use crate::host_io;
use crate::programs::Program;
use crate::regs::{ParamSlot, Registers};
use crate::sequencer::Sequencer;
use crate::static_vec::StaticVec;
use crate::waveform::Waveform;

/// Most circuit lengths one run can sweep.
pub const MAX_NUM_LENGTHS: usize = 100;
/// Hardware shots per circuit.
pub const RB_REPEAT: u32 = 1000;
/// Settling time after the reset pulse.
pub const DELAY_RESET: u32 = 100;

/// One randomized benchmarking run.
///
/// Parameter order on the host stream: `seed`, `num_lengths`,
/// `num_circuit`, then `num_lengths` lengths. Every value is rounded to the
/// nearest integer. Two words are emitted per length: `L` and the failure
/// count `repeat * num_circuit - Σ survival`.
#[derive(Debug, Clone, PartialEq)]
pub struct RbDriver {
    pub seed: u64,
    pub num_circuit: u32,
    pub lengths: StaticVec<u32, MAX_NUM_LENGTHS>,
    pub repeat: u32,
    pub channel: Channel,
}

impl RbDriver {
    pub fn new(seed: u64, num_circuit: u32, lengths: &[u32]) -> Result<Self, YqeError> {
        let lengths = StaticVec::from_slice(lengths).map_err(|count| YqeError::TooManyLengths {
            count,
            max: MAX_NUM_LENGTHS,
        })?;
        Ok(Self {
            seed,
            num_circuit,
            lengths,
            repeat: RB_REPEAT,
            channel: channel_1q(0),
        })
    }

    /// Runs the sweep with the PRNG seeded from `self.seed`.
    pub fn run_seeded<R: Registers>(&self, seq: &mut Sequencer<R>) {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        self.run_with_rng(seq, &mut rng);
    }

    /// Runs the sweep drawing circuit elements from `rng`.
    pub fn run_with_rng<R: Registers, G: RngCore>(&self, seq: &mut Sequencer<R>, rng: &mut G) {
        seq.set_param(self.channel, ParamSlot::Amplitude, 1.0);

        for &length in self.lengths.iter() {
            let mut fid_sum: i64 = 0;
            for _ in 0..self.num_circuit {
                self.play_circuit(seq, rng, length);
                seq.play(self.channel, Waveform::MEAS);
                seq.trigger(self.repeat);
                fid_sum += i64::from(seq.fetch(self.channel));
            }

            let shots = i64::from(self.repeat) * i64::from(self.num_circuit);
            let failures = shots - fid_sum;
            log::info!(
                "rb L={}: {} of {} shots failed",
                length,
                failures,
                shots
            );
            seq.emit_word(saturate(i64::from(length)));
            seq.emit_word(saturate(failures));
        }
    }

    /// Compiles reset, `length - 1` random elements and the recovery
    /// element. Returns the recovery element.
    ///
    /// A length of one (or zero) draws nothing and recovers with the
    /// identity, leaving a reset-then-measure reference circuit.
    pub fn play_circuit<R: Registers, G: RngCore>(
        &self,
        seq: &mut Sequencer<R>,
        rng: &mut G,
        length: u32,
    ) -> Clifford {
        seq.play(self.channel, Waveform::RESET);
        seq.wait(DELAY_RESET);

        let mut total = Clifford::IDENTITY;
        for _ in 1..length {
            let next = draw(rng);
            next.apply(seq, self.channel);
            total = total.compose(next);
        }

        let recovery = total.inverse();
        recovery.apply(seq, self.channel);
        log::trace!("circuit L={} recovers with {}", length, recovery);
        recovery
    }
}

/// Uniformly random group element.
pub fn draw<G: RngCore>(rng: &mut G) -> Clifford {
    Clifford::wrapping(rng.gen_range(0..GROUP_ORDER as u32))
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

impl Program for RbDriver {
    const NAME: &'static str = "rb";

    fn load<R: Registers>(seq: &mut Sequencer<R>) -> Result<Self, YqeError> {
        // The host seeds with an unsigned int.
        let seed = u64::from(seq.param_u32());
        let num_lengths = host_io::count("num_lengths", seq.param_rounded())? as usize;
        let num_circuit = host_io::count("num_circuit", seq.param_rounded())?;
        if num_lengths > MAX_NUM_LENGTHS {
            return Err(YqeError::TooManyLengths {
                count: num_lengths,
                max: MAX_NUM_LENGTHS,
            });
        }

        let mut lengths = StaticVec::new();
        for _ in 0..num_lengths {
            let length = host_io::count("length", seq.param_rounded())?;
            lengths
                .push(length)
                .map_err(|_| YqeError::TooManyLengths {
                    count: num_lengths,
                    max: MAX_NUM_LENGTHS,
                })?;
        }

        log::debug!(
            "rb seed={} circuits={} lengths={:?}",
            seed,
            num_circuit,
            lengths
        );
        Ok(Self {
            seed,
            num_circuit,
            lengths,
            repeat: RB_REPEAT,
            channel: channel_1q(0),
        })
    }

    fn run<R: Registers>(&self, seq: &mut Sequencer<R>) -> Result<(), YqeError> {
        self.run_seeded(seq);
        Ok(())
    }
}
