//! Fixed waveform catalog and custom envelope upload.
//!
//! The control electronics keep up to 256 waveform slots per channel. A
//! handful of them are fixed by the firmware of the electronics (reset,
//! measurement, calibrated π and π/2 pulses, square-pulse edges on the XY
//! and Z lines). The remaining slots can be filled at run time by uploading
//! a sampled envelope through the shared envelope table.

use crate::YqeError;
use crate::channel::Channel;
use crate::regs::Registers;
use yqe_common::mmio::ENVELOPE_CAPACITY;

/// Full-scale amplitude of a 14-bit envelope sample.
pub const FULL_AMP: u16 = 0x4000;

/// Index of a waveform slot on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Waveform(u8);

/// How a single-qubit channel interprets a waveform slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveformKind {
    Pi,
    HalfPi,
    SquareUp,
    SquareDown,
    ZUp,
    ZDown,
    Reset,
    Measure,
    /// Uploaded XY envelope (I samples followed by Q samples).
    CustomXy,
    /// Uploaded Z-line envelope.
    CustomZ,
    /// Reserved slot with no assigned meaning.
    Unassigned,
}

impl Waveform {
    /// Calibrated π rotation about the X axis (phase selects the axis).
    pub const PI: Self = Self(0);
    /// Calibrated π/2 rotation.
    pub const PI_2: Self = Self(1);
    /// Rising edge of a square pulse on the XY line.
    pub const SQUARE_UP: Self = Self(2);
    /// Falling edge of a square pulse on the XY line.
    pub const SQUARE_DOWN: Self = Self(3);
    /// Rising edge of a square pulse on the Z line.
    pub const Z_UP: Self = Self(64);
    /// Falling edge of a square pulse on the Z line.
    pub const Z_DOWN: Self = Self(65);
    /// Resets the qubit to |0>.
    pub const RESET: Self = Self(127);
    /// Measures the qubit.
    pub const MEAS: Self = Self(128);

    /// Two-qubit CZ placeholder on coupler channels; realisation is
    /// platform-specific.
    pub const CZ: Self = Self(0);
    /// Two-qubit iSWAP placeholder on coupler channels.
    pub const IS: Self = Self(1);

    /// Wraps a raw slot index read back from hardware or a trace.
    pub const fn from_index(index: u8) -> Self {
        Self(index)
    }

    /// Selects a non-reserved slot for a custom envelope.
    pub fn custom(index: u8) -> Result<Self, YqeError> {
        let waveform = Self(index);
        if waveform.is_reserved() {
            return Err(YqeError::ReservedWaveform(index));
        }
        Ok(waveform)
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    /// Slots owned by the catalog; uploads to them are rejected.
    pub const fn is_reserved(self) -> bool {
        matches!(self.0, 0..=3 | 64 | 65 | 127..=255)
    }

    pub const fn kind(self) -> WaveformKind {
        match self.0 {
            0 => WaveformKind::Pi,
            1 => WaveformKind::HalfPi,
            2 => WaveformKind::SquareUp,
            3 => WaveformKind::SquareDown,
            64 => WaveformKind::ZUp,
            65 => WaveformKind::ZDown,
            127 => WaveformKind::Reset,
            128 => WaveformKind::Measure,
            4..=63 => WaveformKind::CustomXy,
            66..=126 => WaveformKind::CustomZ,
            _ => WaveformKind::Unassigned,
        }
    }
}

/// Sampled envelope ready for upload.
///
/// Envelopes are either generated on the fly (no buffer needed on the
/// control unit) or borrowed from a caller-provided sample table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope<'a> {
    /// Square pulse of `length` samples: a zero ramp-up sample, a flat
    /// full-scale region and a zero ramp-down sample on I, followed by an
    /// all-zero Q region of the same length.
    Square { length: usize },
    /// Raw 16-bit samples, written as-is.
    Samples(&'a [u16]),
}

impl Envelope<'_> {
    pub const fn square(length: usize) -> Self {
        Envelope::Square { length }
    }

    /// Total number of samples committed by the upload.
    pub fn len(&self) -> usize {
        match self {
            Envelope::Square { length } => 2 * length,
            Envelope::Samples(samples) => samples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample at `index`, which must be below `len()`.
    pub fn sample(&self, index: usize) -> u16 {
        match self {
            Envelope::Square { length } => {
                let last = length.saturating_sub(1);
                if index == 0 || index >= last {
                    0
                } else {
                    FULL_AMP
                }
            }
            Envelope::Samples(samples) => samples[index],
        }
    }
}

/// Uploads `envelope` into `waveform` on `channel`.
///
/// Samples go first, then the destination channel and slot, and finally
/// the length, whose write commits the upload. A later PLAY of the same
/// slot sees the new content, including PLAYs already compiled into a
/// timeline that has not been triggered yet, so callers must not re-upload
/// a slot between its PLAYs within one timeline.
pub fn upload<R: Registers>(
    regs: &mut R,
    channel: Channel,
    waveform: Waveform,
    envelope: &Envelope<'_>,
) -> Result<(), YqeError> {
    if waveform.is_reserved() {
        return Err(YqeError::ReservedWaveform(waveform.index()));
    }
    let len = envelope.len();
    if len == 0 {
        return Err(YqeError::EmptyEnvelope);
    }
    if len > ENVELOPE_CAPACITY {
        return Err(YqeError::EnvelopeTooLong {
            len,
            capacity: ENVELOPE_CAPACITY,
        });
    }

    for i in 0..len {
        regs.write_envelope(i, envelope.sample(i));
    }
    regs.write_wave_channel(channel);
    regs.write_wave_index(waveform);
    regs.write_wave_len(len as u32);

    log::debug!(
        "uploaded {} samples to waveform {} on {}",
        len,
        waveform.index(),
        channel
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeRegisters, Write};

    #[test]
    fn catalog_indices_are_binary_contract() {
        assert_eq!(Waveform::PI.index(), 0);
        assert_eq!(Waveform::PI_2.index(), 1);
        assert_eq!(Waveform::SQUARE_UP.index(), 2);
        assert_eq!(Waveform::SQUARE_DOWN.index(), 3);
        assert_eq!(Waveform::Z_UP.index(), 64);
        assert_eq!(Waveform::Z_DOWN.index(), 65);
        assert_eq!(Waveform::RESET.index(), 127);
        assert_eq!(Waveform::MEAS.index(), 128);
        assert_eq!(Waveform::CZ.index(), 0);
        assert_eq!(Waveform::IS.index(), 1);
    }

    #[test]
    fn reserved_slots_reject_custom_upload() {
        for index in [0u8, 1, 2, 3, 64, 65, 127, 128, 200, 255] {
            assert_eq!(
                Waveform::custom(index),
                Err(YqeError::ReservedWaveform(index))
            );
        }
        assert_eq!(Waveform::custom(4).map(Waveform::kind), Ok(WaveformKind::CustomXy));
        assert_eq!(Waveform::custom(70).map(Waveform::kind), Ok(WaveformKind::CustomZ));
    }

    #[test]
    fn square_envelope_shape() {
        let env = Envelope::square(5);
        let samples: Vec<u16> = (0..env.len()).map(|i| env.sample(i)).collect();
        assert_eq!(
            samples,
            [0, FULL_AMP, FULL_AMP, FULL_AMP, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn upload_commits_length_last() {
        let mut fake = FakeRegisters::new();
        let slot = Waveform::custom(4).unwrap();
        upload(&mut fake, Channel::qubit(0), slot, &Envelope::square(3)).unwrap();

        let n = fake.writes.len();
        assert_eq!(n, 6 + 3);
        assert_eq!(fake.writes[n - 3], Write::WaveChannel(Channel::qubit(0)));
        assert_eq!(fake.writes[n - 2], Write::WaveIndex(slot));
        assert_eq!(fake.writes[n - 1], Write::WaveLen(6));
        assert_eq!(fake.writes[1], Write::Envelope(1, FULL_AMP));
    }

    #[test]
    fn upload_rejects_oversized_and_empty_envelopes() {
        let mut fake = FakeRegisters::new();
        let slot = Waveform::custom(5).unwrap();
        let err = upload(
            &mut fake,
            Channel::qubit(0),
            slot,
            &Envelope::square(ENVELOPE_CAPACITY),
        );
        assert_eq!(
            err,
            Err(YqeError::EnvelopeTooLong {
                len: 2 * ENVELOPE_CAPACITY,
                capacity: ENVELOPE_CAPACITY
            })
        );
        let err = upload(&mut fake, Channel::qubit(0), slot, &Envelope::Samples(&[]));
        assert_eq!(err, Err(YqeError::EmptyEnvelope));
        assert!(fake.writes.is_empty());
    }

    #[test]
    fn upload_rejects_catalog_slot() {
        let mut fake = FakeRegisters::new();
        let err = upload(
            &mut fake,
            Channel::qubit(0),
            Waveform::MEAS,
            &Envelope::Samples(&[1, 2]),
        );
        assert_eq!(err, Err(YqeError::ReservedWaveform(128)));
    }
}
