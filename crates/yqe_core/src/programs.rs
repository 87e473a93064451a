use core::fmt;
use core::str::FromStr;

use thiserror::Error;

use crate::YqeError;
use crate::calibration::{
    RabiAmp, RabiPulse, RabiZ, T1, T1Iq, T2, T2NoFringe, Transmission, VectorT1,
};
use crate::rb::RbDriver;
use crate::regs::{Registers, TriggerConfig};
use crate::sequencer::Sequencer;

/// A control program: a parameter-order contract plus a run routine.
///
/// `load` consumes the host parameter stream in the program's fixed order.
/// `run` compiles and triggers timelines and emits the result records.
pub trait Program: Sized {
    /// Name used by the host tooling.
    const NAME: &'static str;

    fn load<R: Registers>(seq: &mut Sequencer<R>) -> Result<Self, YqeError>;

    fn run<R: Registers>(&self, seq: &mut Sequencer<R>) -> Result<(), YqeError>;
}

/// Configures the trigger, loads `P` from the parameter stream and runs it.
///
/// Gives the register binding back once the program has finished.
pub fn execute<P: Program, R: Registers>(regs: R) -> Result<R, YqeError> {
    let mut seq = Sequencer::new(regs);
    seq.configure(&TriggerConfig::default());
    let program = P::load(&mut seq)?;
    log::info!("running {}", P::NAME);
    program.run(&mut seq)?;
    Ok(seq.into_inner())
}

/// Every program shipped with the control unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    Rb,
    T1,
    T1Iq,
    T2,
    T2NoFringe,
    RabiAmp,
    RabiPulse,
    RabiZ,
    Transmission,
    VectorT1,
}

impl ProgramKind {
    pub const ALL: [ProgramKind; 10] = [
        ProgramKind::Rb,
        ProgramKind::T1,
        ProgramKind::T1Iq,
        ProgramKind::T2,
        ProgramKind::T2NoFringe,
        ProgramKind::RabiAmp,
        ProgramKind::RabiPulse,
        ProgramKind::RabiZ,
        ProgramKind::Transmission,
        ProgramKind::VectorT1,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ProgramKind::Rb => RbDriver::NAME,
            ProgramKind::T1 => T1::NAME,
            ProgramKind::T1Iq => T1Iq::NAME,
            ProgramKind::T2 => T2::NAME,
            ProgramKind::T2NoFringe => T2NoFringe::NAME,
            ProgramKind::RabiAmp => RabiAmp::NAME,
            ProgramKind::RabiPulse => RabiPulse::NAME,
            ProgramKind::RabiZ => RabiZ::NAME,
            ProgramKind::Transmission => Transmission::NAME,
            ProgramKind::VectorT1 => VectorT1::NAME,
        }
    }

    /// Number of values in one result record.
    pub const fn record_arity(self) -> usize {
        match self {
            ProgramKind::Rb
            | ProgramKind::T1
            | ProgramKind::T1Iq
            | ProgramKind::T2
            | ProgramKind::T2NoFringe => 2,
            ProgramKind::RabiAmp | ProgramKind::RabiPulse | ProgramKind::RabiZ => 3,
            ProgramKind::Transmission => 1,
            ProgramKind::VectorT1 => 1 + crate::calibration::VECTOR_QUBITS,
        }
    }

    pub fn execute<R: Registers>(self, regs: R) -> Result<R, YqeError> {
        match self {
            ProgramKind::Rb => execute::<RbDriver, R>(regs),
            ProgramKind::T1 => execute::<T1, R>(regs),
            ProgramKind::T1Iq => execute::<T1Iq, R>(regs),
            ProgramKind::T2 => execute::<T2, R>(regs),
            ProgramKind::T2NoFringe => execute::<T2NoFringe, R>(regs),
            ProgramKind::RabiAmp => execute::<RabiAmp, R>(regs),
            ProgramKind::RabiPulse => execute::<RabiPulse, R>(regs),
            ProgramKind::RabiZ => execute::<RabiZ, R>(regs),
            ProgramKind::Transmission => execute::<Transmission, R>(regs),
            ProgramKind::VectorT1 => execute::<VectorT1, R>(regs),
        }
    }
}

impl fmt::Display for ProgramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a program name is not recognised.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("unknown program")]
pub struct UnknownProgram;

impl FromStr for ProgramKind {
    type Err = UnknownProgram;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProgramKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or(UnknownProgram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeRegisters, Write};

    #[test]
    fn names_round_trip() {
        for kind in ProgramKind::ALL {
            assert_eq!(kind.name().parse(), Ok(kind));
        }
        assert_eq!("t3".parse::<ProgramKind>(), Err(UnknownProgram));
        assert_eq!(
            "t2-no-fringe".parse::<ProgramKind>(),
            Ok(ProgramKind::T2NoFringe)
        );
    }

    #[test]
    fn unknown_program_is_an_error() {
        let err: &dyn core::error::Error = &UnknownProgram;
        assert_eq!(err.to_string(), "unknown program");
    }

    #[test]
    fn execute_configures_trigger_first() {
        let fake = FakeRegisters::with_params(&[0.0, 1.0, 10.0]);
        let fake = ProgramKind::T1.execute(fake).unwrap();
        assert_eq!(
            fake.writes[..3],
            [
                Write::Bitmask(0xffff_ffff),
                Write::Interval(1000),
                Write::FmrOffset(0)
            ]
        );
    }
}
