//! Ordered parameter intake and result emission towards the host PC.
//!
//! The host writes experiment parameters into SRAM as a flat sequence of
//! doubles before the program starts; programs consume them in a fixed,
//! program-specific order through an auto-incrementing cursor. Results go
//! back over the PCIe stream as words or doubles. Neither direction carries
//! names or types in-band, so each program documents its own contract.

use core::fmt;

use crate::YqeError;
use crate::regs::Registers;

/// One value emitted on the PCIe result stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostValue {
    Word(i32),
    Double(f64),
}

impl HostValue {
    pub fn as_f64(self) -> f64 {
        match self {
            HostValue::Word(w) => f64::from(w),
            HostValue::Double(d) => d,
        }
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Word(w) => write!(f, "{w}"),
            HostValue::Double(d) => write!(f, "{d}"),
        }
    }
}

/// Auto-incrementing read cursor over the SRAM parameter stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamCursor {
    next: usize,
}

impl ParamCursor {
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Index of the next parameter to be read.
    pub const fn position(&self) -> usize {
        self.next
    }

    pub fn next_f64<R: Registers>(&mut self, regs: &mut R) -> f64 {
        let value = regs.read_sram(self.next);
        log::trace!("param[{}] = {}", self.next, value);
        self.next += 1;
        value
    }

    /// Next parameter truncated towards zero.
    pub fn next_int<R: Registers>(&mut self, regs: &mut R) -> i32 {
        self.next_f64(regs) as i32
    }

    /// Next parameter rounded half up, tolerating host-side float noise.
    pub fn next_rounded<R: Registers>(&mut self, regs: &mut R) -> i32 {
        (self.next_f64(regs) + 0.5) as i32
    }

    /// Next parameter rounded half up and reduced modulo 2^32, so values
    /// up to `u32::MAX` keep their exact value.
    pub fn next_u32_wrapping<R: Registers>(&mut self, regs: &mut R) -> u32 {
        (self.next_f64(regs) + 0.5) as i64 as u32
    }
}

/// Interprets a parameter as a count.
pub fn count(name: &'static str, value: i32) -> Result<u32, YqeError> {
    u32::try_from(value).map_err(|_| YqeError::NegativeParameter { name, value })
}

/// Interprets a parameter as a sweep step.
pub fn step(name: &'static str, value: i32) -> Result<usize, YqeError> {
    if value <= 0 {
        return Err(YqeError::NonPositiveStep { name, value });
    }
    Ok(value as usize)
}
