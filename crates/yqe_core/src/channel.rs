//! Logical-to-register channel mapping.
//!
//! Every array-shaped register (PLAY, PARAMS, FMR, FMR_IQ) is indexed by a
//! channel offset. Single-qubit drive lines, two-qubit couplers and raw
//! physical outputs occupy disjoint offset ranges; callers always go through
//! the constructors here instead of computing offsets by hand.

use core::fmt;
use yqe_common::topology::{COUPLER_BASE, PHYSICAL_BASE, QUBIT_BASE};

/// Register offset of one channel of the control electronics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(u16);

/// Which offset range a channel falls into, with its logical index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Qubit(u16),
    Coupler(u16),
    Physical(u16),
}

impl Channel {
    /// Drive channel of logical qubit `k`.
    ///
    /// Indices past the coupler range are a programming error for the
    /// fixed topology.
    pub const fn qubit(k: u16) -> Self {
        debug_assert!(k < COUPLER_BASE - QUBIT_BASE);
        Self(QUBIT_BASE + k)
    }

    /// Channel of two-qubit interaction (coupler) `k`.
    pub const fn coupler(k: u16) -> Self {
        debug_assert!(k < PHYSICAL_BASE - COUPLER_BASE);
        Self(COUPLER_BASE + k)
    }

    /// Raw physical output `k`.
    pub const fn physical(k: u16) -> Self {
        debug_assert!(k <= u16::MAX - PHYSICAL_BASE);
        Self(PHYSICAL_BASE + k)
    }

    /// Wraps a register offset read back from hardware or a trace.
    pub const fn from_offset(offset: u16) -> Self {
        Self(offset)
    }

    /// Register offset of this channel.
    pub const fn offset(self) -> u16 {
        self.0
    }

    /// Offset as an array index into the register file.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn kind(self) -> ChannelKind {
        if self.0 >= PHYSICAL_BASE {
            ChannelKind::Physical(self.0 - PHYSICAL_BASE)
        } else if self.0 >= COUPLER_BASE {
            ChannelKind::Coupler(self.0 - COUPLER_BASE)
        } else {
            ChannelKind::Qubit(self.0 - QUBIT_BASE)
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ChannelKind::Qubit(k) => write!(f, "q{k}"),
            ChannelKind::Coupler(k) => write!(f, "c{k}"),
            ChannelKind::Physical(k) => write!(f, "p{k}"),
        }
    }
}

/// Drive channel of logical qubit `k`.
pub const fn channel_1q(k: u16) -> Channel {
    Channel::qubit(k)
}

/// Channel of two-qubit interaction `k`.
pub const fn channel_2q(k: u16) -> Channel {
    Channel::coupler(k)
}

/// Raw physical channel `k`.
pub const fn channel_phys(k: u16) -> Channel {
    Channel::physical(k)
}
