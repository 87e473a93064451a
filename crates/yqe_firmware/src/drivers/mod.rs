//! Hardware drivers for firmware peripherals.
//!
//! Each driver wraps the memory-mapped registers of one device behind a
//! safe interface.

pub mod pulse;
