//! File formats exchanged between the host PC and the control programs.
//!
//! Parameter files hold the flat list of numbers written into SRAM before
//! a program starts. Result files hold the values a program streams back,
//! one record per line. Neither side is self-describing on the wire, so
//! the record layout of every program is kept here next to the writer.

/// Parameter file parsing.
///
/// Numbers separated by whitespace or commas, with `#` comments running to
/// the end of the line. Values are kept in file order, which is the order
/// the program reads them.
pub mod params;

/// Result stream records.
///
/// Splits the emitted value stream into fixed-arity records and writes them
/// as whitespace-separated text with a commented header naming the columns.
pub mod results;
