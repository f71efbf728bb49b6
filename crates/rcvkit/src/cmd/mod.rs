//! Command implementations for the `rcv` binary.

pub mod parse;
pub mod rut;
