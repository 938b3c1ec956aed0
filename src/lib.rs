
// Error type shared by every layer below
pub mod error;

// External data representation, a protocol for serializing data to be sent over the network
pub mod xdr;

// Remote procedure call, a protocol build on top of XDR to provide something like C-style function calls over the network
pub mod rpc;

// A protocol using RPC that's meant to communicate with instruments like oscilloscopes, power supplies, waveform generators, etc
pub mod vxi11;

// Message-based links to an instrument: VXI-11 for real hardware, a scripted mock for tests
pub mod transport;

// SCPI commands and queries, binary blocks and error-queue checking
pub mod scpi;

// Instrument drivers built on the SCPI layer
pub mod devices;

// FFT and curve-fit helpers for captured waveforms
pub mod analysis;

pub use crate::error::{Error, Result};
