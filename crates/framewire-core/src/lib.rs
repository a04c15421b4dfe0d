//! Shared vocabulary of framewire: frames, wire messages, reply envelopes,
//! the strategy table and the encoder/decoder seam every strategy plugs into.

pub mod common;
pub mod error;
pub mod frame;
pub mod reply;
pub mod strategy;
pub mod traits;

pub use bytes::Bytes;

#[cfg(test)]
mod tests;
