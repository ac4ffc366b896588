//! Bitstream helpers for the codecs the transport stream output carries.

pub mod aac;
pub mod h264;

// Re-export common types
pub use aac::{AACConfig, ADTSHeader};
pub use h264::{AvcConfig, LengthPrefixedNalus};
