//! # AAC Helpers
//!
//! Parses the track's AudioSpecificConfig and builds the ADTS header each
//! raw AAC frame needs before it can be carried in a transport stream.

/// AudioSpecificConfig and ADTS header types
pub mod types;

pub use types::{AACConfig, ADTSHeader, ProfileType, ADTS_HEADER_SIZE};
