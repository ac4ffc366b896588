//! # H.264/AVC Helpers
//!
//! Conversions between the length-prefixed form stored by the buffer and
//! the Annex B form required inside a transport stream:
//!
//! - decoder configuration records (`avcC`) rendered as inline SPS/PPS
//! - iteration over 4-byte length-prefixed NAL units with truncation detection
//!
//! ```rust
//! use hlsmux::codec::h264::{LengthPrefixedNalus, START_CODE};
//!
//! let sample = [0, 0, 0, 2, 0x65, 0x88];
//! let mut annex_b = Vec::new();
//! for nal in LengthPrefixedNalus::new(&sample) {
//!     annex_b.extend_from_slice(&START_CODE);
//!     annex_b.extend_from_slice(nal);
//! }
//! assert_eq!(annex_b, vec![0, 0, 0, 1, 0x65, 0x88]);
//! ```

/// AVC decoder configuration record parsing
pub mod avcc;
/// Length-prefixed NAL unit iteration
pub mod nalu;
/// NAL unit types and Annex B constants
pub mod types;

#[doc(inline)]
pub use avcc::AvcConfig;
#[doc(inline)]
pub use nalu::{LengthPrefixedNalus, Truncation};
#[doc(inline)]
pub use types::{NALUnitType, ACCESS_UNIT_DELIMITER, START_CODE};
