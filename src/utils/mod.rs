//! # Utility Functions and Types
//!
//! Bit-level helpers used by the codec headers and the MPEG-2 CRC used by
//! the program tables.
//!
//! ```rust
//! use hlsmux::utils::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(3, 0b101);
//! let bytes = writer.into_bytes();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! ```

/// Bit reading and writing
pub mod bits;

/// CRC calculation
pub mod crc;

pub use bits::{BitReader, BitWriter};
pub use crc::Crc32Mpeg2;
