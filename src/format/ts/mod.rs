//! # MPEG Transport Stream (TS) Output
//!
//! Everything needed to turn buffered media packets into a transport
//! stream an HLS client can play:
//!
//! - **PSI**: PAT/PMT sections for the selected tracks, sealed with CRC32
//! - **Packet buffer**: 188-byte packets with PCR, random access flags
//!   and adaptation field stuffing
//! - **Packetizer**: splits PES bytes into packets, keeps per-PID
//!   continuity counters and re-injects the tables every 42 packets
//! - **Framer**: builds PES units from H.264 access units and AAC/MP3 frames
//!
//! ## Example Usage
//!
//! ```rust
//! use hlsmux::av::{CodecType, MediaPacket, TrackKind};
//! use hlsmux::format::ts::{EsFramer, Packetizer, ProgramStream, ProgramTables, TS_PACKET_SIZE};
//! use hlsmux::meta::Track;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tables = ProgramTables::build(&[ProgramStream { track_id: 1, codec: CodecType::H264 }])?;
//! let mut packetizer = Packetizer::new(tables);
//! let mut framer = EsFramer::new(false);
//!
//! let track = Track::new(1, TrackKind::Video, CodecType::H264);
//! let packet = MediaPacket::new(1, vec![0, 0, 0, 2, 0x41, 0x9a]).with_time(40);
//! framer.frame(&track, &packet, &mut packetizer);
//!
//! let output = packetizer.take_output();
//! assert_eq!(output.len() % TS_PACKET_SIZE, 0);
//! # Ok(())
//! # }
//! ```

/// PES units built from media packets
pub mod framer;

/// The transport packet under construction and continuity counters
pub mod packet;

/// Packet splitting, table re-injection and output buffering
pub mod packetizer;

/// PES header encoding
pub mod pes;

/// PAT/PMT construction
pub mod psi;

/// Core TS types and constants
pub mod types;

pub use framer::{EsFramer, FrameOutcome};
pub use packet::{ContinuityCounters, TsPacket};
pub use packetizer::{AccessUnit, Packetizer};
pub use pes::PESHeader;
pub use psi::{ProgramStream, ProgramTables};
pub use types::{
    checked_elementary_pid, elementary_pid, ms_to_pts, TSHeader, PID_PAT, PID_PMT,
    STREAM_TYPE_AAC, STREAM_TYPE_H264, STREAM_TYPE_MP3, TS_PACKET_SIZE, TS_PAYLOAD_SIZE,
};
