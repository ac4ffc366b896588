#![doc(html_root_url = "https://docs.rs/hlsmux/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::missing_crate_level_docs)]

//! # hlsmux - HTTP Live Streaming output
//!
//! `hlsmux` turns already demuxed, buffered media packets into what an HLS
//! client asks for: master and media playlists, and MPEG transport stream
//! segments cut at arbitrary millisecond boundaries.
//!
//! ## Features
//!
//! - H.264 video with access unit delimiters and SPS/PPS on keyframes
//! - AAC audio framed with ADTS headers, MP3 passed through
//! - PAT/PMT re-injection, PCR on keyframes, per-PID continuity counters
//! - Live sliding window playlists and VoD playlists
//! - Seek gating for live segments outside the buffered window
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hlsmux::av::MemorySource;
//! use hlsmux::format::hls::HlsOutput;
//! use hlsmux::meta::SharedMeta;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Filled by the ingest side
//!     let meta = SharedMeta::default();
//!     let mut session = HlsOutput::new(meta, hlsmux::config::current());
//!
//!     let response = session.handle_request("/hls/cam/1_2/0_4000.ts", "AppleCoreMedia/1.0");
//!     if response.is_success() && session.is_streaming() {
//!         let mut source = MemorySource::new(Vec::new());
//!         let mut out = tokio::io::stdout();
//!         session.stream_segment(&mut source, &mut out).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - `av`: media packets and the packet source trait
//! - `meta`: shared track and fragment metadata with snapshot reads
//! - `codec`: H.264 decoder configuration and NAL framing, AAC config and ADTS
//! - `format`: transport stream packetizing and the HLS session
//! - `config`: process-wide settings
//! - `error`: error type and result alias
//! - `utils`: bit reader/writer and CRC32

/// Media packets and packet sources
pub mod av;

/// Codec configuration parsing and elementary stream framing
pub mod codec;

/// Error types and utilities
pub mod error;

/// Transport stream and HLS output
pub mod format;

/// Track and fragment metadata shared with the ingest side
pub mod meta;

/// Common utilities and helper functions
pub mod utils;

/// Configuration module
pub mod config;

pub use error::{HlsError, Result};
