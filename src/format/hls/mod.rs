//! # HTTP Live Streaming Output
//!
//! Serves a buffered stream to HLS clients:
//!
//! - **Requests**: the URL grammar for master playlists, media playlists
//!   and `<from>_<until>.ts` segments
//! - **Playlists**: master and media playlists built from a metadata
//!   snapshot, with the live sliding window
//! - **Seek gating**: live segment requests outside the buffered window are
//!   refused before any byte is sent
//! - **Session**: [`HlsOutput`] answers requests and streams segments
//!
//! ## Example Usage
//!
//! ```rust
//! use hlsmux::av::{CodecType, MediaPacket, MemorySource, TrackKind};
//! use hlsmux::config::Config;
//! use hlsmux::format::hls::HlsOutput;
//! use hlsmux::meta::{Fragment, Meta, SharedMeta, Track};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let video = Track::new(1, TrackKind::Video, CodecType::H264)
//!     .with_fragment(Fragment::closed(1, 2000), 0);
//! let meta = SharedMeta::new(Meta::new(false).with_track(video));
//! let mut session = HlsOutput::new(meta, Config::default());
//!
//! let response = session.handle_request("/hls/cam/1/0_2000.ts", "curl/8.0");
//! assert_eq!(response.status, 200);
//!
//! let mut source = MemorySource::new(vec![
//!     MediaPacket::new(1, vec![0, 0, 0, 1, 0x65]).with_key_flag(true),
//! ]);
//! let mut segment = Vec::new();
//! session.stream_segment(&mut source, &mut segment).await?;
//! assert_eq!(segment.len() % 188, 0);
//! # Ok(())
//! # }
//! ```

mod playlist;
mod request;
mod seek;
mod session;

pub use playlist::{HLSMasterPlaylist, HLSPlaylist, HLSSegment, HLSVariant};
pub use request::{HlsRequest, PlaylistFormat};
pub use seek::Seekable;
pub use session::{HlsOutput, Response, SEGMENT_CONTENT_TYPE};
