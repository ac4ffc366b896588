use async_trait::async_trait;
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

mod packet;
pub use packet::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecType {
    H264,
    AAC,
    MP3,
    /// Anything else the ingest side stored, kept by name.
    Other(String),
}

impl CodecType {
    /// Maps the metadata store's codec name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "H264" => CodecType::H264,
            "AAC" => CodecType::AAC,
            "MP3" => CodecType::MP3,
            other => CodecType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for CodecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecType::H264 => f.write_str("H264"),
            CodecType::AAC => f.write_str("AAC"),
            CodecType::MP3 => f.write_str("MP3"),
            CodecType::Other(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
    /// Subtitles, metadata and the like; never packetized.
    Other,
}

/// Ordered supply of media packets for one segment request.
#[async_trait]
pub trait PacketSource: Send {
    /// Positions the source so the next packet of `tracks` is at or after `time_ms`.
    async fn seek(&mut self, tracks: &BTreeSet<u32>, time_ms: u64) -> crate::Result<()>;

    /// Next packet in presentation order, `None` once the buffer is exhausted.
    async fn read_packet(&mut self) -> crate::Result<Option<MediaPacket>>;
}

/// Packet source over an in-memory, time-ordered packet list.
#[derive(Debug, Default)]
pub struct MemorySource {
    packets: Vec<MediaPacket>,
    pending: VecDeque<MediaPacket>,
}

impl MemorySource {
    pub fn new(packets: Vec<MediaPacket>) -> Self {
        Self {
            pending: packets.iter().cloned().collect(),
            packets,
        }
    }
}

#[async_trait]
impl PacketSource for MemorySource {
    async fn seek(&mut self, tracks: &BTreeSet<u32>, time_ms: u64) -> crate::Result<()> {
        self.pending = self
            .packets
            .iter()
            .filter(|p| tracks.contains(&p.track_id) && p.time_ms >= time_ms)
            .cloned()
            .collect();
        Ok(())
    }

    async fn read_packet(&mut self) -> crate::Result<Option<MediaPacket>> {
        Ok(self.pending.pop_front())
    }
}
