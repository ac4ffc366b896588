use bytes::Bytes;

/// One demuxed media packet as pulled from the buffer.
///
/// Video payloads are a run of NAL units, each prefixed by a 4-byte
/// big-endian length. Audio payloads hold exactly one raw frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaPacket {
    pub track_id: u32,
    /// Presentation time in milliseconds.
    pub time_ms: u64,
    pub is_key: bool,
    pub data: Bytes,
}

impl MediaPacket {
    pub fn new(track_id: u32, data: impl Into<Bytes>) -> Self {
        Self {
            track_id,
            time_ms: 0,
            is_key: false,
            data: data.into(),
        }
    }

    pub fn with_time(mut self, time_ms: u64) -> Self {
        self.time_ms = time_ms;
        self
    }

    pub fn with_key_flag(mut self, is_key: bool) -> Self {
        self.is_key = is_key;
        self
    }

    /// Presentation time on the 90 kHz PES clock, wrapping like the clock.
    pub fn pts(&self) -> u64 {
        self.time_ms.wrapping_mul(90)
    }
}
