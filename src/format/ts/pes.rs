use super::types::{STREAM_ID_AUDIO, STREAM_ID_VIDEO};
use bytes::{BufMut, Bytes, BytesMut};

/// Bytes following the packet length field when only a PTS is present:
/// two flag bytes, header data length, 5-byte PTS.
const PES_PTS_HEADER_SIZE: usize = 8;

/// Packetized Elementary Stream (PES) header carrying a presentation time.
///
/// Only the fields the HLS output writes are modelled; DTS, ESCR and the
/// other optional fields are never present.
#[derive(Debug, Clone)]
pub struct PESHeader {
    /// Stream identifier indicating content type (video/audio)
    pub stream_id: u8,
    /// Length of the remainder of the PES packet, 0 for unbounded video
    pub packet_length: u16,
    /// Data alignment indicator
    pub data_alignment: bool,
    /// Presentation Time Stamp on the 90 kHz clock (33 bits used)
    pub pts: u64,
}

impl PESHeader {
    /// Lead-in for a video access unit of unknown length.
    pub fn video(pts: u64) -> Self {
        Self {
            stream_id: STREAM_ID_VIDEO,
            packet_length: 0,
            data_alignment: true,
            pts,
        }
    }

    /// Lead-in for an audio frame whose payload (headers included) is `payload_len` bytes.
    pub fn audio(payload_len: usize, pts: u64) -> Self {
        let length = payload_len + PES_PTS_HEADER_SIZE;
        Self {
            stream_id: STREAM_ID_AUDIO,
            packet_length: u16::try_from(length).unwrap_or(0),
            data_alignment: false,
            pts,
        }
    }

    pub fn write_to(&self, buf: &mut BytesMut) {
        // Start code prefix
        buf.put_slice(&[0x00, 0x00, 0x01]);
        buf.put_u8(self.stream_id);
        buf.put_u16(self.packet_length);

        // '10' marker, no scrambling, alignment as configured
        let mut flags = 0x80u8;
        if self.data_alignment {
            flags |= 0x04;
        }
        buf.put_u8(flags);

        // PTS only
        buf.put_u8(0x80);
        buf.put_u8(5);
        write_timestamp(buf, 0x20, self.pts);
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(9 + 5);
        self.write_to(&mut buf);
        buf.freeze()
    }
}

/// Writes a 33-bit timestamp with its marker bits.
fn write_timestamp(buf: &mut BytesMut, marker: u8, ts: u64) {
    let pts = ts & 0x1FFFFFFFF; // 33 bits

    // First byte: marker bits and 3 MSB of timestamp
    buf.put_u8(marker | ((pts >> 29) & 0x0E) as u8 | 0x01);

    // Middle 15 bits and marker
    buf.put_u16((((pts >> 14) & 0xFFFE) | 0x01) as u16);

    // Final 15 bits and marker
    buf.put_u16((((pts << 1) & 0xFFFE) | 0x01) as u16);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn read_pts(b: &[u8]) -> u64 {
        ((b[0] as u64 >> 1) & 0x07) << 30
            | (b[1] as u64) << 22
            | ((b[2] as u64) >> 1) << 15
            | (b[3] as u64) << 7
            | (b[4] as u64) >> 1
    }

    #[test]
    fn test_video_lead_in() {
        let bytes = PESHeader::video(90_000).to_bytes();
        assert_eq!(&bytes[..9], &[0x00, 0x00, 0x01, 0xe0, 0x00, 0x00, 0x84, 0x80, 0x05]);
        assert_eq!(bytes.len(), 14);
        assert_eq!(bytes[9] & 0xF1, 0x21);
        assert_eq!(read_pts(&bytes[9..]), 90_000);
    }

    #[test]
    fn test_audio_lead_in_length() {
        let bytes = PESHeader::audio(7 + 200, 45_000).to_bytes();
        assert_eq!(bytes[3], 0xc0);
        assert_eq!(u16::from_be_bytes([bytes[4], bytes[5]]), 215);
        assert_eq!(read_pts(&bytes[9..]), 45_000);
    }

    #[test]
    fn test_pts_wraps_at_33_bits() {
        let bytes = PESHeader::video((1 << 33) + 5).to_bytes();
        assert_eq!(read_pts(&bytes[9..]), 5);
    }
}
