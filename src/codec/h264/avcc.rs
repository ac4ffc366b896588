use super::types::{NALUnitType, START_CODE};
use crate::error::{HlsError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Parameter sets carried by an AVC decoder configuration record (`avcC`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvcConfig {
    pub profile_idc: u8,
    pub level_idc: u8,
    /// Size of the NAL length prefix used in samples, usually 4.
    pub length_size: u8,
    pub sps: Vec<Bytes>,
    pub pps: Vec<Bytes>,
}

impl AvcConfig {
    pub fn parse(record: &[u8]) -> Result<Self> {
        let mut buf = record;
        if buf.remaining() < 6 {
            return Err(HlsError::Codec("avcC record too short".into()));
        }
        let version = buf.get_u8();
        if version != 1 {
            return Err(HlsError::Codec(format!(
                "unsupported avcC version {}",
                version
            )));
        }
        let profile_idc = buf.get_u8();
        buf.advance(1); // profile compatibility
        let level_idc = buf.get_u8();
        let length_size = (buf.get_u8() & 0x03) + 1;

        let sps_count = buf.get_u8() & 0x1F;
        let sps = read_parameter_sets(&mut buf, sps_count as usize)?;
        if !buf.has_remaining() {
            return Err(HlsError::Codec("avcC record misses PPS count".into()));
        }
        let pps_count = buf.get_u8();
        let pps = read_parameter_sets(&mut buf, pps_count as usize)?;

        for nal in sps.iter().chain(pps.iter()) {
            log::trace!("avcC parameter set {:?}", NALUnitType::of(nal[0]));
        }

        Ok(Self {
            profile_idc,
            level_idc,
            length_size,
            sps,
            pps,
        })
    }

    /// SPS then PPS units, each behind a start code.
    pub fn to_annex_b(&self) -> Bytes {
        let size: usize = self.sps.iter().chain(self.pps.iter()).map(|n| n.len() + 4).sum();
        let mut out = BytesMut::with_capacity(size);
        for nal in self.sps.iter().chain(self.pps.iter()) {
            out.put_slice(&START_CODE);
            out.put_slice(nal);
        }
        out.freeze()
    }
}

fn read_parameter_sets(buf: &mut &[u8], count: usize) -> Result<Vec<Bytes>> {
    let mut sets = Vec::with_capacity(count);
    for _ in 0..count {
        if buf.remaining() < 2 {
            return Err(HlsError::Codec("avcC parameter set length missing".into()));
        }
        let len = buf.get_u16() as usize;
        if len == 0 || buf.remaining() < len {
            return Err(HlsError::Codec(format!(
                "avcC parameter set of {} bytes, {} available",
                len,
                buf.remaining()
            )));
        }
        sets.push(Bytes::copy_from_slice(&buf[..len]));
        buf.advance(len);
    }
    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RECORD: [u8; 23] = [
        0x01, 0x64, 0x00, 0x1F, 0xFF, 0xE1, // version, profile, compat, level, length size 4, 1 SPS
        0x00, 0x06, 0x67, 0x64, 0x00, 0x1F, 0xAC, 0xD9, // SPS
        0x01, // 1 PPS
        0x00, 0x04, 0x68, 0xEB, 0xE3, 0xCB, // PPS
        0x00, 0x00, // trailing extension bytes are ignored
    ];

    #[test]
    fn test_parse_record() {
        let config = AvcConfig::parse(&RECORD).unwrap();
        assert_eq!(config.profile_idc, 0x64);
        assert_eq!(config.level_idc, 0x1F);
        assert_eq!(config.length_size, 4);
        assert_eq!(config.sps.len(), 1);
        assert_eq!(config.pps.len(), 1);
    }

    #[test]
    fn test_annex_b_output() {
        let config = AvcConfig::parse(&RECORD).unwrap();
        assert_eq!(
            config.to_annex_b().to_vec(),
            vec![
                0x00, 0x00, 0x00, 0x01, 0x67, 0x64, 0x00, 0x1F, 0xAC, 0xD9, 0x00, 0x00, 0x00,
                0x01, 0x68, 0xEB, 0xE3, 0xCB,
            ]
        );
    }

    #[test]
    fn test_truncated_record() {
        assert!(AvcConfig::parse(&RECORD[..10]).is_err());
        assert!(AvcConfig::parse(&[0x01, 0x64]).is_err());
        let mut bad_version = RECORD;
        bad_version[0] = 2;
        assert!(AvcConfig::parse(&bad_version).is_err());
    }
}
