//! Program Specific Information: the PAT and PMT sections describing which
//! PIDs carry the selected elementary streams.

use super::types::*;
use crate::av::CodecType;
use crate::error::{HlsError, Result};
use crate::utils::Crc32Mpeg2;
use bytes::{BufMut, Bytes, BytesMut};

/// Stream type code for a codec, `None` when a transport stream cannot
/// signal it.
pub fn stream_type(codec: &CodecType) -> Option<u8> {
    match codec {
        CodecType::H264 => Some(STREAM_TYPE_H264),
        CodecType::AAC => Some(STREAM_TYPE_AAC),
        CodecType::MP3 => Some(STREAM_TYPE_MP3),
        CodecType::Other(_) => None,
    }
}

#[derive(Debug, Clone)]
pub struct PATEntry {
    pub program_number: u16,
    pub program_map_pid: u16,
}

#[derive(Debug, Clone, Default)]
pub struct PAT {
    pub entries: Vec<PATEntry>,
}

impl PAT {
    /// Single program pointing at the PMT PID.
    pub fn single_program() -> Self {
        Self {
            entries: vec![PATEntry {
                program_number: PROGRAM_NUMBER,
                program_map_pid: PID_PMT,
            }],
        }
    }

    pub fn write_to(&self, buf: &mut BytesMut) {
        for entry in &self.entries {
            buf.put_u16(entry.program_number);
            buf.put_u16(entry.program_map_pid & 0x1fff | 7 << 13);
        }
    }

    pub fn section(&self) -> Bytes {
        let mut body = BytesMut::new();
        self.write_to(&mut body);
        psi_section(TABLE_ID_PAT, TRANSPORT_STREAM_ID, &body)
    }
}

#[derive(Debug, Clone)]
pub struct ElementaryStreamInfo {
    pub stream_type: u8,
    pub elementary_pid: u16,
}

#[derive(Debug, Clone, Default)]
pub struct PMT {
    pub pcr_pid: u16,
    pub elementary_stream_infos: Vec<ElementaryStreamInfo>,
}

impl PMT {
    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.put_u16(self.pcr_pid & 0x1fff | 7 << 13);
        // No program descriptors
        buf.put_u16(0xf << 12);

        for info in &self.elementary_stream_infos {
            buf.put_u8(info.stream_type);
            buf.put_u16(info.elementary_pid & 0x1fff | 7 << 13);
            buf.put_u16(0xf << 12);
        }
    }

    pub fn section(&self) -> Bytes {
        let mut body = BytesMut::new();
        self.write_to(&mut body);
        psi_section(TABLE_ID_PMT, PROGRAM_NUMBER, &body)
    }
}

/// Track selected for a segment, as seen by the program map.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramStream {
    pub track_id: u32,
    pub codec: CodecType,
}

/// PAT and PMT sections for one selection of tracks, built once per request.
#[derive(Debug, Clone)]
pub struct ProgramTables {
    pat: Bytes,
    pmt: Bytes,
    pcr_pid: u16,
}

impl ProgramTables {
    /// Builds the tables; streams are ordered by track id and the lowest one
    /// carries the PCR. Codecs without a stream type are rejected.
    pub fn build(streams: &[ProgramStream]) -> Result<Self> {
        let mut streams = streams.to_vec();
        streams.sort_by_key(|s| s.track_id);
        streams.dedup_by_key(|s| s.track_id);

        let first = streams
            .first()
            .ok_or_else(|| HlsError::InvalidData("program without streams".into()))?;
        let pcr_pid = checked_elementary_pid(first.track_id)
            .ok_or(HlsError::UnmappableTrack(first.track_id))?;

        let mut pmt = PMT {
            pcr_pid,
            elementary_stream_infos: Vec::with_capacity(streams.len()),
        };
        for stream in &streams {
            let elementary_pid = checked_elementary_pid(stream.track_id)
                .ok_or(HlsError::UnmappableTrack(stream.track_id))?;
            let stream_type =
                self::stream_type(&stream.codec).ok_or_else(|| HlsError::UnsupportedCodec {
                    track: stream.track_id,
                    codec: stream.codec.to_string(),
                })?;
            pmt.elementary_stream_infos.push(ElementaryStreamInfo {
                stream_type,
                elementary_pid,
            });
        }

        Ok(Self {
            pat: PAT::single_program().section(),
            pmt: pmt.section(),
            pcr_pid,
        })
    }

    pub fn pat(&self) -> &Bytes {
        &self.pat
    }

    pub fn pmt(&self) -> &Bytes {
        &self.pmt
    }

    pub fn pcr_pid(&self) -> u16 {
        self.pcr_pid
    }
}

/// Long-form section: header, body, CRC32 over everything before it.
fn psi_section(table_id: u8, table_id_extension: u16, body: &[u8]) -> Bytes {
    // table id extension .. last section number, body, CRC
    let section_length = 5 + body.len() + 4;
    let mut buf = BytesMut::with_capacity(3 + section_length);
    buf.put_u8(table_id);
    // section_syntax_indicator, '0', reserved
    buf.put_u16(0xB000 | (section_length as u16 & 0x3ff));
    buf.put_u16(table_id_extension);
    // reserved, version 0, current
    buf.put_u8(0xC1);
    buf.put_u8(0);
    buf.put_u8(0);
    buf.put_slice(body);
    let crc = Crc32Mpeg2::calculate(&buf);
    buf.put_u32(crc);
    buf.freeze()
}

/// Wraps a section into one complete 188-byte transport packet.
pub fn write_section_packet(buf: &mut BytesMut, pid: u16, continuity_counter: u8, section: &[u8]) {
    let start = buf.len();
    TSHeader {
        payload_unit_start: true,
        pid,
        continuity_counter,
        ..Default::default()
    }
    .write_to(buf);
    // Pointer field
    buf.put_u8(0);
    let room = TS_PACKET_SIZE - TS_HEADER_SIZE - 1;
    buf.put_slice(&section[..section.len().min(room)]);
    buf.put_bytes(STUFFING_BYTE, TS_PACKET_SIZE - (buf.len() - start));
}
