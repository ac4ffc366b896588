use bytes::{BufMut, BytesMut};

// Stream IDs
pub const STREAM_ID_VIDEO: u8 = 0xe0;
pub const STREAM_ID_AUDIO: u8 = 0xc0;

// PIDs
pub const PID_PAT: u16 = 0x0000;
pub const PID_PMT: u16 = 0x1000;

// Table IDs
pub const TABLE_ID_PAT: u8 = 0x00;
pub const TABLE_ID_PMT: u8 = 0x02;
pub const TRANSPORT_STREAM_ID: u16 = 1;
pub const PROGRAM_NUMBER: u16 = 1;

// Elementary Stream Types
pub const STREAM_TYPE_H264: u8 = 0x1b;
pub const STREAM_TYPE_AAC: u8 = 0x0f;
pub const STREAM_TYPE_MP3: u8 = 0x03;

// Constants
pub const TS_PACKET_SIZE: usize = 188;
pub const TS_HEADER_SIZE: usize = 4;
pub const TS_PAYLOAD_SIZE: usize = TS_PACKET_SIZE - TS_HEADER_SIZE;
pub const SYNC_BYTE: u8 = 0x47;
pub const STUFFING_BYTE: u8 = 0xff;
pub const PTS_HZ: u64 = 90_000;
pub const PCR_HZ: u64 = 27_000_000;

/// First and last PID handed out to elementary streams.
pub const PID_ELEMENTARY_FIRST: u16 = 0x100;
pub const PID_ELEMENTARY_LAST: u16 = 0x1ffe;

/// PID carrying the elementary stream of `track_id` (track 1 -> 0x100).
///
/// Wraps for track ids that cannot be mapped; tracks are validated with
/// [`checked_elementary_pid`] before their tables are built.
pub fn elementary_pid(track_id: u32) -> u16 {
    (0xffu32.wrapping_add(track_id) & 0x1fff) as u16
}

/// PID of `track_id`, or `None` when it would leave the elementary range
/// or land on the PMT.
pub fn checked_elementary_pid(track_id: u32) -> Option<u16> {
    let pid = 0xffu32.checked_add(track_id)?;
    let pid = u16::try_from(pid).ok()?;
    if (PID_ELEMENTARY_FIRST..=PID_ELEMENTARY_LAST).contains(&pid) && pid != PID_PMT {
        Some(pid)
    } else {
        None
    }
}

/// Converts milliseconds to the 27 MHz program clock. The clock wraps,
/// so does the conversion.
pub fn ms_to_pcr(time_ms: u64) -> u64 {
    time_ms.wrapping_mul(PCR_HZ / 1000)
}

/// Converts milliseconds to the 90 kHz PES clock, wrapping like the clock.
pub fn ms_to_pts(time_ms: u64) -> u64 {
    time_ms.wrapping_mul(PTS_HZ / 1000)
}

/// Writes a PCR as 33-bit base, 6 reserved bits, 9-bit extension.
pub fn write_pcr(buf: &mut BytesMut, pcr: u64) {
    let base = (pcr / 300) & 0x1_ffff_ffff;
    let ext = pcr % 300;
    buf.put_u32((base >> 1) as u32);
    buf.put_u16((((base & 1) << 15) | 0x3f << 9 | ext) as u16);
}

#[derive(Debug, Clone)]
pub struct TSHeader {
    pub transport_error: bool,
    pub payload_unit_start: bool,
    pub transport_priority: bool,
    pub pid: u16,
    pub scrambling_control: u8,
    pub adaptation_field_exists: bool,
    pub contains_payload: bool,
    pub continuity_counter: u8,
}

impl Default for TSHeader {
    fn default() -> Self {
        Self {
            transport_error: false,
            payload_unit_start: false,
            transport_priority: false,
            pid: 0,
            scrambling_control: 0,
            adaptation_field_exists: false,
            contains_payload: true,
            continuity_counter: 0,
        }
    }
}

impl TSHeader {
    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.put_u8(SYNC_BYTE);

        let mut b1 = 0u8;
        if self.transport_error {
            b1 |= 0x80;
        }
        if self.payload_unit_start {
            b1 |= 0x40;
        }
        if self.transport_priority {
            b1 |= 0x20;
        }
        b1 |= ((self.pid >> 8) & 0x1f) as u8;
        buf.put_u8(b1);

        buf.put_u8((self.pid & 0xff) as u8);

        let mut b3 = self.scrambling_control << 6;
        if self.adaptation_field_exists {
            b3 |= 0x20;
        }
        if self.contains_payload {
            b3 |= 0x10;
        }
        b3 |= self.continuity_counter & 0x0f;
        buf.put_u8(b3);
    }
}
