use super::types::*;
use bytes::{BufMut, BytesMut};

/// The transport packet currently being assembled.
///
/// Header flags are set while the packet is fresh, then payload is filled
/// until no room is left. Stuffing goes into the adaptation field so the
/// payload always runs up to the end of the packet.
#[derive(Debug, Clone)]
pub struct TsPacket {
    header: TSHeader,
    random_access: bool,
    pcr: Option<u64>,
    stuffed: bool,
    payload: BytesMut,
}

impl Default for TsPacket {
    fn default() -> Self {
        Self::new()
    }
}

impl TsPacket {
    pub fn new() -> Self {
        Self {
            header: TSHeader::default(),
            random_access: false,
            pcr: None,
            stuffed: false,
            payload: BytesMut::with_capacity(TS_PAYLOAD_SIZE),
        }
    }

    /// Adaptation field bytes required by the flags set so far.
    fn adaptation_len(&self) -> usize {
        if self.random_access || self.pcr.is_some() {
            // length + flags [+ PCR]
            2 + if self.pcr.is_some() { 6 } else { 0 }
        } else {
            0
        }
    }

    /// Payload bytes that still fit.
    pub fn bytes_free(&self) -> usize {
        if self.stuffed {
            return 0;
        }
        TS_PAYLOAD_SIZE - self.adaptation_len() - self.payload.len()
    }

    /// True before any flag or payload was set.
    pub fn is_fresh(&self) -> bool {
        !self.stuffed && self.bytes_free() == TS_PAYLOAD_SIZE
    }

    pub fn set_pid(&mut self, pid: u16) {
        self.header.pid = pid;
    }

    pub fn set_continuity_counter(&mut self, counter: u8) {
        self.header.continuity_counter = counter & 0x0f;
    }

    pub fn set_unit_start(&mut self) {
        self.header.payload_unit_start = true;
    }

    pub fn set_random_access(&mut self) {
        self.random_access = true;
    }

    /// Stamps a program clock reference (27 MHz units).
    pub fn set_pcr(&mut self, pcr: u64) {
        self.pcr = Some(pcr);
    }

    /// Copies as much of `data` as fits, returning the number of bytes taken.
    pub fn fill(&mut self, data: &[u8]) -> usize {
        let n = data.len().min(self.bytes_free());
        self.payload.put_slice(&data[..n]);
        n
    }

    /// Marks the packet complete; the rest becomes adaptation stuffing.
    pub fn add_stuffing(&mut self) {
        self.stuffed = true;
    }

    /// Writes exactly [`TS_PACKET_SIZE`] bytes.
    pub fn write_to(&self, buf: &mut BytesMut) {
        let start = buf.len();
        let adaptation_total = TS_PAYLOAD_SIZE - self.payload.len();

        let mut header = self.header.clone();
        header.adaptation_field_exists = adaptation_total > 0;
        header.contains_payload = !self.payload.is_empty();
        header.write_to(buf);

        if adaptation_total > 0 {
            buf.put_u8((adaptation_total - 1) as u8);
            if adaptation_total > 1 {
                let mut flags = 0u8;
                if self.random_access {
                    flags |= 0x40;
                }
                if self.pcr.is_some() {
                    flags |= 0x10;
                }
                buf.put_u8(flags);
                if let Some(pcr) = self.pcr {
                    write_pcr(buf, pcr);
                }
                let used = buf.len() - start - TS_HEADER_SIZE;
                buf.put_bytes(STUFFING_BYTE, adaptation_total - used);
            }
        }

        buf.put_slice(&self.payload);
        debug_assert_eq!(buf.len() - start, TS_PACKET_SIZE);
    }

    pub fn clear(&mut self) {
        self.header = TSHeader::default();
        self.random_access = false;
        self.pcr = None;
        self.stuffed = false;
        self.payload.clear();
    }
}

/// Continuity counters for the handful of PIDs a session emits.
///
/// A segment carries at most one video and one audio stream next to the
/// PAT and PMT, so a small fixed table covers every PID in use.
#[derive(Debug, Clone, Default)]
pub struct ContinuityCounters {
    slots: [Option<(u16, u8)>; Self::CAPACITY],
}

impl ContinuityCounters {
    pub const CAPACITY: usize = 8;

    pub fn new() -> Self {
        Self::default()
    }

    /// Counter value for the next packet on `pid`, starting at 0.
    pub fn next(&mut self, pid: u16) -> u8 {
        let index = match self.slots.iter().position(|s| matches!(s, Some((p, _)) if *p == pid)) {
            Some(index) => index,
            None => match self.slots.iter().position(Option::is_none) {
                Some(free) => {
                    self.slots[free] = Some((pid, 0));
                    free
                }
                None => {
                    log::warn!("No continuity slot left for PID {:#x}, sharing the last one", pid);
                    Self::CAPACITY - 1
                }
            },
        };

        match &mut self.slots[index] {
            Some((_, counter)) => {
                let current = *counter;
                *counter = (current + 1) & 0x0f;
                current
            }
            None => 0,
        }
    }
}
