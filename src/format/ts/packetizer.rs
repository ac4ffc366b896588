use super::packet::{ContinuityCounters, TsPacket};
use super::psi::{write_section_packet, ProgramTables};
use super::types::*;
use crate::config::DEFAULT_TABLE_INTERVAL;
use bytes::{Bytes, BytesMut};

/// Per access unit state threaded through [`Packetizer::append`].
#[derive(Debug, Clone)]
pub struct AccessUnit {
    pub track_id: u32,
    pub time_ms: u64,
    pub keyframe: bool,
    first: bool,
}

impl AccessUnit {
    pub fn new(track_id: u32, time_ms: u64, keyframe: bool) -> Self {
        Self {
            track_id,
            time_ms,
            keyframe,
            first: true,
        }
    }

    /// True until the first transport packet of this unit was opened.
    pub fn is_pending_start(&self) -> bool {
        self.first
    }
}

/// Splits elementary stream bytes into 188-byte transport packets.
///
/// Output accumulates internally and is drained with
/// [`Packetizer::take_output`]. Every `table_interval` emitted packets a
/// PAT/PMT pair is put in front of the next packet.
#[derive(Debug)]
pub struct Packetizer {
    frame: TsPacket,
    counters: ContinuityCounters,
    emitted: u64,
    table_interval: u64,
    tables: ProgramTables,
    out: BytesMut,
}

impl Packetizer {
    pub fn new(tables: ProgramTables) -> Self {
        Self::with_table_interval(tables, DEFAULT_TABLE_INTERVAL)
    }

    pub fn with_table_interval(tables: ProgramTables, table_interval: u64) -> Self {
        Self::with_counters(tables, table_interval, ContinuityCounters::new())
    }

    /// Continues the continuity counters of earlier output on the same
    /// connection.
    pub fn with_counters(
        tables: ProgramTables,
        table_interval: u64,
        counters: ContinuityCounters,
    ) -> Self {
        Self {
            frame: TsPacket::new(),
            counters,
            emitted: 0,
            table_interval: table_interval.max(1),
            tables,
            out: BytesMut::with_capacity(TS_PACKET_SIZE * 64),
        }
    }

    /// Appends payload bytes of `unit`, flushing full packets along the way.
    /// A packet filled to the brim stays pending until the next call; an
    /// empty `data` only flushes such a packet.
    pub fn append(&mut self, unit: &mut AccessUnit, data: &[u8]) {
        let mut data = data;
        if self.frame.bytes_free() == 0 {
            self.flush();
        }
        while !data.is_empty() {
            if self.frame.bytes_free() == 0 {
                self.flush();
            }

            if self.frame.is_fresh() {
                let pid = elementary_pid(unit.track_id);
                self.frame.set_pid(pid);
                self.frame.set_continuity_counter(self.counters.next(pid));
                if unit.first {
                    self.frame.set_unit_start();
                    if unit.keyframe {
                        self.frame.set_random_access();
                        self.frame.set_pcr(ms_to_pcr(unit.time_ms));
                    }
                    unit.first = false;
                }
            }

            let taken = self.frame.fill(data);
            data = &data[taken..];
        }
    }

    /// Ends the current packet early with stuffing so the next access unit
    /// starts on a packet boundary.
    pub fn pad_and_flush(&mut self) {
        if self.frame.bytes_free() < TS_PAYLOAD_SIZE {
            self.frame.add_stuffing();
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.emitted % self.table_interval == 0 {
            let cc = self.counters.next(PID_PAT);
            write_section_packet(&mut self.out, PID_PAT, cc, self.tables.pat());
            let cc = self.counters.next(PID_PMT);
            write_section_packet(&mut self.out, PID_PMT, cc, self.tables.pmt());
            self.emitted += 2;
        }
        self.frame.write_to(&mut self.out);
        self.emitted += 1;
        self.frame.clear();
    }

    /// Transport packets emitted so far, tables included.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Drains the bytes produced since the last call.
    pub fn take_output(&mut self) -> Bytes {
        self.out.split().freeze()
    }

    /// Flushes what is pending and returns the final output, leaving the
    /// packetizer ready for a new segment. Continuity counters keep running.
    pub fn finish(&mut self) -> Bytes {
        self.pad_and_flush();
        let out = self.take_output();
        self.reset();
        out
    }

    /// Drops the pending packet and output and restarts the table cadence.
    pub fn reset(&mut self) {
        self.frame.clear();
        self.emitted = 0;
        self.out.clear();
    }

    /// Hands the continuity counters back for the next segment.
    pub fn into_counters(self) -> ContinuityCounters {
        self.counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::av::CodecType;
    use crate::format::ts::psi::ProgramStream;
    use pretty_assertions::assert_eq;
    use quickcheck_macros::quickcheck;
    use std::collections::HashMap;

    fn packetizer() -> Packetizer {
        let tables = ProgramTables::build(&[
            ProgramStream {
                track_id: 1,
                codec: CodecType::H264,
            },
            ProgramStream {
                track_id: 2,
                codec: CodecType::AAC,
            },
        ])
        .unwrap();
        Packetizer::new(tables)
    }

    fn pid_of(packet: &[u8]) -> u16 {
        ((packet[1] as u16 & 0x1f) << 8) | packet[2] as u16
    }

    #[test]
    fn test_first_flush_carries_tables() {
        let mut p = packetizer();
        let mut unit = AccessUnit::new(1, 0, false);
        p.append(&mut unit, &[0xAA; 10]);
        p.pad_and_flush();

        let out = p.take_output();
        assert_eq!(out.len(), 3 * TS_PACKET_SIZE);
        let pids: Vec<u16> = out.chunks(TS_PACKET_SIZE).map(pid_of).collect();
        assert_eq!(pids, vec![PID_PAT, PID_PMT, 0x100]);
        assert_eq!(p.emitted(), 3);
    }

    #[test]
    fn test_keyframe_unit_start_and_pcr() {
        let mut p = packetizer();
        let mut unit = AccessUnit::new(1, 1000, true);
        p.append(&mut unit, &[0x55; 400]);
        assert!(!unit.is_pending_start());
        p.pad_and_flush();

        let out = p.take_output();
        let packets: Vec<&[u8]> = out.chunks(TS_PACKET_SIZE).skip(2).collect();
        assert_eq!(packets.len(), 3);
        // first: unit start, adaptation field with random access + PCR
        assert_eq!(packets[0][1] & 0x40, 0x40);
        assert_eq!(packets[0][5], 0x50);
        // continuation packets carry neither
        assert_eq!(packets[1][1] & 0x40, 0);
        assert_eq!(packets[1][3] & 0x20, 0);
        // 400 - 176 - 184 = 40 bytes left, stuffed
        assert_eq!(packets[2][4] as usize, TS_PAYLOAD_SIZE - 40 - 1);
    }

    #[test]
    fn test_flush_only_call() {
        let mut p = packetizer();
        let mut unit = AccessUnit::new(1, 0, false);
        p.append(&mut unit, &[]);
        assert!(p.take_output().is_empty());
        p.append(&mut unit, &[1; TS_PAYLOAD_SIZE]);
        assert!(p.take_output().is_empty());
        p.append(&mut unit, &[]);
        assert_eq!(p.take_output().len(), 3 * TS_PACKET_SIZE);
    }

    #[test]
    fn test_tables_every_42_packets() {
        let mut p = packetizer();
        let mut unit = AccessUnit::new(1, 0, false);
        p.append(&mut unit, &vec![0u8; TS_PAYLOAD_SIZE * 100]);
        p.pad_and_flush();

        let out = p.take_output();
        let pids: Vec<u16> = out.chunks(TS_PACKET_SIZE).map(pid_of).collect();
        let table_positions: Vec<usize> = pids
            .iter()
            .enumerate()
            .filter(|(_, pid)| **pid == PID_PAT)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(table_positions, vec![0, 42, 84]);
        for &i in &table_positions {
            assert_eq!(pids[i + 1], PID_PMT);
            assert_eq!(pids[i + 2], 0x100);
        }
    }

    fn counters_of(out: &[u8]) -> Vec<(u16, u8)> {
        out.chunks(TS_PACKET_SIZE)
            .map(|p| (pid_of(p), p[3] & 0x0f))
            .collect()
    }

    #[test]
    fn test_finish_restarts_tables_but_keeps_counters() {
        let mut p = packetizer();
        let mut unit = AccessUnit::new(1, 0, false);
        p.append(&mut unit, &[1; 10]);
        let out = p.finish();
        assert_eq!(counters_of(&out), vec![(PID_PAT, 0), (PID_PMT, 0), (0x100, 0)]);
        assert_eq!(p.emitted(), 0);

        let mut unit = AccessUnit::new(1, 0, false);
        p.append(&mut unit, &[1; 10]);
        let again = p.finish();
        assert_eq!(counters_of(&again), vec![(PID_PAT, 1), (PID_PMT, 1), (0x100, 1)]);
    }

    #[test]
    fn test_counters_carry_over_to_a_new_packetizer() {
        let mut p = packetizer();
        let mut unit = AccessUnit::new(2, 0, false);
        p.append(&mut unit, &[1; 10]);
        p.finish();

        let tables = ProgramTables::build(&[ProgramStream {
            track_id: 2,
            codec: CodecType::AAC,
        }])
        .unwrap();
        let mut next = Packetizer::with_counters(tables, DEFAULT_TABLE_INTERVAL, p.into_counters());
        let mut unit = AccessUnit::new(2, 40, false);
        next.append(&mut unit, &[1; 10]);
        assert_eq!(
            counters_of(&next.finish()),
            vec![(PID_PAT, 1), (PID_PMT, 1), (0x101, 1)]
        );
    }

    #[quickcheck]
    fn prop_frames_are_188_bytes_and_counters_continuous(units: Vec<(bool, bool, u16)>) -> bool {
        let mut p = packetizer();
        for (i, (audio, key, len)) in units.iter().enumerate() {
            let track = if *audio { 2 } else { 1 };
            let mut unit = AccessUnit::new(track, i as u64 * 40, *key);
            p.append(&mut unit, &vec![0x42u8; (*len % 2000) as usize + 1]);
            p.pad_and_flush();
        }
        let out = p.take_output();
        if out.len() % TS_PACKET_SIZE != 0 {
            return false;
        }

        let mut last: HashMap<u16, u8> = HashMap::new();
        out.chunks(TS_PACKET_SIZE).all(|packet| {
            let cc = packet[3] & 0x0f;
            let ok = packet[0] == SYNC_BYTE
                && match last.get(&pid_of(packet)) {
                    Some(prev) => cc == (prev + 1) & 0x0f,
                    None => cc == 0,
                };
            last.insert(pid_of(packet), cc);
            ok
        })
    }
}
