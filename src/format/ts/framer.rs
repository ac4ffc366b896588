use super::packetizer::{AccessUnit, Packetizer};
use super::pes::PESHeader;
use crate::av::{CodecType, MediaPacket, TrackKind};
use crate::codec::aac::{AACConfig, ADTSHeader};
use crate::codec::h264::{AvcConfig, LengthPrefixedNalus, Truncation, ACCESS_UNIT_DELIMITER, START_CODE};
use crate::meta::Track;
use bytes::Bytes;
use log::{debug, warn};

/// What happened to one media packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Complete,
    /// A NAL length prefix pointed past the payload; the rest of the
    /// access unit was dropped.
    Truncated(Truncation),
    /// Track kind that is not carried in the stream.
    Ignored,
}

/// Turns media packets into PES units and feeds them to a [`Packetizer`].
#[derive(Debug, Default)]
pub struct EsFramer {
    strict_timing: bool,
    last_video_pts: u64,
    parameter_sets: Option<Bytes>,
    audio_config: Option<(u32, AACConfig)>,
}

impl EsFramer {
    /// `strict_timing` stamps audio with the last video timestamp, which
    /// some clients need to keep audio and video aligned.
    pub fn new(strict_timing: bool) -> Self {
        Self {
            strict_timing,
            ..Default::default()
        }
    }

    pub fn set_strict_timing(&mut self, strict_timing: bool) {
        self.strict_timing = strict_timing;
    }

    /// Seeds the audio timestamp used before the first video packet.
    pub fn set_last_video_pts(&mut self, pts: u64) {
        self.last_video_pts = pts;
    }

    pub fn last_video_pts(&self) -> u64 {
        self.last_video_pts
    }

    pub fn frame(&mut self, track: &Track, packet: &MediaPacket, out: &mut Packetizer) -> FrameOutcome {
        match track.kind {
            TrackKind::Video => self.frame_video(track, packet, out),
            TrackKind::Audio => {
                self.frame_audio(track, packet, out);
                FrameOutcome::Complete
            }
            TrackKind::Other => FrameOutcome::Ignored,
        }
    }

    fn frame_video(&mut self, track: &Track, packet: &MediaPacket, out: &mut Packetizer) -> FrameOutcome {
        let pts = packet.pts();
        self.last_video_pts = pts;
        let mut unit = AccessUnit::new(track.id, packet.time_ms, packet.is_key);

        out.append(&mut unit, &PESHeader::video(pts).to_bytes());
        if track.codec == CodecType::H264 {
            out.append(&mut unit, &ACCESS_UNIT_DELIMITER);
        }
        if packet.is_key {
            let parameter_sets = self.parameter_sets(track);
            out.append(&mut unit, parameter_sets);
        }

        let mut nalus = LengthPrefixedNalus::new(&packet.data);
        for nal in nalus.by_ref() {
            out.append(&mut unit, &START_CODE);
            out.append(&mut unit, nal);
        }

        let outcome = match nalus.truncated() {
            Some(truncation) => {
                warn!(
                    "Too big NALU detected ({} > {}) in track {} @ {} ms - skipping rest of frame",
                    truncation.wanted, truncation.available, track.id, packet.time_ms
                );
                FrameOutcome::Truncated(truncation)
            }
            None => FrameOutcome::Complete,
        };
        out.pad_and_flush();
        outcome
    }

    fn frame_audio(&mut self, track: &Track, packet: &MediaPacket, out: &mut Packetizer) {
        let pts = if self.strict_timing {
            self.last_video_pts
        } else {
            packet.pts()
        };

        let header: Vec<u8> = match track.codec {
            CodecType::AAC => ADTSHeader::for_frame(packet.data.len(), self.aac_config(track))
                .to_bytes()
                .to_vec(),
            _ => Vec::new(),
        };

        let mut unit = AccessUnit::new(track.id, packet.time_ms, packet.is_key);
        out.append(
            &mut unit,
            &PESHeader::audio(header.len() + packet.data.len(), pts).to_bytes(),
        );
        out.append(&mut unit, &header);
        out.append(&mut unit, &packet.data);
        out.pad_and_flush();
    }

    /// SPS/PPS in Annex B form, converted on the first keyframe only.
    fn parameter_sets(&mut self, track: &Track) -> &Bytes {
        self.parameter_sets.get_or_insert_with(|| {
            if track.codec != CodecType::H264 {
                return Bytes::new();
            }
            match AvcConfig::parse(&track.init) {
                Ok(config) => config.to_annex_b(),
                Err(e) => {
                    warn!("Track {} has unusable init data: {}", track.id, e);
                    Bytes::new()
                }
            }
        })
    }

    fn aac_config(&mut self, track: &Track) -> &AACConfig {
        if !matches!(&self.audio_config, Some((id, _)) if *id == track.id) {
            self.audio_config = None;
        }
        let (_, config) = self.audio_config.get_or_insert_with(|| {
            let config = AACConfig::parse(&track.init).unwrap_or_else(|e| {
                warn!(
                    "Track {} has unusable AudioSpecificConfig ({}), assuming LC 44.1kHz stereo",
                    track.id, e
                );
                AACConfig::default()
            });
            debug!("Track {} ADTS config {:?}", track.id, config);
            (track.id, config)
        });
        config
    }
}
