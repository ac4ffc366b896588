use crate::av::CodecType;
use crate::error::{HlsError, Result};
use crate::meta::{Meta, Track};
use std::fmt;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// One `#EXT-X-STREAM-INF` entry: a video track plus optional audio.
#[derive(Debug, Clone, PartialEq)]
pub struct HLSVariant {
    pub bandwidth: u64,
    pub video_track: u32,
    pub audio_track: Option<u32>,
}

impl HLSVariant {
    /// Relative URI of the variant's media playlist.
    pub fn uri(&self) -> String {
        match self.audio_track {
            Some(audio) => format!("{}_{}/index.m3u8", self.video_track, audio),
            None => format!("{}/index.m3u8", self.video_track),
        }
    }
}

#[derive(Debug, Default)]
pub struct HLSMasterPlaylist {
    pub variants: Vec<HLSVariant>,
}

impl HLSMasterPlaylist {
    /// One variant per H.264 track, each paired with the first AAC track.
    ///
    /// Bandwidth is `(video_bps * 2 + audio_bps * 2) * 10`, the figure
    /// clients have always been given; it is not a measured rate.
    pub fn from_meta(meta: &Meta) -> Self {
        let audio = meta.tracks.values().find(|t| t.codec == CodecType::AAC);

        let variants = meta
            .tracks
            .values()
            .filter(|t| t.codec == CodecType::H264)
            .map(|video| {
                let mut bandwidth = video.bps * 2;
                if let Some(audio) = audio {
                    bandwidth += audio.bps * 2;
                }
                HLSVariant {
                    bandwidth: bandwidth * 10,
                    video_track: video.id,
                    audio_track: audio.map(|a| a.id),
                }
            })
            .collect();

        Self { variants }
    }

    pub async fn write_to<W: AsyncWrite + Unpin>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(self.to_string().as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}

impl fmt::Display for HLSMasterPlaylist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#EXTM3U\r\n")?;
        for variant in &self.variants {
            write!(
                f,
                "#EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH={}\r\n{}\r\n",
                variant.bandwidth,
                variant.uri()
            )?;
        }
        Ok(())
    }
}

/// A fragment listed in a media playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct HLSSegment {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl HLSSegment {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// `#EXTINF` value: duration rounded to whole seconds.
    pub fn extinf(&self) -> u64 {
        (self.duration_ms() + 500) / 1000
    }

    pub fn filename(&self) -> String {
        format!("{}_{}.ts", self.start_ms, self.end_ms)
    }
}

#[derive(Debug)]
pub struct HLSPlaylist {
    /// Seconds.
    pub target_duration: u64,
    pub media_sequence: u64,
    pub segments: Vec<HLSSegment>,
    pub is_endlist: bool,
}

impl HLSPlaylist {
    pub fn new(target_duration: u64) -> Self {
        Self {
            target_duration,
            media_sequence: 0,
            segments: Vec::new(),
            is_endlist: false,
        }
    }

    /// Media playlist for one track of a metadata snapshot.
    ///
    /// Live playlists hide the oldest fragment once more than two exist
    /// (it may be evicted while a client fetches it) and always hide the
    /// newest one, which is still being written. VoD lists everything and
    /// ends with `#EXT-X-ENDLIST`.
    pub fn from_track(meta: &Meta, track_id: u32) -> Result<Self> {
        let track = meta.track(track_id).ok_or(HlsError::UnknownTrack(track_id))?;
        if track.fragments.is_empty() {
            return Err(HlsError::EmptyTrack(track_id));
        }

        // The last fragment may still be open, leave it out
        let longest = track
            .fragments
            .iter()
            .take(track.fragments.len() - 1)
            .filter_map(|f| f.duration_ms)
            .max()
            .unwrap_or(0);
        let mut playlist = HLSPlaylist::new(longest / 1000 + 1);

        let mut segments = segments_of(track);
        let mut skipped = 0;
        if meta.live {
            if segments.len() > 2 {
                segments.remove(0);
                skipped += 1;
            }
            segments.pop();
        } else {
            playlist.is_endlist = true;
        }

        playlist.media_sequence = track.missed_frags + skipped;
        playlist.segments = segments;
        Ok(playlist)
    }

    pub async fn write_to<W: AsyncWrite + Unpin>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(self.to_string().as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}

impl fmt::Display for HLSPlaylist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#EXTM3U\r\n#EXT-X-TARGETDURATION:{}\r\n#EXT-X-MEDIA-SEQUENCE:{}\r\n",
            self.target_duration, self.media_sequence
        )?;
        for segment in &self.segments {
            write!(
                f,
                "#EXTINF:{}, no desc\r\n{}\r\n",
                segment.extinf(),
                segment.filename()
            )?;
        }
        if self.is_endlist {
            write!(f, "#EXT-X-ENDLIST\r\n")?;
        }
        Ok(())
    }
}

fn segments_of(track: &Track) -> Vec<HLSSegment> {
    let mut segments: Vec<HLSSegment> = Vec::with_capacity(track.fragments.len());
    for fragment in &track.fragments {
        let start_ms = match track.fragment_start(fragment) {
            Some(start) => start,
            None => {
                let fallback = segments.last().map_or(track.first_ms, |s| s.end_ms);
                log::warn!(
                    "Track {} has no key entry for fragment {}, assuming start {}",
                    track.id,
                    fragment.number,
                    fallback
                );
                fallback
            }
        };
        let duration = fragment
            .duration_ms
            .unwrap_or_else(|| track.last_ms.saturating_sub(start_ms));
        segments.push(HLSSegment {
            start_ms,
            end_ms: start_ms.saturating_add(duration),
        });
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::av::TrackKind;
    use crate::meta::Fragment;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn video(id: u32, bps: u64) -> Track {
        Track::new(id, TrackKind::Video, CodecType::H264).with_bps(bps)
    }

    fn audio(id: u32, bps: u64) -> Track {
        Track::new(id, TrackKind::Audio, CodecType::AAC).with_bps(bps)
    }

    fn fragmented(live: bool, durations: &[Option<u64>], missed: u64, last_ms: u64) -> Meta {
        let mut track = video(1, 0);
        let mut start = 10_000;
        for (i, duration) in durations.iter().enumerate() {
            let fragment = Fragment {
                number: i as u32 + 1,
                duration_ms: *duration,
            };
            track = track.with_fragment(fragment, start);
            start += duration.unwrap_or(0);
        }
        track.missed_frags = missed;
        track.last_ms = last_ms;
        Meta::new(live).with_track(track)
    }

    #[test]
    fn test_master_playlist_single_audio_reference() {
        let meta = Meta::new(true)
            .with_track(video(1, 100_000))
            .with_track(video(2, 50_000))
            .with_track(audio(3, 16_000))
            .with_track(audio(4, 8_000));

        let master = HLSMasterPlaylist::from_meta(&meta);
        assert_eq!(
            master.variants,
            vec![
                HLSVariant {
                    bandwidth: (100_000 * 2 + 16_000 * 2) * 10,
                    video_track: 1,
                    audio_track: Some(3),
                },
                HLSVariant {
                    bandwidth: (50_000 * 2 + 16_000 * 2) * 10,
                    video_track: 2,
                    audio_track: Some(3),
                },
            ]
        );
        assert_eq!(
            master.to_string(),
            "#EXTM3U\r\n\
             #EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=2320000\r\n1_3/index.m3u8\r\n\
             #EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=1320000\r\n2_3/index.m3u8\r\n"
        );
    }

    #[test]
    fn test_master_playlist_without_audio() {
        let meta = Meta::new(false).with_track(video(1, 1000));
        let master = HLSMasterPlaylist::from_meta(&meta);
        assert_eq!(master.variants[0].bandwidth, 20_000);
        assert_eq!(master.variants[0].uri(), "1/index.m3u8");

        let mut buffer = Cursor::new(Vec::new());
        tokio_test::block_on(master.write_to(&mut buffer)).unwrap();
        assert_eq!(
            String::from_utf8(buffer.into_inner()).unwrap(),
            "#EXTM3U\r\n#EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=20000\r\n1/index.m3u8\r\n"
        );
    }

    #[test]
    fn test_live_playlist_window() {
        let meta = fragmented(
            true,
            &[Some(4000), Some(4000), Some(6400), Some(4000), None],
            2,
            30_000,
        );
        let playlist = HLSPlaylist::from_track(&meta, 1).unwrap();

        assert_eq!(playlist.segments.len(), 3);
        assert_eq!(playlist.media_sequence, 3);
        assert_eq!(playlist.target_duration, 7);
        assert!(!playlist.is_endlist);
        assert_eq!(
            playlist.to_string(),
            "#EXTM3U\r\n#EXT-X-TARGETDURATION:7\r\n#EXT-X-MEDIA-SEQUENCE:3\r\n\
             #EXTINF:4, no desc\r\n14000_18000.ts\r\n\
             #EXTINF:6, no desc\r\n18000_24400.ts\r\n\
             #EXTINF:4, no desc\r\n24400_28400.ts\r\n"
        );
    }

    #[test]
    fn test_live_playlist_with_two_fragments_keeps_oldest() {
        let meta = fragmented(true, &[Some(2000), None], 0, 13_000);
        let playlist = HLSPlaylist::from_track(&meta, 1).unwrap();
        assert_eq!(playlist.media_sequence, 0);
        assert_eq!(
            playlist.segments,
            vec![HLSSegment {
                start_ms: 10_000,
                end_ms: 12_000
            }]
        );
    }

    #[test]
    fn test_vod_playlist_keeps_everything() {
        let meta = fragmented(false, &[Some(2000), Some(2000), Some(2000), Some(1400)], 0, 17_400);
        let playlist = HLSPlaylist::from_track(&meta, 1).unwrap();

        assert_eq!(playlist.segments.len(), 4);
        assert_eq!(playlist.media_sequence, 0);
        assert_eq!(playlist.target_duration, 3);
        let text = playlist.to_string();
        assert!(text.ends_with("16000_17400.ts\r\n#EXT-X-ENDLIST\r\n"));
        assert_eq!(text.matches("#EXTINF:").count(), 4);
    }

    #[test]
    fn test_open_fragment_uses_track_end() {
        let meta = fragmented(false, &[Some(2000), None], 0, 15_600);
        let playlist = HLSPlaylist::from_track(&meta, 1).unwrap();
        assert_eq!(playlist.segments[1].end_ms, 15_600);
        assert_eq!(playlist.segments[1].extinf(), 4);
    }

    #[test]
    fn test_empty_and_unknown_tracks() {
        let meta = Meta::new(true).with_track(video(1, 0));
        assert!(matches!(
            HLSPlaylist::from_track(&meta, 1),
            Err(HlsError::EmptyTrack(1))
        ));
        assert!(matches!(
            HLSPlaylist::from_track(&meta, 2),
            Err(HlsError::UnknownTrack(2))
        ));
    }

    #[test]
    fn test_write_to() {
        let meta = fragmented(false, &[Some(1000)], 0, 11_000);
        let playlist = HLSPlaylist::from_track(&meta, 1).unwrap();
        let mut buffer = Cursor::new(Vec::new());
        tokio_test::block_on(playlist.write_to(&mut buffer)).unwrap();
        assert_eq!(
            String::from_utf8(buffer.into_inner()).unwrap(),
            playlist.to_string()
        );
    }
}
