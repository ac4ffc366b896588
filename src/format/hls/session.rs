use super::playlist::{HLSMasterPlaylist, HLSPlaylist};
use super::request::{HlsRequest, PlaylistFormat};
use super::seek::Seekable;
use crate::av::PacketSource;
use crate::config::Config;
use crate::error::{HlsError, Result};
use crate::format::ts::{
    ms_to_pts, ContinuityCounters, EsFramer, Packetizer, ProgramStream, ProgramTables,
    TS_PACKET_SIZE,
};
use crate::meta::{SharedMeta, Track};
use bytes::Bytes;
use log::{debug, error, info, trace, warn};
use std::collections::{BTreeMap, BTreeSet};
use tokio::io::{AsyncWrite, AsyncWriteExt};

pub const SEGMENT_CONTENT_TYPE: &str = "video/mp2t";

const URL_NOT_UNDERSTOOD: &str = "The HLS URL wasn't understood - what did you want, exactly?\n";
const FRAGMENT_EXPIRED: &str =
    "The requested fragment is no longer kept in memory on the server and cannot be served.\n";
const FRAGMENT_NOT_YET_AVAILABLE: &str = "Proxy, re-request this in a second or two.\n";

/// Response head, plus the whole body for everything but segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub reason: &'static str,
    pub content_type: Option<&'static str>,
    pub cache_control: Option<&'static str>,
    /// Empty for segments, whose bytes come from [`HlsOutput::stream_segment`].
    pub body: Bytes,
}

impl Response {
    fn text(status: u16, reason: &'static str, body: &'static str) -> Self {
        Self {
            status,
            reason,
            content_type: Some("text/plain"),
            cache_control: None,
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    fn manifest(format: PlaylistFormat, body: String) -> Self {
        Self {
            status: 200,
            reason: "OK",
            content_type: Some(format.content_type()),
            cache_control: Some("no-cache"),
            body: Bytes::from(body),
        }
    }

    fn segment() -> Self {
        Self {
            status: 200,
            reason: "OK",
            content_type: Some(SEGMENT_CONTENT_TYPE),
            cache_control: None,
            body: Bytes::new(),
        }
    }

    fn from_error(err: &HlsError) -> Self {
        match err.status() {
            404 => Self::text(404, "URL mismatch", URL_NOT_UNDERSTOOD),
            412 => Self::text(412, "Fragment out of range", FRAGMENT_EXPIRED),
            208 => Self::text(208, "Ask again later", FRAGMENT_NOT_YET_AVAILABLE),
            415 => Self {
                status: 415,
                reason: "Unsupported Media Type",
                content_type: None,
                cache_control: None,
                body: Bytes::new(),
            },
            status => Self {
                status,
                reason: "Internal Server Error",
                content_type: None,
                cache_control: None,
                body: Bytes::new(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// A segment accepted by [`HlsOutput::handle_request`], waiting to be streamed.
#[derive(Debug)]
struct SegmentJob {
    tracks: BTreeMap<u32, Track>,
    from_ms: u64,
    until_ms: u64,
    tables: ProgramTables,
}

#[derive(Debug)]
enum State {
    Idle,
    Streaming(SegmentJob),
}

/// HLS output for one client connection.
///
/// Requests are answered one at a time: [`handle_request`](Self::handle_request)
/// produces the response head, and for segments the caller then drives
/// [`stream_segment`](Self::stream_segment), after which the session is idle
/// again and can take the next request on the same connection. Continuity
/// counters run on across all segments of the connection.
#[derive(Debug)]
pub struct HlsOutput {
    meta: SharedMeta,
    config: Config,
    framer: EsFramer,
    counters: ContinuityCounters,
    state: State,
}

impl HlsOutput {
    pub fn new(meta: SharedMeta, config: Config) -> Self {
        Self {
            meta,
            config,
            framer: EsFramer::new(false),
            counters: ContinuityCounters::new(),
            state: State::Idle,
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.state, State::Streaming(_))
    }

    pub fn handle_request(&mut self, target: &str, user_agent: &str) -> Response {
        let strict = !self.config.strict_timing_agent.is_empty()
            && user_agent.contains(&self.config.strict_timing_agent);
        self.framer.set_strict_timing(strict);

        if let State::Streaming(job) = &self.state {
            warn!(
                "New request while segment {}-{} was still pending, dropping it",
                job.from_ms, job.until_ms
            );
            self.state = State::Idle;
        }

        let request = match HlsRequest::parse(target, &self.config.url_prefix) {
            Ok(request) => request,
            Err(e) => {
                debug!("Could not parse {}: {}", target, e);
                return Response::from_error(&e);
            }
        };

        match request {
            HlsRequest::MasterPlaylist { format, .. } => {
                let body = HLSMasterPlaylist::from_meta(&self.meta.snapshot()).to_string();
                trace!("Sending master playlist:\n{}", body);
                Response::manifest(format, body)
            }
            HlsRequest::MediaPlaylist {
                track_id, format, ..
            } => match HLSPlaylist::from_track(&self.meta.snapshot(), track_id) {
                Ok(playlist) => {
                    let body = playlist.to_string();
                    trace!("Sending media playlist:\n{}", body);
                    Response::manifest(format, body)
                }
                Err(HlsError::EmptyTrack(id)) => {
                    error!("Playlist requested for track {} which has no fragments", id);
                    Response::manifest(format, String::new())
                }
                Err(e) => {
                    warn!("Playlist for track {} unavailable: {}", track_id, e);
                    Response::from_error(&e)
                }
            },
            HlsRequest::Segment {
                video_track,
                audio_track,
                from_ms,
                until_ms,
                ..
            } => match self.prepare_segment(video_track, audio_track, from_ms, until_ms) {
                Ok(job) => {
                    info!(
                        "Serving segment {}-{} of tracks {:?}",
                        from_ms,
                        until_ms,
                        job.tracks.keys().collect::<Vec<_>>()
                    );
                    self.framer.set_last_video_pts(ms_to_pts(from_ms));
                    self.state = State::Streaming(job);
                    Response::segment()
                }
                Err(e) => {
                    match &e {
                        HlsError::FragmentExpired(_) | HlsError::FragmentNotYetAvailable(_) => {
                            warn!("Segment @ {} ms refused: {}", from_ms, e)
                        }
                        _ => debug!("Segment @ {} ms refused: {}", from_ms, e),
                    }
                    Response::from_error(&e)
                }
            },
        }
    }

    /// Selects the tracks and, for live streams, checks the buffered window
    /// before anything is emitted.
    fn prepare_segment(
        &self,
        video_track: u32,
        audio_track: Option<u32>,
        from_ms: u64,
        until_ms: u64,
    ) -> Result<SegmentJob> {
        let meta = self.meta.snapshot();

        let mut tracks = BTreeMap::new();
        for id in std::iter::once(video_track).chain(audio_track) {
            let track = meta.track(id).ok_or(HlsError::UnknownTrack(id))?;
            tracks.insert(id, track.clone());
        }

        if meta.live {
            Seekable::classify(&meta, from_ms).into_result(from_ms)?;
        }

        let streams: Vec<ProgramStream> = tracks
            .values()
            .map(|t| ProgramStream {
                track_id: t.id,
                codec: t.codec.clone(),
            })
            .collect();
        let tables = ProgramTables::build(&streams)?;

        Ok(SegmentJob {
            tracks,
            from_ms,
            until_ms,
            tables,
        })
    }

    /// Streams the accepted segment into `writer`, returning the bytes written.
    ///
    /// Packets are pulled until one at or past the end time shows up or the
    /// source runs dry. The session is idle afterwards, also on error.
    pub async fn stream_segment<S, W>(&mut self, source: &mut S, writer: &mut W) -> Result<u64>
    where
        S: PacketSource + ?Sized,
        W: AsyncWrite + Unpin + ?Sized,
    {
        let job = match std::mem::replace(&mut self.state, State::Idle) {
            State::Streaming(job) => job,
            State::Idle => {
                return Err(HlsError::InvalidData(
                    "no segment request is pending".to_string(),
                ))
            }
        };

        let mut packetizer = Packetizer::with_counters(
            job.tables.clone(),
            self.config.table_interval,
            std::mem::take(&mut self.counters),
        );
        let result = self.pump(&job, &mut packetizer, source, writer).await;
        self.counters = packetizer.into_counters();

        let written = result?;
        debug!(
            "Segment {}-{} done, {} bytes in {} packets",
            job.from_ms,
            job.until_ms,
            written,
            written / TS_PACKET_SIZE as u64
        );
        Ok(written)
    }

    async fn pump<S, W>(
        &mut self,
        job: &SegmentJob,
        packetizer: &mut Packetizer,
        source: &mut S,
        writer: &mut W,
    ) -> Result<u64>
    where
        S: PacketSource + ?Sized,
        W: AsyncWrite + Unpin + ?Sized,
    {
        let selected: BTreeSet<u32> = job.tracks.keys().copied().collect();
        source.seek(&selected, job.from_ms).await?;

        let mut written = 0u64;
        while let Some(packet) = source.read_packet().await? {
            if packet.time_ms >= job.until_ms {
                break;
            }
            let track = match job.tracks.get(&packet.track_id) {
                Some(track) => track,
                None => {
                    trace!("Skipping packet of unselected track {}", packet.track_id);
                    continue;
                }
            };

            self.framer.frame(track, &packet, packetizer);
            let out = packetizer.take_output();
            if !out.is_empty() {
                writer.write_all(&out).await?;
                written += out.len() as u64;
            }
        }

        let tail = packetizer.finish();
        if !tail.is_empty() {
            writer.write_all(&tail).await?;
            written += tail.len() as u64;
        }
        writer.flush().await?;
        Ok(written)
    }
}
