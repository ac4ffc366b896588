use crate::error::{HlsError, Result};
use url::Url;

/// Playlist flavour, chosen by the requested file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistFormat {
    M3u8,
    M3u,
}

impl PlaylistFormat {
    fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(".m3u8") {
            Some(PlaylistFormat::M3u8)
        } else if name.ends_with(".m3u") {
            Some(PlaylistFormat::M3u)
        } else {
            None
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            PlaylistFormat::M3u8 => "audio/x-mpegurl",
            PlaylistFormat::M3u => "audio/mpegurl",
        }
    }
}

/// A request an HLS client can make.
///
/// ```text
/// /<prefix>/<stream>/index.m3u8                  master playlist
/// /<prefix>/<stream>/<video>[_<audio>]/index.m3u8 media playlist
/// /<prefix>/<stream>/<video>[_<audio>]/<from>_<until>.ts
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HlsRequest {
    MasterPlaylist {
        stream: String,
        format: PlaylistFormat,
    },
    MediaPlaylist {
        stream: String,
        /// Video track of the variant; the fragment list follows it.
        track_id: u32,
        format: PlaylistFormat,
    },
    Segment {
        stream: String,
        video_track: u32,
        audio_track: Option<u32>,
        from_ms: u64,
        until_ms: u64,
    },
}

impl HlsRequest {
    /// Parses a request target, either a bare path or a full URL. The query
    /// string is ignored.
    pub fn parse(target: &str, url_prefix: &str) -> Result<Self> {
        let base = Url::parse("http://localhost/")
            .map_err(|e| HlsError::MalformedRequest(e.to_string()))?;
        let url = base
            .join(target)
            .map_err(|e| HlsError::MalformedRequest(format!("{}: {}", target, e)))?;

        let mut segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let prefix = url_prefix.trim_matches('/');
        if !prefix.is_empty() {
            if segments.first() != Some(&prefix) {
                return Err(HlsError::MalformedRequest(format!(
                    "{} is not below /{}/",
                    url.path(),
                    prefix
                )));
            }
            segments.remove(0);
        }

        match segments.as_slice() {
            [stream, file] => match PlaylistFormat::from_file_name(file) {
                Some(format) => Ok(HlsRequest::MasterPlaylist {
                    stream: stream.to_string(),
                    format,
                }),
                None => Err(malformed(url.path())),
            },
            [stream, tracks, file] => {
                let (video, audio) = parse_tracks(tracks)?;
                if let Some(format) = PlaylistFormat::from_file_name(file) {
                    return Ok(HlsRequest::MediaPlaylist {
                        stream: stream.to_string(),
                        track_id: video,
                        format,
                    });
                }

                let range = file
                    .strip_suffix(".ts")
                    .and_then(|name| name.split_once('_'))
                    .ok_or_else(|| malformed(url.path()))?;
                Ok(HlsRequest::Segment {
                    stream: stream.to_string(),
                    video_track: video,
                    audio_track: audio,
                    from_ms: range.0.parse()?,
                    until_ms: range.1.parse()?,
                })
            }
            _ => Err(malformed(url.path())),
        }
    }

    pub fn stream(&self) -> &str {
        match self {
            HlsRequest::MasterPlaylist { stream, .. }
            | HlsRequest::MediaPlaylist { stream, .. }
            | HlsRequest::Segment { stream, .. } => stream,
        }
    }
}

fn malformed(path: &str) -> HlsError {
    HlsError::MalformedRequest(path.to_string())
}

/// `<video>` or `<video>_<audio>`.
fn parse_tracks(tracks: &str) -> Result<(u32, Option<u32>)> {
    match tracks.split_once('_') {
        Some((video, audio)) => Ok((video.parse()?, Some(audio.parse()?))),
        None => Ok((tracks.parse()?, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_master_playlist() {
        assert_eq!(
            HlsRequest::parse("/hls/live/index.m3u8", "hls").unwrap(),
            HlsRequest::MasterPlaylist {
                stream: "live".into(),
                format: PlaylistFormat::M3u8,
            }
        );
        assert_eq!(
            HlsRequest::parse("/hls/live/index.m3u?session=1", "hls").unwrap(),
            HlsRequest::MasterPlaylist {
                stream: "live".into(),
                format: PlaylistFormat::M3u,
            }
        );
    }

    #[test]
    fn test_media_playlist_follows_video_track() {
        assert_eq!(
            HlsRequest::parse("/hls/live/1_2/index.m3u8", "hls").unwrap(),
            HlsRequest::MediaPlaylist {
                stream: "live".into(),
                track_id: 1,
                format: PlaylistFormat::M3u8,
            }
        );
        assert_eq!(
            HlsRequest::parse("http://example.com/hls/live/7/index.m3u8", "hls").unwrap(),
            HlsRequest::MediaPlaylist {
                stream: "live".into(),
                track_id: 7,
                format: PlaylistFormat::M3u8,
            }
        );
    }

    #[test]
    fn test_segment() {
        assert_eq!(
            HlsRequest::parse("/hls/live/1_2/0_4000.ts", "hls").unwrap(),
            HlsRequest::Segment {
                stream: "live".into(),
                video_track: 1,
                audio_track: Some(2),
                from_ms: 0,
                until_ms: 4000,
            }
        );
        let request = HlsRequest::parse("/live/3/4000_8000.ts", "").unwrap();
        assert_eq!(request.stream(), "live");
        assert!(matches!(
            request,
            HlsRequest::Segment {
                video_track: 3,
                audio_track: None,
                from_ms: 4000,
                until_ms: 8000,
                ..
            }
        ));
    }

    #[test]
    fn test_malformed() {
        for target in [
            "/hls/live/1_2/0-4000.ts",
            "/hls/live/1_2/0_4000.mp4",
            "/hls/live/a_b/0_4000.ts",
            "/hls/live",
            "/dash/live/index.m3u8",
            "/hls/live/1/2/3/index.m3u8",
        ] {
            let err = HlsRequest::parse(target, "hls").unwrap_err();
            assert_eq!(err.status(), 404, "{}", target);
        }
    }

    #[test]
    fn test_content_types() {
        assert_eq!(PlaylistFormat::M3u8.content_type(), "audio/x-mpegurl");
        assert_eq!(PlaylistFormat::M3u.content_type(), "audio/mpegurl");
    }
}
