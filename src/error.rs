use std::num::ParseIntError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HlsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("fragment @ {0} ms is no longer buffered")]
    FragmentExpired(u64),

    #[error("fragment @ {0} ms is not available yet")]
    FragmentNotYetAvailable(u64),

    #[error("track {0} has no fragments")]
    EmptyTrack(u32),

    #[error("unknown track {0}")]
    UnknownTrack(u32),

    #[error("track {0} has no usable transport stream PID")]
    UnmappableTrack(u32),

    #[error("track {track} uses codec {codec}, which cannot be carried in a transport stream")]
    UnsupportedCodec { track: u32, codec: String },

    #[error("codec error: {0}")]
    Codec(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("parse int error: {0}")]
    ParseInt(#[from] ParseIntError),
}

impl HlsError {
    /// HTTP status code this error is reported with.
    pub fn status(&self) -> u16 {
        match self {
            HlsError::MalformedRequest(_)
            | HlsError::UnknownTrack(_)
            | HlsError::UnmappableTrack(_)
            | HlsError::ParseInt(_) => 404,
            HlsError::FragmentExpired(_) => 412,
            HlsError::FragmentNotYetAvailable(_) => 208,
            HlsError::UnsupportedCodec { .. } => 415,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, HlsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(HlsError::MalformedRequest("x".into()).status(), 404);
        assert_eq!(HlsError::UnknownTrack(3).status(), 404);
        assert_eq!(HlsError::UnmappableTrack(0xf01).status(), 404);
        assert_eq!(HlsError::FragmentExpired(10).status(), 412);
        assert_eq!(HlsError::FragmentNotYetAvailable(10).status(), 208);
        assert_eq!(
            HlsError::UnsupportedCodec {
                track: 1,
                codec: "VP9".into()
            }
            .status(),
            415
        );
        assert_eq!(HlsError::EmptyTrack(1).status(), 500);
    }
}
