use crate::error::{HlsError, Result};
use crate::meta::Meta;

/// Where a requested start time falls relative to the buffered window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seekable {
    /// Already evicted from every buffer that could serve it.
    Expired,
    /// Past the newest buffered data, or nothing buffered at all.
    NotYetAvailable,
    Servable,
}

impl Seekable {
    /// Classifies `time_ms` against every track of the snapshot.
    ///
    /// Tracks are checked in id order and the first track that rejects the
    /// time decides: an early track that already expired wins over a later
    /// one that has not caught up yet.
    pub fn classify(meta: &Meta, time_ms: u64) -> Self {
        if meta.tracks.is_empty() {
            return Seekable::NotYetAvailable;
        }
        for track in meta.tracks.values() {
            if time_ms < track.first_ms {
                return Seekable::Expired;
            }
            if time_ms > track.last_ms {
                return Seekable::NotYetAvailable;
            }
        }
        Seekable::Servable
    }

    pub fn into_result(self, time_ms: u64) -> Result<()> {
        match self {
            Seekable::Servable => Ok(()),
            Seekable::Expired => Err(HlsError::FragmentExpired(time_ms)),
            Seekable::NotYetAvailable => Err(HlsError::FragmentNotYetAvailable(time_ms)),
        }
    }
}
