//! # Track Metadata
//!
//! The ingest pipeline keeps appending fragments and evicting old ones
//! while HLS sessions read the same tracks. Readers never iterate the live
//! structure: [`SharedMeta::snapshot`] copies it under the read lock and
//! every playlist or seek decision works on that copy.

mod track;

pub use track::{Fragment, Meta, Track};

use crate::error::{HlsError, Result};
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable handle to metadata shared between ingest and output sessions.
#[derive(Debug, Clone, Default)]
pub struct SharedMeta {
    inner: Arc<RwLock<Meta>>,
}

impl SharedMeta {
    pub fn new(meta: Meta) -> Self {
        Self {
            inner: Arc::new(RwLock::new(meta)),
        }
    }

    /// Consistent copy of all tracks.
    pub fn snapshot(&self) -> Meta {
        self.inner.read().clone()
    }

    pub fn set_live(&self, live: bool) {
        self.inner.write().live = live;
    }

    pub fn add_track(&self, track: Track) {
        self.inner.write().tracks.insert(track.id, track);
    }

    /// Opens a new fragment at `start_ms`, closing a still-open predecessor.
    pub fn push_fragment(&self, track_id: u32, number: u32, start_ms: u64) -> Result<()> {
        self.with_track(track_id, |track| {
            if let Some(prev) = track.fragments.back_mut() {
                if prev.duration_ms.is_none() {
                    let prev_start = track.keys.get(&prev.number).copied().unwrap_or(start_ms);
                    prev.duration_ms = Some(start_ms.saturating_sub(prev_start));
                }
            }
            if track.fragments.is_empty() {
                track.first_ms = start_ms;
            }
            track.keys.insert(number, start_ms);
            track.fragments.push_back(Fragment::open(number));
            track.last_ms = track.last_ms.max(start_ms);
        })
    }

    /// Terminates the newest fragment.
    pub fn close_fragment(&self, track_id: u32, duration_ms: u64) -> Result<()> {
        self.with_track(track_id, |track| {
            if let Some(last) = track.fragments.back_mut() {
                last.duration_ms = Some(duration_ms);
            }
        })
    }

    /// Moves the latest buffered timestamp forward.
    pub fn advance(&self, track_id: u32, last_ms: u64) -> Result<()> {
        self.with_track(track_id, |track| {
            track.last_ms = track.last_ms.max(last_ms);
        })
    }

    /// Drops the oldest fragment, returning it.
    pub fn evict_fragment(&self, track_id: u32) -> Result<Option<Fragment>> {
        let mut evicted = None;
        self.with_track(track_id, |track| {
            evicted = track.fragments.pop_front();
            if let Some(fragment) = evicted {
                track.keys.remove(&fragment.number);
                track.missed_frags += 1;
                let next_start = track
                    .fragments
                    .front()
                    .and_then(|f| track.keys.get(&f.number).copied());
                if let Some(start) = next_start {
                    track.first_ms = start;
                }
            }
        })?;
        Ok(evicted)
    }

    fn with_track<F: FnOnce(&mut Track)>(&self, track_id: u32, f: F) -> Result<()> {
        let mut meta = self.inner.write();
        let track = meta
            .tracks
            .get_mut(&track_id)
            .ok_or(HlsError::UnknownTrack(track_id))?;
        f(track);
        Ok(())
    }
}
