use crate::av::{CodecType, TrackKind};
use bytes::Bytes;
use std::collections::{BTreeMap, VecDeque};

/// One addressable segment of a track's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    /// Sequence number; also the key index entry holding the start time.
    pub number: u32,
    /// `None` while the fragment is still being written.
    pub duration_ms: Option<u64>,
}

impl Fragment {
    pub fn closed(number: u32, duration_ms: u64) -> Self {
        Self {
            number,
            duration_ms: Some(duration_ms),
        }
    }

    pub fn open(number: u32) -> Self {
        Self {
            number,
            duration_ms: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Track {
    pub id: u32,
    pub kind: TrackKind,
    pub codec: CodecType,
    /// Average rate as recorded by ingest.
    pub bps: u64,
    /// Codec initialization data (avcC record, AudioSpecificConfig, ...).
    pub init: Bytes,
    pub first_ms: u64,
    pub last_ms: u64,
    pub fragments: VecDeque<Fragment>,
    /// Fragments evicted from the head so far.
    pub missed_frags: u64,
    /// Fragment number to absolute start time in ms.
    pub keys: BTreeMap<u32, u64>,
}

impl Track {
    pub fn new(id: u32, kind: TrackKind, codec: CodecType) -> Self {
        Self {
            id,
            kind,
            codec,
            bps: 0,
            init: Bytes::new(),
            first_ms: 0,
            last_ms: 0,
            fragments: VecDeque::new(),
            missed_frags: 0,
            keys: BTreeMap::new(),
        }
    }

    pub fn with_bps(mut self, bps: u64) -> Self {
        self.bps = bps;
        self
    }

    pub fn with_init(mut self, init: impl Into<Bytes>) -> Self {
        self.init = init.into();
        self
    }

    /// Appends a fragment starting at `start_ms` and widens the buffered range.
    pub fn with_fragment(mut self, fragment: Fragment, start_ms: u64) -> Self {
        if self.fragments.is_empty() {
            self.first_ms = start_ms;
        }
        self.keys.insert(fragment.number, start_ms);
        let end = start_ms.saturating_add(fragment.duration_ms.unwrap_or(0));
        self.last_ms = self.last_ms.max(end);
        self.fragments.push_back(fragment);
        self
    }

    pub fn with_range(mut self, first_ms: u64, last_ms: u64) -> Self {
        self.first_ms = first_ms;
        self.last_ms = last_ms;
        self
    }

    /// Start time of a fragment through the key index.
    pub fn fragment_start(&self, fragment: &Fragment) -> Option<u64> {
        self.keys.get(&fragment.number).copied()
    }
}

/// Point-in-time view of the whole session's metadata.
#[derive(Debug, Clone, Default)]
pub struct Meta {
    pub live: bool,
    pub tracks: BTreeMap<u32, Track>,
}

impl Meta {
    pub fn new(live: bool) -> Self {
        Self {
            live,
            tracks: BTreeMap::new(),
        }
    }

    pub fn with_track(mut self, track: Track) -> Self {
        self.tracks.insert(track.id, track);
        self
    }

    pub fn track(&self, id: u32) -> Option<&Track> {
        self.tracks.get(&id)
    }
}
