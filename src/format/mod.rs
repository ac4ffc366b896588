/// HLS requests, playlists and segment sessions
pub mod hls;

/// MPEG transport stream packetizing
pub mod ts;

pub use self::hls::{HlsOutput, HlsRequest, Response};
pub use self::ts::{EsFramer, Packetizer, ProgramTables};
