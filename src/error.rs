//! Error types for the smfplay library

/// Failure while decoding a Standard MIDI File.
///
/// Every variant aborts the decode call, no partial song is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SmfError {
    /// The file does not start with a `MThd` chunk
    #[error("header chunk not found: expected \"MThd\" but found {found:?}")]
    HeaderTagMismatch { found: String },

    /// The header chunk length field is not 6
    #[error("header chunk length must be 6 but is {0}")]
    HeaderLengthMismatch(u32),

    /// The division uses SMPTE time code (top bit set)
    #[error("SMPTE time code division {0:#06X} is not supported")]
    UnsupportedTimeFormat(u16),

    /// A track chunk does not start with `MTrk`
    #[error("track chunk {track} not found: expected \"MTrk\" but found {found:?}")]
    TrackTagMismatch { track: usize, found: String },

    /// A read went past the end of the buffer
    #[error("unexpected end of data at offset {offset}")]
    OutOfData { offset: usize },

    /// A data byte appeared before any status byte in a track
    #[error("data byte without running status at offset {offset}")]
    MissingRunningStatus { offset: usize },
}

impl SmfError {
    pub const fn is_out_of_data(&self) -> bool {
        matches!(self, Self::OutOfData { .. })
    }
}
