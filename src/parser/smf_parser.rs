use crate::parser::byte_cursor::ByteCursor;
use crate::parser::midi_message::Message;
use crate::SmfError;

// SMF 1.0 docs at <https://midi.org/standard-midi-files-specification>

pub const HEADER_TAG: &[u8] = b"MThd";
pub const TRACK_TAG: &[u8] = b"MTrk";
pub const HEADER_LENGTH: u32 = 6;

const SMPTE_DIVISION_FLAG: u16 = 0x8000;
const STATUS_FLAG: u8 = 0x80;
const META_EVENT: u8 = 0xFF;
const SYSEX_EVENT: u8 = 0xF0;
const SYSEX_END: u8 = 0xF7;

/// A decoded Standard MIDI File.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Song {
    /// Pulses per quarter note (PPQN), top bit always clear.
    pub division: u16,
    /// Tracks in file order.
    pub tracks: Vec<Track>,
}

impl Song {
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }
}

/// A message and the ticks elapsed since the previous event of the same track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaEvent {
    pub delta: u32,
    pub message: Message,
}

/// Channel messages of one track in playback order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    events: Vec<DeltaEvent>,
}

impl Track {
    pub(crate) fn push(&mut self, delta: u32, message: Message) {
        self.events.push(DeltaEvent { delta, message });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DeltaEvent> {
        self.events.get(index)
    }

    #[allow(clippy::missing_const_for_fn)]
    pub fn events(&self) -> &[DeltaEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeltaEvent> {
        self.events.iter()
    }

    pub fn messages(&self) -> impl Iterator<Item = Message> + '_ {
        self.events.iter().map(|event| event.message)
    }

    /// Tick position of the last event.
    pub fn duration_ticks(&self) -> u64 {
        self.events.iter().map(|event| u64::from(event.delta)).sum()
    }
}

impl<'a> IntoIterator for &'a Track {
    type Item = &'a DeltaEvent;
    type IntoIter = std::slice::Iter<'a, DeltaEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl FromIterator<DeltaEvent> for Track {
    fn from_iter<I: IntoIterator<Item = DeltaEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

/// Event families a track chunk can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventCategory {
    Meta,
    SysEx,
    Channel(u8),
}

impl EventCategory {
    const fn from_status(status: u8) -> Self {
        match status {
            META_EVENT => Self::Meta,
            SYSEX_EVENT => Self::SysEx,
            status => Self::Channel(status),
        }
    }
}

/// Decode a complete Standard MIDI File.
pub fn parse_smf_data(data: &[u8]) -> Result<Song, SmfError> {
    let mut cursor = ByteCursor::new(data);

    let tag = cursor.read_chars(HEADER_TAG.len())?;
    if tag != HEADER_TAG {
        return Err(SmfError::HeaderTagMismatch {
            found: String::from_utf8_lossy(tag).into_owned(),
        });
    }

    let header_length = cursor.read_be_u32()?;
    if header_length != HEADER_LENGTH {
        return Err(SmfError::HeaderLengthMismatch(header_length));
    }

    // format type is not used
    cursor.advance(2)?;

    let track_count = cursor.read_be_u16()?;

    let division = cursor.read_be_u16()?;
    if division & SMPTE_DIVISION_FLAG != 0 {
        return Err(SmfError::UnsupportedTimeFormat(division));
    }
    log::debug!("SMF header: {track_count} track(s), division {division}");

    let mut tracks = Vec::with_capacity(usize::from(track_count));
    for track_index in 0..usize::from(track_count) {
        tracks.push(parse_track(&mut cursor, track_index)?);
    }

    if !cursor.is_at_end() {
        log::debug!(
            "Ignoring {} trailing byte(s) after the last track",
            cursor.remaining().len()
        );
    }
    Ok(Song { division, tracks })
}

/// Decode one `MTrk` chunk.
///
/// Meta and system exclusive events are skipped, only channel messages are kept.
pub fn parse_track(
    cursor: &mut ByteCursor<'_>,
    track_index: usize,
) -> Result<Track, SmfError> {
    let tag = cursor.read_chars(TRACK_TAG.len())?;
    if tag != TRACK_TAG {
        return Err(SmfError::TrackTagMismatch {
            track: track_index,
            found: String::from_utf8_lossy(tag).into_owned(),
        });
    }

    let chunk_length = cursor.read_be_u32()?;
    let chunk_end = cursor.offset().saturating_add(chunk_length as usize);
    log::debug!("Track {track_index}: chunk of {chunk_length} bytes");

    let mut track = Track::default();
    let mut running_status: Option<u8> = None;
    while cursor.offset() < chunk_end {
        let delta = cursor.read_variable_length()?;

        if cursor.peek_byte()? & STATUS_FLAG != 0 {
            running_status = Some(cursor.read_byte()?);
        }
        let Some(status) = running_status else {
            return Err(SmfError::MissingRunningStatus {
                offset: cursor.offset(),
            });
        };

        match EventCategory::from_status(status) {
            EventCategory::Meta => {
                let meta_type = cursor.read_byte()?;
                let length = cursor.read_variable_length()?;
                cursor.advance(length as usize)?;
                log::debug!(
                    "Track {track_index}: skipped meta event {meta_type:#04X} ({length} bytes)"
                );
            }
            EventCategory::SysEx => {
                let length = skip_sysex(cursor)?;
                log::debug!("Track {track_index}: skipped sysex event ({length} bytes)");
            }
            EventCategory::Channel(status) => {
                let data1 = cursor.read_byte()?;
                let data2 = if Message::has_single_data_byte(status) {
                    0
                } else {
                    cursor.read_byte()?
                };
                track.push(delta, Message::new(status, data1, data2));
            }
        }
    }

    log::debug!("Track {track_index}: {} event(s)", track.len());
    Ok(track)
}

/// Consume a system exclusive payload up to and including its terminator.
/// Returns the number of bytes skipped.
fn skip_sysex(cursor: &mut ByteCursor<'_>) -> Result<usize, SmfError> {
    let mut skipped = 0;
    loop {
        let byte = cursor.read_byte()?;
        skipped += 1;
        if byte == SYSEX_END {
            return Ok(skipped);
        }
    }
}
