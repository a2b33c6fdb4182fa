//! smfplay - Standard MIDI file decoder and track sequencer
//!
//! This library provides:
//! - Decoding of Standard MIDI Files into tracks of channel messages
//! - A sequencer replaying one track against a clock driven by the caller
//!
//! # Example
//!
//! ```no_run
//! use smfplay::{parse_smf_data, MidiSequencer};
//!
//! let file_data = std::fs::read("song.mid").unwrap();
//! let song = parse_smf_data(&file_data).unwrap();
//! let track = song.track(0).unwrap();
//! let mut sequencer = MidiSequencer::new(track, song.division, 120.0);
//! let mut due = sequencer.start(0.0);
//! while sequencer.is_playing() {
//!     for message in due.drain(..) {
//!         println!("{message}");
//!     }
//!     due = sequencer.advance(1.0 / 60.0);
//! }
//! ```

pub mod error;
pub mod parser;
pub mod playback;

// Re-export main types for convenience
pub use error::SmfError;
pub use parser::{
    byte_cursor::ByteCursor,
    midi_message::{Message, NOTE_OFF, NOTE_ON, PROGRAM_CHANGE},
    smf_parser::{parse_smf_data, parse_track, DeltaEvent, Song, Track},
};
pub use playback::midi_sequencer::{MidiSequencer, PlaybackState};
