use crate::AppError;
use smfplay::{Message, MidiSequencer, Song, NOTE_ON};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct PlayerArgs {
    pub track: usize,
    pub bpm: f32,
    pub start_time: f32,
    pub frame_rate: u32,
    pub no_sleep: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSummary {
    pub messages: usize,
    pub hits: usize,
    pub song_time: f32,
}

/// Drives a sequencer from a fixed rate update loop, like a game engine frame.
pub struct FramePlayer<'a> {
    song: &'a Song,
    args: PlayerArgs,
}

impl<'a> FramePlayer<'a> {
    pub const fn new(song: &'a Song, args: PlayerArgs) -> Self {
        Self { song, args }
    }

    pub fn play(&self) -> Result<PlaybackSummary, AppError> {
        let track = self.song.track(self.args.track).ok_or_else(|| {
            AppError::ConfigError(format!(
                "Track {} not found, song has {} track(s)",
                self.args.track,
                self.song.tracks.len()
            ))
        })?;
        let division = self.song.division;
        let mut sequencer = MidiSequencer::new(track, division, self.args.bpm);
        let pulses_per_second = sequencer.pulses_per_second();
        if !pulses_per_second.is_finite() || pulses_per_second <= 0.0 {
            // no event with a positive delta would ever be reached
            return Err(AppError::ConfigError(format!(
                "Cannot play division {division} at {} bpm",
                self.args.bpm
            )));
        }
        let length = track.duration_ticks() as f32 / pulses_per_second;
        log::info!(
            "Playing track {} ({} events, {length:.3}s) at {} bpm",
            self.args.track,
            track.len(),
            self.args.bpm
        );

        let mut dispatcher = DrumDispatcher::default();
        let mut song_time = self.args.start_time;
        dispatcher.dispatch(song_time, &sequencer.start(self.args.start_time));

        let mut clock = FrameClock::new(self.args.frame_rate, self.args.no_sleep);
        while sequencer.is_playing() {
            let delta_time = clock.tick();
            song_time += delta_time;
            dispatcher.dispatch(song_time, &sequencer.advance(delta_time));
        }
        Ok(dispatcher.summary(song_time))
    }
}

/// Elapsed seconds between two frames.
enum FrameClock {
    Simulated { frame: f32 },
    Wall { frame: Duration, last: Instant },
}

impl FrameClock {
    fn new(frame_rate: u32, simulated: bool) -> Self {
        let frame = 1.0 / frame_rate as f32;
        if simulated {
            Self::Simulated { frame }
        } else {
            Self::Wall {
                frame: Duration::from_secs_f32(frame),
                last: Instant::now(),
            }
        }
    }

    fn tick(&mut self) -> f32 {
        match self {
            Self::Simulated { frame } => *frame,
            Self::Wall { frame, last } => {
                thread::sleep(*frame);
                let now = Instant::now();
                let elapsed = now.duration_since(*last);
                *last = now;
                elapsed.as_secs_f32()
            }
        }
    }
}

/// General MIDI percussion notes with a handler.
fn drum_name(note: u8) -> Option<&'static str> {
    match note {
        0x24 => Some("kick"),
        0x26..=0x28 => Some("snare"),
        0x2A => Some("hat"),
        0x2E => Some("open hat"),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct DrumDispatcher {
    messages: usize,
    hits: usize,
}

impl DrumDispatcher {
    fn dispatch(&mut self, song_time: f32, messages: &[Message]) {
        for message in messages {
            self.messages += 1;
            // any note-on status triggers its drum, whatever the velocity
            if message.command() != NOTE_ON {
                continue;
            }
            match drum_name(message.data1) {
                Some(drum) => {
                    self.hits += 1;
                    log::info!("{song_time:>8.3}s {drum:<8} {message}");
                }
                None => log::debug!("{song_time:>8.3}s unmapped note {message}"),
            }
        }
    }

    const fn summary(&self, song_time: f32) -> PlaybackSummary {
        PlaybackSummary {
            messages: self.messages,
            hits: self.hits,
            song_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smfplay::{parse_smf_data, DeltaEvent, Track};

    fn event(delta: u32, status: u8, data1: u8, data2: u8) -> DeltaEvent {
        DeltaEvent {
            delta,
            message: Message::new(status, data1, data2),
        }
    }

    fn drum_song() -> Song {
        let track: Track = [
            event(0, 0xC9, 0x00, 0x00),
            event(0, 0x99, 0x24, 0x64),
            event(48, 0x99, 0x24, 0x00),
            event(0, 0x99, 0x30, 0x64),
            event(48, 0x99, 0x26, 0x64),
            event(96, 0x89, 0x26, 0x40),
        ]
        .into_iter()
        .collect();
        Song {
            division: 96,
            tracks: vec![Track::default(), track],
        }
    }

    fn args(track: usize) -> PlayerArgs {
        PlayerArgs {
            track,
            bpm: 60.0,
            start_time: 0.0,
            frame_rate: 16,
            no_sleep: true,
        }
    }

    #[test]
    fn test_drum_name() {
        assert_eq!(drum_name(0x24), Some("kick"));
        assert_eq!(drum_name(0x27), Some("snare"));
        assert_eq!(drum_name(0x2A), Some("hat"));
        assert_eq!(drum_name(0x2E), Some("open hat"));
        assert_eq!(drum_name(0x25), None);
    }

    #[test]
    fn test_dispatch_counts_note_on_hits() {
        let mut dispatcher = DrumDispatcher::default();
        dispatcher.dispatch(
            0.0,
            &[
                Message::new(0x99, 0x24, 0x64),
                Message::new(0x99, 0x24, 0x00),
                Message::new(0x89, 0x2A, 0x40),
                Message::new(0x99, 0x31, 0x64),
            ],
        );
        let summary = dispatcher.summary(0.0);
        assert_eq!(summary.messages, 4);
        assert_eq!(summary.hits, 2);
    }

    #[test]
    fn test_play_simulated() {
        let song = drum_song();
        let summary = FramePlayer::new(&song, args(1)).play().unwrap();
        assert_eq!(summary.messages, 6);
        assert_eq!(summary.hits, 3);
        // 192 ticks at 96 pulses/s, frames of 1/16s are exact
        assert_eq!(summary.song_time, 2.0);
    }

    #[test]
    fn test_play_with_start_time() {
        let song = drum_song();
        let mut args = args(1);
        args.start_time = 1.0;
        let summary = FramePlayer::new(&song, args).play().unwrap();
        assert_eq!(summary.messages, 6);
        assert_eq!(summary.song_time, 2.0);
    }

    #[test]
    fn test_play_empty_track() {
        let song = drum_song();
        let summary = FramePlayer::new(&song, args(0)).play().unwrap();
        assert_eq!(summary.messages, 0);
        assert_eq!(summary.song_time, 0.0);
    }

    #[test]
    fn test_play_unknown_track() {
        let song = drum_song();
        let result = FramePlayer::new(&song, args(2)).play();
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_play_zero_division() {
        let data = [
            b'M', b'T', b'h', b'd', 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00,
            b'M', b'T', b'r', b'k', 0x00, 0x00, 0x00, 0x04, 0x0A, 0x99, 0x24, 0x64,
        ];
        let song = parse_smf_data(&data).unwrap();
        assert_eq!(song.division, 0);
        let result = FramePlayer::new(&song, args(0)).play();
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_play_zero_tempo() {
        let song = drum_song();
        let mut args = args(1);
        args.bpm = 0.0;
        let result = FramePlayer::new(&song, args).play();
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
