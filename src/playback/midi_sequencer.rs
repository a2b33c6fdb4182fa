use crate::parser::midi_message::Message;
use crate::parser::smf_parser::Track;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PlaybackState {
    NotStarted,
    Playing,
    Finished,
}

/// Plays one track against a clock driven by the caller.
///
/// Elapsed seconds are converted into fractional ticks and every event whose
/// cumulative tick position has been reached is returned in file order.
/// `start` can return events too, not only `advance`.
pub struct MidiSequencer<'a> {
    track: &'a Track,           // track being played
    position: usize,            // index of the next event to emit
    state: PlaybackState,       // NotStarted -> Playing -> Finished
    pulses_per_second: f32,     // ticks per second for the tempo
    ticks_to_next_event: f32,   // delta of the event at `position`
    accumulated_ticks: f32,     // ticks since the last emitted event
}

impl<'a> MidiSequencer<'a> {
    /// `ppqn` is the pulses per quarter note, usually the song division.
    pub fn new(track: &'a Track, ppqn: u16, bpm: f32) -> Self {
        Self {
            track,
            position: 0,
            state: PlaybackState::NotStarted,
            pulses_per_second: pulses_per_second(bpm, ppqn),
            ticks_to_next_event: 0.0,
            accumulated_ticks: 0.0,
        }
    }

    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    pub const fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing)
    }

    pub const fn position(&self) -> usize {
        self.position
    }

    pub const fn pulses_per_second(&self) -> f32 {
        self.pulses_per_second
    }

    pub const fn accumulated_ticks(&self) -> f32 {
        self.accumulated_ticks
    }

    /// Start playback and return the events due at `start_time` seconds.
    ///
    /// `start_time` goes through the same accumulation as `advance`, so every
    /// event up to that point is returned at once.
    pub fn start(&mut self, start_time: f32) -> Vec<Message> {
        if self.state != PlaybackState::NotStarted {
            log::debug!("Sequencer already started ({:?})", self.state);
            return Vec::new();
        }
        let Some(first) = self.track.events().first() else {
            log::debug!("Empty track, nothing to play");
            self.state = PlaybackState::Finished;
            return Vec::new();
        };
        self.ticks_to_next_event = first.delta as f32;
        self.state = PlaybackState::Playing;
        log::debug!(
            "Start playing {} events at {} pulses/s from {start_time}s",
            self.track.len(),
            self.pulses_per_second
        );
        self.advance(start_time)
    }

    /// Move the song position by `delta_time` seconds and return the events due.
    pub fn advance(&mut self, delta_time: f32) -> Vec<Message> {
        if !self.is_playing() {
            return Vec::new();
        }

        self.accumulated_ticks += self.pulses_per_second * delta_time;
        if self.accumulated_ticks < self.ticks_to_next_event {
            return Vec::new();
        }

        let events = self.track.events();
        let mut messages = Vec::new();
        while self.accumulated_ticks >= self.ticks_to_next_event {
            messages.push(events[self.position].message);
            self.position += 1;
            let Some(next) = events.get(self.position) else {
                log::debug!("End of track reached after {} events", self.position);
                self.state = PlaybackState::Finished;
                break;
            };
            self.accumulated_ticks -= self.ticks_to_next_event;
            self.ticks_to_next_event = next.delta as f32;
        }
        messages
    }
}

fn pulses_per_second(tempo_bpm: f32, ppqn: u16) -> f32 {
    tempo_bpm / 60.0 * f32::from(ppqn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::smf_parser::DeltaEvent;

    fn note_on(delta: u32, key: u8) -> DeltaEvent {
        DeltaEvent {
            delta,
            message: Message::new(0x90, key, 0x7F),
        }
    }

    // cumulative ticks: 0, 480, 960, 1200, 1200, 1920
    fn demo_track() -> Track {
        [0, 480, 480, 240, 0, 720]
            .into_iter()
            .enumerate()
            .map(|(i, delta)| note_on(delta, 0x24 + i as u8))
            .collect()
    }

    fn cumulative_ticks(track: &Track) -> Vec<u32> {
        track
            .iter()
            .scan(0, |tick, event| {
                *tick += event.delta;
                Some(*tick)
            })
            .collect()
    }

    #[test]
    fn test_pulses_per_second() {
        assert_eq!(pulses_per_second(120.0, 480), 960.0);
        assert_eq!(pulses_per_second(90.0, 96), 144.0);
        let track = Track::default();
        let sequencer = MidiSequencer::new(&track, 960, 100.0);
        assert!((sequencer.pulses_per_second() - 1600.0).abs() < 0.001);
    }

    #[test]
    fn test_empty_track() {
        let track = Track::default();
        let mut sequencer = MidiSequencer::new(&track, 480, 120.0);
        assert_eq!(sequencer.state(), PlaybackState::NotStarted);
        assert!(sequencer.start(0.0).is_empty());
        assert_eq!(sequencer.state(), PlaybackState::Finished);
        assert!(!sequencer.is_playing());
        assert!(sequencer.advance(10.0).is_empty());
    }

    #[test]
    fn test_advance_before_start() {
        let track = demo_track();
        let mut sequencer = MidiSequencer::new(&track, 480, 120.0);
        assert!(sequencer.advance(100.0).is_empty());
        assert_eq!(sequencer.position(), 0);
        assert_eq!(sequencer.accumulated_ticks(), 0.0);
    }

    #[test]
    fn test_start_emits_first_event_at_zero() {
        let track = demo_track();
        let mut sequencer = MidiSequencer::new(&track, 480, 120.0);
        let batch = sequencer.start(0.0);
        assert_eq!(batch, vec![track.get(0).unwrap().message]);
        assert!(sequencer.is_playing());
        assert_eq!(sequencer.position(), 1);
    }

    #[test]
    fn test_start_twice_is_noop() {
        let track = demo_track();
        let mut sequencer = MidiSequencer::new(&track, 480, 120.0);
        assert_eq!(sequencer.start(0.0).len(), 1);
        assert!(sequencer.start(5.0).is_empty());
        assert_eq!(sequencer.position(), 1);
    }

    #[test]
    fn test_start_with_offset() {
        let track = demo_track();
        let mut sequencer = MidiSequencer::new(&track, 480, 120.0);
        // 1.25s * 960 pulses/s = 1200 ticks
        let batch = sequencer.start(1.25);
        let expected: Vec<Message> = track.messages().take(5).collect();
        assert_eq!(batch, expected);
        assert!(sequencer.is_playing());
        // next event is 720 ticks away
        assert!(sequencer.advance(0.5).is_empty());
        assert_eq!(sequencer.advance(0.25).len(), 1);
        assert!(!sequencer.is_playing());
    }

    #[test]
    fn test_advance_nothing_due() {
        let track = demo_track();
        let mut sequencer = MidiSequencer::new(&track, 480, 120.0);
        sequencer.start(0.0);
        assert!(sequencer.advance(0.25).is_empty());
        assert_eq!(sequencer.accumulated_ticks(), 240.0);
        assert_eq!(sequencer.advance(0.25).len(), 1);
        assert_eq!(sequencer.accumulated_ticks(), 0.0);
    }

    #[test]
    fn test_advance_emits_prefix_of_due_events() {
        let track = demo_track();
        let cumulative = cumulative_ticks(&track);
        let mut sequencer = MidiSequencer::new(&track, 480, 120.0);
        let mut emitted = sequencer.start(0.0);
        let mut elapsed = 0.0_f32;
        // 0.125s * 960 pulses/s = 120 ticks per step, exact in f32
        while sequencer.is_playing() {
            elapsed += 0.125;
            emitted.extend(sequencer.advance(0.125));
            let reached = elapsed * sequencer.pulses_per_second();
            let due = cumulative.iter().filter(|t| **t as f32 <= reached).count();
            assert_eq!(emitted.len(), due, "at {elapsed}s");
        }
        let expected: Vec<Message> = track.messages().collect();
        assert_eq!(emitted, expected);
        assert_eq!(elapsed, 2.0);
    }

    #[test]
    fn test_advance_batches_spanned_events() {
        let track = demo_track();
        let mut sequencer = MidiSequencer::new(&track, 480, 120.0);
        sequencer.start(0.0);
        let batch = sequencer.advance(10.0);
        let expected: Vec<Message> = track.messages().skip(1).collect();
        assert_eq!(batch, expected);
        assert_eq!(sequencer.state(), PlaybackState::Finished);
        assert_eq!(sequencer.position(), track.len());
        assert!(sequencer.advance(10.0).is_empty());
    }

    #[test]
    fn test_events_sharing_a_tick() {
        let track: Track = [note_on(10, 0x24), note_on(0, 0x26), note_on(0, 0x2A)]
            .into_iter()
            .collect();
        let mut sequencer = MidiSequencer::new(&track, 96, 60.0);
        assert!(sequencer.start(0.0).is_empty());
        // 96 pulses/s, 10 ticks needed
        assert!(sequencer.advance(0.1).is_empty());
        assert_eq!(sequencer.advance(0.01).len(), 3);
        assert!(!sequencer.is_playing());
    }

    #[test]
    fn test_fractional_ticks_do_not_drift() {
        let track: Track = (0..100).map(|_| note_on(16, 0x24)).collect();
        // 32 pulses/s, one event every 0.5s
        let mut sequencer = MidiSequencer::new(&track, 16, 120.0);
        sequencer.start(0.0);
        let mut count = 0;
        // 60 frames per second for 10 seconds
        for _ in 0..600 {
            count += sequencer.advance(1.0 / 60.0).len();
        }
        // 10s = 320 ticks = 20 events, allow one event of rounding
        assert!((19..=20).contains(&count), "{count}");
    }
}
