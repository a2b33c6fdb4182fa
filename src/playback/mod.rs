pub mod midi_sequencer;
