use crate::player::{FramePlayer, PlayerArgs};
use crate::AppError::ConfigError;
use clap::Parser;
use config::Config;
use smfplay::{parse_smf_data, SmfError};
use std::io;
use std::path::PathBuf;

mod config;
mod player;

fn main() {
    let result = main_result();
    std::process::exit(match result {
        Ok(()) => 0,
        Err(err) => {
            // use Display instead of Debug for user friendly error messages
            log::error!("{err}");
            1
        }
    });
}

pub fn main_result() -> Result<(), AppError> {
    // setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("smfplay=info"))
        .init();

    // args
    let args = CliArgs::parse();
    let midi_file = PathBuf::from(args.midi_file);

    // check if MIDI file exists
    if !midi_file.exists() {
        let err = ConfigError(format!("MIDI file not found {midi_file:?}"));
        return Err(err);
    }

    // read local config, CLI values take precedence
    let local_config = Config::read_config()?;
    let bpm = args.bpm.unwrap_or_else(|| local_config.bpm());
    if !bpm.is_finite() || bpm <= 0.0 {
        return Err(ConfigError(format!("Tempo must be positive but is {bpm}")));
    }
    let frame_rate = args.frame_rate.unwrap_or_else(|| local_config.frame_rate());
    if frame_rate == 0 {
        return Err(ConfigError("Frame rate must be positive".to_string()));
    }
    if !args.start_time.is_finite() || args.start_time < 0.0 {
        let err = ConfigError(format!("Invalid start time {}", args.start_time));
        return Err(err);
    }

    // decode song
    let file_data = std::fs::read(&midi_file)?;
    let song = parse_smf_data(&file_data)?;
    log::info!(
        "Loaded {midi_file:?} with {} track(s) and division {}",
        song.tracks.len(),
        song.division
    );

    // bundle player args
    let player_args = PlayerArgs {
        track: args.track,
        bpm,
        start_time: args.start_time,
        frame_rate,
        no_sleep: args.no_sleep,
    };

    // go!
    let summary = FramePlayer::new(&song, player_args).play()?;
    log::info!(
        "Dispatched {} message(s) with {} drum hit(s) in {:.3}s",
        summary.messages,
        summary.hits,
        summary.song_time
    );
    Ok(())
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Path to a Standard MIDI file.
    midi_file: String,
    /// Index of the track to play.
    #[arg(long, default_value_t = 0)]
    track: usize,
    /// Tempo in beats per minute, defaults to the configured tempo.
    #[arg(long)]
    bpm: Option<f32>,
    /// Offset in seconds, events before it are dispatched at once.
    #[arg(long, default_value_t = 0.0)]
    start_time: f32,
    /// Update loop frequency in Hz, defaults to the configured frame rate.
    #[arg(long)]
    frame_rate: Option<u32>,
    /// Simulate the frame clock instead of sleeping between frames.
    #[arg(long, default_value_t = false)]
    no_sleep: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    ConfigError(String),
    #[error("parsing error: {0}")]
    ParsingError(String),
    #[error("other error: {0}")]
    OtherError(String),
}

impl From<SmfError> for AppError {
    fn from(error: SmfError) -> Self {
        Self::ParsingError(error.to_string())
    }
}

impl From<io::Error> for AppError {
    fn from(error: io::Error) -> Self {
        Self::OtherError(error.to_string())
    }
}
