use std::{
    fs::{create_dir_all, File},
    io::{BufReader, Write},
    path::PathBuf,
};

use home::home_dir;
use serde::{Deserialize, Serialize};

use crate::AppError;

const DEFAULT_BPM: f32 = 120.0;
const DEFAULT_FRAME_RATE: u32 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    bpm: f32,
    frame_rate: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }
}

impl Config {
    // folder placed in $HOME directory
    const FOLDER: &'static str = ".smfplay";

    pub const fn bpm(&self) -> f32 {
        self.bpm
    }

    pub const fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    fn get_base_path() -> Result<PathBuf, AppError> {
        let home = home_dir()
            .ok_or_else(|| AppError::ConfigError("Could not find home directory".to_string()))?;
        let path = home.join(Self::FOLDER);
        Ok(path)
    }

    fn get_path() -> Result<PathBuf, AppError> {
        let base = Self::get_base_path()?;
        Ok(base.join("config.json"))
    }

    /// Creates config if it does not exist
    pub fn read_config() -> Result<Self, AppError> {
        let base_path = Self::get_base_path()?;
        if !base_path.exists() {
            create_dir_all(base_path)?;
        }
        let config_path = Self::get_path()?;
        if !config_path.exists() {
            // create default config
            log::info!("Creating default configuration at {config_path:?}");
            Config::default().save_config()?;
        }
        let file = File::open(config_path)?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader).map_err(|err| {
            AppError::ConfigError(format!("Could not read local configuration {err:}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Assumes the config folder exists
    pub fn save_config(&self) -> Result<(), AppError> {
        let config_path = Self::get_path()?;
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            AppError::ConfigError(format!("Could not save local configuration {err:}"))
        })?;
        let mut file = File::create(config_path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    fn validate(&self) -> Result<(), AppError> {
        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return Err(AppError::ConfigError(format!(
                "Configured bpm must be positive but is {}",
                self.bpm
            )));
        }
        if self.frame_rate == 0 {
            return Err(AppError::ConfigError(
                "Configured frame rate must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
