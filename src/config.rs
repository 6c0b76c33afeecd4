use anyhow::{Context, Result, bail};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{config as paths, frames, pacing};
use crate::playback::Pacing;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlaybackConfig {
    #[serde(default = "default_speed")]
    pub speed_ms: u64,
    #[serde(default = "default_jitter")]
    pub jitter: f64,
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
}

fn default_speed() -> u64 {
    pacing::DEFAULT_SPEED_MS
}

fn default_jitter() -> f64 {
    pacing::DEFAULT_JITTER
}

fn default_frame_interval() -> u64 {
    frames::DEFAULT_FRAME_INTERVAL_MS
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            speed_ms: default_speed(),
            jitter: default_jitter(),
            frame_interval_ms: default_frame_interval(),
        }
    }
}

impl PlaybackConfig {
    pub fn pacing(&self) -> Pacing {
        Pacing::new(Duration::from_millis(self.speed_ms), self.jitter)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(paths::CONFIG_DIR_NAME))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(paths::CONFIG_FILE_NAME))
    }

    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            info!("📝 Created default config at: {}", config_path.display());
            Ok(config)
        }
    }

    /// Read and validate a config file at an explicit path
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)
            .context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let playback = &self.playback;

        if playback.speed_ms == 0 {
            bail!("speed_ms must be greater than 0");
        }
        if playback.speed_ms > pacing::MAX_SPEED_MS {
            bail!("speed_ms must be <= {}", pacing::MAX_SPEED_MS);
        }

        if !playback.jitter.is_finite() || playback.jitter < 0.0 {
            bail!("jitter must be >= 0.0");
        }
        if playback.jitter > 1.0 {
            bail!("jitter must be <= 1.0");
        }

        if playback.frame_interval_ms == 0 {
            bail!("frame_interval_ms must be greater than 0");
        }
        if playback.frame_interval_ms > frames::MAX_FRAME_INTERVAL_MS {
            bail!("frame_interval_ms must be <= {}", frames::MAX_FRAME_INTERVAL_MS);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .context("Failed to create config directory")?;
        }

        let yaml = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs::write(path, yaml)
            .context("Failed to write config file")?;

        Ok(())
    }
}
