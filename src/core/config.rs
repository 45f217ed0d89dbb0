//! Deployment configuration: which merge strategy runs, and where ffmpeg lives.

use std::path::PathBuf;

use tracing::debug;

use super::error::{Error, Result};
use super::merge::{DecodeConcat, FfmpegConcat, MergeStrategy};

/// Env var selecting the strategy: `decode` or `ffmpeg`.
pub const STRATEGY_ENV: &str = "AUDIO_MERGER_STRATEGY";
/// Env var overriding the ffmpeg program path.
pub const FFMPEG_ENV: &str = "AUDIO_MERGER_FFMPEG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    /// Decode, splice, and encode in-process.
    #[default]
    Decode,
    /// Concat demuxer in an external ffmpeg.
    Ffmpeg,
}

impl std::str::FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "decode" | "in-process" | "inprocess" => Ok(StrategyKind::Decode),
            "ffmpeg" | "external" => Ok(StrategyKind::Ffmpeg),
            other => Err(Error::InvalidConfig(format!(
                "unknown merge strategy '{other}' (expected 'decode' or 'ffmpeg')"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergerConfig {
    pub strategy: StrategyKind,
    pub ffmpeg_path: PathBuf,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
        }
    }
}

impl MergerConfig {
    /// Defaults, overridden by [`STRATEGY_ENV`] / [`FFMPEG_ENV`] when set and non-empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup(STRATEGY_ENV).filter(|v| !v.trim().is_empty()) {
            config.strategy = v.parse()?;
        }
        if let Some(v) = lookup(FFMPEG_ENV).filter(|v| !v.trim().is_empty()) {
            config.ffmpeg_path = PathBuf::from(v.trim());
        }

        debug!(?config, "merger config loaded");
        Ok(config)
    }

    /// Build the configured strategy.
    pub fn engine(&self) -> Box<dyn MergeStrategy> {
        match self.strategy {
            StrategyKind::Decode => Box::new(DecodeConcat),
            StrategyKind::Ffmpeg => Box::new(FfmpegConcat::new(self.ffmpeg_path.clone())),
        }
    }
}
