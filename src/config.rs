use crate::kernel::time::DECAY_WINDOW;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds of silence after which dialogue memory is forgotten.
    pub decay_window_secs: u64,
    /// Minimum classifier score for a known intent.
    pub confidence_threshold: f32,
    /// Minimum score for an utterance to interrupt an unfinished command.
    pub interrupt_threshold: f32,
    pub listen_timeout_secs: u64,
    /// Add an encouragement every N successful commands. 0 disables.
    pub encouragement_every: u32,
    pub history_window: usize,
    /// Fixed seed for phrase selection (tests, replays).
    pub rng_seed: Option<u64>,
    pub dispatch_url: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decay_window_secs: DECAY_WINDOW.as_secs(),
            confidence_threshold: 0.3,
            interrupt_threshold: 0.5,
            listen_timeout_secs: 10,
            encouragement_every: 3,
            history_window: 5,
            rng_seed: None,
            dispatch_url: None,
        }
    }
}

impl EngineConfig {
    pub fn decay_window(&self) -> Duration {
        Duration::from_secs(self.decay_window_secs)
    }

    pub fn listen_timeout(&self) -> Duration {
        Duration::from_secs(self.listen_timeout_secs)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults (or `PARLEY_CONFIG` file) with `PARLEY_*` overrides on top.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var("PARLEY_CONFIG") {
            Ok(path) => Self::from_path(path)?,
            Err(_) => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from any key/value source. Split out so tests need no process env.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PARLEY_DECAY_SECS") {
            self.decay_window_secs = parse("decay_window_secs", &v)?;
        }
        if let Some(v) = lookup("PARLEY_CONFIDENCE_THRESHOLD") {
            self.confidence_threshold = parse("confidence_threshold", &v)?;
        }
        if let Some(v) = lookup("PARLEY_INTERRUPT_THRESHOLD") {
            self.interrupt_threshold = parse("interrupt_threshold", &v)?;
        }
        if let Some(v) = lookup("PARLEY_LISTEN_TIMEOUT_SECS") {
            self.listen_timeout_secs = parse("listen_timeout_secs", &v)?;
        }
        if let Some(v) = lookup("PARLEY_ENCOURAGEMENT_EVERY") {
            self.encouragement_every = parse("encouragement_every", &v)?;
        }
        if let Some(v) = lookup("PARLEY_SEED") {
            self.rng_seed = Some(parse("rng_seed", &v)?);
        }
        if let Some(v) = lookup("PARLEY_DISPATCH_URL") {
            self.dispatch_url = Some(v).filter(|url| !url.trim().is_empty());
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("interrupt_threshold", self.interrupt_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    key,
                    reason: format!("{value} is outside 0.0..=1.0"),
                });
            }
        }
        if self.decay_window_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "decay_window_secs",
                reason: "must be positive".to_string(),
            });
        }
        if self.history_window == 0 {
            return Err(ConfigError::Invalid {
                key: "history_window",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}
