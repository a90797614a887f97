use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{PlayerError, Result};

/// Shortest tick period the controller accepts.
pub const MIN_TICK_PERIOD_SECONDS: f32 = 0.001;

/// Top-level configuration for a player instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Nominal period of the external clock, in seconds.
    pub tick_period_seconds: f32,
    /// When set, each tick advances the cursor by `period * tempo` instead of
    /// the bare period.
    pub tempo_scaled_ticks: bool,
    pub initial_tempo: f32,
    pub initial_volume: f32,
    pub initial_loop: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_period_seconds: 0.1,
            tempo_scaled_ticks: false,
            initial_tempo: 1.0,
            initial_volume: 0.8,
            initial_loop: false,
        }
    }
}

impl PlayerConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Tick period as a [`Duration`], never shorter than one millisecond.
    /// Unrepresentable periods fall back to the default.
    pub fn tick_period(&self) -> Duration {
        let seconds = self.tick_period_seconds.max(MIN_TICK_PERIOD_SECONDS);
        Duration::try_from_secs_f32(seconds)
            .unwrap_or_else(|_| Duration::from_secs_f32(Self::default().tick_period_seconds))
    }

    fn validate(&self) -> Result<()> {
        let numbers = [
            ("tick_period_seconds", self.tick_period_seconds),
            ("initial_tempo", self.initial_tempo),
            ("initial_volume", self.initial_volume),
        ];
        for (name, value) in numbers {
            if !value.is_finite() {
                return Err(PlayerError::Config(format!("`{name}` must be a finite number")));
            }
        }
        if self.tick_period_seconds <= 0.0 {
            return Err(PlayerError::Config(
                "`tick_period_seconds` must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = PlayerConfig::from_json_str(r#"{ "initial_loop": true }"#).unwrap();
        assert!(config.initial_loop);
        assert_eq!(config.tick_period_seconds, 0.1);
        assert_eq!(config.initial_volume, 0.8);
    }

    #[test]
    fn rejects_unknown_fields_and_bad_periods() {
        assert!(PlayerConfig::from_json_str(r#"{ "speed": 2 }"#).is_err());

        let err = PlayerConfig::from_json_str(r#"{ "tick_period_seconds": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("tick_period_seconds"));
    }

    #[test]
    fn tick_period_has_a_floor() {
        let config = PlayerConfig {
            tick_period_seconds: 0.0,
            ..Default::default()
        };
        assert_eq!(config.tick_period(), Duration::from_secs_f32(MIN_TICK_PERIOD_SECONDS));
    }
}
