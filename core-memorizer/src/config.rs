//! # Memorizer Configuration
//!
//! Tunables for the playback core. Defaults match the shipped product
//! behavior; hosts override individual fields through serde or struct update
//! syntax.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback core configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorizerConfig {
    /// Duration reported by the simulated clock when no real source is bound.
    ///
    /// Default: 600 seconds.
    #[serde(default = "default_simulated_duration_secs")]
    pub simulated_duration_secs: f64,

    /// Loop end installed when a session resets its loop region.
    ///
    /// Default: 30 seconds.
    #[serde(default = "default_loop_end_secs")]
    pub default_loop_end_secs: f64,

    /// Minimum span the loop region may be narrowed to.
    ///
    /// Default: 1 second.
    #[serde(default = "default_min_loop_span_secs")]
    pub min_loop_span_secs: f64,

    /// Cadence at which the media backend's position is sampled while
    /// playing. Bounds the UI update frequency.
    ///
    /// Default: 250 ms.
    #[serde(default = "default_media_poll_interval", with = "duration_millis")]
    pub media_poll_interval: Duration,

    /// Fixed step of the simulated clock.
    ///
    /// Default: 50 ms.
    #[serde(default = "default_simulated_tick_interval", with = "duration_millis")]
    pub simulated_tick_interval: Duration,

    /// Number of chapters in the supported range (ids are 1-based).
    ///
    /// Default: 114.
    #[serde(default = "default_surah_count")]
    pub surah_count: u16,

    /// Highest chapter id shipped as a deferred-download pack. Chapters above
    /// this index stream only.
    ///
    /// Default: 4.
    #[serde(default = "default_offline_pack_limit")]
    pub offline_pack_limit: u16,
}

impl Default for MemorizerConfig {
    fn default() -> Self {
        Self {
            simulated_duration_secs: default_simulated_duration_secs(),
            default_loop_end_secs: default_loop_end_secs(),
            min_loop_span_secs: default_min_loop_span_secs(),
            media_poll_interval: default_media_poll_interval(),
            simulated_tick_interval: default_simulated_tick_interval(),
            surah_count: default_surah_count(),
            offline_pack_limit: default_offline_pack_limit(),
        }
    }
}

impl MemorizerConfig {
    /// Validate field combinations that would break the clock or loop math.
    pub fn validate(&self) -> Result<(), String> {
        if self.simulated_duration_secs <= 0.0 {
            return Err("simulated_duration_secs must be positive".to_string());
        }
        if self.min_loop_span_secs <= 0.0 {
            return Err("min_loop_span_secs must be positive".to_string());
        }
        if self.media_poll_interval.is_zero() || self.simulated_tick_interval.is_zero() {
            return Err("poll/tick intervals must be non-zero".to_string());
        }
        if self.surah_count == 0 {
            return Err("surah_count must be at least 1".to_string());
        }
        Ok(())
    }

    /// Seconds advanced per simulated tick.
    pub fn simulated_step_secs(&self) -> f64 {
        self.simulated_tick_interval.as_secs_f64()
    }
}

fn default_simulated_duration_secs() -> f64 {
    600.0
}

fn default_loop_end_secs() -> f64 {
    30.0
}

fn default_min_loop_span_secs() -> f64 {
    1.0
}

fn default_media_poll_interval() -> Duration {
    Duration::from_millis(250)
}

fn default_simulated_tick_interval() -> Duration {
    Duration::from_millis(50)
}

fn default_surah_count() -> u16 {
    114
}

fn default_offline_pack_limit() -> u16 {
    4
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MemorizerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.simulated_duration_secs, 600.0);
        assert_eq!(config.default_loop_end_secs, 30.0);
        assert_eq!(config.simulated_step_secs(), 0.05);
        assert_eq!(config.surah_count, 114);
    }

    #[test]
    fn serde_round_trip_with_partial_input() {
        let config: MemorizerConfig =
            serde_json::from_str(r#"{"media_poll_interval": 100}"#).unwrap();
        assert_eq!(config.media_poll_interval, Duration::from_millis(100));
        assert_eq!(config.simulated_tick_interval, Duration::from_millis(50));

        let json = serde_json::to_string(&config).unwrap();
        let back: MemorizerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.media_poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn validation_rejects_zero_intervals() {
        let config = MemorizerConfig {
            simulated_tick_interval: Duration::ZERO,
            ..MemorizerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
