use serde::{Deserialize, Serialize};

/// Errors from building a world.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("invalid sim config: {reason}")]
    InvalidConfig { reason: String },
}

/// Tuning for the avatar and the wandering agents. Speeds are in world units
/// per second, times in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    /// Agents spawned when the world is built.
    pub agent_count: usize,
    /// Agents spawn uniformly in `[-e, e)` on both axes.
    pub spawn_half_extent: f32,
    pub avatar_speed: f32,
    pub agent_speed: f32,
    /// Speed factor applied while surging.
    pub surge_multiplier: f32,
    /// Agents pick a new heading after a random time in `[min, max)`.
    pub decision_interval: (f32, f32),
    /// Chance that a new heading is "stand still".
    pub idle_chance: f32,
    pub surge_chance_per_second: f32,
    /// How long a surge lasts, drawn from `[min, max)`.
    pub surge_duration: (f32, f32),
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            agent_count: 4,
            spawn_half_extent: 20.0,
            avatar_speed: 6.0,
            agent_speed: 3.5,
            surge_multiplier: 1.5,
            decision_interval: (2.0, 5.0),
            idle_chance: 0.2,
            surge_chance_per_second: 0.3,
            surge_duration: (1.0, 3.0),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |reason: String| -> Result<(), SimError> {
            Err(SimError::InvalidConfig { reason })
        };

        if !(self.spawn_half_extent.is_finite() && self.spawn_half_extent > 0.0) {
            return invalid(format!(
                "spawn_half_extent must be positive, got {}",
                self.spawn_half_extent
            ));
        }
        for (name, speed) in [
            ("avatar_speed", self.avatar_speed),
            ("agent_speed", self.agent_speed),
            ("surge_multiplier", self.surge_multiplier),
        ] {
            if !(speed.is_finite() && speed >= 0.0) {
                return invalid(format!("{name} must be finite and non-negative, got {speed}"));
            }
        }
        for (name, (min, max)) in [
            ("decision_interval", self.decision_interval),
            ("surge_duration", self.surge_duration),
        ] {
            if !(min.is_finite() && max.is_finite() && 0.0 < min && min < max) {
                return invalid(format!("{name} must satisfy 0 < min < max, got ({min}, {max})"));
            }
        }
        for (name, p) in [
            ("idle_chance", self.idle_chance),
            ("surge_chance_per_second", self.surge_chance_per_second),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{name} must be within [0, 1], got {p}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.agent_speed, 3.5);
        assert_eq!(config.decision_interval, (2.0, 5.0));
    }

    #[test]
    fn rejects_inverted_interval() {
        let config = SimConfig {
            decision_interval: (5.0, 2.0),
            ..SimConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("decision_interval"));
    }

    #[test]
    fn rejects_bad_probability_and_speed() {
        let config = SimConfig {
            idle_chance: 1.5,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SimConfig {
            agent_speed: -1.0,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
