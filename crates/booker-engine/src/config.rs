//! Engine configuration.

use serde::{Deserialize, Serialize};

use booker_core::{BookerError, BookerResult};

/// Tunables shared by the booking engines.
///
/// Deserialized configs are validated; use [`EngineConfig::validate`] after
/// editing fields directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConfigFile")]
pub struct EngineConfig {
    /// RNG seed for reproducible outcomes.
    pub seed: u64,
    /// Weight multiplier applied per additional team member (0-1].
    pub member_decay: f64,
    /// Maximum fractional swing applied to team power.
    pub power_variance: f64,
    /// Shortest allowed match, in minutes.
    pub min_duration: u32,
    /// Longest allowed match, in minutes.
    pub max_duration: u32,
    /// Awareness at which an interferer is ejected.
    pub ejection_threshold: u8,
    /// Awareness at which a match is thrown out.
    pub dq_threshold: u8,
    /// Risk reduction at full faction affinity.
    pub max_affinity_reduction: f64,
    /// Chance a heel interferes when given an opportunity.
    pub heel_interference_chance: f64,
    /// Awareness assumed for a referee with no known rating.
    pub default_referee_awareness: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            member_decay: 0.6,
            power_variance: 0.1,
            min_duration: 5,
            max_duration: 25,
            ejection_threshold: 80,
            dq_threshold: 100,
            max_affinity_reduction: 0.3,
            heel_interference_chance: 0.35,
            default_referee_awareness: 50,
        }
    }
}

impl EngineConfig {
    /// Check that every tunable is in range.
    pub fn validate(&self) -> BookerResult<()> {
        let invalid = |msg: String| Err(BookerError::InvalidConfig(msg));
        if !(f64::EPSILON..=1.0).contains(&self.member_decay) {
            return invalid(format!("member_decay must be in (0, 1], got {}", self.member_decay));
        }
        if !(0.0..=0.5).contains(&self.power_variance) {
            return invalid(format!(
                "power_variance must be in 0.0..=0.5, got {}",
                self.power_variance
            ));
        }
        if self.min_duration > self.max_duration {
            return invalid(format!(
                "min_duration {} exceeds max_duration {}",
                self.min_duration, self.max_duration
            ));
        }
        if [
            self.ejection_threshold,
            self.dq_threshold,
            self.default_referee_awareness,
        ]
        .iter()
        .any(|v| *v > 100)
        {
            return invalid("awareness values must be at most 100".into());
        }
        if !(0.0..=1.0).contains(&self.max_affinity_reduction) {
            return invalid(format!(
                "max_affinity_reduction must be in 0.0..=1.0, got {}",
                self.max_affinity_reduction
            ));
        }
        if !(0.0..=1.0).contains(&self.heel_interference_chance) {
            return invalid(format!(
                "heel_interference_chance must be in 0.0..=1.0, got {}",
                self.heel_interference_chance
            ));
        }
        Ok(())
    }

    /// Parse and validate a config from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> BookerResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| BookerError::InvalidConfig(format!("engine config: {e}")))
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the per-member weight decay (clamped to 0.05-1.0).
    pub fn with_member_decay(mut self, decay: f64) -> Self {
        self.member_decay = decay.clamp(0.05, 1.0);
        self
    }

    /// Set the power variance (clamped to 0.0-0.5).
    pub fn with_power_variance(mut self, variance: f64) -> Self {
        self.power_variance = variance.clamp(0.0, 0.5);
        self
    }

    /// Set the match duration bounds. The bounds are swapped if reversed.
    pub fn with_duration_range(mut self, min: u32, max: u32) -> Self {
        self.min_duration = min.min(max);
        self.max_duration = min.max(max);
        self
    }

    /// Set the ejection and disqualification thresholds (clamped to 0-100).
    pub fn with_thresholds(mut self, ejection: u8, dq: u8) -> Self {
        self.ejection_threshold = ejection.min(100);
        self.dq_threshold = dq.min(100);
        self
    }

    /// Set the heel interference chance (clamped to 0.0-1.0).
    pub fn with_heel_interference_chance(mut self, chance: f64) -> Self {
        self.heel_interference_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Set the default referee awareness (clamped to 0-100).
    pub fn with_default_referee_awareness(mut self, awareness: u8) -> Self {
        self.default_referee_awareness = awareness.min(100);
        self
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct ConfigFile {
    seed: u64,
    member_decay: f64,
    power_variance: f64,
    min_duration: u32,
    max_duration: u32,
    ejection_threshold: u8,
    dq_threshold: u8,
    max_affinity_reduction: f64,
    heel_interference_chance: f64,
    default_referee_awareness: u8,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let d = EngineConfig::default();
        Self {
            seed: d.seed,
            member_decay: d.member_decay,
            power_variance: d.power_variance,
            min_duration: d.min_duration,
            max_duration: d.max_duration,
            ejection_threshold: d.ejection_threshold,
            dq_threshold: d.dq_threshold,
            max_affinity_reduction: d.max_affinity_reduction,
            heel_interference_chance: d.heel_interference_chance,
            default_referee_awareness: d.default_referee_awareness,
        }
    }
}

impl TryFrom<ConfigFile> for EngineConfig {
    type Error = BookerError;

    fn try_from(f: ConfigFile) -> BookerResult<Self> {
        let config = Self {
            seed: f.seed,
            member_decay: f.member_decay,
            power_variance: f.power_variance,
            min_duration: f.min_duration,
            max_duration: f.max_duration,
            ejection_threshold: f.ejection_threshold,
            dq_threshold: f.dq_threshold,
            max_affinity_reduction: f.max_affinity_reduction,
            heel_interference_chance: f.heel_interference_chance,
            default_referee_awareness: f.default_referee_awareness,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.min_duration, 5);
        assert_eq!(cfg.max_duration, 25);
        assert_eq!(cfg.ejection_threshold, 80);
        assert_eq!(cfg.dq_threshold, 100);
    }

    #[test]
    fn builder_methods() {
        let cfg = EngineConfig::default()
            .with_seed(7)
            .with_member_decay(0.5)
            .with_power_variance(0.2)
            .with_heel_interference_chance(0.9);
        assert_eq!(cfg.seed, 7);
        assert!((cfg.member_decay - 0.5).abs() < f64::EPSILON);
        assert!((cfg.power_variance - 0.2).abs() < f64::EPSILON);
        assert!((cfg.heel_interference_chance - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn values_clamped() {
        let cfg = EngineConfig::default()
            .with_member_decay(3.0)
            .with_power_variance(-1.0)
            .with_thresholds(200, 250)
            .with_duration_range(30, 10);
        assert!((cfg.member_decay - 1.0).abs() < f64::EPSILON);
        assert_eq!(cfg.power_variance, 0.0);
        assert_eq!(cfg.ejection_threshold, 100);
        assert_eq!(cfg.dq_threshold, 100);
        assert_eq!((cfg.min_duration, cfg.max_duration), (10, 30));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"seed": 9}"#).unwrap();
        assert_eq!(cfg.seed, 9);
        assert_eq!(cfg.ejection_threshold, 80);
    }

    #[test]
    fn inverted_duration_rejected() {
        let err =
            EngineConfig::from_json(r#"{"min_duration": 40, "max_duration": 10}"#).unwrap_err();
        assert!(matches!(err, BookerError::InvalidConfig(_)));
        assert!(serde_json::from_str::<EngineConfig>(r#"{"power_variance": -0.2}"#).is_err());
        assert!(EngineConfig::from_json(r#"{"heel_interference_chance": 2.0}"#).is_err());
    }

    #[test]
    fn builders_produce_valid_configs() {
        let cfg = EngineConfig::default()
            .with_duration_range(30, 10)
            .with_power_variance(9.0)
            .with_member_decay(-1.0);
        assert!(cfg.validate().is_ok());
        assert!(EngineConfig::default().validate().is_ok());
    }
}
