//! Subscription tiers and their heart limits.
//!
//! The tier decides capacity, refill speed and whether the heart system is
//! bypassed entirely.
//!
//! | Tier | Hearts | Refill | Daily reset | Gradual refill |
//! |------|--------|--------|-------------|----------------|
//! | Free | 5 | 60 min | Yes | Yes |
//! | Fluency Builder | 10 | 30 min | Yes | Yes |
//! | Language Mastery | Unlimited | - | - | - |

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, ValidationError};

/// Sentinel `max_hearts` value for tiers with unlimited hearts.
pub const UNLIMITED_HEARTS: u32 = u32::MAX;

/// Largest capacity accepted for a capped tier.
pub const MAX_CAPPED_HEARTS: u32 = 10_000;

/// Longest refill interval accepted for a capped tier (30 days).
pub const MAX_REFILL_INTERVAL_MS: u64 = 30 * 24 * 60 * 60 * 1000;

/// The user's subscription level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[default]
    Free,
    FluencyBuilder,
    LanguageMastery,
}

impl SubscriptionTier {
    pub const ALL: [SubscriptionTier; 3] = [
        SubscriptionTier::Free,
        SubscriptionTier::FluencyBuilder,
        SubscriptionTier::LanguageMastery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::FluencyBuilder => "fluency_builder",
            SubscriptionTier::LanguageMastery => "language_mastery",
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        SubscriptionTier::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownTier(s.to_string()))
    }
}

/// Per-tier heart constants.
///
/// When `unlimited_hearts` is set, the refill and reset flags are never
/// evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Capacity of every category pool ([`UNLIMITED_HEARTS`] when unlimited)
    pub max_hearts: u32,
    /// Time to regenerate one heart (milliseconds)
    pub refill_interval_ms: u64,
    pub daily_reset_enabled: bool,
    pub gradual_refill_enabled: bool,
    pub unlimited_hearts: bool,
}

impl TierConfig {
    /// A capped tier with gradual refill and daily reset.
    pub fn limited(max_hearts: u32, refill_interval: Duration) -> Self {
        Self {
            max_hearts,
            refill_interval_ms: refill_interval.num_milliseconds().max(0) as u64,
            daily_reset_enabled: true,
            gradual_refill_enabled: true,
            unlimited_hearts: false,
        }
    }

    /// A tier that bypasses the heart system.
    pub fn unlimited() -> Self {
        Self {
            max_hearts: UNLIMITED_HEARTS,
            refill_interval_ms: 0,
            daily_reset_enabled: false,
            gradual_refill_enabled: false,
            unlimited_hearts: true,
        }
    }

    pub fn refill_interval(&self) -> Duration {
        Duration::milliseconds(self.refill_interval_ms.min(i64::MAX as u64) as i64)
    }

    /// Refill runs only for capped tiers with a positive interval.
    pub fn refills_gradually(&self) -> bool {
        !self.unlimited_hearts && self.gradual_refill_enabled && self.refill_interval_ms > 0
    }

    pub fn resets_daily(&self) -> bool {
        !self.unlimited_hearts && self.daily_reset_enabled
    }
}

/// Resolves a tier identifier to its fixed constants.
pub trait TierResolver: Send + Sync {
    fn resolve(&self, tier: SubscriptionTier) -> TierConfig;
}

/// Tier table, loaded from the `[tiers]` section of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTable {
    #[serde(default = "default_free")]
    pub free: TierConfig,
    #[serde(default = "default_fluency_builder")]
    pub fluency_builder: TierConfig,
    #[serde(default = "default_language_mastery")]
    pub language_mastery: TierConfig,
}

fn default_free() -> TierConfig {
    TierConfig::limited(5, Duration::minutes(60))
}
fn default_fluency_builder() -> TierConfig {
    TierConfig::limited(10, Duration::minutes(30))
}
fn default_language_mastery() -> TierConfig {
    TierConfig::unlimited()
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            free: default_free(),
            fluency_builder: default_fluency_builder(),
            language_mastery: default_language_mastery(),
        }
    }
}

impl TierTable {
    pub fn get(&self, tier: SubscriptionTier) -> &TierConfig {
        match tier {
            SubscriptionTier::Free => &self.free,
            SubscriptionTier::FluencyBuilder => &self.fluency_builder,
            SubscriptionTier::LanguageMastery => &self.language_mastery,
        }
    }

    pub fn get_mut(&mut self, tier: SubscriptionTier) -> &mut TierConfig {
        match tier {
            SubscriptionTier::Free => &mut self.free,
            SubscriptionTier::FluencyBuilder => &mut self.fluency_builder,
            SubscriptionTier::LanguageMastery => &mut self.language_mastery,
        }
    }

    /// Reject capped tiers that could never refill or whose limits are out
    /// of range.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for a capped tier with gradual
    /// refill enabled and a zero interval, an interval above
    /// [`MAX_REFILL_INTERVAL_MS`], or more than [`MAX_CAPPED_HEARTS`] hearts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for tier in SubscriptionTier::ALL {
            let cfg = self.get(tier);
            if cfg.unlimited_hearts {
                continue;
            }
            let invalid = |field: &str, message: String| ConfigError::InvalidValue {
                key: format!("tiers.{tier}.{field}"),
                message,
            };
            if cfg.gradual_refill_enabled && cfg.refill_interval_ms == 0 {
                return Err(invalid(
                    "refill_interval_ms",
                    "must be greater than zero when gradual refill is enabled".into(),
                ));
            }
            if cfg.refill_interval_ms > MAX_REFILL_INTERVAL_MS {
                return Err(invalid(
                    "refill_interval_ms",
                    format!("must be at most {MAX_REFILL_INTERVAL_MS}"),
                ));
            }
            if cfg.max_hearts > MAX_CAPPED_HEARTS {
                return Err(invalid("max_hearts", format!("must be at most {MAX_CAPPED_HEARTS}")));
            }
        }
        Ok(())
    }
}

impl TierResolver for TierTable {
    fn resolve(&self, tier: SubscriptionTier) -> TierConfig {
        self.get(tier).clone()
    }
}

/// A remaining-heart count that may be unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum HeartCount {
    Limited(u32),
    Unlimited,
}

impl fmt::Display for HeartCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeartCount::Limited(n) => write!(f, "{n}"),
            HeartCount::Unlimited => f.write_str("unlimited"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_product_limits() {
        let table = TierTable::default();
        assert_eq!(table.free.max_hearts, 5);
        assert_eq!(table.free.refill_interval(), Duration::hours(1));
        assert_eq!(table.fluency_builder.max_hearts, 10);
        assert_eq!(table.fluency_builder.refill_interval(), Duration::minutes(30));
        assert!(table.language_mastery.unlimited_hearts);
        assert_eq!(table.language_mastery.max_hearts, UNLIMITED_HEARTS);
    }

    #[test]
    fn unlimited_tier_never_refills_or_resets() {
        let mut cfg = TierConfig::unlimited();
        cfg.gradual_refill_enabled = true;
        cfg.daily_reset_enabled = true;
        cfg.refill_interval_ms = 1_000;
        assert!(!cfg.refills_gradually());
        assert!(!cfg.resets_daily());
    }

    #[test]
    fn validate_rejects_zero_interval_on_capped_tier() {
        let mut table = TierTable::default();
        table.free.refill_interval_ms = 0;
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("tiers.free.refill_interval_ms"));
    }

    #[test]
    fn validate_bounds_capped_limits() {
        let mut table = TierTable::default();
        table.free.refill_interval_ms = 9_000_000_000_000_000_000;
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("tiers.free.refill_interval_ms"));

        let mut table = TierTable::default();
        table.fluency_builder.max_hearts = u32::MAX - 1;
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("tiers.fluency_builder.max_hearts"));

        let mut table = TierTable::default();
        table.free.max_hearts = MAX_CAPPED_HEARTS;
        table.free.refill_interval_ms = MAX_REFILL_INTERVAL_MS;
        assert!(table.validate().is_ok());
    }

    #[test]
    fn tier_parses_from_str() {
        assert_eq!("fluency-builder".parse(), Ok(SubscriptionTier::FluencyBuilder));
        assert_eq!("LANGUAGE_MASTERY".parse(), Ok(SubscriptionTier::LanguageMastery));
        assert!("premium".parse::<SubscriptionTier>().is_err());
    }

    #[test]
    fn resolver_returns_table_entry() {
        let mut table = TierTable::default();
        table.free.max_hearts = 3;
        assert_eq!(table.resolve(SubscriptionTier::Free).max_hearts, 3);
    }
}
