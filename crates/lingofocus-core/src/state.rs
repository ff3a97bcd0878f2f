//! Persisted heart state.
//!
//! [`FocusState`] is the unit that is saved and hydrated as a whole.
//! Timestamps are stored as epoch milliseconds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::ChallengeCategory;
use crate::tier::SubscriptionTier;

/// Heart pool of one category.
///
/// Invariants: `current <= max` (except after a tier downgrade, see
/// [`HeartEconomy::update_subscription_tier`](crate::HeartEconomy::update_subscription_tier)),
/// and `next_refill_time` is `None` exactly when the pool is full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartState {
    pub current: u32,
    /// Mirrors the tier's `max_hearts` at the last update
    pub max: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_refill_time: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub next_refill_time: Option<DateTime<Utc>>,
}

impl HeartState {
    pub fn full(max: u32, now: DateTime<Utc>) -> Self {
        Self {
            current: max,
            max,
            last_refill_time: now,
            next_refill_time: None,
        }
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    /// Hearts still missing before the pool is full.
    pub fn missing(&self) -> u32 {
        self.max.saturating_sub(self.current)
    }
}

/// Aggregate of every category pool plus reset bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusState {
    pub hearts: BTreeMap<ChallengeCategory, HeartState>,
    /// Instant of the last daily reset; compared by local calendar day
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_daily_reset: DateTime<Utc>,
    pub subscription_tier: SubscriptionTier,
}

impl FocusState {
    /// Fresh state with every category full.
    pub fn new(tier: SubscriptionTier, max_hearts: u32, now: DateTime<Utc>) -> Self {
        let hearts = ChallengeCategory::ALL
            .into_iter()
            .map(|c| (c, HeartState::full(max_hearts, now)))
            .collect();
        Self {
            hearts,
            last_daily_reset: now,
            subscription_tier: tier,
        }
    }

    pub fn heart(&self, category: ChallengeCategory) -> Option<&HeartState> {
        self.hearts.get(&category)
    }

    pub fn heart_mut(&mut self, category: ChallengeCategory) -> Option<&mut HeartState> {
        self.hearts.get_mut(&category)
    }

    /// Seed any category absent from a stored state with a full pool.
    ///
    /// Returns `true` if a category was added.
    pub fn fill_missing(&mut self, max_hearts: u32, now: DateTime<Utc>) -> bool {
        let mut added = false;
        for category in ChallengeCategory::ALL {
            self.hearts.entry(category).or_insert_with(|| {
                added = true;
                HeartState::full(max_hearts, now)
            });
        }
        added
    }
}
