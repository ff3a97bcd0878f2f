use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::ChallengeCategory;
use crate::tier::SubscriptionTier;

/// Every state change in the heart economy produces an Event.
/// The UI polls for them with [`HeartEconomy::drain_events`](crate::HeartEconomy::drain_events).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FocusEvent {
    /// No stored state was found; every category starts full.
    StateCreated {
        tier: SubscriptionTier,
        max_hearts: u32,
        at: DateTime<Utc>,
    },
    HeartConsumed {
        category: ChallengeCategory,
        remaining: u32,
        next_refill_time: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
    /// The category just spent its last heart.
    HeartsDepleted {
        category: ChallengeCategory,
        at: DateTime<Utc>,
    },
    ShieldActivated {
        streak: u32,
        at: DateTime<Utc>,
    },
    /// A wrong answer was absorbed by the shield instead of a heart.
    ShieldUsed {
        category: ChallengeCategory,
        at: DateTime<Utc>,
    },
    StreakReset {
        previous_streak: u32,
        at: DateTime<Utc>,
    },
    HeartsRefilled {
        refills: Vec<CategoryRefill>,
        at: DateTime<Utc>,
    },
    DailyReset {
        at: DateTime<Utc>,
    },
    TierChanged {
        from: SubscriptionTier,
        to: SubscriptionTier,
        max_hearts: u32,
        at: DateTime<Utc>,
    },
    /// A state change could not be written; it stays valid in memory.
    PersistFailed {
        message: String,
        at: DateTime<Utc>,
    },
}

/// Hearts credited to one category by a refill check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRefill {
    pub category: ChallengeCategory,
    pub added: u32,
    pub current: u32,
}
