//! Heart economy.
//!
//! The single authority for whether a user may attempt a challenge in a
//! category, and for advancing heart counts forward in time. Like the rest
//! of the core it has no internal thread: the host calls [`HeartEconomy::tick`]
//! periodically (see [`crate::ticker`]) and on app foreground.
//!
//! ## Transitions
//!
//! ```text
//! consume_heart:     current -= 1, countdown restarts at now
//! check_and_refill:  current += floor(elapsed / interval), remainder dropped
//! check_daily_reset: new local calendar day -> every pool full
//! ```
//!
//! Persistence failures never surface as errors. They are logged, recorded
//! as [`FocusEvent::PersistFailed`] and flagged on results; the in-memory
//! state stays authoritative.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::category::ChallengeCategory;
use crate::clock::Clock;
use crate::events::{CategoryRefill, FocusEvent};
use crate::shield::StreakShield;
use crate::state::{FocusState, HeartState};
use crate::storage::Store;
use crate::tier::{HeartCount, SubscriptionTier, TierConfig, TierResolver, UNLIMITED_HEARTS};

/// Events kept for [`HeartEconomy::drain_events`]; the oldest are dropped beyond this.
pub const MAX_PENDING_EVENTS: usize = 256;

/// Outcome of [`HeartEconomy::consume_heart`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumeResult {
    pub success: bool,
    pub remaining: HeartCount,
    /// This call spent the category's last heart
    pub was_last_heart: bool,
    /// The category was already empty; the caller should show the
    /// out-of-hearts screen
    pub out_of_hearts: bool,
    /// The streak shield absorbed the attempt
    pub shield_used: bool,
    /// The change could not be written to the store
    pub persist_failed: bool,
}

impl ConsumeResult {
    fn unlimited() -> Self {
        Self {
            success: true,
            remaining: HeartCount::Unlimited,
            was_last_heart: false,
            out_of_hearts: false,
            shield_used: false,
            persist_failed: false,
        }
    }

    fn shielded(remaining: u32) -> Self {
        Self {
            shield_used: true,
            remaining: HeartCount::Limited(remaining),
            ..Self::unlimited()
        }
    }

    fn depleted() -> Self {
        Self {
            success: false,
            remaining: HeartCount::Limited(0),
            out_of_hearts: true,
            ..Self::unlimited()
        }
    }
}

/// Outcome of [`HeartEconomy::record_answer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnswerOutcome {
    Correct { streak: u32, shield_activated: bool },
    Incorrect(ConsumeResult),
}

/// What the UI needs to render the out-of-hearts screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutOfHeartsData {
    pub category: ChallengeCategory,
    /// Other categories that still have hearts
    pub alternatives: Vec<ChallengeCategory>,
    pub next_refill_time: Option<DateTime<Utc>>,
    /// When gradual refill alone would make the pool full again
    pub all_hearts_refill_time: Option<DateTime<Utc>>,
    /// Next local midnight, when daily reset is enabled
    pub next_daily_reset: Option<DateTime<Utc>>,
    /// Neither this category nor any alternative can be played
    pub is_completely_blocked: bool,
}

/// One category row of a [`EconomySnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStatus {
    pub category: ChallengeCategory,
    pub current: HeartCount,
    pub max: HeartCount,
    pub next_refill_time: Option<DateTime<Utc>>,
}

/// Read-only view of the whole economy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomySnapshot {
    pub tier: SubscriptionTier,
    pub categories: Vec<CategoryStatus>,
    pub shield: StreakShield,
    pub last_daily_reset: DateTime<Utc>,
    pub at: DateTime<Utc>,
}

/// Per-category heart pools, refill scheduling, daily reset and the
/// streak shield.
pub struct HeartEconomy<C: Clock, S: Store> {
    state: FocusState,
    config: TierConfig,
    resolver: Box<dyn TierResolver>,
    clock: C,
    store: S,
    shield: StreakShield,
    events: VecDeque<FocusEvent>,
}

impl<C: Clock, S: Store> HeartEconomy<C, S> {
    /// Hydrate from `store`, or create and persist a full state if nothing
    /// is stored.
    ///
    /// No refill catch-up happens here; call [`tick`](Self::tick) once the
    /// economy is in place. If the stored tier (or its limits) differ from
    /// `tier`, the new tier is applied as by
    /// [`update_subscription_tier`](Self::update_subscription_tier).
    pub fn init(
        tier: SubscriptionTier,
        resolver: impl TierResolver + 'static,
        clock: C,
        store: S,
    ) -> Self {
        let config = resolver.resolve(tier);
        let now = clock.now();

        let (state, created) = match store.load() {
            Ok(Some(state)) => (state, false),
            Ok(None) => (FocusState::new(tier, config.max_hearts, now), true),
            Err(e) => {
                // Keep running on a fresh state; the next mutation overwrites the store.
                warn!(error = %e, "failed to load focus state, starting fresh");
                (FocusState::new(tier, config.max_hearts, now), false)
            }
        };

        let mut economy = Self {
            state,
            config,
            resolver: Box::new(resolver),
            clock,
            store,
            shield: StreakShield::default(),
            events: VecDeque::new(),
        };

        if created {
            info!(tier = %tier, max_hearts = economy.config.max_hearts, "created focus state");
            economy.record(FocusEvent::StateCreated {
                tier,
                max_hearts: economy.config.max_hearts,
                at: now,
            });
            economy.persist();
            return economy;
        }

        let previous = economy.state.subscription_tier;
        let previous_config = economy.resolver.resolve(previous);
        let mut dirty = economy.state.fill_missing(economy.config.max_hearts, now);
        let limits_differ = economy
            .state
            .hearts
            .values()
            .any(|h| h.max != economy.config.max_hearts);
        if previous != tier || limits_differ {
            economy.apply_tier(tier, &previous_config);
            dirty = true;
        }
        if dirty {
            economy.persist();
        }
        economy
    }

    /// Replace the session's streak shield (e.g. a different requirement).
    pub fn with_shield(mut self, shield: StreakShield) -> Self {
        self.shield = shield;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn tier(&self) -> SubscriptionTier {
        self.state.subscription_tier
    }

    pub fn config(&self) -> &TierConfig {
        &self.config
    }

    pub fn state(&self) -> &FocusState {
        &self.state
    }

    pub fn shield(&self) -> &StreakShield {
        &self.shield
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn get_hearts_for_type(&self, category: ChallengeCategory) -> Option<&HeartState> {
        self.state.heart(category)
    }

    pub fn has_hearts_available(&self, category: ChallengeCategory) -> bool {
        self.config.unlimited_hearts
            || self.state.heart(category).is_some_and(|h| !h.is_empty())
    }

    /// Every other category that still holds hearts.
    pub fn get_alternative_challenges(&self, excluding: ChallengeCategory) -> Vec<ChallengeCategory> {
        ChallengeCategory::ALL
            .into_iter()
            .filter(|&c| c != excluding && self.has_hearts_available(c))
            .collect()
    }

    pub fn get_out_of_hearts_data(&self, category: ChallengeCategory) -> OutOfHeartsData {
        let now = self.clock.now();
        let alternatives = self.get_alternative_challenges(category);
        let heart = self.state.heart(category);
        let next_refill_time = heart.and_then(|h| h.next_refill_time);

        let all_hearts_refill_time = match heart {
            Some(h) if self.config.refills_gradually() && !h.is_full() => {
                let interval = self.config.refill_interval();
                let remaining = i32::try_from(h.missing().saturating_sub(1))
                    .ok()
                    .and_then(|n| interval.checked_mul(n));
                h.next_refill_time
                    .or_else(|| now.checked_add_signed(interval))
                    .zip(remaining)
                    .and_then(|(next, rest)| next.checked_add_signed(rest))
            }
            _ => None,
        };
        let next_daily_reset = self
            .config
            .resets_daily()
            .then(|| self.clock.next_local_midnight(now));

        OutOfHeartsData {
            category,
            is_completely_blocked: !self.has_hearts_available(category) && alternatives.is_empty(),
            alternatives,
            next_refill_time,
            all_hearts_refill_time,
            next_daily_reset,
        }
    }

    /// Time left until the category's next heart, zero if overdue.
    pub fn time_until_next_refill(&self, category: ChallengeCategory) -> Option<Duration> {
        let next = self.state.heart(category)?.next_refill_time?;
        Some((next - self.clock.now()).max(Duration::zero()))
    }

    pub fn snapshot(&self) -> EconomySnapshot {
        let count = |n: u32| {
            if self.config.unlimited_hearts {
                HeartCount::Unlimited
            } else {
                HeartCount::Limited(n)
            }
        };
        let categories = self
            .state
            .hearts
            .iter()
            .map(|(&category, h)| CategoryStatus {
                category,
                current: count(h.current),
                max: count(h.max),
                next_refill_time: h.next_refill_time,
            })
            .collect();
        EconomySnapshot {
            tier: self.state.subscription_tier,
            categories,
            shield: self.shield.clone(),
            last_daily_reset: self.state.last_daily_reset,
            at: self.clock.now(),
        }
    }

    /// Take every event produced since the last call.
    ///
    /// At most [`MAX_PENDING_EVENTS`] are buffered between calls.
    pub fn drain_events(&mut self) -> Vec<FocusEvent> {
        self.events.drain(..).collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Spend one heart of `category`.
    ///
    /// With `use_shield` and an active shield, the shield is spent instead
    /// and hearts are untouched. Spending a heart restarts the category's
    /// refill countdown from now.
    pub fn consume_heart(&mut self, category: ChallengeCategory, use_shield: bool) -> ConsumeResult {
        if self.config.unlimited_hearts {
            return ConsumeResult::unlimited();
        }

        let now = self.clock.now();
        let interval = self.config.refill_interval();

        if use_shield && self.shield.consume_shield() {
            let remaining = self.heart_entry(category, now).current;
            debug!(category = %category, remaining, "shield absorbed attempt");
            self.record(FocusEvent::ShieldUsed { category, at: now });
            return ConsumeResult::shielded(remaining);
        }

        let heart = self.heart_entry(category, now);
        if heart.current == 0 {
            debug!(category = %category, "out of hearts");
            return ConsumeResult::depleted();
        }

        heart.current -= 1;
        heart.last_refill_time = heart.last_refill_time.max(now);
        heart.next_refill_time = if heart.is_full() {
            None
        } else {
            heart.last_refill_time.checked_add_signed(interval)
        };
        let remaining = heart.current;
        let next_refill_time = heart.next_refill_time;

        debug!(category = %category, remaining, "heart consumed");
        self.record(FocusEvent::HeartConsumed {
            category,
            remaining,
            next_refill_time,
            at: now,
        });
        if remaining == 0 {
            self.record(FocusEvent::HeartsDepleted { category, at: now });
        }

        let persisted = self.persist();
        ConsumeResult {
            success: true,
            remaining: HeartCount::Limited(remaining),
            was_last_heart: remaining == 0,
            out_of_hearts: false,
            shield_used: false,
            persist_failed: !persisted,
        }
    }

    /// Record an answer in `category`.
    ///
    /// Correct answers build the streak. A wrong answer is absorbed by an
    /// active shield; otherwise it resets the streak and costs a heart.
    pub fn record_answer(&mut self, category: ChallengeCategory, correct: bool) -> AnswerOutcome {
        if correct {
            let shield_activated = self.increment_streak();
            return AnswerOutcome::Correct {
                streak: self.shield.correct_answers_streak(),
                shield_activated,
            };
        }

        let result = self.consume_heart(category, true);
        if !result.shield_used {
            self.reset_streak();
        }
        AnswerOutcome::Incorrect(result)
    }

    /// Returns `true` when this answer activated the shield.
    pub fn increment_streak(&mut self) -> bool {
        let activated = self.shield.increment_streak();
        if activated {
            let now = self.clock.now();
            debug!(streak = self.shield.correct_answers_streak(), "shield activated");
            self.record(FocusEvent::ShieldActivated {
                streak: self.shield.correct_answers_streak(),
                at: now,
            });
        }
        activated
    }

    pub fn reset_streak(&mut self) {
        let previous_streak = self.shield.correct_answers_streak();
        self.shield.reset_streak();
        if previous_streak > 0 {
            self.record(FocusEvent::StreakReset {
                previous_streak,
                at: self.clock.now(),
            });
        }
    }

    /// Spend the shield outside of [`consume_heart`](Self::consume_heart).
    pub fn consume_shield(&mut self) -> bool {
        self.shield.consume_shield()
    }

    /// Credit whole elapsed refill intervals to every non-full category.
    ///
    /// Idempotent: a second call without elapsed time changes nothing.
    /// Returns `true` if any category changed.
    pub fn check_and_refill_hearts(&mut self) -> bool {
        if !self.config.refills_gradually() {
            return false;
        }

        let now = self.clock.now();
        let interval = self.config.refill_interval();
        let interval_ms = interval.num_milliseconds();
        let mut refills = Vec::new();

        for (&category, heart) in self.state.hearts.iter_mut() {
            if heart.current >= heart.max {
                continue;
            }
            // Clock moved backwards: no credit until real time catches up.
            let elapsed_ms = (now - heart.last_refill_time).num_milliseconds().max(0);
            let hearts_to_add = elapsed_ms / interval_ms;
            if hearts_to_add < 1 {
                continue;
            }

            let added = hearts_to_add.min(i64::from(heart.missing())) as u32;
            heart.current += added;
            heart.last_refill_time = now;
            heart.next_refill_time = if heart.is_full() {
                None
            } else {
                now.checked_add_signed(interval)
            };
            refills.push(CategoryRefill {
                category,
                added,
                current: heart.current,
            });
        }

        if refills.is_empty() {
            return false;
        }
        debug!(categories = refills.len(), "hearts refilled");
        self.record(FocusEvent::HeartsRefilled { refills, at: now });
        self.persist();
        true
    }

    /// Refill every pool when the local calendar day has advanced.
    ///
    /// Date-boundary based, never duration based. Returns `true` if a reset
    /// fired.
    pub fn check_daily_reset(&mut self) -> bool {
        if !self.config.resets_daily() {
            return false;
        }

        let now = self.clock.now();
        let last_day = self.clock.local_date(self.state.last_daily_reset);
        if self.clock.local_date(now) <= last_day {
            return false;
        }

        for heart in self.state.hearts.values_mut() {
            heart.current = heart.max;
            heart.next_refill_time = None;
        }
        self.state.last_daily_reset = now;

        info!(previous_day = %last_day, "daily reset");
        self.record(FocusEvent::DailyReset { at: now });
        self.persist();
        true
    }

    /// Run the daily reset check, then the refill check.
    pub fn tick(&mut self) -> bool {
        let reset = self.check_daily_reset();
        let refilled = self.check_and_refill_hearts();
        reset || refilled
    }

    /// Switch tier and update every category's `max`.
    ///
    /// Hearts above a lowered cap are kept until spent. Leaving an
    /// unlimited tier starts every pool full at the new cap.
    pub fn update_subscription_tier(&mut self, tier: SubscriptionTier) {
        let previous_config = self.config.clone();
        self.apply_tier(tier, &previous_config);
        self.persist();
    }

    // ── Internals ────────────────────────────────────────────────────

    fn record(&mut self, event: FocusEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    fn heart_entry(&mut self, category: ChallengeCategory, now: DateTime<Utc>) -> &mut HeartState {
        let max_hearts = self.config.max_hearts;
        self.state
            .hearts
            .entry(category)
            .or_insert_with(|| HeartState::full(max_hearts, now))
    }

    fn apply_tier(&mut self, tier: SubscriptionTier, previous_config: &TierConfig) {
        let from = self.state.subscription_tier;
        let config = self.resolver.resolve(tier);
        let now = self.clock.now();
        let interval = config.refill_interval();

        for heart in self.state.hearts.values_mut() {
            // The stored sentinel marks an unlimited pool even if the tier
            // table no longer says so.
            let was_unlimited = previous_config.unlimited_hearts || heart.max == UNLIMITED_HEARTS;
            let was_full = heart.is_full();
            heart.max = config.max_hearts;
            if was_unlimited {
                heart.current = config.max_hearts;
            }

            if config.unlimited_hearts || heart.is_full() {
                heart.next_refill_time = None;
            } else {
                if was_full || heart.next_refill_time.is_none() {
                    // A pool that just gained room starts its countdown now.
                    heart.last_refill_time = heart.last_refill_time.max(now);
                }
                // Running countdowns follow the new interval.
                heart.next_refill_time = heart.last_refill_time.checked_add_signed(interval);
            }
        }

        self.state.subscription_tier = tier;
        info!(from = %from, to = %tier, max_hearts = config.max_hearts, "subscription tier applied");
        self.record(FocusEvent::TierChanged {
            from,
            to: tier,
            max_hearts: config.max_hearts,
            at: now,
        });
        self.config = config;
    }

    /// Write the state, logging and recording failures. Returns `true` on success.
    fn persist(&mut self) -> bool {
        match self.store.save(&self.state) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to persist focus state");
                self.record(FocusEvent::PersistFailed {
                    message: e.to_string(),
                    at: self.clock.now(),
                });
                false
            }
        }
    }
}
