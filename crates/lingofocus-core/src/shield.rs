//! Streak shield: consecutive correct answers earn one free miss.
//!
//! The shield is session-scoped. It is rebuilt whenever a
//! [`HeartEconomy`](crate::HeartEconomy) is initialized and is never persisted.

use serde::{Deserialize, Serialize};

/// Correct answers needed to activate the shield by default.
pub const DEFAULT_REQUIRED_STREAK: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakShield {
    is_active: bool,
    correct_answers_streak: u32,
    required_streak: u32,
}

impl StreakShield {
    /// `required_streak` of zero is treated as one.
    pub fn new(required_streak: u32) -> Self {
        Self {
            is_active: false,
            correct_answers_streak: 0,
            required_streak: required_streak.max(1),
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn correct_answers_streak(&self) -> u32 {
        self.correct_answers_streak
    }

    pub fn required_streak(&self) -> u32 {
        self.required_streak
    }

    /// Record a correct answer.
    ///
    /// Returns `true` only on the call that activates the shield.
    pub fn increment_streak(&mut self) -> bool {
        self.correct_answers_streak = self.correct_answers_streak.saturating_add(1);
        if !self.is_active && self.correct_answers_streak >= self.required_streak {
            self.is_active = true;
            return true;
        }
        false
    }

    /// Record an unshielded wrong answer.
    pub fn reset_streak(&mut self) {
        self.correct_answers_streak = 0;
        self.is_active = false;
    }

    /// Spend the shield. Returns `false` and changes nothing when inactive.
    pub fn consume_shield(&mut self) -> bool {
        if !self.is_active {
            return false;
        }
        self.is_active = false;
        self.correct_answers_streak = 0;
        true
    }
}

impl Default for StreakShield {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIRED_STREAK)
    }
}
