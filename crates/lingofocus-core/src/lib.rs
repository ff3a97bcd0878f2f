//! # LingoFocus Core Library
//!
//! This library provides the Focus / Hearts system of the LingoFocus
//! language-learning app: a per-category "lives" economy that gates how
//! many attempts a user gets, refills gradually, resets daily and can be
//! shielded by a streak of correct answers.
//!
//! ## Architecture
//!
//! - **Heart Economy**: a wall-clock-based state machine; the caller invokes
//!   `tick()` periodically (or spawns a ticker) to apply refills and resets
//! - **Storage**: pluggable persistence (SQLite, JSON file, memory) and
//!   TOML-based configuration
//! - **Clock**: injectable time source so refill and reset rules can be
//!   tested deterministically
//!
//! ## Key Components
//!
//! - [`HeartEconomy`]: Core heart state machine
//! - [`StreakShield`]: Free miss earned by consecutive correct answers
//! - [`Store`]: Persistence interface for [`FocusState`]
//! - [`Config`]: Application configuration and tier table

pub mod category;
pub mod clock;
pub mod economy;
pub mod error;
pub mod events;
pub mod shield;
pub mod state;
pub mod storage;
pub mod ticker;
pub mod tier;

pub use category::ChallengeCategory;
pub use clock::{Clock, ManualClock, SystemClock};
pub use economy::{
    AnswerOutcome, CategoryStatus, ConsumeResult, EconomySnapshot, HeartEconomy, OutOfHeartsData,
    MAX_PENDING_EVENTS,
};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::{CategoryRefill, FocusEvent};
pub use shield::StreakShield;
pub use state::{FocusState, HeartState};
pub use storage::{Config, JsonFileStore, MemoryStore, SqliteStore, StorageBackend, Store};
pub use ticker::{spawn_ticker, SharedEconomy, TickerHandle};
pub use tier::{
    HeartCount, SubscriptionTier, TierConfig, TierResolver, TierTable,
    MAX_CAPPED_HEARTS, MAX_REFILL_INTERVAL_MS, UNLIMITED_HEARTS,
};
