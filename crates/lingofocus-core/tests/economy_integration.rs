//! Integration tests for the heart economy across stores and restarts.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use lingofocus_core::{
    ChallengeCategory, FocusEvent, FocusState, HeartCount, HeartEconomy, JsonFileStore, ManualClock,
    MemoryStore, SqliteStore, StreakShield, SubscriptionTier, TierConfig, TierTable,
};

fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

#[test]
fn test_fresh_install_quiz_depletion_leaves_other_pools() {
    let clock = ManualClock::new(utc("2025-09-01T08:00:00Z"));
    let mut economy =
        HeartEconomy::init(SubscriptionTier::Free, TierTable::default(), clock, MemoryStore::new());

    let mut remaining = Vec::new();
    for _ in 0..5 {
        let result = economy.consume_heart(ChallengeCategory::Quiz, false);
        assert!(result.success);
        remaining.push(result.remaining);
    }
    assert_eq!(
        remaining,
        (0..5).rev().map(HeartCount::Limited).collect::<Vec<_>>()
    );

    let sixth = economy.consume_heart(ChallengeCategory::Quiz, false);
    assert!(!sixth.success);
    assert!(sixth.out_of_hearts);
    assert_eq!(
        economy.get_hearts_for_type(ChallengeCategory::Flashcard).unwrap().current,
        5
    );
    assert!(!economy.has_hearts_available(ChallengeCategory::Quiz));
    assert!(economy.has_hearts_available(ChallengeCategory::Flashcard));
}

#[test]
fn test_refill_two_and_a_half_hours_credits_two() {
    let start = utc("2025-09-01T08:00:00Z");
    let mut state = FocusState::new(SubscriptionTier::Free, 5, start);
    let quiz = state.heart_mut(ChallengeCategory::Quiz).unwrap();
    quiz.current = 2;
    quiz.next_refill_time = Some(start + Duration::hours(1));

    let store = MemoryStore::with_state(&state).unwrap();
    let clock = ManualClock::new(start + Duration::minutes(150));
    let mut economy = HeartEconomy::init(SubscriptionTier::Free, TierTable::default(), clock, store);

    // Hydration alone does not catch up.
    assert_eq!(economy.get_hearts_for_type(ChallengeCategory::Quiz).unwrap().current, 2);

    assert!(economy.check_and_refill_hearts());
    let quiz = economy.get_hearts_for_type(ChallengeCategory::Quiz).unwrap();
    assert_eq!(quiz.current, 4);
    assert_eq!(quiz.last_refill_time, start + Duration::minutes(150));
}

#[test]
fn test_depleted_category_stays_blocked_without_refill_or_reset() {
    let mut table = TierTable::default();
    table.free.gradual_refill_enabled = false;
    table.free.daily_reset_enabled = false;
    let clock = ManualClock::new(utc("2025-09-01T08:00:00Z"));
    let mut economy = HeartEconomy::init(SubscriptionTier::Free, table, clock.clone(), MemoryStore::new());

    for _ in 0..5 {
        economy.consume_heart(ChallengeCategory::ErrorSpotting, false);
    }
    clock.advance(Duration::days(30));
    economy.tick();
    assert!(!economy.consume_heart(ChallengeCategory::ErrorSpotting, false).success);
}

#[test]
fn test_state_survives_restart_with_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("lingofocus.db");
    let clock = ManualClock::new(utc("2025-09-01T08:00:00Z"));

    {
        let store = SqliteStore::open(&db_path).unwrap();
        let mut economy =
            HeartEconomy::init(SubscriptionTier::Free, TierTable::default(), clock.clone(), store);
        economy.consume_heart(ChallengeCategory::Listening, false);
        economy.consume_heart(ChallengeCategory::Listening, false);
    }

    clock.advance(Duration::hours(1));
    let store = SqliteStore::open(&db_path).unwrap();
    let mut economy = HeartEconomy::init(SubscriptionTier::Free, TierTable::default(), clock, store);
    let listening = economy.get_hearts_for_type(ChallengeCategory::Listening).unwrap();
    assert_eq!(listening.current, 3);
    assert_eq!(listening.next_refill_time, Some(utc("2025-09-01T09:00:00Z")));

    economy.tick();
    assert_eq!(economy.get_hearts_for_type(ChallengeCategory::Listening).unwrap().current, 4);
}

#[test]
fn test_state_survives_restart_with_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("focus.json"));
    let clock = ManualClock::new(utc("2025-09-01T08:00:00Z"));

    let mut economy =
        HeartEconomy::init(SubscriptionTier::FluencyBuilder, TierTable::default(), clock.clone(), store.clone());
    economy.consume_heart(ChallengeCategory::SentenceBuilder, false);
    drop(economy);

    let economy = HeartEconomy::init(SubscriptionTier::FluencyBuilder, TierTable::default(), clock, store);
    let heart = economy.get_hearts_for_type(ChallengeCategory::SentenceBuilder).unwrap();
    assert_eq!((heart.current, heart.max), (9, 10));
}

#[test]
fn test_daily_reset_uses_local_calendar_day() {
    // 23:59 local in UTC+9 is 14:59 UTC.
    let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
    let clock = ManualClock::with_offset(utc("2025-09-01T14:59:00Z"), tokyo);
    let mut economy =
        HeartEconomy::init(SubscriptionTier::Free, TierTable::default(), clock.clone(), MemoryStore::new());
    economy.consume_heart(ChallengeCategory::Quiz, false);

    clock.advance(Duration::minutes(2));
    assert!(economy.check_daily_reset());
    assert_eq!(economy.get_hearts_for_type(ChallengeCategory::Quiz).unwrap().current, 5);

    // Still the same Tokyo day, even though it is a new UTC day later on.
    economy.consume_heart(ChallengeCategory::Quiz, false);
    clock.set(utc("2025-09-02T12:00:00Z"));
    assert!(!economy.check_daily_reset());
}

#[test]
fn test_offline_across_midnight_resets_on_next_tick() {
    let clock = ManualClock::new(utc("2025-09-01T18:00:00Z"));
    let mut economy =
        HeartEconomy::init(SubscriptionTier::Free, TierTable::default(), clock.clone(), MemoryStore::new());
    for category in ChallengeCategory::ALL {
        for _ in 0..5 {
            economy.consume_heart(category, false);
        }
    }
    assert!(economy.get_out_of_hearts_data(ChallengeCategory::Quiz).is_completely_blocked);

    clock.set(utc("2025-09-03T07:30:00Z"));
    assert!(economy.tick());
    for category in ChallengeCategory::ALL {
        assert_eq!(economy.get_hearts_for_type(category).unwrap().current, 5);
    }
}

#[test]
fn test_session_with_custom_shield_requirement() {
    let clock = ManualClock::new(utc("2025-09-01T08:00:00Z"));
    let mut economy =
        HeartEconomy::init(SubscriptionTier::Free, TierTable::default(), clock, MemoryStore::new())
            .with_shield(StreakShield::new(2));

    economy.record_answer(ChallengeCategory::FillInBlank, true);
    economy.record_answer(ChallengeCategory::FillInBlank, true);
    economy.record_answer(ChallengeCategory::FillInBlank, false);

    assert_eq!(economy.get_hearts_for_type(ChallengeCategory::FillInBlank).unwrap().current, 5);
    let events = economy.drain_events();
    assert!(events.iter().any(|e| matches!(e, FocusEvent::ShieldActivated { streak: 2, .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        FocusEvent::ShieldUsed { category: ChallengeCategory::FillInBlank, .. }
    )));
}

#[test]
fn test_custom_tier_table_drives_limits() {
    let mut table = TierTable::default();
    *table.get_mut(SubscriptionTier::Free) = TierConfig::limited(3, Duration::minutes(10));
    let clock = ManualClock::new(utc("2025-09-01T08:00:00Z"));
    let mut economy = HeartEconomy::init(SubscriptionTier::Free, table, clock.clone(), MemoryStore::new());

    for _ in 0..3 {
        economy.consume_heart(ChallengeCategory::Flashcard, false);
    }
    clock.advance(Duration::minutes(25));
    economy.check_and_refill_hearts();
    assert_eq!(economy.get_hearts_for_type(ChallengeCategory::Flashcard).unwrap().current, 2);
}
