//! Property tests: heart invariants hold under arbitrary operation sequences.

use chrono::{DateTime, Duration, Utc};
use lingofocus_core::{
    ChallengeCategory, HeartEconomy, ManualClock, MemoryStore, SubscriptionTier, TierTable,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Consume(usize, bool),
    Answer(usize, bool),
    Advance(i64),
    Tick,
    Refill,
    Reset,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..6usize, any::<bool>()).prop_map(|(c, s)| Op::Consume(c, s)),
        (0..6usize, any::<bool>()).prop_map(|(c, ok)| Op::Answer(c, ok)),
        (0..600i64).prop_map(Op::Advance),
        Just(Op::Tick),
        Just(Op::Refill),
        Just(Op::Reset),
    ]
}

fn tier_strategy() -> impl Strategy<Value = SubscriptionTier> {
    prop_oneof![
        Just(SubscriptionTier::Free),
        Just(SubscriptionTier::FluencyBuilder),
    ]
}

fn start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-09-01T06:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

proptest! {
    #[test]
    fn hearts_stay_in_bounds_and_countdown_tracks_fullness(
        tier in tier_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..80),
    ) {
        let clock = ManualClock::new(start());
        let mut economy = HeartEconomy::init(tier, TierTable::default(), clock.clone(), MemoryStore::new());
        let mut last_refill: Vec<_> = ChallengeCategory::ALL
            .iter()
            .map(|&c| economy.get_hearts_for_type(c).unwrap().last_refill_time)
            .collect();

        for op in ops {
            match op {
                Op::Consume(i, shield) => {
                    economy.consume_heart(ChallengeCategory::ALL[i], shield);
                }
                Op::Answer(i, correct) => {
                    economy.record_answer(ChallengeCategory::ALL[i], correct);
                }
                Op::Advance(minutes) => clock.advance(Duration::minutes(minutes)),
                Op::Tick => {
                    economy.tick();
                }
                Op::Refill => {
                    economy.check_and_refill_hearts();
                }
                Op::Reset => {
                    economy.check_daily_reset();
                }
            }

            for (i, &category) in ChallengeCategory::ALL.iter().enumerate() {
                let heart = economy.get_hearts_for_type(category).unwrap();
                prop_assert!(heart.current <= heart.max);
                prop_assert_eq!(heart.next_refill_time.is_none(), heart.current == heart.max);
                prop_assert!(heart.last_refill_time >= last_refill[i]);
                last_refill[i] = heart.last_refill_time;
            }
        }
    }

    #[test]
    fn second_refill_check_is_a_no_op(
        spent in 1u32..=5,
        minutes in 0i64..1_000,
    ) {
        let clock = ManualClock::new(start());
        let mut economy = HeartEconomy::init(
            SubscriptionTier::Free,
            TierTable::default(),
            clock.clone(),
            MemoryStore::new(),
        );
        for _ in 0..spent {
            economy.consume_heart(ChallengeCategory::Quiz, false);
        }
        clock.advance(Duration::minutes(minutes));
        economy.check_and_refill_hearts();
        let after_first = economy.state().clone();
        prop_assert!(!economy.check_and_refill_hearts());
        prop_assert_eq!(economy.state(), &after_first);
    }
}
