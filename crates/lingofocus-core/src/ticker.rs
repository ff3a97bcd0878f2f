//! Periodic refill and daily-reset driver.
//!
//! The economy has no thread of its own. A host that runs on a tokio
//! runtime wraps it in a [`SharedEconomy`] and spawns a ticker; every
//! mutation, whether from the ticker or the UI, goes through the same
//! mutex.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::clock::Clock;
use crate::economy::HeartEconomy;
use crate::storage::Store;

/// Economy guarded for use from several tasks.
pub type SharedEconomy<C, S> = Arc<Mutex<HeartEconomy<C, S>>>;

impl<C: Clock, S: Store> HeartEconomy<C, S> {
    pub fn into_shared(self) -> SharedEconomy<C, S> {
        Arc::new(Mutex::new(self))
    }
}

/// Running ticker. Dropping the handle stops it as well.
pub struct TickerHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<u64>>,
}

impl TickerHandle {
    /// Stop the ticker and wait for it to exit.
    ///
    /// Returns the number of ticks that changed state.
    pub async fn shutdown(mut self) -> u64 {
        let _ = self.shutdown.send(true);
        match self.task.take() {
            Some(task) => task.await.unwrap_or(0),
            None => 0,
        }
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Run [`HeartEconomy::tick`] now and then every `period`.
///
/// The first tick fires immediately, which is the eager check on startup.
/// Must be called from within a tokio runtime.
pub fn spawn_ticker<C, S>(economy: SharedEconomy<C, S>, period: Duration) -> TickerHandle
where
    C: Clock + 'static,
    S: Store + 'static,
{
    let (shutdown, mut stop) = watch::channel(false);
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut changed_ticks = 0u64;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if economy.lock().await.tick() {
                        changed_ticks += 1;
                        debug!(changed_ticks, "ticker applied refill or reset");
                    }
                }
                result = stop.changed() => {
                    if result.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }
        changed_ticks
    });

    TickerHandle {
        shutdown,
        task: Some(task),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::ChallengeCategory;
    use crate::clock::ManualClock;
    use crate::events::FocusEvent;
    use crate::storage::MemoryStore;
    use crate::tier::{SubscriptionTier, TierTable};
    use chrono::{DateTime, Utc};

    fn economy_at(at: &str) -> (SharedEconomy<ManualClock, MemoryStore>, ManualClock) {
        let now = DateTime::parse_from_rfc3339(at).unwrap().with_timezone(&Utc);
        let clock = ManualClock::new(now);
        let mut economy =
            HeartEconomy::init(SubscriptionTier::Free, TierTable::default(), clock.clone(), MemoryStore::new());
        economy.consume_heart(ChallengeCategory::Quiz, false);
        economy.consume_heart(ChallengeCategory::Quiz, false);
        economy.drain_events();
        (economy.into_shared(), clock)
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_refills_as_time_passes() {
        let (shared, clock) = economy_at("2025-06-01T09:00:00Z");
        let ticker = spawn_ticker(shared.clone(), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(
            shared.lock().await.get_hearts_for_type(ChallengeCategory::Quiz).unwrap().current,
            3
        );

        clock.advance(chrono::Duration::hours(1));
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(
            shared.lock().await.get_hearts_for_type(ChallengeCategory::Quiz).unwrap().current,
            4
        );

        assert_eq!(ticker.shutdown().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_further_ticks() {
        let (shared, clock) = economy_at("2025-06-01T09:00:00Z");
        let ticker = spawn_ticker(shared.clone(), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(1)).await;
        ticker.shutdown().await;

        clock.advance(chrono::Duration::hours(3));
        tokio::time::sleep(Duration::from_secs(600)).await;
        let mut economy = shared.lock().await;
        assert_eq!(economy.get_hearts_for_type(ChallengeCategory::Quiz).unwrap().current, 3);
        assert!(!economy
            .drain_events()
            .iter()
            .any(|e| matches!(e, FocusEvent::HeartsRefilled { .. })));
    }
}
