//! Time sources.
//!
//! Daily resets compare local calendar days, so a clock also knows which
//! timezone the user lives in.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Offset, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Current time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day of `at` in the user's local time.
    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate;

    /// First instant of the local day after `at`.
    fn next_local_midnight(&self, at: DateTime<Utc>) -> DateTime<Utc>;
}

/// Wall clock in the host's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&Local).date_naive()
    }

    fn next_local_midnight(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        next_midnight_in(&Local, at)
    }
}

/// Settable clock with a fixed UTC offset.
///
/// Clones share the same instant, so a test can keep a handle and advance
/// time while the economy owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    epoch_ms: Arc<AtomicI64>,
    offset: FixedOffset,
}

impl ManualClock {
    /// Clock fixed at `at`, reporting calendar days in UTC.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self::with_offset(at, Utc.fix())
    }

    pub fn with_offset(at: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            epoch_ms: Arc::new(AtomicI64::new(at.timestamp_millis())),
            offset,
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.epoch_ms.store(at.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.epoch_ms.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let ms = self.epoch_ms.load(Ordering::SeqCst);
        DateTime::from_timestamp_millis(ms).unwrap_or_default()
    }

    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    fn next_local_midnight(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        next_midnight_in(&self.offset, at)
    }
}

fn next_midnight_in<Tz: TimeZone>(tz: &Tz, at: DateTime<Utc>) -> DateTime<Utc> {
    let today = at.with_timezone(tz).date_naive();
    let Some(tomorrow) = today.succ_opt() else {
        return at;
    };
    let midnight = tomorrow.and_time(chrono::NaiveTime::MIN);
    // A DST gap can swallow midnight; fall back to the naive instant in UTC.
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}
