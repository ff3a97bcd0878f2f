pub mod config;
pub mod hearts;
pub mod session;
pub mod tier;
pub mod watch;

use chrono::{DateTime, Utc};
use lingofocus_core::storage::data_dir;
use lingofocus_core::{
    Config, HeartEconomy, JsonFileStore, SqliteStore, StorageBackend, Store, StreakShield,
    SystemClock,
};

pub type CliEconomy = HeartEconomy<SystemClock, Box<dyn Store>>;
pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the store selected in `config`.
fn open_store(config: &Config) -> Result<Box<dyn Store>, Box<dyn std::error::Error>> {
    let store: Box<dyn Store> = match config.storage {
        StorageBackend::Sqlite => Box::new(SqliteStore::open_default()?),
        StorageBackend::Json => Box::new(JsonFileStore::new(data_dir()?.join("focus_state.json"))),
    };
    Ok(store)
}

/// Build the economy from config and run the eager refill/reset check.
pub fn open_economy(config: &Config) -> Result<CliEconomy, Box<dyn std::error::Error>> {
    let store = open_store(config)?;
    let mut economy = HeartEconomy::init(config.tier, config.tiers.clone(), SystemClock, store)
        .with_shield(StreakShield::new(config.required_streak));
    economy.tick();
    Ok(economy)
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// "in 1h 05m" style countdown, or "now" when due.
pub fn format_until(at: DateTime<Utc>) -> String {
    format_remaining((at - Utc::now()).num_seconds())
}

/// Rounds up to whole minutes.
fn format_remaining(secs: i64) -> String {
    if secs <= 0 {
        return "now".to_string();
    }
    let total_minutes = (secs + 59) / 60;
    let (hours, minutes) = (total_minutes / 60, total_minutes % 60);
    if hours > 0 {
        format!("in {hours}h {minutes:02}m")
    } else {
        format!("in {minutes}m")
    }
}
