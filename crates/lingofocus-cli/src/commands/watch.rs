use std::time::Duration;

use lingofocus_core::{spawn_ticker, Config};

use super::{open_economy, CliResult};

pub fn run(seconds: u64, period: Option<u64>) -> CliResult {
    let config = Config::load()?;
    let period = Duration::from_secs(period.unwrap_or(config.refill_check_interval_secs).max(1));
    let shared = open_economy(&config)?.into_shared();

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(async move {
        let ticker = spawn_ticker(shared.clone(), period);
        let deadline = tokio::time::Instant::now() + Duration::from_secs(seconds);

        println!("Watching hearts every {}s for {seconds}s", period.as_secs());
        loop {
            let events = shared.lock().await.drain_events();
            for event in events {
                println!("{}", serde_json::to_string(&event)?);
            }
            if tokio::time::Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        let changed = ticker.shutdown().await;
        println!("Stopped after {changed} state-changing ticks.");
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
