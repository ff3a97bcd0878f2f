//! Heart status, consumption and refill commands.

use lingofocus_core::{ChallengeCategory, Config, HeartCount};

use super::{format_until, open_economy, print_json, CliResult};

pub fn status(json: bool) -> CliResult {
    let config = Config::load()?;
    let economy = open_economy(&config)?;
    let snapshot = economy.snapshot();
    if json {
        return print_json(&snapshot);
    }

    println!("Tier: {}", snapshot.tier);
    for row in &snapshot.categories {
        let hearts = match (row.current, row.max) {
            (HeartCount::Limited(current), HeartCount::Limited(max)) => format!("{current}/{max}"),
            _ => "unlimited".to_string(),
        };
        let next = row
            .next_refill_time
            .map(|at| format!("  next heart {}", format_until(at)))
            .unwrap_or_default();
        println!("  {:<18} {:>9}{}", row.category.label(), hearts, next);
    }
    println!(
        "Shield: {} ({}/{} correct)",
        if snapshot.shield.is_active() { "active" } else { "inactive" },
        snapshot.shield.correct_answers_streak(),
        snapshot.shield.required_streak()
    );
    Ok(())
}

pub fn consume(category: ChallengeCategory, shield: bool, json: bool) -> CliResult {
    let config = Config::load()?;
    let mut economy = open_economy(&config)?;
    let result = economy.consume_heart(category, shield);
    if json {
        return print_json(&result);
    }

    if result.shield_used {
        println!("Shield used: no heart spent ({} left)", result.remaining);
    } else if result.success {
        println!("{}: heart spent, {} left", category.label(), result.remaining);
        if result.was_last_heart {
            println!("That was your last heart for {}.", category.label());
        }
    } else {
        println!("Out of hearts for {}.", category.label());
        let data = economy.get_out_of_hearts_data(category);
        if let Some(at) = data.next_refill_time {
            println!("Next heart {}", format_until(at));
        }
    }
    if result.persist_failed {
        eprintln!("warning: change could not be saved");
    }
    Ok(())
}

pub fn refill(json: bool) -> CliResult {
    let config = Config::load()?;
    // open_economy already ran the eager tick; report what it did.
    let mut economy = open_economy(&config)?;
    let events = economy.drain_events();
    if json {
        return print_json(&events);
    }
    if events.is_empty() {
        println!("Nothing to refill.");
    }
    for event in events {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}

pub fn blocked(category: ChallengeCategory, json: bool) -> CliResult {
    let config = Config::load()?;
    let economy = open_economy(&config)?;
    let data = economy.get_out_of_hearts_data(category);
    if json {
        return print_json(&data);
    }

    if economy.has_hearts_available(category) {
        println!("{} still has hearts.", category.label());
    } else {
        println!("{} is out of hearts.", category.label());
    }
    if let Some(at) = data.next_refill_time {
        println!("  Next heart:       {}", format_until(at));
    }
    if let Some(at) = data.all_hearts_refill_time {
        println!("  Full again:       {}", format_until(at));
    }
    if let Some(at) = data.next_daily_reset {
        println!("  Daily reset:      {}", format_until(at));
    }
    if data.is_completely_blocked {
        println!("  Every category is empty.");
    } else if !data.alternatives.is_empty() {
        let names: Vec<_> = data.alternatives.iter().map(|c| c.label()).collect();
        println!("  Try instead:      {}", names.join(", "));
    }
    Ok(())
}
