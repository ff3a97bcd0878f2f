use clap::Subcommand;
use lingofocus_core::{Config, SubscriptionTier};

use super::{open_economy, print_json, CliResult};

#[derive(Subcommand)]
pub enum TierAction {
    /// Show the active tier and its limits
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Switch tier (free, fluency_builder, language_mastery)
    Set { tier: SubscriptionTier },
}

pub fn run(action: TierAction) -> CliResult {
    match action {
        TierAction::Show { json } => {
            let config = Config::load()?;
            let limits = config.tiers.get(config.tier);
            if json {
                return print_json(&serde_json::json!({
                    "tier": config.tier,
                    "limits": limits,
                }));
            }
            println!("Tier: {}", config.tier);
            if limits.unlimited_hearts {
                println!("  Hearts: unlimited");
            } else {
                println!("  Hearts per category: {}", limits.max_hearts);
                println!("  Refill: one heart every {} min", limits.refill_interval().num_minutes());
                println!("  Daily reset: {}", if limits.daily_reset_enabled { "on" } else { "off" });
                println!("  Gradual refill: {}", if limits.gradual_refill_enabled { "on" } else { "off" });
            }
        }
        TierAction::Set { tier } => {
            let mut config = Config::load()?;
            let mut economy = open_economy(&config)?;
            economy.update_subscription_tier(tier);
            config.tier = tier;
            config.save()?;
            println!("tier set to {tier}");
        }
    }
    Ok(())
}
