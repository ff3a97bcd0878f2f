//! Simulated answer session.
//!
//! The streak shield only lives for one economy instance, so a session is
//! played inside a single invocation.

use lingofocus_core::{AnswerOutcome, ChallengeCategory, Config};
use serde::Serialize;

use super::{open_economy, print_json, CliResult};

#[derive(Serialize)]
struct SessionReport {
    category: ChallengeCategory,
    outcomes: Vec<AnswerOutcome>,
    /// Answers left unplayed because the category ran out of hearts
    skipped: usize,
    remaining: lingofocus_core::HeartCount,
}

fn parse_answers(answers: &str) -> Result<Vec<bool>, String> {
    answers
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| match c.to_ascii_lowercase() {
            'c' | 'y' | '1' => Ok(true),
            'x' | 'n' | '0' => Ok(false),
            other => Err(format!("invalid answer '{other}': use c for correct, x for wrong")),
        })
        .collect()
}

pub fn run(category: ChallengeCategory, answers: &str, json: bool) -> CliResult {
    let answers = parse_answers(answers)?;
    let config = Config::load()?;
    let mut economy = open_economy(&config)?;

    let mut outcomes = Vec::new();
    let mut skipped = 0;
    for (i, &correct) in answers.iter().enumerate() {
        if !economy.has_hearts_available(category) {
            skipped = answers.len() - i;
            break;
        }
        let outcome = economy.record_answer(category, correct);
        if !json {
            match &outcome {
                AnswerOutcome::Correct { streak, shield_activated } => {
                    let note = if *shield_activated { "  shield activated!" } else { "" };
                    println!("#{:<3} correct  streak {streak}{note}", i + 1);
                }
                AnswerOutcome::Incorrect(result) if result.shield_used => {
                    println!("#{:<3} wrong    shield absorbed it", i + 1);
                }
                AnswerOutcome::Incorrect(result) => {
                    println!("#{:<3} wrong    {} hearts left", i + 1, result.remaining);
                }
            }
        }
        outcomes.push(outcome);
    }

    let remaining = economy.snapshot().categories.into_iter().find(|row| row.category == category);
    let remaining = remaining
        .map(|row| row.current)
        .unwrap_or(lingofocus_core::HeartCount::Limited(0));

    if json {
        return print_json(&SessionReport {
            category,
            outcomes,
            skipped,
            remaining,
        });
    }
    if skipped > 0 {
        println!("Out of hearts: {skipped} answers not played.");
    }
    println!("{}: {} hearts left", category.label(), remaining);
    Ok(())
}
