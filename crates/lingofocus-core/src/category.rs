//! Challenge categories.
//!
//! Each category owns an independent heart pool; pools never share capacity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Content types that gate attempts independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeCategory {
    ErrorSpotting,
    Quiz,
    Flashcard,
    Listening,
    FillInBlank,
    SentenceBuilder,
}

impl ChallengeCategory {
    /// Every category, in display order.
    pub const ALL: [ChallengeCategory; 6] = [
        ChallengeCategory::ErrorSpotting,
        ChallengeCategory::Quiz,
        ChallengeCategory::Flashcard,
        ChallengeCategory::Listening,
        ChallengeCategory::FillInBlank,
        ChallengeCategory::SentenceBuilder,
    ];

    /// Stable identifier, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeCategory::ErrorSpotting => "error_spotting",
            ChallengeCategory::Quiz => "quiz",
            ChallengeCategory::Flashcard => "flashcard",
            ChallengeCategory::Listening => "listening",
            ChallengeCategory::FillInBlank => "fill_in_blank",
            ChallengeCategory::SentenceBuilder => "sentence_builder",
        }
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            ChallengeCategory::ErrorSpotting => "Error Spotting",
            ChallengeCategory::Quiz => "Quiz",
            ChallengeCategory::Flashcard => "Flashcards",
            ChallengeCategory::Listening => "Listening",
            ChallengeCategory::FillInBlank => "Fill in the Blank",
            ChallengeCategory::SentenceBuilder => "Sentence Builder",
        }
    }
}

impl fmt::Display for ChallengeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChallengeCategory {
    type Err = ValidationError;

    /// Accepts the snake_case identifier, with `-` allowed in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        ChallengeCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_dashes_and_case() {
        assert_eq!("quiz".parse(), Ok(ChallengeCategory::Quiz));
        assert_eq!("Error-Spotting".parse(), Ok(ChallengeCategory::ErrorSpotting));
        assert_eq!(" fill_in_blank ".parse(), Ok(ChallengeCategory::FillInBlank));
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "crossword".parse::<ChallengeCategory>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownCategory("crossword".into()));
    }

    #[test]
    fn serialized_form_matches_as_str() {
        for category in ChallengeCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }
}
