use std::fmt;

use serde::{Deserialize, Serialize};

/// Running feedback counters.
///
/// The only durable entity. Changed by single increments through a
/// [`CounterStore`](crate::db::CounterStore) or zeroed by a reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackTally {
    pub liked: u64,
    pub disliked: u64,
}

impl FeedbackTally {
    pub fn new(liked: u64, disliked: u64) -> Self {
        Self { liked, disliked }
    }

    /// Returns a copy with `decision`'s counter bumped by one, saturating.
    pub fn incremented(mut self, decision: Decision) -> Self {
        match decision {
            Decision::Liked => self.liked = self.liked.saturating_add(1),
            Decision::Disliked => self.disliked = self.disliked.saturating_add(1),
        }
        self
    }
}

impl fmt::Display for FeedbackTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "👍{}  👎{}", self.liked, self.disliked)
    }
}

/// A binary feedback choice on the fact just shown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Liked,
    Disliked,
}

impl Decision {
    pub const ALL: [Decision; 2] = [Decision::Liked, Decision::Disliked];

    /// Key under which the counter is persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liked => "liked",
            Self::Disliked => "disliked",
        }
    }

    /// Parses the persisted key as well as the terminal's yes/no answers.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "liked" | "like" | "yes" | "y" => Some(Self::Liked),
            "disliked" | "dislike" | "no" | "n" => Some(Self::Disliked),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_are_independent() {
        let a = FeedbackTally::default()
            .incremented(Decision::Liked)
            .incremented(Decision::Disliked);
        let b = FeedbackTally::default()
            .incremented(Decision::Disliked)
            .incremented(Decision::Liked);
        assert_eq!(a, FeedbackTally::new(1, 1));
        assert_eq!(a, b);
    }

    #[test]
    fn increment_saturates() {
        let tally = FeedbackTally::new(u64::MAX, 0).incremented(Decision::Liked);
        assert_eq!(tally.liked, u64::MAX);
    }

    #[test]
    fn renders_label() {
        assert_eq!(FeedbackTally::new(3, 1).to_string(), "👍3  👎1");
    }

    #[test]
    fn parses_answers() {
        assert_eq!(Decision::from_str("Y"), Some(Decision::Liked));
        assert_eq!(Decision::from_str(" no "), Some(Decision::Disliked));
        assert_eq!(Decision::from_str("liked"), Some(Decision::Liked));
        assert_eq!(Decision::from_str("maybe"), None);
    }
}
