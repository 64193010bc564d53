use std::sync::Mutex;

use super::CounterStore;
use crate::models::{Decision, FeedbackTally};

/// In-process [`CounterStore`]. Counts are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tally: Mutex<FeedbackTally>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing tally.
    pub fn with_tally(tally: FeedbackTally) -> Self {
        Self {
            tally: Mutex::new(tally),
        }
    }
}

impl CounterStore for MemoryStore {
    fn get(&self) -> FeedbackTally {
        *self.tally.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn increment(&self, decision: Decision) -> FeedbackTally {
        let mut tally = self.tally.lock().unwrap_or_else(|e| e.into_inner());
        *tally = tally.incremented(decision);
        *tally
    }

    fn reset(&self) -> FeedbackTally {
        let mut tally = self.tally.lock().unwrap_or_else(|e| e.into_inner());
        *tally = FeedbackTally::default();
        *tally
    }
}
