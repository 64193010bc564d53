//! Turns a feedback decision into a counter increment.

use std::sync::Arc;

use crate::db::CounterStore;
use crate::models::{Decision, FeedbackTally};

/// Records liked/disliked decisions into a [`CounterStore`].
#[derive(Clone)]
pub struct FeedbackRecorder {
    store: Arc<dyn CounterStore>,
}

impl FeedbackRecorder {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Count `decision` and return the updated tally.
    pub fn record(&self, decision: Decision) -> FeedbackTally {
        let tally = self.store.increment(decision);
        tracing::info!(
            decision = decision.as_str(),
            liked = tally.liked,
            disliked = tally.disliked,
            "Recorded feedback"
        );
        tally
    }

    pub fn tally(&self) -> FeedbackTally {
        self.store.get()
    }

    pub fn reset(&self) -> FeedbackTally {
        let tally = self.store.reset();
        tracing::info!("Feedback tally reset");
        tally
    }
}
