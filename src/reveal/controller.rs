use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{RevealMachine, Snapshot, Ticket};
use crate::client::{new_nonce, FactSource, ImageSource};
use crate::feedback::FeedbackRecorder;
use crate::models::{Decision, FeedbackTally};

/// Runs the reveal cycle against real (or fake) fact and image sources.
///
/// The machine lock is never held across an await, so intents may arrive
/// while a fetch is pending. Superseded results are dropped by the machine's
/// generation check.
pub struct RevealController {
    machine: Mutex<RevealMachine>,
    facts: Arc<dyn FactSource>,
    images: Arc<dyn ImageSource>,
    recorder: FeedbackRecorder,
    updates: watch::Sender<Snapshot>,
}

impl RevealController {
    pub fn new(
        facts: Arc<dyn FactSource>,
        images: Arc<dyn ImageSource>,
        recorder: FeedbackRecorder,
    ) -> Self {
        let machine = RevealMachine::new();
        let (updates, _) = watch::channel(machine.snapshot(recorder.tally()));
        Self {
            machine: Mutex::new(machine),
            facts,
            images,
            recorder,
            updates,
        }
    }

    /// Receive a snapshot after every state or tally change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.updates.borrow().clone()
    }

    pub fn tally(&self) -> FeedbackTally {
        self.recorder.tally()
    }

    fn machine(&self) -> MutexGuard<'_, RevealMachine> {
        self.machine.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Publish the current state and tally.
    ///
    /// The tally read and the send both happen under the machine lock so
    /// publishes are serialized and the last one reflects the latest store
    /// value.
    fn publish(&self) {
        let machine = self.machine();
        let snapshot = machine.snapshot(self.recorder.tally());
        tracing::debug!(state = snapshot.state.as_str(), "Publishing snapshot");
        self.updates.send_replace(snapshot);
    }

    /// Start a new fact cycle and wait for it to settle.
    ///
    /// Returns `false` if a newer request superseded this one.
    pub async fn refresh(&self) -> bool {
        let ticket = self.machine().begin_fact_fetch();
        self.publish();
        self.run_fact_fetch(ticket).await
    }

    /// [`RevealController::refresh`] on a background task.
    pub fn spawn_refresh(self: &Arc<Self>) -> JoinHandle<bool> {
        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.refresh().await })
    }

    async fn run_fact_fetch(&self, ticket: Ticket) -> bool {
        tracing::debug!(generation = ticket.generation(), "Fact fetch issued");
        let result = self.facts.fetch_fact().await;
        let applied = self.machine().complete_fact_fetch(ticket, result);
        if applied {
            self.publish();
        } else {
            tracing::debug!(generation = ticket.generation(), "Discarding stale fact");
        }
        applied
    }

    /// Fetch and reveal the picture for the current fact.
    ///
    /// Returns `false` if the request was not allowed in the current state or
    /// was superseded before it completed.
    pub async fn reveal_image(&self) -> bool {
        let ticket = self.machine().begin_image_fetch();
        let Some(ticket) = ticket else {
            tracing::debug!("Ignoring image request, no fact to illustrate");
            return false;
        };
        self.publish();

        let nonce = new_nonce();
        tracing::debug!(generation = ticket.generation(), %nonce, "Image fetch issued");
        let result = self.images.fetch_image(&nonce).await;
        let applied = self.machine().complete_image_fetch(ticket, result);
        if applied {
            self.publish();
        } else {
            tracing::debug!(generation = ticket.generation(), "Discarding stale image");
        }
        applied
    }

    /// Record feedback on the revealed fact and move on to the next one.
    ///
    /// Only valid while an image is shown; otherwise nothing is recorded and
    /// `None` is returned. Waits for the next fact to settle and returns the
    /// tally as it stood right after recording.
    pub async fn advance(&self, decision: Decision) -> Option<FeedbackTally> {
        let ticket = self.machine().begin_next_cycle()?;
        let tally = self.recorder.record(decision);
        self.publish();
        self.run_fact_fetch(ticket).await;
        Some(tally)
    }

    pub fn reset_tally(&self) -> FeedbackTally {
        let tally = self.recorder.reset();
        self.publish();
        tally
    }
}
