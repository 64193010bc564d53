//! The fact → image → feedback cycle.
//!
//! [`RevealMachine`] is the synchronous state holder. Every fetch is split into
//! a `begin_*` call that hands out a [`Ticket`] and a `complete_*` call that
//! applies the result only if the ticket is still current. A ticket goes stale
//! as soon as another fetch begins, so late responses from superseded
//! requests are dropped instead of overwriting newer state.
//!
//! [`RevealController`] drives the machine with real fetches and publishes a
//! [`Snapshot`] after every change.

mod controller;

use std::sync::Arc;

use crate::client::FetchError;
use crate::models::{CatImage, Fact, FeedbackTally, RevealMode, RevealState};

pub use controller::RevealController;

/// Shown while a fact request is in flight.
pub const LOADING_TEXT: &str = "Loading a cat fact…";

/// Shown in place of the fact when it could not be fetched.
pub const FACT_ERROR_TEXT: &str = "failed to load fact";

/// Inline notice when the image for the current fact could not be fetched.
pub const IMAGE_ERROR_TEXT: &str = "Failed to load image";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Fact,
    Image,
}

/// Proof that a fetch was issued at a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    kind: FetchKind,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn kind(&self) -> FetchKind {
        self.kind
    }
}

/// Everything the render layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub state: RevealState,
    pub mode: RevealMode,
    /// Fact text, or the loading / error placeholder.
    pub text: String,
    /// Inline error shown alongside the text.
    pub notice: Option<String>,
    pub image: Option<Arc<CatImage>>,
    pub tally: FeedbackTally,
    /// Whether the "show image" affordance should be enabled.
    pub can_request_image: bool,
    /// Whether tapping to advance (and being asked for feedback) is enabled.
    pub can_advance: bool,
}

#[derive(Debug)]
pub struct RevealMachine {
    state: RevealState,
    mode: RevealMode,
    fact: Option<Fact>,
    image: Option<Arc<CatImage>>,
    notice: Option<&'static str>,
    generation: u64,
}

impl Default for RevealMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RevealMachine {
    pub fn new() -> Self {
        Self {
            state: RevealState::Loading,
            mode: RevealMode::FactOnly,
            fact: None,
            image: None,
            notice: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn mode(&self) -> RevealMode {
        self.mode
    }

    pub fn fact(&self) -> Option<&Fact> {
        self.fact.as_ref()
    }

    pub fn image(&self) -> Option<&Arc<CatImage>> {
        self.image.as_ref()
    }

    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn display_text(&self) -> &str {
        match self.state {
            RevealState::Loading => LOADING_TEXT,
            RevealState::Error => FACT_ERROR_TEXT,
            RevealState::FactShown | RevealState::ImageLoading | RevealState::ImageShown => self
                .fact
                .as_ref()
                .map(|f| f.text.as_str())
                .unwrap_or(LOADING_TEXT),
        }
    }

    pub fn can_request_image(&self) -> bool {
        self.state == RevealState::FactShown
    }

    pub fn can_advance(&self) -> bool {
        self.state == RevealState::ImageShown
    }

    fn issue(&mut self, kind: FetchKind) -> Ticket {
        self.generation += 1;
        Ticket {
            generation: self.generation,
            kind,
        }
    }

    fn is_current(&self, ticket: Ticket, kind: FetchKind, state: RevealState) -> bool {
        ticket.kind == kind && ticket.generation == self.generation && self.state == state
    }

    /// Start a new cycle. Accepted from any state; anything in flight goes stale.
    pub fn begin_fact_fetch(&mut self) -> Ticket {
        self.state = RevealState::Loading;
        self.mode = RevealMode::FactOnly;
        self.fact = None;
        self.image = None;
        self.notice = None;
        self.issue(FetchKind::Fact)
    }

    /// Advance past a revealed image into a new cycle.
    ///
    /// Returns `None` unless an image is currently shown.
    pub fn begin_next_cycle(&mut self) -> Option<Ticket> {
        if !self.can_advance() {
            return None;
        }
        Some(self.begin_fact_fetch())
    }

    /// Apply a fact result. Returns `false` if the ticket was stale.
    pub fn complete_fact_fetch(&mut self, ticket: Ticket, result: Result<Fact, FetchError>) -> bool {
        if !self.is_current(ticket, FetchKind::Fact, RevealState::Loading) {
            return false;
        }
        match result {
            Ok(fact) => {
                self.fact = Some(fact);
                self.state = RevealState::FactShown;
            }
            Err(_) => {
                self.fact = None;
                self.state = RevealState::Error;
            }
        }
        true
    }

    /// Request the picture for the current fact.
    ///
    /// A repeat request while one is in flight supersedes it. Returns `None`
    /// when there is no fact to illustrate or the image is already shown.
    pub fn begin_image_fetch(&mut self) -> Option<Ticket> {
        match self.state {
            RevealState::FactShown | RevealState::ImageLoading => {
                self.state = RevealState::ImageLoading;
                self.notice = None;
                Some(self.issue(FetchKind::Image))
            }
            RevealState::Loading | RevealState::ImageShown | RevealState::Error => None,
        }
    }

    /// Apply an image result. Returns `false` if the ticket was stale.
    pub fn complete_image_fetch(
        &mut self,
        ticket: Ticket,
        result: Result<CatImage, FetchError>,
    ) -> bool {
        if !self.is_current(ticket, FetchKind::Image, RevealState::ImageLoading) {
            return false;
        }
        match result {
            Ok(image) => {
                self.image = Some(Arc::new(image));
                self.mode = RevealMode::ImageRevealed;
                self.state = RevealState::ImageShown;
            }
            Err(_) => {
                self.image = None;
                self.mode = RevealMode::FactOnly;
                self.notice = Some(IMAGE_ERROR_TEXT);
                self.state = RevealState::FactShown;
            }
        }
        true
    }

    pub fn snapshot(&self, tally: FeedbackTally) -> Snapshot {
        Snapshot {
            state: self.state,
            mode: self.mode,
            text: self.display_text().to_string(),
            notice: self.notice.map(str::to_string),
            image: self.image.clone(),
            tally,
            can_request_image: self.can_request_image(),
            can_advance: self.can_advance(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gif() -> CatImage {
        CatImage::from_bytes(b"GIF89a-cat".to_vec()).unwrap()
    }

    fn shown(text: &str) -> RevealMachine {
        let mut machine = RevealMachine::new();
        let ticket = machine.begin_fact_fetch();
        assert!(machine.complete_fact_fetch(ticket, Ok(Fact::new(text))));
        machine
    }

    #[test]
    fn starts_loading() {
        let machine = RevealMachine::new();
        assert_eq!(machine.state(), RevealState::Loading);
        assert_eq!(machine.mode(), RevealMode::FactOnly);
        assert_eq!(machine.display_text(), LOADING_TEXT);
        assert!(!machine.can_advance());
        assert!(!machine.can_request_image());
    }

    #[test]
    fn shows_fetched_fact() {
        let machine = shown("Cats sleep 70% of their lives.");
        assert_eq!(machine.state(), RevealState::FactShown);
        assert_eq!(machine.display_text(), "Cats sleep 70% of their lives.");
        assert_eq!(machine.mode(), RevealMode::FactOnly);
        assert!(machine.image().is_none());
        assert!(machine.can_request_image());
    }

    #[test]
    fn fact_failure_enters_error() {
        let mut machine = RevealMachine::new();
        let ticket = machine.begin_fact_fetch();
        let err = FetchError::FactUnavailable("malformed body".into());
        assert!(machine.complete_fact_fetch(ticket, Err(err)));

        assert_eq!(machine.state(), RevealState::Error);
        assert_eq!(machine.display_text(), FACT_ERROR_TEXT);
        assert!(!machine.can_request_image());
        assert!(machine.begin_image_fetch().is_none());
    }

    #[test]
    fn image_success_reveals() {
        let mut machine = shown("fact");
        let ticket = machine.begin_image_fetch().unwrap();
        assert_eq!(machine.state(), RevealState::ImageLoading);
        assert_eq!(machine.mode(), RevealMode::FactOnly);

        assert!(machine.complete_image_fetch(ticket, Ok(gif())));
        assert_eq!(machine.state(), RevealState::ImageShown);
        assert_eq!(machine.mode(), RevealMode::ImageRevealed);
        assert!(machine.image().is_some());
        assert!(machine.can_advance());
    }

    #[test]
    fn image_failure_keeps_fact() {
        let mut machine = shown("fact");
        let ticket = machine.begin_image_fetch().unwrap();
        let err = FetchError::ImageUnavailable("connection refused".into());
        assert!(machine.complete_image_fetch(ticket, Err(err)));

        assert_eq!(machine.state(), RevealState::FactShown);
        assert_eq!(machine.mode(), RevealMode::FactOnly);
        assert_eq!(machine.display_text(), "fact");
        assert_eq!(machine.notice(), Some(IMAGE_ERROR_TEXT));
        assert!(machine.image().is_none());
        assert!(!machine.can_advance());
    }

    #[test]
    fn next_cycle_resets_mode_and_image() {
        let mut machine = shown("fact");
        let ticket = machine.begin_image_fetch().unwrap();
        machine.complete_image_fetch(ticket, Ok(gif()));

        let next = machine.begin_next_cycle().unwrap();
        assert_eq!(next.kind(), FetchKind::Fact);
        assert_eq!(machine.state(), RevealState::Loading);
        assert_eq!(machine.mode(), RevealMode::FactOnly);
        assert!(machine.image().is_none());
        assert!(machine.fact().is_none());
    }

    #[test]
    fn next_cycle_requires_revealed_image() {
        let mut machine = shown("fact");
        assert!(machine.begin_next_cycle().is_none());
        assert_eq!(machine.state(), RevealState::FactShown);
    }

    #[test]
    fn stale_fact_result_is_discarded() {
        let mut machine = RevealMachine::new();
        let first = machine.begin_fact_fetch();
        let second = machine.begin_fact_fetch();

        assert!(machine.complete_fact_fetch(second, Ok(Fact::new("newer"))));
        assert!(!machine.complete_fact_fetch(first, Ok(Fact::new("older"))));
        assert_eq!(machine.display_text(), "newer");
    }

    #[test]
    fn duplicate_image_request_supersedes() {
        let mut machine = shown("fact");
        let first = machine.begin_image_fetch().unwrap();
        let second = machine.begin_image_fetch().unwrap();
        assert!(second.generation() > first.generation());

        let err = FetchError::ImageUnavailable("late".into());
        assert!(!machine.complete_image_fetch(first, Err(err)));
        assert_eq!(machine.state(), RevealState::ImageLoading);

        assert!(machine.complete_image_fetch(second, Ok(gif())));
        assert_eq!(machine.mode(), RevealMode::ImageRevealed);
    }

    #[test]
    fn image_result_after_refresh_is_discarded() {
        let mut machine = shown("fact");
        let image = machine.begin_image_fetch().unwrap();
        machine.begin_fact_fetch();

        assert!(!machine.complete_image_fetch(image, Ok(gif())));
        assert_eq!(machine.mode(), RevealMode::FactOnly);
        assert!(machine.image().is_none());
    }

    #[test]
    fn ticket_kinds_are_not_interchangeable() {
        let mut machine = shown("fact");
        let image = machine.begin_image_fetch().unwrap();
        assert!(!machine.complete_fact_fetch(image, Ok(Fact::new("wrong"))));
        assert_eq!(machine.state(), RevealState::ImageLoading);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut machine = shown("fact");
        let ticket = machine.begin_image_fetch().unwrap();
        machine.complete_image_fetch(ticket, Ok(gif()));

        let snapshot = machine.snapshot(FeedbackTally::new(2, 1));
        assert_eq!(snapshot.text, "fact");
        assert_eq!(snapshot.tally, FeedbackTally::new(2, 1));
        assert!(snapshot.can_advance);
        assert!(!snapshot.can_request_image);
        assert!(snapshot.image.is_some());
        assert!(snapshot.notice.is_none());
    }
}
