//! Domain models for cat-facts.
//!
//! # Core Concepts
//!
//! ## Per-cycle Entities
//!
//! These share the lifecycle of the fact currently on screen and are replaced
//! wholesale when a new fact is fetched:
//!
//! - [`Fact`]: The text fetched from the fact endpoint.
//! - [`CatImage`]: Image bytes revealed for the current fact.
//! - [`RevealMode`] / [`RevealState`]: Where the screen is in the reveal flow.
//!
//! ## Durable Entities
//!
//! - [`FeedbackTally`]: Running liked/disliked counters, persisted across runs.
//! - [`Decision`]: A single binary feedback choice on a fact.

mod fact;
mod image;
mod reveal;
mod tally;

pub use fact::*;
pub use image::*;
pub use reveal::*;
pub use tally::*;
