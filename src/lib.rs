//! Random cat facts, an optional cat picture per fact, and a persistent
//! liked/disliked tally.

pub mod client;
pub mod config;
pub mod db;
pub mod feedback;
pub mod models;
pub mod reveal;
pub mod terminal;
