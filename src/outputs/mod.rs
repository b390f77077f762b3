//! Rendering a [`ScrapeOutcome`](crate::models::ScrapeOutcome) for people and programs.
//!
//! # Submodules
//!
//! - [`report`]: Human-readable attribute block and season table for stdout
//! - [`json`]: The outcome as JSON, printed or written to a file

pub mod json;
pub mod report;
