//! Stackscout core library — fetch layer, signal extractors, insight
//! synthesis, and report writing.
//!
//! The main entry point is [`pipeline::OrgIngestor`], which processes one
//! repository at a time: Fetch → Extract → Synthesize → Write.

pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod insight;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod types;
