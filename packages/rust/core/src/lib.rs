//! Pipeline orchestration and domain logic for the roadmap tooling.
//!
//! This crate ties the document store, the upstream scraper and the link
//! checker together into the two maintenance workflows: [`ingest`] and
//! [`validate`].

pub mod ingest;
pub mod merge;
pub mod slug;
pub mod validate;
