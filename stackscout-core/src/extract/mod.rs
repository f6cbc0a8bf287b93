//! Signal extractors, one per artifact type.
//!
//! Each extractor is a pure function of (artifacts, catalog); the async
//! wrappers only fetch and classify the outcome as
//! [`Collected`](crate::types::Collected).

pub mod ci;
pub mod comments;
pub mod commits;
pub mod fear;
pub mod hidden_deps;
pub mod shadow;
pub mod stack_files;
