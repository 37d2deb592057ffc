//! Trait seams between the runner and its external collaborators.

pub mod extractor;
pub mod fetcher;
