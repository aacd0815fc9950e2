//! Reddit OAuth API client for the redsift harvester.
//!
//! Implements [`redsift_core::remote::RedditClient`] over `reqwest`, mapping
//! HTTP outcomes onto the closed [`redsift_core::FetchError`] set and
//! normalising Reddit's JSON into the flat records of `redsift_core::item`.

mod client;
mod model;

pub mod error;

pub use client::{HttpRedditClient, RedditConfig};
pub use error::Error;

#[cfg(test)]
mod tests;
