//! Core types and trait definitions for the redsift harvester.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend, the Reddit client and the inference client all implement
//! traits defined here; the pipeline depends only on those traits.

// Native `async fn` in traits; the `Send` bounds are spelled out where needed.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod inference;
pub mod item;
pub mod record;
pub mod remote;
pub mod store;

pub use error::{FetchError, InferenceError};
