//! Core types and trait definitions for the InnoRussian vocabulary service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! It holds the domain records, the card filter/sort engine, the favourites
//! merge, the global search aggregator, and the [`store::VocabularyStore`]
//! boundary every backend implements.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod error;
pub mod favourites;
pub mod model;
pub mod query;
pub mod search;
pub mod store;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;
