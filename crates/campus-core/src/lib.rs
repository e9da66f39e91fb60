//! Core types, the storage trait, and the session rollover engines for
//! Campus.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod promotion;
pub mod records;
pub mod school;
pub mod session;
pub mod store;
pub mod student;
pub mod template;

pub use error::{Error, Result};
