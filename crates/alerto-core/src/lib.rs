//! Core types and trait definitions for the Alerto SOS suite.
//!
//! This crate is deliberately free of HTTP, database, and runtime
//! dependencies. All other crates depend on it; it depends on nothing
//! proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod alert;
pub mod contact;
pub mod dispatch;
pub mod error;
pub mod position;
pub mod report;
pub mod store;

pub use error::{Error, Result};
