//! Common utilities for the arbor parsing core.
//!
//! This crate provides shared infrastructure used by the DOM and HTML crates:
//! - **Warning System** - deduplicated diagnostics for unsupported input

pub mod warning;
