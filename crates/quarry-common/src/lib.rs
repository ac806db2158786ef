//! Common utilities for the Quarry selector compiler.
//!
//! This crate provides shared infrastructure used by all Quarry components:
//! - **Warning System** - deduplicated diagnostics routed through the `log` facade

pub mod warning;
