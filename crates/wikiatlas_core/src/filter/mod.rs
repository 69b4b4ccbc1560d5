//! List sanitization applied before articles reach callers.
//!
//! # Responsibility
//! - Remove duplicate and identifier-less rows from fetched lists.
//! - Detect junk articles for the administrative cleanup sweep.

pub mod cleanup;
pub mod dedup;
