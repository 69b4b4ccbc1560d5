//! Domain model for articles, communities, profiles and comments.
//!
//! # Responsibility
//! - Define the strict shapes used by search, filtering and auto-save.
//! - Reconcile loosely typed backend rows into those shapes.
//!
//! # Invariants
//! - An `Article` always carries a non-empty identifier.
//! - Backend JSON never flows past `record` without reconciliation.

pub mod article;
pub mod comment;
pub mod community;
pub mod identity;
pub mod profile;
pub mod record;
