//! Article search: lexical pass with a semantic-match fallback.
//!
//! # Responsibility
//! - Match free-text queries against the in-memory article collection.
//! - Delegate to an external semantic matcher only when nothing matches
//!   lexically.
//!
//! # Invariants
//! - Results keep the collection's original order.
//! - A failed or missing semantic matcher yields "no matches", never an error.

pub mod engine;
pub mod gemini;
pub mod lexical;
pub mod semantic;
