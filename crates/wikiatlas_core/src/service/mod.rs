//! Service layer: read/write use-cases over the gateway and local archive.
//!
//! # Responsibility
//! - Apply read-path degrade policy (archive, then built-in articles).
//! - Validate input before any network call.
//!
//! # Invariants
//! - Read paths never surface transport errors to callers.
//! - Write paths never degrade; failures are returned typed.

pub mod article_service;
pub mod builtin;
pub mod directory_service;

pub use article_service::{
    ArticleListing, ArticleService, ArticleServiceError, CleanupReport, ListingOrigin,
    DEFAULT_PAGE_LIMIT, RELATED_LIMIT,
};
pub use directory_service::{DirectoryService, DirectoryServiceError};
