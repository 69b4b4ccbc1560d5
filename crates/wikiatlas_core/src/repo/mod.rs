//! Local persistence behind the services.
//!
//! # Responsibility
//! - Keep the last good article list so reads survive a backend outage.
//! - Keep SQL details out of service orchestration.
//!
//! # Invariants
//! - Only reconciled `Article` values are archived.
//! - A refresh replaces the archived list atomically.

pub mod archive_repo;

pub use archive_repo::{ArchiveRepository, RepoError, RepoResult, SqliteArchiveRepository};
