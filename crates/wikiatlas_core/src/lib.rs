//! Client core for WikiAtlas.
//!
//! Owns article search, list sanitization, draft auto-save, the backend
//! gateway and the offline archive. Front ends call into this crate and never
//! talk to the backend directly.

pub mod autosave;
pub mod config;
pub mod db;
pub mod filter;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use autosave::{
    AutoSaveCoordinator, AutoSaveHandle, AutoSavePhase, AutoSaveStatus, DraftPersister,
    DraftSnapshot, GatewayPersister,
};
pub use config::{ClientConfig, ConfigError};
pub use gateway::{ArticleGateway, BackendClient, DirectoryGateway, GatewayError, GatewayResult};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::article::{Article, ArticleDetail, ArticleDraft, ArticleId, DraftValidationError};
pub use model::identity::Identity;
pub use repo::{ArchiveRepository, RepoError, SqliteArchiveRepository};
pub use search::engine::{MatchStage, SearchEngine, SearchOutcome};
pub use search::gemini::GeminiMatcher;
pub use search::semantic::{SemanticError, SemanticMatcher};
pub use service::{ArticleService, ArticleServiceError, DirectoryService, DirectoryServiceError};

/// Health-check used by front ends before wiring anything else.
pub fn ping() -> &'static str {
    "pong"
}

pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
