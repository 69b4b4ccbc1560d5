//! Debounced draft auto-save.
//!
//! # Responsibility
//! - Observe a continuously edited draft and persist it in the background.
//! - Publish an observable status for the editing surface.
//!
//! # Invariants
//! - At most one persistence call is in flight per coordinator.
//! - The first successful create fixes the article id for later updates.
//! - Persisted payloads always carry status `draft`.
//! - Save failures are logged and counted, never surfaced or retried.

pub mod coordinator;
pub mod persister;

pub use coordinator::{
    AutoSaveCoordinator, AutoSaveError, AutoSaveHandle, AutoSavePhase, AutoSaveStatus,
    DraftSnapshot,
};
pub use persister::{DraftPersister, GatewayPersister};
