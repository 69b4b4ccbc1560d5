//! Auto-save coordinator: one tokio task per edited draft.
//!
//! # Responsibility
//! - Debounce observed edits with a sliding window.
//! - Issue persistence calls one at a time with the latest snapshot.
//! - Capture the article id assigned by the first successful create.
//!
//! # Invariants
//! - A timer is armed only when title and content are non-blank and an
//!   identity is attached; any edit failing that disarms it.
//! - A timer firing during a save defers one save until the in-flight call
//!   completes; it never starts a second call.
//! - An edit after that re-arms the window and cancels the deferred save.
//! - `dirty` is false only when the latest observed revision was persisted.

use crate::autosave::persister::DraftPersister;
use crate::config::{ClientConfig, DEFAULT_AUTOSAVE_DELAY_MS};
use crate::gateway::GatewayResult;
use crate::model::article::{Article, ArticleDraft, ArticleId, ArticleStatus};
use crate::model::identity::Identity;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::pending;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use uuid::Uuid;

/// Coordinator lifecycle phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AutoSavePhase {
    #[default]
    Idle,
    /// Timer armed, waiting for the edit stream to go quiet.
    Debouncing,
    /// A persistence call is in flight.
    Saving,
    Closed,
}

impl AutoSavePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Debouncing => "debouncing",
            Self::Saving => "saving",
            Self::Closed => "closed",
        }
    }
}

/// Snapshot published after every state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoSaveStatus {
    /// Local key for this editing session, stable across create and update.
    pub draft_key: Uuid,
    pub phase: AutoSavePhase,
    pub article_id: Option<ArticleId>,
    pub dirty: bool,
    pub saves_issued: u64,
    pub failures: u64,
    pub last_saved_at_ms: Option<i64>,
}

/// One observed state of the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSnapshot {
    pub draft: ArticleDraft,
    /// Signed-in author; auto-save is off without one.
    pub author: Option<Identity>,
}

impl DraftSnapshot {
    pub fn new(draft: ArticleDraft, author: Option<Identity>) -> Self {
        Self { draft, author }
    }

    /// Whether this snapshot may arm the timer.
    pub fn is_saveable(&self) -> bool {
        self.author.is_some() && self.draft.has_required_text()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoSaveError {
    /// No tokio runtime to host the coordinator task.
    NoRuntime,
    /// The coordinator task has stopped.
    Closed,
}

impl Display for AutoSaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRuntime => write!(f, "auto-save requires a running tokio runtime"),
            Self::Closed => write!(f, "auto-save coordinator is closed"),
        }
    }
}

impl Error for AutoSaveError {}

enum Command {
    Observe(DraftSnapshot),
    Close(oneshot::Sender<AutoSaveStatus>),
}

/// Builder for a coordinator task.
pub struct AutoSaveCoordinator {
    persister: Arc<dyn DraftPersister>,
    delay: Duration,
    article_id: Option<ArticleId>,
}

impl AutoSaveCoordinator {
    pub fn new(persister: Arc<dyn DraftPersister>) -> Self {
        Self {
            persister,
            delay: Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS),
            article_id: None,
        }
    }

    /// Uses the configured debounce delay.
    pub fn from_config(persister: Arc<dyn DraftPersister>, config: &ClientConfig) -> Self {
        Self::new(persister).with_delay(config.autosave_delay)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Starts in update mode for an existing article.
    pub fn editing(mut self, article_id: impl Into<ArticleId>) -> Self {
        self.article_id = Some(article_id.into());
        self
    }

    /// Spawns the coordinator on the current tokio runtime.
    ///
    /// # Errors
    /// - `NoRuntime` when called outside a tokio runtime.
    pub fn spawn(self) -> Result<AutoSaveHandle, AutoSaveError> {
        let runtime = Handle::try_current().map_err(|_| AutoSaveError::NoRuntime)?;
        let status = AutoSaveStatus {
            draft_key: Uuid::new_v4(),
            phase: AutoSavePhase::Idle,
            article_id: self.article_id,
            dirty: false,
            saves_issued: 0,
            failures: 0,
            last_saved_at_ms: None,
        };
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(status.clone());

        let worker = Worker {
            persister: self.persister,
            delay: self.delay,
            commands: command_rx,
            status_tx,
            status,
            latest: None,
            revision: 0,
            saved_revision: 0,
            deadline: None,
            deferred: false,
            in_flight: None,
        };
        debug!(
            "event=autosave_start module=autosave status=ok draft_key={} delay_ms={}",
            worker.status.draft_key,
            self.delay.as_millis()
        );
        runtime.spawn(worker.run());

        Ok(AutoSaveHandle {
            commands: command_tx,
            status: status_rx,
        })
    }
}

/// Caller side of a running coordinator.
#[derive(Clone)]
pub struct AutoSaveHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<AutoSaveStatus>,
}

impl AutoSaveHandle {
    /// Reports an edit. Never blocks.
    pub fn observe(&self, snapshot: DraftSnapshot) -> Result<(), AutoSaveError> {
        self.commands
            .send(Command::Observe(snapshot))
            .map_err(|_| AutoSaveError::Closed)
    }

    /// Latest published status.
    pub fn status(&self) -> AutoSaveStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AutoSaveStatus> {
        self.status.clone()
    }

    /// Disarms the timer, waits for any in-flight save and stops the task.
    pub async fn close(self) -> AutoSaveStatus {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.commands.send(Command::Close(reply_tx)).is_err() {
            return self.status();
        }
        match reply_rx.await {
            Ok(status) => status,
            Err(_) => self.status(),
        }
    }
}

struct SaveOutcome {
    revision: u64,
    result: GatewayResult<Article>,
}

struct Worker {
    persister: Arc<dyn DraftPersister>,
    delay: Duration,
    commands: mpsc::UnboundedReceiver<Command>,
    status_tx: watch::Sender<AutoSaveStatus>,
    status: AutoSaveStatus,
    latest: Option<DraftSnapshot>,
    revision: u64,
    saved_revision: u64,
    deadline: Option<Instant>,
    /// Timer expired while a save was in flight.
    deferred: bool,
    in_flight: Option<JoinHandle<SaveOutcome>>,
}

impl Worker {
    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Observe(snapshot)) => self.observe(snapshot),
                    Some(Command::Close(reply)) => {
                        let status = self.shutdown().await;
                        let _ = reply.send(status);
                        return;
                    }
                    None => {
                        self.shutdown().await;
                        return;
                    }
                },
                () = wait_deadline(self.deadline), if self.deadline.is_some() => self.on_timer(),
                outcome = join_save(&mut self.in_flight), if self.in_flight.is_some() => {
                    self.in_flight = None;
                    self.on_save_finished(outcome);
                    if std::mem::take(&mut self.deferred) {
                        self.start_save();
                    }
                }
            }
            self.publish();
        }
    }

    fn observe(&mut self, snapshot: DraftSnapshot) {
        self.revision += 1;
        self.status.dirty = true;
        self.deadline = snapshot
            .is_saveable()
            .then(|| Instant::now() + self.delay);
        self.deferred = false;
        self.latest = Some(snapshot);
    }

    fn on_timer(&mut self) {
        self.deadline = None;
        if self.in_flight.is_some() {
            self.deferred = true;
        } else {
            self.start_save();
        }
    }

    fn start_save(&mut self) {
        if self.revision == self.saved_revision {
            return;
        }
        let Some(snapshot) = self.latest.as_ref().filter(|s| s.is_saveable()) else {
            return;
        };
        let Some(author) = snapshot.author.clone() else {
            return;
        };
        let mut draft = snapshot.draft.clone();
        draft.status = ArticleStatus::Draft;

        let persister = Arc::clone(&self.persister);
        let article_id = self.status.article_id.clone();
        let revision = self.revision;
        self.status.saves_issued += 1;
        debug!(
            "event=autosave_issue module=autosave status=ok draft_key={} mode={} revision={}",
            self.status.draft_key,
            if article_id.is_some() { "update" } else { "create" },
            revision
        );

        self.in_flight = Some(tokio::spawn(async move {
            let result = persister
                .persist(&author, article_id.as_deref(), &draft)
                .await;
            SaveOutcome { revision, result }
        }));
    }

    fn on_save_finished(&mut self, outcome: Option<SaveOutcome>) {
        match outcome {
            Some(SaveOutcome {
                revision,
                result: Ok(article),
            }) => {
                if self.status.article_id.is_none() {
                    self.status.article_id = Some(article.id);
                }
                self.saved_revision = self.saved_revision.max(revision);
                self.status.dirty = self.saved_revision != self.revision;
                self.status.last_saved_at_ms = Some(now_epoch_ms());
                info!(
                    "event=autosave module=autosave status=ok draft_key={} revision={} dirty={}",
                    self.status.draft_key, revision, self.status.dirty
                );
            }
            Some(SaveOutcome {
                revision,
                result: Err(err),
            }) => {
                self.status.failures += 1;
                warn!(
                    "event=autosave module=autosave status=error draft_key={} revision={} error={}",
                    self.status.draft_key, revision, err
                );
            }
            None => {
                self.status.failures += 1;
                warn!(
                    "event=autosave module=autosave status=error draft_key={} error=save_task_aborted",
                    self.status.draft_key
                );
            }
        }
    }

    async fn shutdown(&mut self) -> AutoSaveStatus {
        self.deadline = None;
        self.deferred = false;
        if let Some(handle) = self.in_flight.take() {
            let outcome = handle.await.ok();
            self.on_save_finished(outcome);
        }
        self.status.phase = AutoSavePhase::Closed;
        self.status_tx.send_replace(self.status.clone());
        debug!(
            "event=autosave_close module=autosave status=ok draft_key={} saves_issued={} failures={}",
            self.status.draft_key, self.status.saves_issued, self.status.failures
        );
        self.status.clone()
    }

    fn publish(&mut self) {
        self.status.phase = if self.in_flight.is_some() {
            AutoSavePhase::Saving
        } else if self.deadline.is_some() {
            AutoSavePhase::Debouncing
        } else {
            AutoSavePhase::Idle
        };
        self.status_tx.send_replace(self.status.clone());
    }
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

async fn join_save(slot: &mut Option<JoinHandle<SaveOutcome>>) -> Option<SaveOutcome> {
    match slot {
        Some(handle) => handle.await.ok(),
        None => pending().await,
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
