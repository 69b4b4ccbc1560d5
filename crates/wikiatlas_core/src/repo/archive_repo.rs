//! Offline article archive over SQLite.
//!
//! # Responsibility
//! - Store the most recent reconciled article list in backend order.
//! - Serve that list when the backend is unreachable.
//!
//! # Invariants
//! - `replace_articles` is all-or-nothing.
//! - Rows that fail to decode are reported, never silently dropped.

use crate::db::{open_archive, ArchiveLocation, DbError};
use crate::model::article::Article;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

const LAST_REFRESH_KEY: &str = "last_refresh_ms";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A stored payload could not be encoded or decoded.
    InvalidData(String),
    /// A previous holder of the connection panicked.
    LockPoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid archived article: {message}"),
            Self::LockPoisoned => write!(f, "archive connection lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::LockPoisoned => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Archive contract used by the article service.
pub trait ArchiveRepository: Send + Sync {
    /// Replaces the whole archive with `articles`, keeping their order.
    fn replace_articles(&self, articles: &[Article]) -> RepoResult<()>;
    /// Lists archived articles in the order they were stored.
    fn list_articles(&self) -> RepoResult<Vec<Article>>;
    /// Epoch millis of the last successful refresh, if any.
    fn archived_at(&self) -> RepoResult<Option<i64>>;
}

/// SQLite-backed archive.
pub struct SqliteArchiveRepository {
    conn: Mutex<Connection>,
}

impl SqliteArchiveRepository {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens (and migrates) the archive at `location`.
    pub fn open(location: &ArchiveLocation) -> RepoResult<Self> {
        Ok(Self::new(open_archive(location)?))
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::LockPoisoned)
    }
}

impl ArchiveRepository for SqliteArchiveRepository {
    fn replace_articles(&self, articles: &[Article]) -> RepoResult<()> {
        let now = now_epoch_ms();
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM archived_articles;", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT OR REPLACE INTO archived_articles (article_id, position, payload, archived_at)
                 VALUES (?1, ?2, ?3, ?4);",
            )?;
            for (position, article) in articles.iter().enumerate() {
                let payload = serde_json::to_string(article)
                    .map_err(|err| RepoError::InvalidData(err.to_string()))?;
                insert.execute(params![article.id, position as i64, payload, now])?;
            }
        }
        tx.execute(
            "INSERT INTO archive_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![LAST_REFRESH_KEY, now.to_string()],
        )?;
        tx.commit()?;

        info!(
            "event=archive_refresh module=repo status=ok articles={}",
            articles.len()
        );
        Ok(())
    }

    fn list_articles(&self) -> RepoResult<Vec<Article>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT payload FROM archived_articles ORDER BY position ASC;")?;
        let payloads = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let articles = payloads
            .iter()
            .map(|payload| decode_article(payload))
            .collect::<RepoResult<Vec<_>>>()?;
        debug!(
            "event=archive_list module=repo status=ok articles={}",
            articles.len()
        );
        Ok(articles)
    }

    fn archived_at(&self) -> RepoResult<Option<i64>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM archive_meta WHERE key = ?1;",
                params![LAST_REFRESH_KEY],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        value
            .map(|raw| {
                raw.parse::<i64>()
                    .map_err(|_| RepoError::InvalidData(format!("bad refresh timestamp `{raw}`")))
            })
            .transpose()
    }
}

fn decode_article(payload: &str) -> RepoResult<Article> {
    let article: Article =
        serde_json::from_str(payload).map_err(|err| RepoError::InvalidData(err.to_string()))?;
    if article.id.trim().is_empty() {
        return Err(RepoError::InvalidData("archived article has empty id".to_string()));
    }
    Ok(article)
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
