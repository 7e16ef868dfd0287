//! SQLite-backed topic log.
//!
//! Stores every published message in a `messages` table so that several
//! processes sharing the same database file see one topic history. History
//! pages walk the table by sequence; a live subscription is a background task
//! that polls for rows past its watermark.

mod row;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::traits::{
    HistoryPage, MessageHandler, RawMessage, SubscriptionHandle, Topic, Transport,
};
use crate::error::TransportError;

use row::MessageRow;

/// Default number of messages per history page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Default interval between live-feed polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How long a writer waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Topic log persisted in SQLite.
#[derive(Clone)]
pub struct SqliteTransport {
    conn: Arc<Mutex<Connection>>,
    page_size: usize,
    poll_interval: Duration,
}

impl SqliteTransport {
    /// Open (creating if needed) a topic log at `path`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Storage` if the file cannot be opened or the
    /// schema cannot be created.
    pub fn open(path: &Path) -> Result<Self, TransportError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        Self::from_connection(conn)
    }

    /// Open a private, in-memory topic log.
    pub fn open_in_memory() -> Result<Self, TransportError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, TransportError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                topic TEXT NOT NULL,
                payload BLOB NOT NULL,
                timestamp TEXT
            );

            CREATE INDEX IF NOT EXISTS messages_topic_seq ON messages(topic, seq);
            "#,
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            page_size: DEFAULT_PAGE_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Set the number of messages returned per history page (minimum 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set how often live subscriptions poll for new rows.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    /// Highest sequence stored on `topic`, or 0 when empty.
    pub fn latest_sequence(&self, topic: &Topic) -> Result<u64, TransportError> {
        let conn = lock_conn(&self.conn)?;
        latest_sequence(&conn, topic)
    }
}

fn lock_conn(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, TransportError> {
    conn.lock()
        .map_err(|_| TransportError::Storage("SQLite connection poisoned".to_string()))
}

fn latest_sequence(conn: &Connection, topic: &Topic) -> Result<u64, TransportError> {
    let max: Option<i64> = conn
        .query_row(
            "SELECT MAX(seq) FROM messages WHERE topic = ?1",
            [topic.as_str()],
            |row| row.get(0),
        )
        .optional()?
        .flatten();
    Ok(max.map_or(0, |seq| seq.max(0) as u64))
}

/// Fetch up to `limit` rows on `topic` with sequence greater than `after`.
///
/// Each entry pairs the row's sequence with its message; rows that cannot be
/// read as a message are `None` but still count toward `limit`, so callers
/// can move their cursor past them.
fn fetch_after(
    conn: &Connection,
    topic: &Topic,
    after: u64,
    limit: usize,
) -> Result<Vec<(u64, Option<RawMessage>)>, TransportError> {
    let mut stmt = conn.prepare(
        "SELECT seq, payload, timestamp FROM messages
         WHERE topic = ?1 AND seq > ?2 ORDER BY seq LIMIT ?3",
    )?;
    let rows = stmt.query_map(
        params![topic.as_str(), after as i64, limit as i64],
        MessageRow::from_row,
    )?;

    let mut scanned = Vec::new();
    for row in rows {
        let row = row?;
        scanned.push((row.seq, row.into_message()));
    }
    Ok(scanned)
}

#[async_trait]
impl Transport for SqliteTransport {
    async fn publish(
        &self,
        topic: &Topic,
        payload: Vec<u8>,
        timestamp: DateTime<Utc>,
    ) -> Result<(), TransportError> {
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            "INSERT INTO messages (topic, payload, timestamp) VALUES (?1, ?2, ?3)",
            params![
                topic.as_str(),
                payload,
                timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
            ],
        )?;
        debug!(topic = %topic, seq = conn.last_insert_rowid(), "stored message");
        Ok(())
    }

    async fn query_history(
        &self,
        topic: &Topic,
        cursor: Option<u64>,
    ) -> Result<HistoryPage, TransportError> {
        let conn = lock_conn(&self.conn)?;
        let mut rows = fetch_after(&conn, topic, cursor.unwrap_or(0), self.page_size + 1)?;

        let next_cursor = if rows.len() > self.page_size {
            rows.truncate(self.page_size);
            rows.last().map(|(seq, _)| *seq)
        } else {
            None
        };

        Ok(HistoryPage {
            messages: rows.into_iter().filter_map(|(_, message)| message).collect(),
            next_cursor,
        })
    }

    async fn subscribe(
        &self,
        topic: &Topic,
        resume_after: Option<u64>,
        handler: MessageHandler,
    ) -> Result<Box<dyn SubscriptionHandle>, TransportError> {
        let start = match resume_after {
            Some(seen) => seen,
            None => self.latest_sequence(topic)?,
        };

        let conn = Arc::clone(&self.conn);
        let topic = topic.clone();
        let page_size = self.page_size;
        let poll_interval = self.poll_interval;

        debug!(topic = %topic, start, "starting poll subscription");
        let task = tokio::spawn(async move {
            let mut watermark = start;
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                loop {
                    let batch = match lock_conn(&conn)
                        .and_then(|guard| fetch_after(&guard, &topic, watermark, page_size))
                    {
                        Ok(batch) => batch,
                        Err(err) => {
                            warn!(topic = %topic, error = %err, "poll failed");
                            break;
                        }
                    };
                    let drained = batch.len() < page_size;
                    for (seq, message) in batch {
                        watermark = watermark.max(seq);
                        if let Some(message) = message {
                            handler(message);
                        }
                    }
                    if drained {
                        break;
                    }
                }
            }
        });

        Ok(Box::new(SqliteSubscription { task }))
    }
}

struct SqliteSubscription {
    task: JoinHandle<()>,
}

impl SubscriptionHandle for SqliteSubscription {
    fn unsubscribe(&self) {
        self.task.abort();
    }
}

impl Drop for SqliteSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
