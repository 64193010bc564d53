//! Durable storage for the feedback tally.
//!
//! [`CounterStore`] is the seam the rest of the crate talks to. [`Database`]
//! backs it with SQLite; [`MemoryStore`] keeps counters in process memory and
//! stands in for the database in tests or when the file cannot be opened.

mod memory;
mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use rusqlite::Connection;

use crate::models::{Decision, FeedbackTally};

pub use memory::MemoryStore;

/// Persistence for the liked/disliked counters.
///
/// None of the operations fail from the caller's point of view. Implementations
/// that can lose their backing storage log the problem and answer from memory.
pub trait CounterStore: Send + Sync {
    /// Current tally. Counters that were never written read as zero.
    fn get(&self) -> FeedbackTally;

    /// Add one to `decision`'s counter and return the updated tally.
    fn increment(&self, decision: Decision) -> FeedbackTally;

    /// Zero both counters.
    fn reset(&self) -> FeedbackTally;
}

/// SQLite-backed [`CounterStore`].
///
/// Cheap to clone; clones share the connection and the last known tally.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    last_known: Arc<Mutex<FeedbackTally>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            last_known: Arc::new(Mutex::new(FeedbackTally::default())),
        }
    }

    /// Create or upgrade the schema, then load the stored tally into memory.
    pub fn migrate(&self) -> Result<()> {
        let tally = {
            let conn = self.lock();
            schema::run_migrations(&conn)?;
            read_tally(&conn)?
        };
        *self.remembered() = tally;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave a half-written counter
        // behind: every write runs inside a transaction.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn remembered(&self) -> MutexGuard<'_, FeedbackTally> {
        self.last_known.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn try_get(&self) -> Result<FeedbackTally> {
        let conn = self.lock();
        read_tally(&conn)
    }

    fn try_increment(&self, decision: Decision) -> Result<FeedbackTally> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO counters (key, value) VALUES (?, 1)
             ON CONFLICT(key) DO UPDATE SET value =
                CASE WHEN value < 9223372036854775807 THEN value + 1 ELSE value END",
            [decision.as_str()],
        )?;
        let tally = read_tally(&tx)?;
        tx.commit()?;
        Ok(tally)
    }

    fn try_reset(&self) -> Result<FeedbackTally> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        for decision in Decision::ALL {
            tx.execute(
                "INSERT INTO counters (key, value) VALUES (?, 0)
                 ON CONFLICT(key) DO UPDATE SET value = 0",
                [decision.as_str()],
            )?;
        }
        tx.commit()?;
        Ok(FeedbackTally::default())
    }
}

impl CounterStore for Database {
    fn get(&self) -> FeedbackTally {
        match self.try_get() {
            Ok(tally) => {
                *self.remembered() = tally;
                tally
            }
            Err(e) => {
                tracing::warn!("Failed to read tally, using last known value: {:#}", e);
                *self.remembered()
            }
        }
    }

    fn increment(&self, decision: Decision) -> FeedbackTally {
        let result = self.try_increment(decision);
        let mut remembered = self.remembered();
        match result {
            Ok(tally) => *remembered = tally,
            Err(e) => {
                tracing::warn!(
                    "Failed to persist {} increment, counting in memory: {:#}",
                    decision.as_str(),
                    e
                );
                *remembered = remembered.incremented(decision);
            }
        }
        *remembered
    }

    fn reset(&self) -> FeedbackTally {
        if let Err(e) = self.try_reset() {
            tracing::warn!("Failed to persist tally reset: {:#}", e);
        }
        let mut remembered = self.remembered();
        *remembered = FeedbackTally::default();
        *remembered
    }
}

/// Default database location inside the platform data directory.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "cat-facts")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("tally.db"))
}

fn read_tally(conn: &Connection) -> Result<FeedbackTally> {
    let mut stmt = conn.prepare("SELECT key, value FROM counters")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut tally = FeedbackTally::default();
    for (key, value) in rows {
        let value = u64::try_from(value).unwrap_or(0);
        match Decision::from_str(&key) {
            Some(Decision::Liked) => tally.liked = value,
            Some(Decision::Disliked) => tally.disliked = value,
            None => tracing::debug!("Ignoring unknown counter key {:?}", key),
        }
    }
    Ok(tally)
}
