//! Durable key/value persistence for the job queue.
//!
//! A thin SQLite layer holding a single `kv` table. The whole queue is
//! serialized as one JSON array under the well-known `queued_jobs` key,
//! rewritten on every queue mutation and read back once at startup.
//! Missing or corrupt data rehydrates as an empty queue, never a fatal
//! error: losing the persisted queue must not take the dashboard down.

use cyd_store::jobs::QueuedJob;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Storage key the serialized job-queue array lives under.
pub const JOB_QUEUE_KEY: &str = "queued_jobs";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

/// Durable store for the job queue.
///
/// Cheaply cloneable (via `Rc`) for sharing in a single-threaded
/// cooperative runtime.
#[derive(Clone)]
pub struct JobStore {
    conn: Rc<RefCell<Connection>>,
}

impl JobStore {
    /// Open (or create) a file-backed store.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(JobStore {
            conn: Rc::new(RefCell::new(conn)),
        })
    }

    /// In-memory store, used in tests and by consumers that opt out of
    /// persistence.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(JobStore {
            conn: Rc::new(RefCell::new(conn)),
        })
    }

    /// Mirror the full queue to durable storage.
    pub fn save_jobs(&self, queue: &[QueuedJob]) -> anyhow::Result<()> {
        let payload = serde_json::to_string(queue)?;
        let conn = self.conn.borrow();
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![JOB_QUEUE_KEY, payload],
        )?;
        Ok(())
    }

    /// Load the persisted queue. `None` when nothing was saved or the
    /// payload does not deserialize; corruption is logged and treated
    /// as absence.
    pub fn load_jobs(&self) -> Option<Vec<QueuedJob>> {
        let conn = self.conn.borrow();
        let payload: String = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![JOB_QUEUE_KEY],
                |row| row.get(0),
            )
            .optional()
            .unwrap_or_else(|e| {
                log::warn!("job queue read failed: {}", e);
                None
            })?;
        match serde_json::from_str(&payload) {
            Ok(queue) => Some(queue),
            Err(e) => {
                log::warn!("persisted job queue is corrupt, starting empty: {}", e);
                None
            }
        }
    }

    /// Remove the persisted queue.
    pub fn clear_jobs(&self) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        conn.execute("DELETE FROM kv WHERE key = ?1", params![JOB_QUEUE_KEY])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyd_store::jobs::JobStatus;
    use cyd_core::selection::Crop;

    fn job(id: u64) -> QueuedJob {
        QueuedJob {
            id,
            crop: Crop::Corn,
            year: 2021,
            day: "284".into(),
            status: JobStatus::Pending,
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = JobStore::open_in_memory().unwrap();
        store.save_jobs(&[job(1)]).unwrap();
        let loaded = store.load_jobs().unwrap();
        assert_eq!(loaded, vec![job(1)]);
    }

    #[test]
    fn empty_store_loads_none() {
        let store = JobStore::open_in_memory().unwrap();
        assert!(store.load_jobs().is_none());
    }

    #[test]
    fn save_overwrites_previous_queue() {
        let store = JobStore::open_in_memory().unwrap();
        store.save_jobs(&[job(1)]).unwrap();
        store.save_jobs(&[job(1), job(2)]).unwrap();
        assert_eq!(store.load_jobs().unwrap().len(), 2);
    }

    #[test]
    fn corrupt_payload_loads_none() {
        let store = JobStore::open_in_memory().unwrap();
        {
            let conn = store.conn.borrow();
            conn.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![JOB_QUEUE_KEY, "{not json"],
            )
            .unwrap();
        }
        assert!(store.load_jobs().is_none());
    }

    #[test]
    fn clear_removes_persisted_queue() {
        let store = JobStore::open_in_memory().unwrap();
        store.save_jobs(&[job(1)]).unwrap();
        store.clear_jobs().unwrap();
        assert!(store.load_jobs().is_none());
    }

    #[test]
    fn reload_from_same_file_rehydrates() {
        let dir = std::env::temp_dir().join("cyd-db-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("jobs-{}.sqlite", std::process::id()));
        let _ = std::fs::remove_file(&path);
        {
            let store = JobStore::open(&path).unwrap();
            store.save_jobs(&[job(7)]).unwrap();
        }
        // Simulated reload: a fresh store over the same file.
        let store = JobStore::open(&path).unwrap();
        assert_eq!(store.load_jobs().unwrap(), vec![job(7)]);
        let _ = std::fs::remove_file(&path);
    }
}
