//! SQLite-based persistence.
//!
//! Provides:
//! - A key-value store for application state. The whole reminder engine
//!   (store included) is serialized as one JSON blob under a single key
//!   and rewritten after every mutation -- write-through, no transaction
//!   spanning the in-memory change and the persisted one.
//! - An append-only history of engine events for the caregiver activity
//!   view, with simple daily/all-time counts.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::ReminderEngine;
use crate::error::StorageError;

use super::data_dir;

/// kv key the serialized engine lives under.
pub const ENGINE_KEY: &str = "reminder_engine";

/// One row of the event history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub reminder_id: String,
    pub title: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_fired: u64,
    pub total_missed: u64,
    pub total_alerts: u64,
    pub today_fired: u64,
    pub today_missed: u64,
}

/// SQLite database for engine state and event history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/carepulse/carepulse.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self, crate::error::CoreError> {
        let path = data_dir()?.join("carepulse.db");
        let conn = Connection::open(&path).map_err(|source| StorageError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate().map_err(StorageError::from)?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS events (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                event_type  TEXT NOT NULL,
                reminder_id TEXT NOT NULL DEFAULT '',
                title       TEXT NOT NULL DEFAULT '',
                at          TEXT NOT NULL
            );",
        )
    }

    // ── Key-value store ──────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM kv WHERE key = ?1")
            .map_err(StorageError::from)?;
        let mut rows = stmt.query(params![key]).map_err(StorageError::from)?;
        match rows.next().map_err(StorageError::from)? {
            Some(row) => Ok(Some(row.get(0).map_err(StorageError::from)?)),
            None => Ok(None),
        }
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(StorageError::from)?;
        Ok(())
    }

    // ── Engine persistence ───────────────────────────────────────────

    /// Load the persisted engine, falling back to the given default when
    /// the blob is absent or fails to parse. A parse failure is logged,
    /// never fatal.
    pub fn load_engine(&self, default: impl FnOnce() -> ReminderEngine) -> ReminderEngine {
        match self.kv_get(ENGINE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(engine) => engine,
                Err(e) => {
                    warn!("discarding unparseable engine state: {e}");
                    default()
                }
            },
            Ok(None) => default(),
            Err(e) => {
                warn!("failed to read engine state: {e}");
                default()
            }
        }
    }

    /// Persist the engine as one JSON blob.
    pub fn save_engine(&self, engine: &ReminderEngine) -> Result<(), crate::error::CoreError> {
        let json = serde_json::to_string(engine)?;
        self.kv_set(ENGINE_KEY, &json)?;
        Ok(())
    }

    // ── Event history ────────────────────────────────────────────────

    pub fn record_event(
        &self,
        event_type: &str,
        reminder_id: &str,
        title: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO events (event_type, reminder_id, title, at) VALUES (?1, ?2, ?3, ?4)",
                params![event_type, reminder_id, title, at.to_rfc3339()],
            )
            .map_err(StorageError::from)?;
        Ok(())
    }

    pub fn recent_events(&self, limit: u32) -> Result<Vec<EventRecord>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, event_type, reminder_id, title, at
                 FROM events ORDER BY id DESC LIMIT ?1",
            )
            .map_err(StorageError::from)?;
        let rows = stmt
            .query_map(params![limit], |row| {
                let at: String = row.get(4)?;
                Ok(EventRecord {
                    id: row.get(0)?,
                    event_type: row.get(1)?,
                    reminder_id: row.get(2)?,
                    title: row.get(3)?,
                    at: DateTime::parse_from_rfc3339(&at)
                        .map(|t| t.with_timezone(&Utc))
                        .unwrap_or_else(|e| {
                            warn!("event row has unparseable timestamp {at:?}: {e}");
                            Utc::now()
                        }),
                })
            })
            .map_err(StorageError::from)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
    }

    pub fn stats(&self, now: DateTime<Utc>) -> Result<Stats, StorageError> {
        let count = |sql: &str, args: &[&dyn rusqlite::ToSql]| -> Result<u64, StorageError> {
            self.conn
                .query_row(sql, args, |row| row.get::<_, i64>(0))
                .map(|n| n as u64)
                .map_err(StorageError::from)
        };
        let today_prefix = format!("{}%", now.format("%Y-%m-%d"));
        Ok(Stats {
            total_fired: count(
                "SELECT COUNT(*) FROM events WHERE event_type = 'fired'",
                &[],
            )?,
            total_missed: count(
                "SELECT COUNT(*) FROM events WHERE event_type = 'missed'",
                &[],
            )?,
            total_alerts: count(
                "SELECT COUNT(*) FROM events WHERE event_type = 'alert'",
                &[],
            )?,
            today_fired: count(
                "SELECT COUNT(*) FROM events WHERE event_type = 'fired' AND at LIKE ?1",
                &[&today_prefix],
            )?,
            today_missed: count(
                "SELECT COUNT(*) FROM events WHERE event_type = 'missed' AND at LIKE ?1",
                &[&today_prefix],
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::reminder::{Priority, Reminder, ReminderCategory};
    use chrono::TimeZone;

    #[test]
    fn kv_roundtrip() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "again").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "again");
    }

    #[test]
    fn engine_roundtrip() {
        let db = Database::open_memory().unwrap();
        let mut engine = ReminderEngine::new(EngineConfig::default());
        let t = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
        engine
            .store_mut()
            .add(Reminder::new(
                "Meds",
                "Take morning pills",
                ReminderCategory::Medication,
                t,
                Priority::High,
            ))
            .unwrap();
        db.save_engine(&engine).unwrap();

        let loaded = db.load_engine(ReminderEngine::default);
        assert_eq!(loaded.store().reminders(), engine.store().reminders());
    }

    #[test]
    fn unparseable_engine_falls_back_to_default() {
        let db = Database::open_memory().unwrap();
        db.kv_set(ENGINE_KEY, "not json {").unwrap();
        let loaded = db.load_engine(ReminderEngine::default);
        assert!(loaded.store().reminders().is_empty());
    }

    #[test]
    fn event_history_and_stats() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_event("fired", "r1", "Meds", now).unwrap();
        db.record_event("missed", "r2", "Lunch", now).unwrap();
        db.record_event("alert", "r2", "Missed Reminder", now).unwrap();

        let recent = db.recent_events(10).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].event_type, "alert");

        let stats = db.stats(now).unwrap();
        assert_eq!(stats.total_fired, 1);
        assert_eq!(stats.total_missed, 1);
        assert_eq!(stats.total_alerts, 1);
        assert_eq!(stats.today_fired, 1);
    }

    #[test]
    fn event_with_garbage_timestamp_is_still_listed() {
        let db = Database::open_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO events (event_type, reminder_id, title, at)
                 VALUES ('fired', 'r1', 'Meds', 'not-a-time')",
                [],
            )
            .unwrap();

        let recent = db.recent_events(10).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].event_type, "fired");
    }
}
