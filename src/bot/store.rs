//! Durable SQLite storage for member role snapshots.

use std::fmt;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, params};

/// The roles a member held in one guild at save time.
///
/// (user_id, guild_id) is the unique key; a later save for the same pair
/// fully replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSnapshot {
    pub user_id: u64,
    pub guild_id: u64,
    pub role_ids: Vec<u64>,
}

/// Errors that can occur when reading or writing snapshots.
#[derive(Debug)]
pub enum StoreError {
    /// No snapshot saved for this (user, guild) pair.
    NotFound,
    /// The backing database could not be opened or queried.
    Unavailable(rusqlite::Error),
    /// A stored record could not be reconstructed.
    Decode(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "no snapshot saved for this member"),
            Self::Unavailable(source) => write!(f, "snapshot store unavailable: {}", source),
            Self::Decode(source) => write!(f, "stored snapshot is malformed: {}", source),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound => None,
            Self::Unavailable(source) => Some(source),
            Self::Decode(source) => Some(source),
        }
    }
}

/// Keyed map of role snapshots over a SQLite file.
///
/// Every call is a direct round trip; there is no caching layer, so a read
/// always reflects the most recently completed save.
pub struct SnapshotStore {
    conn: Mutex<Connection>,
}

impl SnapshotStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(StoreError::Unavailable)?;
        let store = Self { conn: Mutex::new(conn) };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::Unavailable)?;
        let store = Self { conn: Mutex::new(conn) };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS role_snapshots (
                user_id INTEGER NOT NULL,
                guild_id INTEGER NOT NULL,
                role_ids TEXT NOT NULL,
                saved_at TEXT NOT NULL,
                PRIMARY KEY (user_id, guild_id)
            );
            "#,
        )
        .map_err(StoreError::Unavailable)
    }

    /// Upsert a snapshot, fully replacing any previous roles for the key.
    pub fn save(&self, snapshot: &RoleSnapshot) -> Result<(), StoreError> {
        let role_ids = serde_json::to_string(&snapshot.role_ids).map_err(StoreError::Decode)?;
        let saved_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO role_snapshots (user_id, guild_id, role_ids, saved_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![snapshot.user_id as i64, snapshot.guild_id as i64, role_ids, saved_at],
        )
        .map_err(StoreError::Unavailable)?;
        Ok(())
    }

    /// Fetch the snapshot for a member, if one was ever saved.
    pub fn get(&self, user_id: u64, guild_id: u64) -> Result<RoleSnapshot, StoreError> {
        let conn = self.conn.lock().unwrap();
        let raw: String = conn
            .query_row(
                "SELECT role_ids FROM role_snapshots WHERE user_id = ?1 AND guild_id = ?2",
                params![user_id as i64, guild_id as i64],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Unavailable(other),
            })?;

        let role_ids: Vec<u64> = serde_json::from_str(&raw).map_err(StoreError::Decode)?;
        Ok(RoleSnapshot { user_id, guild_id, role_ids })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(user_id: u64, guild_id: u64, role_ids: &[u64]) -> RoleSnapshot {
        RoleSnapshot { user_id, guild_id, role_ids: role_ids.to_vec() }
    }

    #[test]
    fn test_save_get_round_trip() {
        let store = SnapshotStore::in_memory().unwrap();
        let snap = snapshot(100, 200, &[1, 2, 3]);

        store.save(&snap).unwrap();
        assert_eq!(store.get(100, 200).unwrap(), snap);
    }

    #[test]
    fn test_overwrite_last_write_wins() {
        let store = SnapshotStore::in_memory().unwrap();
        store.save(&snapshot(100, 200, &[1, 2])).unwrap();
        store.save(&snapshot(100, 200, &[3])).unwrap();

        assert_eq!(store.get(100, 200).unwrap().role_ids, vec![3]);
    }

    #[test]
    fn test_keys_are_independent() {
        let store = SnapshotStore::in_memory().unwrap();
        store.save(&snapshot(100, 200, &[1])).unwrap();
        store.save(&snapshot(100, 201, &[2])).unwrap();
        store.save(&snapshot(101, 200, &[3])).unwrap();

        assert_eq!(store.get(100, 200).unwrap().role_ids, vec![1]);
        assert_eq!(store.get(100, 201).unwrap().role_ids, vec![2]);
        assert_eq!(store.get(101, 200).unwrap().role_ids, vec![3]);
    }

    #[test]
    fn test_get_unsaved_key_is_not_found() {
        let store = SnapshotStore::in_memory().unwrap();
        assert!(matches!(store.get(100, 200), Err(StoreError::NotFound)));
    }

    #[test]
    fn test_empty_role_set_round_trips() {
        let store = SnapshotStore::in_memory().unwrap();
        store.save(&snapshot(100, 200, &[])).unwrap();
        assert!(store.get(100, 200).unwrap().role_ids.is_empty());
    }

    #[test]
    fn test_malformed_record_is_decode_error() {
        let store = SnapshotStore::in_memory().unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO role_snapshots (user_id, guild_id, role_ids, saved_at)
                 VALUES (100, 200, 'not json', '')",
                [],
            )
            .unwrap();
        }

        assert!(matches!(store.get(100, 200), Err(StoreError::Decode(_))));
    }
}
