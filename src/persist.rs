use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::store::Dataset;

/// The whole dataset lives as one JSON blob under this key, mirroring the
/// single-key layout the UI relied on before this daemon existed.
pub const DATA_KEY: &str = "dorm-attendance-data";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("dormtrack.sqlite3");
    let conn = Connection::open(db_path)?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;
    Ok(conn)
}

pub fn kv_set(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO kv(key, value) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value),
    )?;
    Ok(())
}

pub fn kv_get(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?", [key], |r| r.get(0))
        .optional()?;
    Ok(value)
}

/// Persists the dataset. A failed write is logged and swallowed: losing one
/// save must never take the UI flow down with it.
pub fn save_dataset(conn: &Connection, data: &Dataset) {
    let result = serde_json::to_string(data)
        .map_err(anyhow::Error::from)
        .and_then(|json| kv_set(conn, DATA_KEY, &json));
    if let Err(e) = result {
        log::error!("failed to persist dataset: {e}");
    }
}

/// Loads the dataset, falling back to the empty one when the key is absent
/// or the stored blob no longer parses.
pub fn load_dataset(conn: &Connection) -> Dataset {
    match kv_get(conn, DATA_KEY) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("stored dataset is corrupt, starting empty: {e}");
                Dataset::default()
            }
        },
        Ok(None) => Dataset::default(),
        Err(e) => {
            log::warn!("failed to read stored dataset, starting empty: {e}");
            Dataset::default()
        }
    }
}
