use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use rusqlite::Connection;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".pitch-tracker";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "pitches.sqlite3";

/// Open the database at `db_path`, creating the file and the `pitches` table
/// on first use. The schema creation is `IF NOT EXISTS`, so reopening an
/// existing store never fails, never duplicates the table, and never drops
/// rows. The path is a parameter so tests can point each store at a scratch
/// location instead of the shared file in the user's home.
pub fn open_store(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(db_path).context("failed to open SQLite database")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS pitches (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            pitch_type TEXT NOT NULL,
            pitch_result TEXT NOT NULL,
            speed_mph INTEGER,
            time_to_plate REAL,
            fps INTEGER NOT NULL DEFAULT 0,
            f2ps INTEGER NOT NULL DEFAULT 0,
            csoop INTEGER NOT NULL DEFAULT 0,
            lom INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )
    .context("failed to create pitches table")?;

    Ok(conn)
}

/// Resolve the absolute path to the SQLite database inside the user's home.
pub fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::db::{fetch_pitches, record_pitch};
    use crate::models::PitchFlags;

    #[test]
    fn open_store_creates_missing_parent_directories() {
        let dir = tempdir().expect("tempdir");
        let db_path = dir.path().join("nested").join("deeper").join("pitches.sqlite3");

        let conn = open_store(&db_path).expect("open store");
        assert!(db_path.exists());
        assert!(fetch_pitches(&conn).expect("fetch").is_empty());
    }

    #[test]
    fn reopening_the_same_store_keeps_existing_rows() {
        let dir = tempdir().expect("tempdir");
        let db_path = dir.path().join("pitches.sqlite3");

        let conn = open_store(&db_path).expect("first open");
        record_pitch(
            &conn,
            "Fastball",
            "Ball",
            Some(90),
            None,
            PitchFlags::default(),
        )
        .expect("record");
        drop(conn);

        let conn = open_store(&db_path).expect("second open");
        let pitches = fetch_pitches(&conn).expect("fetch");
        assert_eq!(pitches.len(), 1);
        assert_eq!(pitches[0].pitch_type, "Fastball");
    }
}
