use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Error as SqlError, Row};
use thiserror::Error;

use crate::models::{PitchFlags, PitchRecord, TIMESTAMP_FORMAT};

/// Input problems caught before anything touches the database. The UI shows
/// these messages verbatim in the record form, so they are phrased for users.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PitchValidation {
    #[error("Pitch type is required.")]
    MissingPitchType,
    #[error("Pitch result is required.")]
    MissingPitchResult,
}

/// Append one pitch observation. The store assigns both the id and the
/// timestamp; callers never supply either. The insert is a single statement,
/// so a failure leaves no partial row behind. We echo the hydrated record so
/// the caller can update in-memory state without re-querying.
pub fn record_pitch(
    conn: &Connection,
    pitch_type: &str,
    pitch_result: &str,
    speed_mph: Option<i64>,
    time_to_plate: Option<f64>,
    flags: PitchFlags,
) -> Result<PitchRecord> {
    let pitch_type = pitch_type.trim();
    if pitch_type.is_empty() {
        return Err(PitchValidation::MissingPitchType.into());
    }
    let pitch_result = pitch_result.trim();
    if pitch_result.is_empty() {
        return Err(PitchValidation::MissingPitchResult.into());
    }

    // Format first and parse back so the returned record carries exactly the
    // second-granularity timestamp that was persisted.
    let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    let timestamp = NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT)
        .context("failed to parse freshly formatted timestamp")?;

    conn.execute(
        "INSERT INTO pitches
            (timestamp, pitch_type, pitch_result, speed_mph, time_to_plate, fps, f2ps, csoop, lom)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            stamp,
            pitch_type,
            pitch_result,
            speed_mph,
            time_to_plate,
            flags.fps,
            flags.f2ps,
            flags.csoop,
            flags.lom
        ],
    )
    .context("failed to insert pitch")?;

    let id = conn.last_insert_rowid();
    Ok(PitchRecord {
        id,
        timestamp,
        pitch_type: pitch_type.to_string(),
        pitch_result: pitch_result.to_string(),
        speed_mph,
        time_to_plate,
        flags,
    })
}

/// Retrieve every recorded pitch, newest first. The id breaks ties when two
/// pitches land within the same second, so the ordering stays deterministic.
/// The query doubles as the single source of truth for how the history view
/// and the CSV export order rows.
pub fn fetch_pitches(conn: &Connection) -> Result<Vec<PitchRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, timestamp, pitch_type, pitch_result, speed_mph, time_to_plate,
                    fps, f2ps, csoop, lom
             FROM pitches
             ORDER BY timestamp DESC, id DESC",
        )
        .context("failed to prepare pitch query")?;

    let pitches = stmt
        .query_map([], map_pitch_row)
        .context("failed to iterate pitches")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect pitches")?;

    Ok(pitches)
}

/// Remove every row from the table, returning how many were deleted.
/// Irreversible and unconditional; there is no single-record delete.
pub fn delete_all_pitches(conn: &Connection) -> Result<usize> {
    conn.execute("DELETE FROM pitches", [])
        .context("failed to delete pitches")
}

fn map_pitch_row(row: &Row<'_>) -> rusqlite::Result<PitchRecord> {
    let raw: String = row.get(1)?;
    let timestamp = NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
        .map_err(|err| SqlError::FromSqlConversionFailure(1, Type::Text, Box::new(err)))?;

    Ok(PitchRecord {
        id: row.get(0)?,
        timestamp,
        pitch_type: row.get(2)?,
        pitch_result: row.get(3)?,
        speed_mph: row.get(4)?,
        time_to_plate: row.get(5)?,
        flags: PitchFlags {
            fps: row.get(6)?,
            f2ps: row.get(7)?,
            csoop: row.get(8)?,
            lom: row.get(9)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use tempfile::{tempdir, TempDir};

    use super::*;
    use crate::db::open_store;

    fn open_temp_store() -> (TempDir, Connection) {
        let dir = tempdir().expect("tempdir");
        let conn = open_store(&dir.path().join("pitches.sqlite3")).expect("open store");
        (dir, conn)
    }

    #[test]
    fn recorded_pitch_round_trips_through_fetch() {
        let (_dir, conn) = open_temp_store();

        let recorded = record_pitch(
            &conn,
            "Changeup",
            "In Play No Out",
            Some(78),
            Some(0.52),
            PitchFlags {
                fps: true,
                ..PitchFlags::default()
            },
        )
        .expect("record");

        let pitches = fetch_pitches(&conn).expect("fetch");
        assert_eq!(pitches.len(), 1);
        let fetched = &pitches[0];
        assert_eq!(fetched.id, recorded.id);
        assert_eq!(fetched.timestamp, recorded.timestamp);
        assert_eq!(fetched.pitch_type, "Changeup");
        assert_eq!(fetched.pitch_result, "In Play No Out");
        assert_eq!(fetched.speed_mph, Some(78));
        assert_eq!(fetched.time_to_plate, Some(0.52));
        assert!(fetched.flags.fps);
        assert!(!fetched.flags.f2ps);
    }

    #[test]
    fn newest_pitch_comes_back_first() {
        let (_dir, conn) = open_temp_store();

        record_pitch(&conn, "Fastball", "Ball", None, None, PitchFlags::default())
            .expect("first");
        record_pitch(&conn, "Slider", "Called Strike", None, None, PitchFlags::default())
            .expect("second");

        let pitches = fetch_pitches(&conn).expect("fetch");
        assert_eq!(pitches.len(), 2);
        assert_eq!(pitches[0].pitch_type, "Slider");
        assert_eq!(pitches[1].pitch_type, "Fastball");
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let (_dir, conn) = open_temp_store();

        let mut ids = Vec::new();
        for _ in 0..5 {
            let record =
                record_pitch(&conn, "Curveball", "Ball", None, None, PitchFlags::default())
                    .expect("record");
            ids.push(record.id);
        }

        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0], "ids must strictly increase: {ids:?}");
        }
    }

    #[test]
    fn absent_measurements_never_come_back_as_zero() {
        let (_dir, conn) = open_temp_store();

        record_pitch(&conn, "Fastball", "Ball", Some(92), None, PitchFlags::default())
            .expect("speed only");
        record_pitch(&conn, "Curveball", "Ball", None, Some(0.47), PitchFlags::default())
            .expect("time only");

        let pitches = fetch_pitches(&conn).expect("fetch");
        let speed_only = pitches.iter().find(|p| p.pitch_type == "Fastball").unwrap();
        assert_eq!(speed_only.speed_mph, Some(92));
        assert_eq!(speed_only.time_to_plate, None);

        let time_only = pitches.iter().find(|p| p.pitch_type == "Curveball").unwrap();
        assert_eq!(time_only.speed_mph, None);
        assert_eq!(time_only.time_to_plate, Some(0.47));
    }

    #[test]
    fn blank_type_or_result_is_rejected_before_writing() {
        let (_dir, conn) = open_temp_store();

        let err = record_pitch(&conn, "  ", "Ball", None, None, PitchFlags::default())
            .expect_err("blank type");
        assert_eq!(
            err.downcast_ref::<PitchValidation>(),
            Some(&PitchValidation::MissingPitchType)
        );

        let err = record_pitch(&conn, "Fastball", "", None, None, PitchFlags::default())
            .expect_err("blank result");
        assert_eq!(
            err.downcast_ref::<PitchValidation>(),
            Some(&PitchValidation::MissingPitchResult)
        );

        assert!(fetch_pitches(&conn).expect("fetch").is_empty());
    }

    #[test]
    fn delete_all_leaves_an_empty_store() {
        let (_dir, conn) = open_temp_store();

        for _ in 0..3 {
            record_pitch(&conn, "Fastball", "Ball", None, None, PitchFlags::default())
                .expect("record");
        }

        let deleted = delete_all_pitches(&conn).expect("delete");
        assert_eq!(deleted, 3);
        assert!(fetch_pitches(&conn).expect("fetch").is_empty());

        // Deleting an already-empty store is fine and reports zero rows.
        assert_eq!(delete_all_pitches(&conn).expect("delete again"), 0);
    }
}
