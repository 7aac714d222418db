//! CSV export of the full pitch log. The column layout and value rendering
//! are kept byte-compatible with earlier exports so spreadsheets built on top
//! of them keep working: absent measurements become empty fields, TTP keeps
//! two decimals, and flags render as literal Yes/No.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use directories::BaseDirs;
use rusqlite::Connection;

use crate::db::fetch_pitches;
use crate::models::PitchRecord;

/// Fixed header row. MPH and TTP are historical labels for the speed and
/// time-to-plate columns and must not be renamed.
const EXPORT_HEADER: &str = "ID,Timestamp,Pitch Type,Pitch Result,MPH,TTP,FPS,F2PS,CSOOP,LOM";
/// Timestamp embedded in export file names. Second granularity is enough to
/// keep user-triggered exports distinct.
const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
/// Folder name for exports beneath the user's home directory, kept separate
/// from the database file.
const EXPORT_DIR_NAME: &str = ".pitch-tracker/exports";

/// Serialize every stored pitch into `pitch_data_<stamp>.csv` inside `dir`
/// and return the written file's path. Rows appear in store order (newest
/// first). Any storage or I/O failure surfaces as an error and leaves the
/// database untouched.
pub fn export_to_csv(conn: &Connection, dir: &Path) -> Result<PathBuf> {
    let pitches = fetch_pitches(conn)?;

    let mut csv = String::from(EXPORT_HEADER);
    csv.push('\n');
    for pitch in &pitches {
        csv.push_str(&csv_line(pitch));
        csv.push('\n');
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let stamp = Local::now().format(FILE_STAMP_FORMAT);
    let path = dir.join(format!("pitch_data_{stamp}.csv"));
    fs::write(&path, csv).with_context(|| format!("failed to write {}", path.display()))?;

    Ok(path)
}

/// Resolve the default export directory inside the user's home.
pub fn default_export_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(EXPORT_DIR_NAME))
}

/// Render one record as a CSV data line, fields in header order.
fn csv_line(pitch: &PitchRecord) -> String {
    let speed = pitch
        .speed_mph
        .map(|mph| mph.to_string())
        .unwrap_or_default();
    let time = pitch
        .time_to_plate
        .map(|ttp| format!("{ttp:.2}"))
        .unwrap_or_default();

    [
        Cow::Owned(pitch.id.to_string()),
        Cow::Owned(pitch.formatted_timestamp()),
        csv_field(&pitch.pitch_type),
        csv_field(&pitch.pitch_result),
        Cow::Owned(speed),
        Cow::Owned(time),
        Cow::Borrowed(yes_no(pitch.flags.fps)),
        Cow::Borrowed(yes_no(pitch.flags.f2ps)),
        Cow::Borrowed(yes_no(pitch.flags.csoop)),
        Cow::Borrowed(yes_no(pitch.flags.lom)),
    ]
    .join(",")
}

/// Quote a text field if it contains a delimiter, quote, or line break. The
/// record form's closed vocabulary never triggers this, but the store accepts
/// arbitrary non-empty strings, so the exporter cannot assume clean input.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use tempfile::{tempdir, TempDir};

    use super::*;
    use crate::db::{fetch_pitches, open_store, record_pitch};
    use crate::models::PitchFlags;

    fn open_temp_store() -> (TempDir, Connection) {
        let dir = tempdir().expect("tempdir");
        let conn = open_store(&dir.path().join("pitches.sqlite3")).expect("open store");
        (dir, conn)
    }

    #[test]
    fn export_renders_header_then_newest_record_first() {
        let (dir, conn) = open_temp_store();

        record_pitch(
            &conn,
            "Fastball",
            "Called Strike",
            Some(92),
            Some(0.41),
            PitchFlags {
                fps: true,
                ..PitchFlags::default()
            },
        )
        .expect("first record");
        record_pitch(&conn, "Curveball", "Ball", None, None, PitchFlags::default())
            .expect("second record");

        let exports = dir.path().join("exports");
        let path = export_to_csv(&conn, &exports).expect("export");
        let contents = fs::read_to_string(&path).expect("read export");
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], EXPORT_HEADER);

        let pitches = fetch_pitches(&conn).expect("fetch");
        assert_eq!(
            lines[1],
            format!(
                "2,{},Curveball,Ball,,,No,No,No,No",
                pitches[0].formatted_timestamp()
            )
        );
        assert_eq!(
            lines[2],
            format!(
                "1,{},Fastball,Called Strike,92,0.41,Yes,No,No,No",
                pitches[1].formatted_timestamp()
            )
        );
    }

    #[test]
    fn export_of_empty_store_is_just_the_header() {
        let (dir, conn) = open_temp_store();

        let path = export_to_csv(&conn, &dir.path().join("exports")).expect("export");
        let contents = fs::read_to_string(&path).expect("read export");
        assert_eq!(contents, format!("{EXPORT_HEADER}\n"));
    }

    #[test]
    fn export_file_name_embeds_a_stamp() {
        let (dir, conn) = open_temp_store();

        let path = export_to_csv(&conn, &dir.path().join("exports")).expect("export");
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("pitch_data_"));
        assert!(name.ends_with(".csv"));
        // "pitch_data_" + YYYYMMdd_HHmmss + ".csv"
        assert_eq!(name.len(), "pitch_data_".len() + 15 + ".csv".len());
    }

    #[test]
    fn unwritable_destination_fails_and_keeps_the_database() {
        let (dir, conn) = open_temp_store();

        record_pitch(&conn, "Slider", "Ball", None, None, PitchFlags::default())
            .expect("record");

        // A plain file where the export directory should go makes every write
        // under it fail.
        let blocked = dir.path().join("blocked");
        fs::write(&blocked, b"not a directory").expect("write blocker");

        assert!(export_to_csv(&conn, &blocked).is_err());
        assert_eq!(fetch_pitches(&conn).expect("fetch").len(), 1);
    }

    #[test]
    fn embedded_delimiters_are_quoted() {
        assert_eq!(csv_field("Fastball"), "Fastball");
        assert_eq!(csv_field("looks, weird"), "\"looks, weird\"");
        assert_eq!(csv_field("he said \"go\""), "\"he said \"\"go\"\"\"");
    }
}
