//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. The intent is that these types stay light-weight data holders so other
//! layers can focus on presentation and persistence logic. Keeping the
//! commentary here means later refactors can reconstruct the assumptions even
//! if other context is lost.

use chrono::NaiveDateTime;

/// Render format shared by the history list, the CSV export, and the stored
/// `timestamp` column itself. Storing the same text we render keeps SQLite's
/// lexicographic ordering identical to chronological ordering.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Labels for the four situational flags, in schema column order. The CSV
/// header and the record form both rely on this ordering.
pub const FLAG_LABELS: [&str; 4] = ["FPS", "F2PS", "CSOOP", "LOM"];

/// The four independent situational flags attached to every pitch. They are
/// plain booleans rather than an enum because any combination is legal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PitchFlags {
    /// First-pitch strike.
    pub fps: bool,
    /// First-two-pitch strikes.
    pub f2ps: bool,
    /// Called strike out of the zone.
    pub csoop: bool,
    /// Location on the mitt.
    pub lom: bool,
}

impl PitchFlags {
    /// Labels of the flags that are currently set, in column order. The
    /// history view renders these as badges.
    pub fn active_labels(&self) -> Vec<&'static str> {
        let set = [self.fps, self.f2ps, self.csoop, self.lom];
        FLAG_LABELS
            .iter()
            .zip(set)
            .filter_map(|(label, on)| on.then_some(*label))
            .collect()
    }
}

#[derive(Debug, Clone)]
/// In-memory representation of one recorded pitch, mirroring a row in the
/// `pitches` table. Records are immutable after insert; there is no update
/// flow anywhere in the application.
pub struct PitchRecord {
    /// Primary key from the SQLite store. Assigned by the database, strictly
    /// increasing, never reused.
    pub id: i64,
    /// Local time at which the pitch was recorded. Assigned by the store at
    /// insert; callers never supply it.
    pub timestamp: NaiveDateTime,
    /// Classification, e.g. "Fastball". The store accepts any non-empty
    /// string; the record form constrains the vocabulary.
    pub pitch_type: String,
    /// Outcome, e.g. "Called Strike". Same openness as `pitch_type`.
    pub pitch_result: String,
    /// Measured velocity in miles per hour. Absence is distinct from zero.
    pub speed_mph: Option<i64>,
    /// Time to plate in seconds. Absence is distinct from zero.
    pub time_to_plate: Option<f64>,
    /// Situational flags, all defaulting to false.
    pub flags: PitchFlags,
}

impl PitchRecord {
    /// Compose a `Type - Result` string. Lists and status messages rely on
    /// this ready-to-use formatting.
    pub fn summary(&self) -> String {
        format!("{} - {}", self.pitch_type, self.pitch_result)
    }

    /// The timestamp rendered the way both the history view and the CSV
    /// export present it.
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Human-readable measurement line, or `None` when neither measurement
    /// was captured. TTP keeps two decimals to match the export rendering.
    pub fn measurement_summary(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(mph) = self.speed_mph {
            parts.push(format!("{mph} mph"));
        }
        if let Some(ttp) = self.time_to_plate {
            parts.push(format!("TTP {ttp:.2}s"));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("  "))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn sample_record() -> PitchRecord {
        PitchRecord {
            id: 7,
            timestamp: NaiveDate::from_ymd_opt(2026, 4, 12)
                .unwrap()
                .and_hms_opt(18, 5, 9)
                .unwrap(),
            pitch_type: "Slider".to_string(),
            pitch_result: "Swinging Strike".to_string(),
            speed_mph: Some(84),
            time_to_plate: Some(0.435),
            flags: PitchFlags {
                fps: true,
                f2ps: false,
                csoop: true,
                lom: false,
            },
        }
    }

    #[test]
    fn summary_joins_type_and_result() {
        assert_eq!(sample_record().summary(), "Slider - Swinging Strike");
    }

    #[test]
    fn timestamp_renders_zero_padded() {
        assert_eq!(sample_record().formatted_timestamp(), "2026-04-12 18:05:09");
    }

    #[test]
    fn measurement_summary_keeps_two_decimals() {
        assert_eq!(
            sample_record().measurement_summary().as_deref(),
            Some("84 mph  TTP 0.43s")
        );
    }

    #[test]
    fn measurement_summary_absent_when_nothing_measured() {
        let mut record = sample_record();
        record.speed_mph = None;
        record.time_to_plate = None;
        assert!(record.measurement_summary().is_none());
    }

    #[test]
    fn active_labels_follow_column_order() {
        let flags = PitchFlags {
            fps: true,
            f2ps: false,
            csoop: true,
            lom: true,
        };
        assert_eq!(flags.active_labels(), vec!["FPS", "CSOOP", "LOM"]);
        assert!(PitchFlags::default().active_labels().is_empty());
    }
}
