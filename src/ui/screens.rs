use crate::models::PitchRecord;

/// State for the pitch history list: the full record set as loaded from the
/// store plus the filtered view the list actually renders.
pub(crate) struct HistoryScreen {
    pub(crate) pitches: Vec<PitchRecord>,
    pub(crate) filtered: Vec<PitchRecord>,
    pub(crate) filter: Option<String>,
    pub(crate) selected: usize,
}

impl HistoryScreen {
    pub(crate) fn new(pitches: Vec<PitchRecord>) -> Self {
        let mut screen = Self {
            filtered: Vec::new(),
            pitches,
            filter: None,
            selected: 0,
        };
        screen.apply_filter();
        screen
    }

    /// Rebuild the filtered view. The query matches case-insensitively
    /// against both the pitch type and the result.
    pub(crate) fn apply_filter(&mut self) {
        self.filtered = if let Some(query) = &self.filter {
            let ql = query.to_lowercase();
            if ql.trim().is_empty() {
                self.pitches.clone()
            } else {
                self.pitches
                    .iter()
                    .filter(|p| {
                        p.pitch_type.to_lowercase().contains(&ql)
                            || p.pitch_result.to_lowercase().contains(&ql)
                    })
                    .cloned()
                    .collect()
            }
        } else {
            self.pitches.clone()
        };

        if self.filtered.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len() - 1;
        }
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter;
        self.apply_filter();
    }

    /// Replace the backing record set, e.g. after a delete-all.
    pub(crate) fn set_pitches(&mut self, pitches: Vec<PitchRecord>) {
        self.pitches = pitches;
        self.apply_filter();
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.filtered.is_empty() {
            return;
        }
        let len = self.filtered.len() as isize;
        let mut new = self.selected as isize + offset;
        if new < 0 {
            new = 0;
        }
        if new >= len {
            new = len - 1;
        }
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        if !self.filtered.is_empty() {
            self.selected = 0;
        }
    }

    pub(crate) fn select_last(&mut self) {
        if !self.filtered.is_empty() {
            self.selected = self.filtered.len() - 1;
        }
    }

    /// Total number of recorded pitches, ignoring any active filter.
    pub(crate) fn total(&self) -> usize {
        self.pitches.len()
    }

    pub(crate) fn has_filter(&self) -> bool {
        self.filter
            .as_ref()
            .map(|q| !q.trim().is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::PitchFlags;

    fn record(id: i64, pitch_type: &str, pitch_result: &str) -> PitchRecord {
        PitchRecord {
            id,
            timestamp: NaiveDate::from_ymd_opt(2026, 5, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            pitch_type: pitch_type.to_string(),
            pitch_result: pitch_result.to_string(),
            speed_mph: None,
            time_to_plate: None,
            flags: PitchFlags::default(),
        }
    }

    #[test]
    fn filter_matches_type_and_result() {
        let mut screen = HistoryScreen::new(vec![
            record(1, "Fastball", "Ball"),
            record(2, "Curveball", "Called Strike"),
            record(3, "Slider", "Swinging Strike"),
        ]);

        screen.set_filter(Some("strike".to_string()));
        assert_eq!(screen.filtered.len(), 2);

        screen.set_filter(Some("fast".to_string()));
        assert_eq!(screen.filtered.len(), 1);
        assert_eq!(screen.filtered[0].id, 1);

        screen.set_filter(None);
        assert_eq!(screen.filtered.len(), 3);
        assert_eq!(screen.total(), 3);
    }

    #[test]
    fn selection_stays_in_bounds_when_the_filter_shrinks_the_list() {
        let mut screen = HistoryScreen::new(vec![
            record(1, "Fastball", "Ball"),
            record(2, "Curveball", "Ball"),
            record(3, "Slider", "Ball"),
        ]);
        screen.select_last();
        assert_eq!(screen.selected, 2);

        screen.set_filter(Some("curve".to_string()));
        assert_eq!(screen.filtered.len(), 1);
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn selection_clamps_at_both_ends() {
        let mut screen = HistoryScreen::new(vec![
            record(1, "Fastball", "Ball"),
            record(2, "Curveball", "Ball"),
        ]);
        screen.move_selection(-3);
        assert_eq!(screen.selected, 0);
        screen.move_selection(10);
        assert_eq!(screen.selected, 1);
    }
}
