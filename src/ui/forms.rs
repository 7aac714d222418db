use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{FLAG_LABELS, PitchFlags};

/// Pitch classifications offered by the record form. The store accepts any
/// non-empty string; this closed vocabulary is a UI constraint only.
pub(crate) const PITCH_TYPES: &[&str] = &["Fastball", "Curveball", "Slider", "Changeup"];
/// Pitch outcomes offered by the record form, same openness as the types.
pub(crate) const PITCH_RESULTS: &[&str] =
    &["In Play No Out", "Called Strike", "Swinging Strike", "Ball"];

/// Fields available within the record form, in tab order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum PitchField {
    Type,
    Result,
    Speed,
    Time,
    Flags,
}

impl Default for PitchField {
    fn default() -> Self {
        PitchField::Type
    }
}

/// Internal representation of the record form. The two choice fields start
/// unselected so an accidental Enter cannot record a half-filled pitch, and
/// the numeric fields filter input as the user types instead of validating
/// after the fact.
#[derive(Default, Clone)]
pub(crate) struct PitchForm {
    pub(crate) pitch_type: Option<usize>,
    pub(crate) pitch_result: Option<usize>,
    pub(crate) speed: String,
    pub(crate) time: String,
    pub(crate) flags: PitchFlags,
    pub(crate) active: PitchField,
    pub(crate) flag_cursor: usize,
    pub(crate) error: Option<String>,
}

impl PitchForm {
    /// Move focus to the next field in tab order.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            PitchField::Type => PitchField::Result,
            PitchField::Result => PitchField::Speed,
            PitchField::Speed => PitchField::Time,
            PitchField::Time => PitchField::Flags,
            PitchField::Flags => PitchField::Type,
        };
    }

    /// Move focus to the previous field in tab order.
    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            PitchField::Type => PitchField::Flags,
            PitchField::Result => PitchField::Type,
            PitchField::Speed => PitchField::Result,
            PitchField::Time => PitchField::Speed,
            PitchField::Flags => PitchField::Time,
        };
    }

    /// Left/Right within the active field: cycle a choice or move the flag
    /// cursor. No-op on the free-text fields.
    pub(crate) fn adjust(&mut self, delta: isize) {
        match self.active {
            PitchField::Type => {
                self.pitch_type = cycle_choice(self.pitch_type, PITCH_TYPES.len(), delta);
            }
            PitchField::Result => {
                self.pitch_result = cycle_choice(self.pitch_result, PITCH_RESULTS.len(), delta);
            }
            PitchField::Flags => {
                let len = FLAG_LABELS.len() as isize;
                self.flag_cursor = (self.flag_cursor as isize + delta).rem_euclid(len) as usize;
            }
            PitchField::Speed | PitchField::Time => {}
        }
    }

    /// Flip the flag under the cursor. Only meaningful while the flag row has
    /// focus; returns whether anything changed.
    pub(crate) fn toggle_flag(&mut self) -> bool {
        if self.active != PitchField::Flags {
            return false;
        }
        self.toggle_flag_at(self.flag_cursor)
    }

    fn toggle_flag_at(&mut self, index: usize) -> bool {
        let slot = match index {
            0 => &mut self.flags.fps,
            1 => &mut self.flags.f2ps,
            2 => &mut self.flags.csoop,
            3 => &mut self.flags.lom,
            _ => return false,
        };
        *slot = !*slot;
        true
    }

    /// Append a character to the active field, validating allowed input. The
    /// numeric fields replicate the original digit-only and
    /// single-decimal-point filters; the choice fields accept their option
    /// number as a shortcut. Returns whether the character was consumed so
    /// unhandled keys can fall through to screen shortcuts.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            PitchField::Type => select_by_digit(ch, PITCH_TYPES.len())
                .map(|idx| self.pitch_type = Some(idx))
                .is_some(),
            PitchField::Result => select_by_digit(ch, PITCH_RESULTS.len())
                .map(|idx| self.pitch_result = Some(idx))
                .is_some(),
            PitchField::Speed => {
                if ch.is_ascii_digit() {
                    self.speed.push(ch);
                    true
                } else {
                    false
                }
            }
            PitchField::Time => {
                if ch.is_ascii_digit() {
                    self.time.push(ch);
                    true
                } else if ch == '.' && !self.time.contains('.') {
                    self.time.push(ch);
                    true
                } else {
                    false
                }
            }
            PitchField::Flags => match select_by_digit(ch, FLAG_LABELS.len()) {
                Some(idx) => self.toggle_flag_at(idx),
                None => false,
            },
        }
    }

    /// Remove the last character from the active field, or clear the active
    /// choice back to unselected.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            PitchField::Type => self.pitch_type = None,
            PitchField::Result => self.pitch_result = None,
            PitchField::Speed => {
                self.speed.pop();
            }
            PitchField::Time => {
                self.time.pop();
            }
            PitchField::Flags => {}
        }
    }

    /// Validate the inputs and return typed values ready for persistence:
    /// `(pitch_type, pitch_result, speed_mph, time_to_plate)`. The flags need
    /// no validation and are read straight off the form.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String, Option<i64>, Option<f64>)> {
        let pitch_type = self
            .pitch_type
            .and_then(|idx| PITCH_TYPES.get(idx))
            .ok_or_else(|| anyhow!("Please select a pitch type."))?;
        let pitch_result = self
            .pitch_result
            .and_then(|idx| PITCH_RESULTS.get(idx))
            .ok_or_else(|| anyhow!("Please select a pitch result."))?;

        let speed_raw = self.speed.trim();
        let speed_mph = if speed_raw.is_empty() {
            None
        } else {
            Some(
                speed_raw
                    .parse::<i64>()
                    .context("MPH must be a whole number.")?,
            )
        };

        let time_raw = self.time.trim();
        let time_to_plate = if time_raw.is_empty() {
            None
        } else {
            Some(time_raw.parse::<f64>().context("TTP must be a number.")?)
        };

        Ok((
            pitch_type.to_string(),
            pitch_result.to_string(),
            speed_mph,
            time_to_plate,
        ))
    }

    /// Reset every field to its default, ready for the next pitch.
    pub(crate) fn clear(&mut self) {
        *self = PitchForm::default();
    }

    /// Render a choice field as a single line for the form widget.
    pub(crate) fn build_choice_line(&self, field_name: &str, field: PitchField) -> Line<'static> {
        let (options, selection): (&[&str], Option<usize>) = match field {
            PitchField::Type => (PITCH_TYPES, self.pitch_type),
            PitchField::Result => (PITCH_RESULTS, self.pitch_result),
            _ => (&[], None),
        };
        let is_active = self.active == field;

        let display = selection
            .and_then(|idx| options.get(idx))
            .map(|value| (*value).to_string());

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if display.is_none() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display.unwrap_or_else(|| "<required>".to_string()), style),
        ])
    }

    /// Render one of the numeric input fields for the form widget.
    pub(crate) fn build_input_line(&self, field_name: &str, field: PitchField) -> Line<'static> {
        let value = match field {
            PitchField::Speed => &self.speed,
            PitchField::Time => &self.time,
            _ => return Line::from(""),
        };
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<optional>".to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Render the flag toggle row, highlighting the cursor position while the
    /// row has focus.
    pub(crate) fn build_flags_line(&self) -> Line<'static> {
        let row_active = self.active == PitchField::Flags;
        let set = [
            self.flags.fps,
            self.flags.f2ps,
            self.flags.csoop,
            self.flags.lom,
        ];

        let mut spans = vec![Span::raw("Flags: ")];
        for (idx, (label, on)) in FLAG_LABELS.iter().zip(set).enumerate() {
            let marker = if on { "[x]" } else { "[ ]" };
            let mut style = Style::default();
            if row_active && idx == self.flag_cursor {
                style = style.fg(Color::Yellow);
            } else if on {
                style = style.fg(Color::Green);
            } else {
                style = style.fg(Color::DarkGray);
            }
            spans.push(Span::styled(format!("{marker} {label}"), style));
            if idx + 1 < FLAG_LABELS.len() {
                spans.push(Span::raw("   "));
            }
        }
        Line::from(spans)
    }

    /// Character count for the requested input field, used to position the
    /// cursor in the draw pass.
    pub(crate) fn value_len(&self, field: PitchField) -> usize {
        match field {
            PitchField::Speed => self.speed.chars().count(),
            PitchField::Time => self.time.chars().count(),
            _ => 0,
        }
    }
}

/// Cycle an optional selection through `len` options, entering the list from
/// either end when nothing is selected yet.
fn cycle_choice(current: Option<usize>, len: usize, delta: isize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let next = match current {
        Some(idx) => (idx as isize + delta).rem_euclid(len as isize) as usize,
        None if delta >= 0 => 0,
        None => len - 1,
    };
    Some(next)
}

/// Map a digit key to a zero-based option index, if it is in range.
fn select_by_digit(ch: char, len: usize) -> Option<usize> {
    let digit = ch.to_digit(10)? as usize;
    if (1..=len).contains(&digit) {
        Some(digit - 1)
    } else {
        None
    }
}

/// State carried by the delete-all confirmation dialog.
pub(crate) struct ConfirmDeleteAll {
    pub(crate) count: usize,
}
