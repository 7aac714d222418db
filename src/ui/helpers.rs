use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Span;

use crate::models::PitchFlags;

/// Render the set flags as compact badges for a history card. Returns an
/// empty list when no flag is set so callers can skip the line entirely.
pub(crate) fn flag_badges(flags: &PitchFlags) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for label in flags.active_labels() {
        if !spans.is_empty() {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!("[{label}]"),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn badges_cover_only_set_flags() {
        let flags = PitchFlags {
            fps: true,
            lom: true,
            ..PitchFlags::default()
        };
        let text: String = flag_badges(&flags)
            .iter()
            .map(|span| span.content.clone().into_owned())
            .collect();
        assert_eq!(text, "[FPS] [LOM]");
        assert!(flag_badges(&PitchFlags::default()).is_empty());
    }

    #[test]
    fn surface_error_prefers_the_root_cause() {
        let err = anyhow!("disk unplugged")
            .context("failed to write export")
            .context("export failed");
        assert_eq!(surface_error(&err), "disk unplugged");
    }
}
