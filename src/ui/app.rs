use std::mem;
use std::path::{Path, PathBuf};

use anyhow::Result;
use crossterm::event::KeyCode;
use open::that as open_path;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;

use crate::db::{delete_all_pitches, fetch_pitches, record_pitch};
use crate::export::export_to_csv;
use crate::models::PitchRecord;

use super::forms::{ConfirmDeleteAll, PitchField, PitchForm};
use super::helpers::{centered_rect, flag_badges, surface_error};
use super::screens::HistoryScreen;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height allocation per pitch card in the history list.
const PITCH_CARD_HEIGHT: u16 = 6;

/// High-level navigation states. Keeping this explicit makes it easy to reason
/// about which rendering path runs and what keyboard shortcuts should do.
enum Screen {
    Record,
    History(HistoryScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    ConfirmDeleteAll(ConfirmDeleteAll),
    ExportComplete { path: PathBuf },
    Searching(SearchState),
}

/// State for an active inline history filter.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    export_dir: PathBuf,
    form: PitchForm,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(conn: Connection, export_dir: PathBuf) -> Self {
        Self {
            conn,
            export_dir,
            form: PitchForm::default(),
            screen: Screen::Record,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::ConfirmDeleteAll(confirm) => self.handle_confirm_delete_all(code, confirm)?,
            Mode::ExportComplete { path } => self.handle_export_complete(code, path)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Record => {
                match code {
                    KeyCode::Esc => {
                        *exit = true;
                    }
                    KeyCode::Tab | KeyCode::Down => self.form.next_field(),
                    KeyCode::BackTab | KeyCode::Up => self.form.previous_field(),
                    KeyCode::Left => self.form.adjust(-1),
                    KeyCode::Right => self.form.adjust(1),
                    KeyCode::Backspace => self.form.backspace(),
                    KeyCode::Char(' ') => {
                        self.form.toggle_flag();
                    }
                    KeyCode::Enter => self.record_current_pitch(),
                    KeyCode::Char(ch) => {
                        // Characters the active field rejects fall through to
                        // screen shortcuts, so digits keep working in the
                        // numeric inputs while 'h' and 'q' work everywhere.
                        if !self.form.push_char(ch) {
                            match ch {
                                'q' | 'Q' => *exit = true,
                                'h' | 'H' => self.open_history(),
                                _ => {}
                            }
                        }
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::History(ref mut history) => {
                let mut status_to_set: Option<(String, StatusKind)> = None;
                let mut clear_status = false;
                let mut back_to_record = false;
                let mut export_now = false;
                let mut confirm_count: Option<usize> = None;

                {
                    let history = &mut *history;
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => {
                            *exit = true;
                        }
                        KeyCode::Esc | KeyCode::Char('r') | KeyCode::Char('R') => {
                            back_to_record = true;
                            clear_status = true;
                        }
                        KeyCode::Up => history.move_selection(-1),
                        KeyCode::Down => history.move_selection(1),
                        KeyCode::PageUp => history.move_selection(-5),
                        KeyCode::PageDown => history.move_selection(5),
                        KeyCode::Home => history.select_first(),
                        KeyCode::End => history.select_last(),
                        KeyCode::Char('f') | KeyCode::Char('F') => {
                            return Ok(Mode::Searching(SearchState {
                                query: String::new(),
                            }));
                        }
                        KeyCode::Char('e') | KeyCode::Char('E') => {
                            export_now = true;
                        }
                        KeyCode::Char('d') | KeyCode::Char('D') => {
                            let count = history.total();
                            if count == 0 {
                                status_to_set = Some((
                                    "No pitches to delete.".to_string(),
                                    StatusKind::Error,
                                ));
                            } else {
                                clear_status = true;
                                confirm_count = Some(count);
                            }
                        }
                        _ => {}
                    }
                }

                if back_to_record {
                    self.screen = Screen::Record;
                }

                if clear_status {
                    self.clear_status();
                } else if let Some((text, kind)) = status_to_set {
                    self.set_status(text, kind);
                }

                if export_now {
                    return self.run_export();
                }
                if let Some(count) = confirm_count {
                    return Ok(Mode::ConfirmDeleteAll(ConfirmDeleteAll { count }));
                }

                Ok(Mode::Normal)
            }
        }
    }

    fn handle_confirm_delete_all(
        &mut self,
        code: KeyCode,
        confirm: ConfirmDeleteAll,
    ) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                match delete_all_pitches(&self.conn) {
                    Ok(deleted) => {
                        self.refresh_history();
                        self.set_status(
                            format!("Deleted {deleted} recorded pitches."),
                            StatusKind::Info,
                        );
                    }
                    Err(err) => {
                        self.set_status(
                            format!("Failed to delete pitches: {}", surface_error(&err)),
                            StatusKind::Error,
                        );
                    }
                }
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Ok(Mode::Normal),
            _ => Ok(Mode::ConfirmDeleteAll(confirm)),
        }
    }

    fn handle_export_complete(&mut self, code: KeyCode, path: PathBuf) -> Result<Mode> {
        match code {
            KeyCode::Char('o') | KeyCode::Char('O') | KeyCode::Enter => {
                if let Err(err) = open_path(&path) {
                    self.set_status(format!("Failed to open file: {err}"), StatusKind::Error);
                } else {
                    self.set_status(
                        format!("Opened {}.", path.display()),
                        StatusKind::Info,
                    );
                }
                Ok(Mode::Normal)
            }
            KeyCode::Esc => Ok(Mode::Normal),
            _ => Ok(Mode::ExportComplete { path }),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        let history = match &mut self.screen {
            Screen::History(h) => h,
            _ => return Ok(Mode::Normal),
        };

        match code {
            KeyCode::Esc => {
                history.set_filter(None);
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                // Keep the narrowed list but leave search mode.
                return Ok(Mode::Normal);
            }
            KeyCode::Up => {
                history.move_selection(-1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Down => {
                history.move_selection(1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::PageUp => {
                history.move_selection(-5);
                return Ok(Mode::Searching(state));
            }
            KeyCode::PageDown => {
                history.move_selection(5);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Home => {
                history.select_first();
                return Ok(Mode::Searching(state));
            }
            KeyCode::End => {
                history.select_last();
                return Ok(Mode::Searching(state));
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    state.query.push(ch);
                }
            }
            _ => {}
        }

        if state.query.trim().is_empty() {
            history.set_filter(None);
        } else {
            history.set_filter(Some(state.query.clone()));
        }

        Ok(Mode::Searching(state))
    }

    /// Ctrl+E exports from anywhere, matching the history screen's 'e'.
    pub(crate) fn handle_ctrl_e(&mut self) -> Result<()> {
        if matches!(self.mode, Mode::Normal) {
            self.mode = self.run_export()?;
        }
        Ok(())
    }

    fn record_current_pitch(&mut self) {
        let parsed = match self.form.parse_inputs() {
            Ok(parsed) => parsed,
            Err(err) => {
                self.form.error = Some(surface_error(&err));
                return;
            }
        };
        self.form.error = None;

        let (pitch_type, pitch_result, speed_mph, time_to_plate) = parsed;
        match record_pitch(
            &self.conn,
            &pitch_type,
            &pitch_result,
            speed_mph,
            time_to_plate,
            self.form.flags,
        ) {
            Ok(record) => {
                self.form.clear();
                self.set_status(format!("Recorded {}.", record.summary()), StatusKind::Info);
            }
            Err(err) => {
                self.set_status(
                    format!("Failed to record pitch: {}", surface_error(&err)),
                    StatusKind::Error,
                );
            }
        }
    }

    /// Load the full record set and switch to the history screen. A storage
    /// failure degrades to an empty list plus a footer error, so "read
    /// failed" stays visible without crashing the UI.
    fn open_history(&mut self) {
        let pitches = match fetch_pitches(&self.conn) {
            Ok(pitches) => pitches,
            Err(err) => {
                self.set_status(
                    format!("Failed to load pitch history: {}", surface_error(&err)),
                    StatusKind::Error,
                );
                Vec::new()
            }
        };
        self.screen = Screen::History(HistoryScreen::new(pitches));
    }

    /// Re-query the store after a mutation while the history screen is open.
    fn refresh_history(&mut self) {
        if let Screen::History(history) = &mut self.screen {
            match fetch_pitches(&self.conn) {
                Ok(pitches) => history.set_pitches(pitches),
                Err(err) => {
                    history.set_pitches(Vec::new());
                    self.set_status(
                        format!("Failed to reload pitch history: {}", surface_error(&err)),
                        StatusKind::Error,
                    );
                }
            }
        }
    }

    fn run_export(&mut self) -> Result<Mode> {
        match export_to_csv(&self.conn, &self.export_dir) {
            Ok(path) => {
                self.set_status(
                    format!("Exported pitch log to {}.", path.display()),
                    StatusKind::Info,
                );
                Ok(Mode::ExportComplete { path })
            }
            Err(err) => {
                self.set_status(
                    format!("Export failed: {}", surface_error(&err)),
                    StatusKind::Error,
                );
                Ok(Mode::Normal)
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Record => self.draw_record_form(frame, content_area),
            Screen::History(history) => self.draw_history(frame, content_area, history),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::ConfirmDeleteAll(confirm) => self.draw_confirm_delete_all(frame, area, confirm),
            Mode::ExportComplete { path } => self.draw_export_complete(frame, area, path),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Normal => {}
        }
    }

    fn draw_record_form(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title("Record Pitch").borders(Borders::ALL);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let mut lines = vec![
            self.form.build_choice_line("Pitch Type", PitchField::Type),
            self.form.build_choice_line("Pitch Result", PitchField::Result),
            self.form.build_input_line("MPH", PitchField::Speed),
            self.form.build_input_line("TTP", PitchField::Time),
            self.form.build_flags_line(),
            Line::from(""),
        ];

        if let Some(error) = &self.form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to record • Left/Right to change • Space to toggle a flag",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        // Only the numeric inputs get a visible cursor; the other fields are
        // driven by arrows and digit shortcuts.
        let cursor = match self.form.active {
            PitchField::Speed => Some((
                inner.x + "MPH: ".len() as u16 + self.form.value_len(PitchField::Speed) as u16,
                inner.y + 2,
            )),
            PitchField::Time => Some((
                inner.x + "TTP: ".len() as u16 + self.form.value_len(PitchField::Time) as u16,
                inner.y + 3,
            )),
            _ => None,
        };
        if let Some(position) = cursor {
            frame.set_cursor_position(position);
        }
    }

    fn draw_history(&self, frame: &mut Frame, area: Rect, history: &HistoryScreen) {
        let title = if history.has_filter() {
            format!(
                "Pitch History ({} of {})",
                history.filtered.len(),
                history.total()
            )
        } else {
            format!("Pitch History ({})", history.total())
        };

        if history.total() == 0 {
            let message = Paragraph::new("No pitches recorded yet.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(message, area);
            return;
        }

        if history.filtered.is_empty() {
            let message = Paragraph::new("No pitches match the current search.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(message, area);
            return;
        }

        let block = Block::default().borders(Borders::NONE).title(title);
        frame.render_widget(block.clone(), area);
        let list_area = block.inner(area);
        self.render_pitch_cards(frame, list_area, &history.filtered, history.selected);
    }

    fn render_pitch_cards(
        &self,
        frame: &mut Frame,
        area: Rect,
        pitches: &[PitchRecord],
        selected: usize,
    ) {
        if pitches.is_empty() || area.height == 0 {
            return;
        }

        let card_height = PITCH_CARD_HEIGHT as usize;
        let capacity = ((area.height as usize) / card_height).max(1);
        let len = pitches.len();
        let mut start = if selected >= capacity {
            selected + 1 - capacity
        } else {
            0
        };
        if start + capacity > len {
            start = len.saturating_sub(capacity);
        }
        let end = (start + capacity).min(len);
        let visible_len = end.saturating_sub(start);
        if visible_len == 0 {
            return;
        }

        let constraints: Vec<Constraint> = (0..visible_len)
            .map(|_| Constraint::Length(PITCH_CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (idx, chunk) in rows.iter().enumerate() {
            if chunk.height == 0 {
                continue;
            }

            let pitch_index = start + idx;
            if pitch_index >= len {
                break;
            }

            let pitch = &pitches[pitch_index];
            let mut block = Block::default().borders(Borders::ALL);
            let mut paragraph_style = Style::default();
            if pitch_index == selected {
                block = block.style(Style::default().fg(Color::Yellow));
                paragraph_style = Style::default().fg(Color::Yellow);
            }

            let mut lines = Vec::new();
            let summary = if pitch_index == selected {
                format!("▶ {}", pitch.summary())
            } else {
                pitch.summary()
            };
            lines.push(Line::from(Span::styled(
                summary,
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                pitch.formatted_timestamp(),
                Style::default().fg(Color::Gray),
            )));
            if let Some(measurements) = pitch.measurement_summary() {
                lines.push(Line::from(measurements));
            }
            let badges = flag_badges(&pitch.flags);
            if !badges.is_empty() {
                lines.push(Line::from(badges));
            }

            let paragraph = Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Left)
                .style(paragraph_style);

            frame.render_widget(paragraph, *chunk);
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match (&self.screen, &self.mode) {
            (_, Mode::ConfirmDeleteAll(_)) => Line::from(vec![
                Span::styled("[Y]", key_style),
                Span::raw(" Delete everything   "),
                Span::styled("[N/Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (_, Mode::ExportComplete { .. }) => Line::from(vec![
                Span::styled("[O/Enter]", key_style),
                Span::raw(" Open file   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Close"),
            ]),
            (_, Mode::Searching(_)) => Line::from(vec![
                Span::raw("Type to filter   "),
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Keep filter   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Clear"),
            ]),
            (Screen::Record, _) => Line::from(vec![
                Span::styled("[Tab/↑↓]", key_style),
                Span::raw(" Field   "),
                Span::styled("[←→]", key_style),
                Span::raw(" Change   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Record   "),
                Span::styled("[H]", key_style),
                Span::raw(" History   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Quit"),
            ]),
            (Screen::History(_), _) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[F]", key_style),
                Span::raw(" Filter   "),
                Span::styled("[E]", key_style),
                Span::raw(" Export CSV   "),
                Span::styled("[D]", key_style),
                Span::raw(" Delete all   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Back   "),
                Span::styled("[Q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_confirm_delete_all(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDeleteAll) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Delete")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete all {} recorded pitches?",
                confirm.count
            )),
            Line::from("This cannot be undone."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_export_complete(&self, frame: &mut Frame, area: Rect, path: &Path) {
        let popup_area = centered_rect(70, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Export Complete")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from("The pitch log was exported to:"),
            Line::from(Span::styled(
                path.display().to_string(),
                Style::default().fg(Color::Cyan),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press O or Enter to open it, Esc to close.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Filter");
        let paragraph = Paragraph::new(Span::raw(format!("Filter: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Filter: ".len() as u16 + state.query.chars().count() as u16;
        let cursor_y = inner.y;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}
