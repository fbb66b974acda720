use super::Component;
use crate::{
    action::Action,
    theme::Theme,
};
use color_eyre::Result;
use crossterm::event::{
    KeyCode,
    KeyEvent,
};
use pitch_tank_session::transcript::{
    ChatMessage,
    SharedTranscript,
};
use ratatui::{
    layout::{
        Constraint,
        Layout,
        Rect,
    },
    text::Line,
    widgets::{
        Block,
        BorderType,
        Borders,
        Paragraph,
    },
    Frame,
};
use serde::{
    Deserialize,
    Serialize,
};
use strum::Display;
use tui_textarea::TextArea;

#[derive(Display, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TranscriptAction {
    Submit(String),
    ScrollUp,
    ScrollDown,
}

/// The chat panel: transcript history above a single-line composer.
///
/// Scrolling is measured in display lines from the bottom. While the reader
/// is scrolled away, lines appended below grow the offset by the same amount,
/// so the content in the viewport stays put. Only a local-origin send forces
/// the view back down; remote messages never move the reading position.
pub struct TranscriptPanel {
    transcript: SharedTranscript,
    theme: Theme,
    open: bool,
    composer: TextArea<'static>,
    /// Display lines between the bottom of the log and the viewport.
    scroll_from_bottom: usize,
    /// Log extent at the last draw, for anchoring a scrolled-away reader.
    last_total_lines: usize,
    last_width: u16,
}

impl TranscriptPanel {
    pub fn new(transcript: SharedTranscript, open: bool) -> Self {
        let mut composer = TextArea::default();
        composer.set_placeholder_text("Make your case...");
        composer.set_cursor_line_style(ratatui::style::Style::default());
        Self {
            transcript,
            theme: Theme::default(),
            open,
            composer,
            scroll_from_bottom: 0,
            last_total_lines: 0,
            last_width: 0,
        }
    }

    fn submit(&mut self) -> Option<Action> {
        let text = self.composer.lines().join(" ").trim().to_string();
        if text.is_empty() {
            return None;
        }
        self.composer = TextArea::default();
        self.composer.set_placeholder_text("Make your case...");
        self.composer.set_cursor_line_style(ratatui::style::Style::default());
        Some(Action::Transcript(TranscriptAction::Submit(text)))
    }

    fn message_lines(&self, message: &ChatMessage, width: usize) -> Vec<Line<'static>> {
        let accent = if message.local {
            self.theme.local_accent
        } else {
            self.theme.agent_accent
        };
        let header = format!("{} · {}", message.sender, message.timestamp.format("%H:%M"));

        let mut lines = vec![Line::styled(header, accent)];
        for row in wrap_text(&message.text, width) {
            lines.push(Line::styled(row, self.theme.text_default));
        }
        lines.push(Line::default());
        lines
    }

    fn welcome_lines(&self) -> Vec<Line<'static>> {
        [
            "You are about to enter the tank.",
            "",
            "State your company, your ask, and why",
            "anyone should believe your numbers.",
        ]
        .into_iter()
        .map(|row| Line::styled(row, self.theme.text_dim))
        .collect()
    }
}

impl Component for TranscriptPanel {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if !self.open {
            return Ok(None);
        }
        let action = match key.code {
            KeyCode::Esc => Some(Action::ToggleChat),
            KeyCode::Enter => self.submit(),
            KeyCode::Up => Some(Action::Transcript(TranscriptAction::ScrollUp)),
            KeyCode::Down => Some(Action::Transcript(TranscriptAction::ScrollDown)),
            _ => {
                self.composer.input(key);
                None
            }
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Render => {
                if self.transcript.lock().unwrap().take_stick_request() {
                    self.scroll_from_bottom = 0;
                }
            }
            Action::ChatOpenChanged(open) => self.open = open,
            Action::ThemeChanged(preference) => self.theme = Theme::from_preference(preference),
            Action::Transcript(TranscriptAction::ScrollUp) => {
                // Clamped against the content height at draw time.
                self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(1);
            }
            Action::Transcript(TranscriptAction::ScrollDown) => {
                self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(1);
            }
            _ => {}
        }
        Ok(None)
    }

    fn is_visible(&self) -> bool {
        self.open
    }

    fn is_focused(&self) -> bool {
        self.open
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let [log_area, composer_area] = Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.theme.border(true))
            .title(" Transcript ");
        let inner = block.inner(log_area);
        frame.render_widget(block, log_area);

        if inner.width > 0 && inner.height > 0 {
            let width = usize::from(inner.width);
            let lines = {
                let transcript = self.transcript.lock().unwrap();
                if transcript.is_empty() {
                    self.welcome_lines()
                } else {
                    transcript
                        .messages()
                        .iter()
                        .flat_map(|message| self.message_lines(message, width))
                        .collect()
                }
            };

            // New lines land below the viewport while scrolled away; grow the
            // bottom offset by the same amount so the reader's content does
            // not slide. A width change reflows everything and only clamps.
            if self.scroll_from_bottom > 0 && inner.width == self.last_width {
                let appended = lines.len().saturating_sub(self.last_total_lines);
                self.scroll_from_bottom += appended;
            }
            self.last_total_lines = lines.len();
            self.last_width = inner.width;

            let viewport = usize::from(inner.height);
            let max_scroll = lines.len().saturating_sub(viewport);
            self.scroll_from_bottom = self.scroll_from_bottom.min(max_scroll);
            let top = max_scroll - self.scroll_from_bottom;
            let visible: Vec<Line<'_>> = lines.into_iter().skip(top).take(viewport).collect();
            frame.render_widget(Paragraph::new(visible), inner);

            // Edge fades hint that the log continues past the viewport.
            let buffer = frame.buffer_mut();
            if top > 0 {
                buffer.set_style(Rect { height: 1, ..inner }, self.theme.fade);
            }
            if self.scroll_from_bottom > 0 {
                let bottom = Rect {
                    y: inner.bottom() - 1,
                    height: 1,
                    ..inner
                };
                buffer.set_style(bottom, self.theme.fade);
            }
        }

        self.composer.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(self.theme.border(true)),
        );
        frame.render_widget(&self.composer, composer_area);

        Ok(())
    }
}

/// Greedy word wrap in characters. Words longer than `width` are hard-split.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_chars = 0;
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if row_chars > 0 {
                rows.push(std::mem::take(&mut row));
                row_chars = 0;
            }
            rows.push(word[..width].iter().collect());
            word.drain(..width);
        }
        if row_chars == 0 {
            row.extend(&word);
            row_chars = word.len();
        } else if row_chars + 1 + word.len() <= width {
            row.push(' ');
            row.extend(&word);
            row_chars += 1 + word.len();
        } else {
            rows.push(std::mem::take(&mut row));
            row.extend(&word);
            row_chars = word.len();
        }
    }
    if row_chars > 0 || rows.is_empty() {
        rows.push(row);
    }
    rows
}
