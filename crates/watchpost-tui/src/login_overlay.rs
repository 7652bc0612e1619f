//! Login overlay — username/password form rendered over the active view.
//!
//! The overlay is mounted whenever the login state machine says so; it
//! never decides its own visibility.

use color_eyre::eyre::Result;
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use secrecy::SecretString;
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use crate::action::Action;
use crate::component::Component;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Username,
    Password,
}

pub struct LoginOverlay {
    username: Input,
    password: Input,
    field: Field,
    /// Error from the last failed attempt, shown inline.
    error: Option<String>,
    /// A login request is in flight; inputs are frozen.
    submitting: bool,
}

impl LoginOverlay {
    pub fn new() -> Self {
        Self {
            username: Input::default(),
            password: Input::default(),
            field: Field::Username,
            error: None,
            submitting: false,
        }
    }

    /// Current form contents, for submission.
    pub fn credentials(&self) -> (String, SecretString) {
        (
            self.username.value().to_owned(),
            SecretString::from(self.password.value().to_owned()),
        )
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    pub fn set_error(&mut self, error: String) {
        self.error = Some(error);
        self.submitting = false;
    }

    /// Clear the form for the next time the overlay mounts.
    pub fn reset(&mut self) {
        self.username.reset();
        self.password.reset();
        self.field = Field::Username;
        self.error = None;
        self.submitting = false;
    }

    fn render_field(&self, frame: &mut Frame, area: Rect, label: &str, field: Field) {
        let focused = self.field == field;
        let value = match field {
            Field::Username => self.username.value().to_owned(),
            Field::Password => "•".repeat(self.password.value().chars().count()),
        };
        let line = Line::from(vec![
            Span::styled(format!("{label:>9}: "), theme::key_hint()),
            Span::styled(
                value,
                if focused {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                },
            ),
            Span::styled(if focused { "▏" } else { "" }, theme::tab_active()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

impl Component for LoginOverlay {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.submitting {
            // Only Esc is honored while a request is in flight.
            if key.code == KeyCode::Esc {
                return Ok(Some(Action::DismissLogin));
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Esc => return Ok(Some(Action::DismissLogin)),
            KeyCode::Enter => {
                if self.field == Field::Username {
                    self.field = Field::Password;
                    return Ok(None);
                }
                return Ok(Some(Action::SubmitLogin));
            }
            KeyCode::Tab | KeyCode::Down => {
                self.field = Field::Password;
                return Ok(None);
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.field = Field::Username;
                return Ok(None);
            }
            _ => {}
        }

        let event = CrosstermEvent::Key(key);
        match self.field {
            Field::Username => self.username.handle_event(&event),
            Field::Password => self.password.handle_event(&event),
        };
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let width = 44u16.min(area.width.saturating_sub(4));
        let height = 9u16.min(area.height.saturating_sub(2));
        let x = (area.width.saturating_sub(width)) / 2;
        let y = (area.height.saturating_sub(height)) / 2;
        let overlay_area = Rect::new(area.x + x, area.y + y, width, height);

        frame.render_widget(Clear, overlay_area);
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            overlay_area,
        );

        let block = Block::default()
            .title(" Log in ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(overlay_area);
        frame.render_widget(block, overlay_area);

        let rows = Layout::vertical([
            Constraint::Length(1), // padding
            Constraint::Length(1), // username
            Constraint::Length(1), // password
            Constraint::Length(1), // padding / error
            Constraint::Length(1), // hints
        ])
        .split(inner);

        self.render_field(frame, rows[1], "username", Field::Username);
        self.render_field(frame, rows[2], "password", Field::Password);

        if let Some(ref error) = self.error {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    format!("  {error}"),
                    theme::error_banner(),
                ))),
                rows[3],
            );
        } else if self.submitting {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled("  logging in…", theme::key_hint()))),
                rows[3],
            );
        }

        let hints = Line::from(vec![
            Span::styled("  Enter ", theme::key_hint_key()),
            Span::styled("submit", theme::key_hint()),
            Span::styled("  Esc ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), rows[4]);
    }
}
