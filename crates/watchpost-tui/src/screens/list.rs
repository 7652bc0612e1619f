//! List activity — camera table with per-camera selectors.

use std::collections::HashSet;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table},
};

use watchpost_core::view::RoutedView;
use watchpost_core::{Camera, UiState, view};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

pub struct ListScreen {
    cameras: Vec<Camera>,
    time_zone_name: String,
    selectors_visible: bool,
    /// Row cursor into `cameras`.
    selected: usize,
    /// Cameras whose selector checkbox is ticked, by uuid. New cameras
    /// start ticked.
    enabled: HashSet<String>,
}

impl ListScreen {
    pub fn new() -> Self {
        Self {
            cameras: Vec::new(),
            time_zone_name: String::new(),
            selectors_visible: true,
            selected: 0,
            enabled: HashSet::new(),
        }
    }

    fn apply_state(&mut self, state: &UiState) {
        let Some(RoutedView::List {
            cameras,
            time_zone_name,
            selectors_visible,
        }) = view::routed_view(state)
        else {
            return;
        };

        // Tick selectors for cameras we haven't seen before.
        for camera in cameras {
            if !self.cameras.iter().any(|c| c.uuid == camera.uuid) {
                self.enabled.insert(camera.uuid.clone());
            }
        }

        self.cameras = cameras.to_vec();
        self.time_zone_name = time_zone_name.to_owned();
        self.selectors_visible = selectors_visible;
        self.selected = self.selected.min(self.cameras.len().saturating_sub(1));
    }

    fn toggle_selected(&mut self) {
        let Some(camera) = self.cameras.get(self.selected) else {
            return;
        };
        if !self.enabled.remove(&camera.uuid) {
            self.enabled.insert(camera.uuid.clone());
        }
    }
}

impl Component for ListScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => Ok(Some(Action::ScrollDown)),
            KeyCode::Char('k') | KeyCode::Up => Ok(Some(Action::ScrollUp)),
            KeyCode::Char(' ') if self.selectors_visible => {
                self.toggle_selected();
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::StateChanged(state) => self.apply_state(state),
            Action::ScrollDown => {
                self.selected = (self.selected + 1).min(self.cameras.len().saturating_sub(1));
            }
            Action::ScrollUp => {
                self.selected = self.selected.saturating_sub(1);
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Cameras ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
        let table_area = layout[0];
        let footer_area = layout[1];

        let mut widths = vec![Constraint::Length(20), Constraint::Min(10)];
        let mut header = vec![Cell::from("Camera"), Cell::from("Description")];
        if self.selectors_visible {
            widths.insert(0, Constraint::Length(3));
            header.insert(0, Cell::from(" "));
        }

        let rows = self.cameras.iter().enumerate().map(|(i, camera)| {
            let style = if i == self.selected {
                theme::table_selected()
            } else {
                theme::table_row()
            };
            let mut cells = vec![
                Cell::from(camera.short_name.clone()),
                Cell::from(camera.description.clone()),
            ];
            if self.selectors_visible {
                let mark = if self.enabled.contains(&camera.uuid) {
                    "[x]"
                } else {
                    "[ ]"
                };
                cells.insert(0, Cell::from(mark));
            }
            Row::new(cells).style(style)
        });

        let table = Table::new(rows, widths).header(Row::new(header).style(theme::table_header()));
        frame.render_widget(table, table_area);

        let footer = Line::from(vec![
            Span::styled("time zone ", theme::key_hint()),
            Span::styled(self.time_zone_name.clone(), theme::tab_inactive()),
        ]);
        frame.render_widget(Paragraph::new(footer), footer_area);
    }
}
