//! Live activity — multiview grid of camera cells.

use color_eyre::eyre::Result;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use watchpost_core::view::RoutedView;
use watchpost_core::{Camera, UiState, view};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

/// Available multiview grids: (label, rows, cols).
pub const LAYOUTS: &[(&str, u16, u16)] = &[("1x1", 1, 1), ("2x2", 2, 2), ("3x3", 3, 3)];

pub struct LiveScreen {
    cameras: Vec<Camera>,
    layout: usize,
}

impl LiveScreen {
    pub fn new() -> Self {
        Self {
            cameras: Vec::new(),
            layout: 0,
        }
    }
}

impl Component for LiveScreen {
    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::StateChanged(state) = action {
            if let Some(RoutedView::Live { cameras, layout }) = view::routed_view(state) {
                self.cameras = cameras.to_vec();
                self.layout = layout.min(LAYOUTS.len() - 1);
            }
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let (label, rows, cols) = LAYOUTS[self.layout.min(LAYOUTS.len() - 1)];

        let block = Block::default()
            .title(format!(" Live ({label}) "))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let row_areas =
            Layout::vertical(vec![Constraint::Ratio(1, u32::from(rows)); rows as usize])
                .split(inner);

        let mut slot = 0usize;
        for row_area in &*row_areas {
            let cells =
                Layout::horizontal(vec![Constraint::Ratio(1, u32::from(cols)); cols as usize])
                    .split(*row_area);
            for cell_area in &*cells {
                self.render_cell(frame, *cell_area, slot);
                slot += 1;
            }
        }
    }
}

impl LiveScreen {
    fn render_cell(&self, frame: &mut Frame, area: Rect, slot: usize) {
        let title = self
            .cameras
            .get(slot)
            .map_or_else(|| " (empty) ".to_owned(), |c| format!(" {} ", c.short_name));

        let block = Block::default()
            .title(title)
            .title_style(theme::tab_inactive())
            .borders(Borders::ALL)
            .border_style(theme::border_default());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        // Stream rendering is out of scope for a terminal; mark the slot.
        let body = if self.cameras.get(slot).is_some() {
            "● live"
        } else {
            ""
        };
        let y_offset = inner.height.saturating_sub(1) / 2;
        let centered = Rect {
            x: inner.x,
            y: inner.y + y_offset,
            width: inner.width,
            height: 1.min(inner.height),
        };
        frame.render_widget(
            Paragraph::new(body)
                .alignment(Alignment::Center)
                .style(theme::table_row()),
            centered,
        );
    }
}
