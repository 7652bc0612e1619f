//! Slate palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const AMBER: Color = Color::Rgb(255, 179, 71); // #ffb347
pub const STEEL_BLUE: Color = Color::Rgb(110, 168, 254); // #6ea8fe
pub const SOFT_GREEN: Color = Color::Rgb(120, 220, 150); // #78dc96
pub const ERROR_RED: Color = Color::Rgb(237, 102, 99); // #ed6663

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(198, 201, 210); // #c6c9d2
pub const BORDER_GRAY: Color = Color::Rgb(90, 100, 120); // #5a6478
pub const BG_HIGHLIGHT: Color = Color::Rgb(38, 42, 52); // #262a34
pub const BG_DARK: Color = Color::Rgb(24, 26, 33); // #181a21

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(STEEL_BLUE).add_modifier(Modifier::BOLD)
}

/// Border for a focused panel.
pub fn border_focused() -> Style {
    Style::default().fg(AMBER)
}

/// Border for an unfocused panel.
pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Table header row.
pub fn table_header() -> Style {
    Style::default()
        .fg(STEEL_BLUE)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

/// Normal table row text.
pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Selected / highlighted table row.
pub fn table_selected() -> Style {
    Style::default()
        .fg(AMBER)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Active tab in the activity bar.
pub fn tab_active() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}

/// Inactive tab in the activity bar.
pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Error banner text.
pub fn error_banner() -> Style {
    Style::default().fg(ERROR_RED).add_modifier(Modifier::BOLD)
}

/// Key hint text (e.g., "q quit  r refresh").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(STEEL_BLUE).add_modifier(Modifier::BOLD)
}
