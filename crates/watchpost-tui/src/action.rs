//! All possible UI actions. Actions are the sole mechanism for state mutation.

use watchpost_core::{Activity, Notice, UiState};

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Controller state (from the data bridge) ────────────────────
    StateChanged(UiState),
    ControllerNotice(Notice),

    // ── Session ────────────────────────────────────────────────────
    Refresh,
    RequestLogin,
    DismissLogin,
    SubmitLogin,
    LoginSucceeded,
    LoginFailed(String),
    Logout,

    // ── View ───────────────────────────────────────────────────────
    SwitchActivity(Activity),
    ToggleSelectors,
    CycleLayout,

    // ── Notifications ──────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,

    // ── Table navigation ───────────────────────────────────────────
    ScrollUp,
    ScrollDown,
}
