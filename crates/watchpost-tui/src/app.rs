//! Application core — event loop, action dispatch, frame layout.

use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use watchpost_api::NvrClient;
use watchpost_core::view::{self, ActivityControl};
use watchpost_core::{Activity, LoginState, Notice, SessionController, UiState};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::data_bridge::{ConfiguredLogin, run_data_bridge};
use crate::event::{Event, EventReader};
use crate::login_overlay::LoginOverlay;
use crate::screens::{LAYOUTS, ListScreen, LiveScreen};
use crate::theme;
use crate::tui::Tui;

/// Toast lifetime in ticks (4 Hz → 5 seconds).
const TOAST_TICKS: u8 = 20;

/// Top-level application state and event loop.
pub struct App {
    controller: SessionController<NvrClient>,
    client: NvrClient,
    /// Login applied by the data bridge before the first fetch.
    configured_login: Option<ConfiguredLogin>,
    /// Latest controller state; refreshed via `Action::StateChanged`.
    state: UiState,
    list: ListScreen,
    live: LiveScreen,
    login: LoginOverlay,
    toast: Option<(Notification, u8)>,
    running: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    bridge_cancel: CancellationToken,
}

impl App {
    pub fn new(
        controller: SessionController<NvrClient>,
        client: NvrClient,
        configured_login: Option<ConfiguredLogin>,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        Self {
            controller,
            client,
            configured_login,
            state: UiState::default(),
            list: ListScreen::new(),
            live: LiveScreen::new(),
            login: LoginOverlay::new(),
            toast: None,
            running: true,
            action_tx,
            action_rx,
            bridge_cancel: CancellationToken::new(),
        }
    }

    /// Run the main event loop. This is the heart of the TUI.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        tokio::spawn(run_data_bridge(
            self.controller.clone(),
            self.client.clone(),
            self.configured_login.take(),
            self.action_tx.clone(),
            self.bridge_cancel.clone(),
        ));

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => {
                    self.action_tx.send(Action::Resize(w, h))?;
                }
                Event::Tick => {
                    self.action_tx.send(Action::Tick)?;
                }
                Event::Render => {
                    self.action_tx.send(Action::Render)?;
                }
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        self.bridge_cancel.cancel();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here; the rest
    /// go to the overlay (when mounted) or the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // A mounted overlay captures everything except Ctrl+C.
        if self.state.login.overlay_visible() {
            if (key.modifiers, key.code) == (KeyModifiers::CONTROL, KeyCode::Char('c')) {
                return Ok(Some(Action::Quit));
            }
            return self.login.handle_key_event(key);
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c'))
            | (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),

            (KeyModifiers::NONE, KeyCode::Char('r')) => return Ok(Some(Action::Refresh)),

            (KeyModifiers::NONE, KeyCode::Char('1')) => {
                return Ok(Some(Action::SwitchActivity(Activity::List)));
            }
            (KeyModifiers::NONE, KeyCode::Char('2')) => {
                return Ok(Some(Action::SwitchActivity(Activity::Live)));
            }
            (KeyModifiers::NONE, KeyCode::Tab) => {
                let next = match self.state.activity {
                    Activity::List => Activity::Live,
                    Activity::Live => Activity::List,
                };
                return Ok(Some(Action::SwitchActivity(next)));
            }

            // Activity controls only exist while their view is usable.
            (KeyModifiers::NONE, KeyCode::Char('s')) => {
                if view::activity_control(&self.state) == Some(ActivityControl::SelectorToggle) {
                    return Ok(Some(Action::ToggleSelectors));
                }
            }
            (KeyModifiers::NONE, KeyCode::Char('m')) => {
                if matches!(
                    view::activity_control(&self.state),
                    Some(ActivityControl::MultiviewChooser { .. })
                ) {
                    return Ok(Some(Action::CycleLayout));
                }
            }

            (KeyModifiers::NONE, KeyCode::Char('l')) => match self.state.login {
                LoginState::NotLoggedIn => return Ok(Some(Action::RequestLogin)),
                LoginState::LoggedIn => return Ok(Some(Action::Logout)),
                _ => {}
            },

            (KeyModifiers::NONE, KeyCode::Esc) => {
                if self.toast.is_some() {
                    return Ok(Some(Action::DismissNotification));
                }
            }

            _ => {}
        }

        // Delegate to the active screen.
        match self.state.activity {
            Activity::List => self.list.handle_key_event(key),
            Activity::Live => self.live.handle_key_event(key),
        }
    }

    /// Process a single action — update app state and propagate to components.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::StateChanged(state) => {
                // Clear the form whenever the overlay (re)mounts.
                if state.login.overlay_visible() && !self.state.login.overlay_visible() {
                    self.login.reset();
                }
                self.state = state.clone();
                self.list.update(action)?;
                self.live.update(action)?;
            }

            Action::ControllerNotice(Notice::LogoutFailed { message }) => {
                self.action_tx.send(Action::Notify(Notification::error(
                    format!("logout failed: {message}"),
                )))?;
            }

            Action::Refresh => {
                debug!("manual refresh");
                self.controller.trigger();
            }

            Action::RequestLogin => self.controller.request_login(),
            Action::DismissLogin => self.controller.dismiss_login(),

            Action::SubmitLogin => {
                let (username, password) = self.login.credentials();
                if username.is_empty() {
                    self.login.set_error("username is required".into());
                } else {
                    self.login.set_submitting(true);
                    let client = self.client.clone();
                    let tx = self.action_tx.clone();
                    tokio::spawn(async move {
                        let action = match client.login(&username, &password).await {
                            Ok(()) => Action::LoginSucceeded,
                            Err(e) => Action::LoginFailed(e.to_string()),
                        };
                        let _ = tx.send(action);
                    });
                }
            }

            Action::LoginSucceeded => {
                self.controller.on_login_success();
                self.action_tx
                    .send(Action::Notify(Notification::info("logged in")))?;
            }

            Action::LoginFailed(message) => {
                self.login.set_error(message.clone());
            }

            Action::Logout => {
                let controller = self.controller.clone();
                tokio::spawn(async move {
                    controller.logout().await;
                });
            }

            Action::SwitchActivity(activity) => {
                self.controller.switch_activity(*activity);
            }

            Action::ToggleSelectors => self.controller.toggle_list_selectors(),

            Action::CycleLayout => {
                let next = (self.state.multiview_layout + 1) % LAYOUTS.len();
                self.controller.set_multiview_layout(next);
            }

            Action::Notify(notification) => {
                self.toast = Some((notification.clone(), TOAST_TICKS));
            }

            Action::DismissNotification => {
                self.toast = None;
            }

            Action::Tick => {
                if let Some((_, ticks)) = &mut self.toast {
                    *ticks = ticks.saturating_sub(1);
                    if *ticks == 0 {
                        self.toast = None;
                    }
                }
            }

            // Render is handled in the main loop; resize needs no bookkeeping
            // because ratatui re-measures on draw.
            Action::Render | Action::Resize(..) => {}

            // Propagate everything else to the active screen.
            other => {
                let follow_up = match self.state.activity {
                    Activity::List => self.list.update(other)?,
                    Activity::Live => self.live.update(other)?,
                };
                if let Some(follow_up) = follow_up {
                    self.action_tx.send(follow_up)?;
                }
            }
        }

        Ok(())
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let banner = view::error_banner(self.state.error.as_ref());

        let mut constraints = vec![Constraint::Length(1)];
        if banner.is_some() {
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Min(1));
        constraints.push(Constraint::Length(1));
        let layout = Layout::vertical(constraints).split(area);

        let header_area = layout[0];
        let mut next = 1;
        if let Some(ref banner) = banner {
            render_error_banner(frame, layout[next], banner);
            next += 1;
        }
        let content_area = layout[next];
        let status_area = layout[next + 1];

        self.render_header(frame, header_area);

        // Content mounts only when the derived view routes somewhere.
        if view::routed_view(&self.state).is_some() {
            match self.state.activity {
                Activity::List => self.list.render(frame, content_area),
                Activity::Live => self.live.render(frame, content_area),
            }
        }

        self.render_status_bar(frame, status_area);

        if self.state.login.overlay_visible() {
            self.login.render(frame, area);
        }

        if let Some((notification, _)) = &self.toast {
            render_toast(frame, area, notification);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::raw(" ")];
        for (activity, label) in [(Activity::List, "1 List"), (Activity::Live, "2 Live")] {
            let style = if self.state.activity == activity {
                theme::tab_active()
            } else {
                theme::tab_inactive()
            };
            spans.push(Span::styled(format!(" {label} "), style));
        }

        match view::activity_control(&self.state) {
            Some(ActivityControl::SelectorToggle) => {
                spans.push(Span::styled("  s ", theme::key_hint_key()));
                spans.push(Span::styled("selectors", theme::key_hint()));
            }
            Some(ActivityControl::MultiviewChooser { layout }) => {
                spans.push(Span::styled("  m ", theme::key_hint_key()));
                spans.push(Span::styled(
                    format!("layout {}", LAYOUTS[layout.min(LAYOUTS.len() - 1)].0),
                    theme::key_hint(),
                ));
            }
            None => {}
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let session = match self.state.login {
            LoginState::LoggedIn => {
                let name = self
                    .state
                    .session
                    .as_ref()
                    .map_or("?", |s| s.user_name.as_str());
                Span::styled(
                    format!("● {name}"),
                    ratatui::style::Style::default().fg(theme::SOFT_GREEN),
                )
            }
            LoginState::NotLoggedIn => Span::styled("○ anonymous", theme::tab_inactive()),
            LoginState::ServerRequiresLogin | LoginState::UserRequestedLogin => Span::styled(
                "◐ login required",
                ratatui::style::Style::default().fg(theme::AMBER),
            ),
            LoginState::Unknown => Span::styled("◌ connecting", theme::key_hint()),
        };

        let hints = match self.state.login {
            LoginState::LoggedIn => " │ r refresh  l log out  q quit",
            LoginState::NotLoggedIn => " │ r refresh  l log in  q quit",
            _ => " │ q quit",
        };

        let line = Line::from(vec![
            Span::raw(" "),
            session,
            Span::styled(hints, theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

}

fn render_error_banner(frame: &mut Frame, area: Rect, banner: &str) {
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {banner}"),
            theme::error_banner(),
        ))),
        area,
    );
}

fn render_toast(frame: &mut Frame, area: Rect, notification: &Notification) {
    let width = (notification.message.len() as u16 + 4).min(area.width.saturating_sub(2));
    let toast_area = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y + 1,
        width,
        3.min(area.height),
    );

    let style = match notification.level {
        NotificationLevel::Error => theme::error_banner(),
        NotificationLevel::Info => theme::tab_inactive(),
    };

    frame.render_widget(Clear, toast_area);
    let block = Block::bordered().border_style(style);
    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);
    frame.render_widget(
        Paragraph::new(notification.message.clone())
            .style(style)
            .alignment(Alignment::Center),
        inner,
    );
}
