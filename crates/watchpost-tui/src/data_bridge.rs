//! Data bridge — connects the session controller's channels to TUI actions.
//!
//! Runs as a background task: optionally performs the configured login,
//! starts the first fetch generation, then forwards every state change and
//! transient notice as an [`Action`] through the TUI's action channel.

use secrecy::SecretString;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use watchpost_api::NvrClient;
use watchpost_core::SessionController;

use crate::action::{Action, Notification};

/// Credentials resolved from the config file, applied before the first fetch.
pub struct ConfiguredLogin {
    pub username: String,
    pub password: SecretString,
}

/// Spawn body for the data bridge.
///
/// The controller's fetch is started exactly once here; every later
/// generation is driven by user actions (retry, login, logout) rather than
/// by redraws.
pub async fn run_data_bridge(
    controller: SessionController<NvrClient>,
    client: NvrClient,
    login: Option<ConfiguredLogin>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    if let Some(login) = login {
        match client.login(&login.username, &login.password).await {
            Ok(()) => debug!(username = %login.username, "configured login succeeded"),
            Err(e) => {
                warn!(error = %e, "configured login failed");
                let _ = action_tx.send(Action::Notify(Notification::error(format!(
                    "login failed: {e}"
                ))));
            }
        }
    }

    let mut state_rx = controller.subscribe();
    let mut notice_rx = controller.notices();
    controller.trigger();

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                let _ = action_tx.send(Action::StateChanged(state));
            }

            notice = notice_rx.recv() => {
                match notice {
                    Ok(notice) => {
                        let _ = action_tx.send(Action::ControllerNotice(notice));
                    }
                    // Lagged: stale toasts are not worth replaying.
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "notice channel lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    controller.shutdown();
    debug!("data bridge shut down");
}
