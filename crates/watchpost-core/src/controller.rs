// ── Session controller ──
//
// Composition root for the client's coordination state: login state,
// session, reference snapshot, fetch error, and the active view. All of it
// lives in one watch channel and is mutated only inside `send_modify`
// closures, so a generation bump and the guard check that consults it can
// never interleave.
//
// The refresh cycle is generation-counted: `trigger()` bumps the counter,
// cancels the previous in-flight fetch, and spawns a new one. A completion
// handler may only mutate state if its generation is still current at
// resolution time — an old, slow fetch that resolves after a newer one is
// discarded even if it succeeded, regardless of whether the transport
// honored the cancellation signal.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use watchpost_api::{FetchError, FetchOutcome, types::TopLevel};

use crate::login::LoginState;
use crate::model::{Activity, ReferenceSnapshot, Session, split_top_level};
use crate::transport::Transport;

const NOTICE_CHANNEL_SIZE: usize = 16;

// ── UiState ──────────────────────────────────────────────────────────

/// The typed state container owned by the controller and observed by the
/// presentation layer. Everything the UI needs is either a field here or a
/// pure function of one (see [`crate::view`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    /// Monotonic fetch generation. Only the in-flight fetch whose
    /// generation matches this value may mutate the fields below.
    pub generation: u64,
    /// Authentication status.
    pub login: LoginState,
    /// Live session credentials. Present iff `login == LoggedIn` (briefly
    /// absent after a logout succeeds, until the triggered fetch resolves).
    pub session: Option<Session>,
    /// Camera list and server time zone; fully present or fully absent.
    pub snapshot: Option<ReferenceSnapshot>,
    /// Last non-auth fetch failure; cleared by the next successful fetch.
    pub error: Option<FetchError>,
    /// Active top-level view.
    pub activity: Activity,
    /// List view: whether the per-camera selector column is shown.
    pub list_selectors_visible: bool,
    /// Live view: index into the multiview layout table.
    pub multiview_layout: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            generation: 0,
            login: LoginState::Unknown,
            session: None,
            snapshot: None,
            error: None,
            activity: Activity::List,
            list_selectors_visible: true,
            multiview_layout: 0,
        }
    }
}

// ── Notices ──────────────────────────────────────────────────────────

/// Transient, user-visible notices that are not part of the state
/// container (they don't survive a re-render and must not desync it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A logout request failed; the user remains logged in.
    LogoutFailed { message: String },
}

// ── SessionController ────────────────────────────────────────────────

/// The composition root. Cheaply cloneable via `Arc`; every clone shares
/// the same state, in-flight fetch, and notice channel.
#[derive(Clone)]
pub struct SessionController<T: Transport> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    transport: T,
    state: watch::Sender<UiState>,
    /// Parent token — cancelled once, on teardown.
    cancel: CancellationToken,
    /// Token scoping the current in-flight top-level fetch. Replaced (and
    /// the old one cancelled) on every `trigger()`.
    in_flight: Mutex<CancellationToken>,
    notices: broadcast::Sender<Notice>,
}

impl<T: Transport> SessionController<T> {
    /// Create a controller around a transport. Does NOT fetch anything --
    /// the presentation layer calls [`trigger()`](Self::trigger) exactly
    /// once at startup.
    pub fn new(transport: T) -> Self {
        let (state, _) = watch::channel(UiState::default());
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let in_flight = Mutex::new(cancel.child_token());

        Self {
            inner: Arc::new(Inner {
                transport,
                state,
                cancel,
                in_flight,
                notices,
            }),
        }
    }

    // ── State observation ────────────────────────────────────────────

    /// Snapshot of the current state.
    pub fn state(&self) -> UiState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.inner.state.subscribe()
    }

    /// Subscribe to transient notices.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    // ── Refresh cycle ────────────────────────────────────────────────

    /// Start a new fetch generation.
    ///
    /// Cancels the previous in-flight fetch (its result becomes stale by
    /// generation even if the transport ignores the token) and spawns one
    /// top-level fetch scoped to a fresh child token.
    pub fn trigger(&self) {
        let (generation, token) = self.begin_fetch();

        let ctrl = self.clone();
        tokio::spawn(async move {
            let outcome = ctrl.inner.transport.top_level(&token).await;
            ctrl.apply_top_level(generation, outcome);
        });
    }

    /// Bump the generation and rotate the in-flight token. Split from
    /// [`trigger()`](Self::trigger) so the guard logic is testable without
    /// spawning.
    fn begin_fetch(&self) -> (u64, CancellationToken) {
        let mut generation = 0;
        self.inner.state.send_modify(|s| {
            s.generation += 1;
            generation = s.generation;
        });

        let token = self.inner.cancel.child_token();
        let previous = {
            let mut guard = self
                .inner
                .in_flight
                .lock()
                .expect("in-flight token lock poisoned");
            std::mem::replace(&mut *guard, token.clone())
        };
        previous.cancel();

        debug!(generation, "top-level fetch started");
        (generation, token)
    }

    /// Apply a top-level fetch resolution, guarded by generation.
    ///
    /// The guard check and the mutation happen inside one `send_modify`
    /// closure; the watch sender serializes them against concurrent
    /// `begin_fetch` bumps.
    fn apply_top_level(&self, generation: u64, outcome: FetchOutcome<TopLevel>) {
        self.inner.state.send_if_modified(|s| {
            if s.generation != generation {
                debug!(
                    generation,
                    current = s.generation,
                    "discarding superseded fetch result"
                );
                return false;
            }

            match outcome {
                // Cancellation is silent: no state mutation at all.
                FetchOutcome::Aborted => false,

                FetchOutcome::Error(e) if e.is_unauthenticated() => {
                    // Authorization failure drives the login machine, not
                    // the error banner. Snapshot and error stay untouched.
                    debug!(generation, "server requires login");
                    s.login = LoginState::ServerRequiresLogin;
                    s.session = None;
                    true
                }

                FetchOutcome::Error(e) => {
                    warn!(generation, error = %e, "top-level fetch failed");
                    s.error = Some(e);
                    true
                }

                FetchOutcome::Success(top) => {
                    let (snapshot, session) = split_top_level(top);
                    debug!(
                        generation,
                        cameras = snapshot.cameras.len(),
                        logged_in = session.is_some(),
                        "top-level fetch complete"
                    );
                    s.error = None;
                    s.login = if session.is_some() {
                        LoginState::LoggedIn
                    } else {
                        LoginState::NotLoggedIn
                    };
                    s.session = session;
                    s.snapshot = Some(snapshot);
                    true
                }
            }
        });
    }

    // ── Login callbacks ──────────────────────────────────────────────

    /// The user opened the login overlay. Ignored unless the state machine
    /// allows it (only from `NotLoggedIn`).
    pub fn request_login(&self) {
        self.inner.state.send_if_modified(|s| {
            let next = s.login.request_login();
            let changed = next != s.login;
            s.login = next;
            changed
        });
    }

    /// The login overlay was dismissed without success.
    pub fn dismiss_login(&self) {
        self.inner.state.send_if_modified(|s| {
            let next = s.login.dismiss_login();
            let changed = next != s.login;
            s.login = next;
            changed
        });
    }

    /// A login attempt succeeded. Transitions to `LoggedIn` and triggers a
    /// new fetch generation to load the session's reference data.
    pub fn on_login_success(&self) {
        let changed = self.inner.state.send_if_modified(|s| {
            let next = s.login.login_succeeded();
            let changed = next != s.login;
            s.login = next;
            changed
        });
        if changed {
            self.trigger();
        }
    }

    /// End the current session.
    ///
    /// No-op when no session exists (two racing logouts resolve the same
    /// way: the later one finds the session already cleared). On transport
    /// failure the user stays logged in and a [`Notice::LogoutFailed`] is
    /// broadcast; on success the session is cleared locally and a new
    /// fetch generation recomputes the login state.
    pub async fn logout(&self) {
        let Some(csrf) = self
            .inner
            .state
            .borrow()
            .session
            .as_ref()
            .map(|s| s.csrf.clone())
        else {
            debug!("logout requested without a session; ignoring");
            return;
        };

        let token = self.inner.cancel.child_token();
        match self.inner.transport.logout(&csrf, &token).await {
            FetchOutcome::Aborted => {}
            FetchOutcome::Error(e) => {
                warn!(error = %e, "logout failed");
                let _ = self.inner.notices.send(Notice::LogoutFailed {
                    message: e.to_string(),
                });
            }
            FetchOutcome::Success(()) => {
                self.inner.state.send_modify(|s| {
                    s.session = None;
                });
                self.trigger();
            }
        }
    }

    // ── View callbacks ───────────────────────────────────────────────

    /// Switch the active top-level view. Does not touch the data or start
    /// a fetch.
    pub fn switch_activity(&self, activity: Activity) {
        self.inner.state.send_if_modified(|s| {
            let changed = s.activity != activity;
            s.activity = activity;
            changed
        });
    }

    /// Toggle the list view's selector column.
    pub fn toggle_list_selectors(&self) {
        self.inner.state.send_modify(|s| {
            s.list_selectors_visible = !s.list_selectors_visible;
        });
    }

    /// Choose a multiview layout for the live view.
    pub fn set_multiview_layout(&self, layout: usize) {
        self.inner.state.send_if_modified(|s| {
            let changed = s.multiview_layout != layout;
            s.multiview_layout = layout;
            changed
        });
    }

    // ── Teardown ─────────────────────────────────────────────────────

    /// Tear the controller down: cancels the in-flight fetch (and any
    /// future child tokens) and invalidates the current generation, so a
    /// resolution from a transport that ignores the token is discarded by
    /// the generation guard rather than applied.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.inner.state.send_modify(|s| s.generation += 1);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use tokio::sync::oneshot;

    use watchpost_api::types::{self, TopLevel};

    use super::*;

    // ── Scripted transport ───────────────────────────────────────────

    /// One scripted top-level resolution. When `gate` is set the call
    /// blocks until the sender side is dropped or fired, which lets tests
    /// force completion order. `honors_cancel` controls whether the fake
    /// transport reacts to the token at all -- the generation guard must
    /// hold either way.
    struct Script {
        gate: Option<oneshot::Receiver<()>>,
        honors_cancel: bool,
        outcome: FetchOutcome<TopLevel>,
    }

    #[derive(Clone)]
    struct Scripted {
        top_level: Arc<Mutex<VecDeque<Script>>>,
        logout: Arc<Mutex<VecDeque<FetchOutcome<()>>>>,
        logout_csrf_seen: Arc<Mutex<Vec<String>>>,
    }

    impl Scripted {
        fn new() -> Self {
            Self {
                top_level: Arc::new(Mutex::new(VecDeque::new())),
                logout: Arc::new(Mutex::new(VecDeque::new())),
                logout_csrf_seen: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn push(&self, outcome: FetchOutcome<TopLevel>) {
            self.top_level.lock().unwrap().push_back(Script {
                gate: None,
                honors_cancel: false,
                outcome,
            });
        }

        /// Push a gated resolution; returns the trigger that releases it.
        fn push_gated(
            &self,
            honors_cancel: bool,
            outcome: FetchOutcome<TopLevel>,
        ) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.top_level.lock().unwrap().push_back(Script {
                gate: Some(rx),
                honors_cancel,
                outcome,
            });
            tx
        }

        fn push_logout(&self, outcome: FetchOutcome<()>) {
            self.logout.lock().unwrap().push_back(outcome);
        }
    }

    impl Transport for Scripted {
        async fn top_level(&self, cancel: &CancellationToken) -> FetchOutcome<TopLevel> {
            let script = self
                .top_level
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected top_level call");
            if let Some(gate) = script.gate {
                if script.honors_cancel {
                    tokio::select! {
                        () = cancel.cancelled() => return FetchOutcome::Aborted,
                        _ = gate => {}
                    }
                } else {
                    let _ = gate.await;
                }
            }
            script.outcome
        }

        async fn logout(&self, csrf: &str, _cancel: &CancellationToken) -> FetchOutcome<()> {
            self.logout_csrf_seen.lock().unwrap().push(csrf.to_owned());
            self.logout
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected logout call")
        }
    }

    // ── Fixtures ─────────────────────────────────────────────────────

    fn camera(uuid: &str) -> types::Camera {
        types::Camera {
            uuid: uuid.into(),
            short_name: format!("cam-{uuid}"),
            description: String::new(),
        }
    }

    fn success(cameras: &[&str], with_session: bool) -> FetchOutcome<TopLevel> {
        FetchOutcome::Success(TopLevel {
            time_zone_name: "UTC".into(),
            cameras: cameras.iter().map(|c| camera(c)).collect(),
            user: with_session.then(|| types::User {
                name: "admin".into(),
                session: Some(types::Session { csrf: "tok".into() }),
            }),
        })
    }

    fn http_error(status: u16) -> FetchOutcome<TopLevel> {
        FetchOutcome::Error(FetchError {
            status: Some(status),
            message: format!("HTTP {status}"),
        })
    }

    /// Let spawned completion handlers run (single-threaded test runtime).
    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    // ── Startup scenarios ────────────────────────────────────────────

    #[tokio::test]
    async fn startup_success_with_session() {
        let transport = Scripted::new();
        transport.push(success(&["a", "b"], true));

        let ctrl = SessionController::new(transport);
        let mut rx = ctrl.subscribe();
        ctrl.trigger();

        let state = rx
            .wait_for(|s| s.snapshot.is_some())
            .await
            .unwrap()
            .clone();
        assert_eq!(state.login, LoginState::LoggedIn);
        assert_eq!(state.session.as_ref().map(|s| s.csrf.as_str()), Some("tok"));
        assert_eq!(state.snapshot.as_ref().unwrap().cameras.len(), 2);
        assert!(state.error.is_none());
        assert!(!state.login.overlay_visible());
    }

    #[tokio::test]
    async fn startup_anonymous_success() {
        let transport = Scripted::new();
        transport.push(success(&["a"], false));

        let ctrl = SessionController::new(transport);
        let mut rx = ctrl.subscribe();
        ctrl.trigger();

        let state = rx
            .wait_for(|s| s.snapshot.is_some())
            .await
            .unwrap()
            .clone();
        assert_eq!(state.login, LoginState::NotLoggedIn);
        assert!(state.session.is_none());
    }

    #[tokio::test]
    async fn startup_unauthenticated_requires_login() {
        let transport = Scripted::new();
        transport.push(http_error(401));

        let ctrl = SessionController::new(transport);
        let mut rx = ctrl.subscribe();
        ctrl.trigger();

        let state = rx
            .wait_for(|s| s.login == LoginState::ServerRequiresLogin)
            .await
            .unwrap()
            .clone();
        // Auth failure is not a banner error, and no view data is mounted.
        assert!(state.error.is_none());
        assert!(state.snapshot.is_none());
        assert!(state.session.is_none());
        assert!(state.login.overlay_visible());
    }

    #[tokio::test]
    async fn startup_transport_error_sets_banner_only() {
        let transport = Scripted::new();
        transport.push(http_error(503));

        let ctrl = SessionController::new(transport);
        let mut rx = ctrl.subscribe();
        ctrl.trigger();

        let state = rx.wait_for(|s| s.error.is_some()).await.unwrap().clone();
        assert_eq!(state.login, LoginState::Unknown);
        assert_eq!(state.error.as_ref().unwrap().status, Some(503));
        assert!(state.snapshot.is_none());
    }

    // ── Result-handling details ──────────────────────────────────────

    #[tokio::test]
    async fn auth_failure_preserves_error_and_snapshot() {
        let transport = Scripted::new();
        transport.push(success(&["a"], true));
        transport.push(http_error(503));
        transport.push(http_error(401));

        let ctrl = SessionController::new(transport);
        let mut rx = ctrl.subscribe();

        ctrl.trigger();
        rx.wait_for(|s| s.snapshot.is_some()).await.unwrap();
        ctrl.trigger();
        rx.wait_for(|s| s.error.is_some()).await.unwrap();
        ctrl.trigger();
        let state = rx
            .wait_for(|s| s.login == LoginState::ServerRequiresLogin)
            .await
            .unwrap()
            .clone();

        // The 401 handler touches only login + session.
        assert_eq!(state.error.as_ref().unwrap().status, Some(503));
        assert!(state.snapshot.is_some());
        assert!(state.session.is_none());
    }

    #[tokio::test]
    async fn success_clears_previous_error() {
        let transport = Scripted::new();
        transport.push(http_error(500));
        transport.push(success(&[], false));

        let ctrl = SessionController::new(transport);
        let mut rx = ctrl.subscribe();

        ctrl.trigger();
        rx.wait_for(|s| s.error.is_some()).await.unwrap();
        ctrl.trigger();
        let state = rx
            .wait_for(|s| s.snapshot.is_some())
            .await
            .unwrap()
            .clone();

        assert!(state.error.is_none());
        // Empty camera list is a legitimate snapshot.
        assert!(state.snapshot.as_ref().unwrap().cameras.is_empty());
    }

    #[tokio::test]
    async fn success_without_session_logs_out_regardless_of_prior_state() {
        let transport = Scripted::new();
        transport.push(success(&["a"], true));
        transport.push(success(&["a"], false));

        let ctrl = SessionController::new(transport);
        let mut rx = ctrl.subscribe();

        ctrl.trigger();
        rx.wait_for(|s| s.login == LoginState::LoggedIn).await.unwrap();
        ctrl.trigger();
        let state = rx
            .wait_for(|s| s.login == LoginState::NotLoggedIn)
            .await
            .unwrap()
            .clone();
        assert!(state.session.is_none());
    }

    // ── Generation guard ─────────────────────────────────────────────

    #[test]
    fn stale_generation_is_discarded_even_on_success() {
        let ctrl = SessionController::new(Scripted::new());

        let (gen1, _t1) = ctrl.begin_fetch();
        let (gen2, _t2) = ctrl.begin_fetch();
        assert!(gen2 > gen1);

        // Newer fetch resolves first.
        ctrl.apply_top_level(gen2, success(&["new"], false));
        // Older fetch resolves late with a *success* -- must be a no-op.
        ctrl.apply_top_level(gen1, success(&["old"], true));

        let state = ctrl.state();
        assert_eq!(state.snapshot.as_ref().unwrap().cameras[0].uuid, "new");
        assert_eq!(state.login, LoginState::NotLoggedIn);
        assert!(state.session.is_none());
    }

    #[test]
    fn stale_error_is_discarded_too() {
        let ctrl = SessionController::new(Scripted::new());

        let (gen1, _t1) = ctrl.begin_fetch();
        let (gen2, _t2) = ctrl.begin_fetch();

        ctrl.apply_top_level(gen2, success(&["a"], false));
        ctrl.apply_top_level(gen1, http_error(500));
        ctrl.apply_top_level(gen1, http_error(401));

        let state = ctrl.state();
        assert!(state.error.is_none());
        assert_eq!(state.login, LoginState::NotLoggedIn);
    }

    #[tokio::test]
    async fn slow_old_fetch_resolving_after_new_one_is_ignored() {
        let transport = Scripted::new();
        // Generation 1: gated, ignores cancellation, would report cameras
        // ["old"] with a session.
        let release_old = transport.push_gated(false, success(&["old"], true));
        // Generation 2: resolves immediately.
        transport.push(success(&["new"], false));

        let ctrl = SessionController::new(transport);
        let mut rx = ctrl.subscribe();

        ctrl.trigger();
        ctrl.trigger();

        let state = rx
            .wait_for(|s| s.snapshot.is_some())
            .await
            .unwrap()
            .clone();
        assert_eq!(state.snapshot.as_ref().unwrap().cameras[0].uuid, "new");

        // Now let the superseded generation-1 fetch complete.
        release_old.send(()).unwrap();
        settle().await;

        let state = ctrl.state();
        assert_eq!(state.snapshot.as_ref().unwrap().cameras[0].uuid, "new");
        assert_eq!(state.login, LoginState::NotLoggedIn);
        assert!(state.session.is_none());
    }

    #[tokio::test]
    async fn superseded_fetch_token_is_cancelled() {
        let transport = Scripted::new();
        // Honors cancellation: resolves Aborted once trigger() supersedes it.
        let _gate = transport.push_gated(true, success(&["old"], true));
        transport.push(success(&["new"], false));

        let ctrl = SessionController::new(transport);
        let mut rx = ctrl.subscribe();

        ctrl.trigger();
        ctrl.trigger();
        settle().await;

        let state = rx
            .wait_for(|s| s.snapshot.is_some())
            .await
            .unwrap()
            .clone();
        assert_eq!(state.snapshot.as_ref().unwrap().cameras[0].uuid, "new");
    }

    #[tokio::test]
    async fn shutdown_cancels_in_flight_fetch() {
        let transport = Scripted::new();
        let _gate = transport.push_gated(true, success(&["a"], true));

        let ctrl = SessionController::new(transport);
        ctrl.trigger();
        ctrl.shutdown();
        settle().await;

        // The fetch resolved Aborted: no state was mutated.
        let state = ctrl.state();
        assert!(state.snapshot.is_none());
        assert_eq!(state.login, LoginState::Unknown);
    }

    #[tokio::test]
    async fn fetch_resolving_after_shutdown_is_discarded() {
        let transport = Scripted::new();
        // Ignores cancellation: the only guard left is the generation.
        let release = transport.push_gated(false, success(&["a"], true));

        let ctrl = SessionController::new(transport);
        ctrl.trigger();
        ctrl.shutdown();

        release.send(()).unwrap();
        settle().await;

        let state = ctrl.state();
        assert!(state.snapshot.is_none());
        assert!(state.session.is_none());
        assert_eq!(state.login, LoginState::Unknown);
    }

    // ── Login callbacks ──────────────────────────────────────────────

    #[tokio::test]
    async fn request_and_dismiss_login_overlay() {
        let transport = Scripted::new();
        transport.push(success(&[], false));

        let ctrl = SessionController::new(transport);
        let mut rx = ctrl.subscribe();
        ctrl.trigger();
        rx.wait_for(|s| s.login == LoginState::NotLoggedIn).await.unwrap();

        ctrl.request_login();
        assert_eq!(ctrl.state().login, LoginState::UserRequestedLogin);
        assert!(ctrl.state().login.overlay_visible());

        ctrl.dismiss_login();
        assert_eq!(ctrl.state().login, LoginState::NotLoggedIn);
    }

    #[tokio::test]
    async fn request_login_is_ignored_while_logged_in() {
        let transport = Scripted::new();
        transport.push(success(&["a"], true));

        let ctrl = SessionController::new(transport);
        let mut rx = ctrl.subscribe();
        ctrl.trigger();
        rx.wait_for(|s| s.login == LoginState::LoggedIn).await.unwrap();

        ctrl.request_login();
        assert_eq!(ctrl.state().login, LoginState::LoggedIn);
    }

    #[tokio::test]
    async fn login_success_triggers_new_generation() {
        let transport = Scripted::new();
        transport.push(http_error(401));
        transport.push(success(&["a"], true));

        let ctrl = SessionController::new(transport);
        let mut rx = ctrl.subscribe();
        ctrl.trigger();
        rx.wait_for(|s| s.login == LoginState::ServerRequiresLogin)
            .await
            .unwrap();
        let generation_before = ctrl.state().generation;

        ctrl.on_login_success();
        let state = rx
            .wait_for(|s| s.snapshot.is_some())
            .await
            .unwrap()
            .clone();

        assert!(state.generation > generation_before);
        assert_eq!(state.login, LoginState::LoggedIn);
    }

    #[tokio::test]
    async fn login_success_outside_overlay_states_is_ignored() {
        let transport = Scripted::new();
        let ctrl = SessionController::new(transport);

        // Unknown state: no overlay is open, so the event is illegal and
        // must neither transition nor trigger a fetch.
        ctrl.on_login_success();
        settle().await;

        let state = ctrl.state();
        assert_eq!(state.login, LoginState::Unknown);
        assert_eq!(state.generation, 0);
    }

    // ── Logout ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn logout_success_clears_session_and_refetches() {
        let transport = Scripted::new();
        transport.push(success(&["a"], true));
        transport.push_logout(FetchOutcome::Success(()));
        transport.push(success(&["a"], false));
        let csrf_seen = Arc::clone(&transport.logout_csrf_seen);

        let ctrl = SessionController::new(transport);
        let mut rx = ctrl.subscribe();
        ctrl.trigger();
        rx.wait_for(|s| s.login == LoginState::LoggedIn).await.unwrap();

        ctrl.logout().await;
        let state = rx
            .wait_for(|s| s.login == LoginState::NotLoggedIn)
            .await
            .unwrap()
            .clone();

        assert!(state.session.is_none());
        assert_eq!(csrf_seen.lock().unwrap().as_slice(), ["tok"]);
    }

    #[tokio::test]
    async fn logout_failure_keeps_session_and_notifies() {
        let transport = Scripted::new();
        transport.push(success(&["a"], true));
        transport.push_logout(FetchOutcome::Error(FetchError {
            status: Some(500),
            message: "boom".into(),
        }));

        let ctrl = SessionController::new(transport);
        let mut state_rx = ctrl.subscribe();
        let mut notice_rx = ctrl.notices();
        ctrl.trigger();
        state_rx
            .wait_for(|s| s.login == LoginState::LoggedIn)
            .await
            .unwrap();

        ctrl.logout().await;

        let state = ctrl.state();
        assert_eq!(state.login, LoginState::LoggedIn);
        assert!(state.session.is_some());
        match notice_rx.try_recv().unwrap() {
            Notice::LogoutFailed { message } => assert!(message.contains("boom")),
        }
    }

    #[tokio::test]
    async fn logout_without_session_is_a_no_op() {
        let transport = Scripted::new();
        let ctrl = SessionController::new(transport);

        // No logout script pushed: a transport call would panic the test.
        ctrl.logout().await;

        assert_eq!(ctrl.state().generation, 0);
    }

    // ── View callbacks ───────────────────────────────────────────────

    #[tokio::test]
    async fn activity_switching_does_not_touch_data() {
        let transport = Scripted::new();
        transport.push(success(&["a"], true));

        let ctrl = SessionController::new(transport);
        let mut rx = ctrl.subscribe();
        ctrl.trigger();
        rx.wait_for(|s| s.snapshot.is_some()).await.unwrap();
        let before = ctrl.state();

        ctrl.switch_activity(Activity::Live);
        ctrl.set_multiview_layout(3);
        ctrl.toggle_list_selectors();

        let after = ctrl.state();
        assert_eq!(after.activity, Activity::Live);
        assert_eq!(after.multiview_layout, 3);
        assert!(!after.list_selectors_visible);
        assert_eq!(after.snapshot, before.snapshot);
        assert_eq!(after.login, before.login);
        assert_eq!(after.generation, before.generation);
    }
}
