// ── Login state machine ──
//
// Five states, six legal transitions. User-driven events go through the
// methods below, which return the state unchanged on an illegal transition.
// Fetch-driven transitions (auth failure, refresh success) are applied by
// the controller's completion handler.

/// Authentication status as seen by this client. Process-local; never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginState {
    /// Startup: no fetch has resolved yet.
    #[default]
    Unknown,
    /// The server confirmed a live session.
    LoggedIn,
    /// The server answered without a session and does not require one.
    NotLoggedIn,
    /// The server rejected a fetch for lack of a session.
    ServerRequiresLogin,
    /// The user opened the login overlay without being asked to.
    UserRequestedLogin,
}

impl LoginState {
    /// Whether the login overlay is shown. A deterministic function of the
    /// state: visible exactly when the server demands a login or the user
    /// asked for one.
    pub fn overlay_visible(self) -> bool {
        matches!(self, Self::ServerRequiresLogin | Self::UserRequestedLogin)
    }

    /// The user explicitly opened the login overlay. Legal only from
    /// `NotLoggedIn`; any other state is returned unchanged.
    pub fn request_login(self) -> Self {
        match self {
            Self::NotLoggedIn => Self::UserRequestedLogin,
            other => other,
        }
    }

    /// The login overlay was dismissed without a successful login. Only a
    /// user-requested overlay can be dismissed; a server-required one stays
    /// until login succeeds.
    pub fn dismiss_login(self) -> Self {
        match self {
            Self::UserRequestedLogin => Self::NotLoggedIn,
            other => other,
        }
    }

    /// A login attempt succeeded. Legal from either overlay-visible state.
    pub fn login_succeeded(self) -> Self {
        match self {
            Self::UserRequestedLogin | Self::ServerRequiresLogin => Self::LoggedIn,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LoginState;

    const ALL: [LoginState; 5] = [
        LoginState::Unknown,
        LoginState::LoggedIn,
        LoginState::NotLoggedIn,
        LoginState::ServerRequiresLogin,
        LoginState::UserRequestedLogin,
    ];

    #[test]
    fn default_is_unknown() {
        assert_eq!(LoginState::default(), LoginState::Unknown);
    }

    #[test]
    fn request_login_only_from_not_logged_in() {
        for state in ALL {
            let next = state.request_login();
            if state == LoginState::NotLoggedIn {
                assert_eq!(next, LoginState::UserRequestedLogin);
            } else {
                assert_eq!(next, state, "illegal transition must be ignored");
            }
        }
    }

    #[test]
    fn dismiss_only_closes_user_requested_overlay() {
        for state in ALL {
            let next = state.dismiss_login();
            if state == LoginState::UserRequestedLogin {
                assert_eq!(next, LoginState::NotLoggedIn);
            } else {
                assert_eq!(next, state);
            }
        }
        // In particular a server-required login cannot be dismissed away.
        assert_eq!(
            LoginState::ServerRequiresLogin.dismiss_login(),
            LoginState::ServerRequiresLogin
        );
    }

    #[test]
    fn login_success_only_from_overlay_states() {
        for state in ALL {
            let next = state.login_succeeded();
            if state.overlay_visible() {
                assert_eq!(next, LoginState::LoggedIn);
            } else {
                assert_eq!(next, state);
            }
        }
    }

    #[test]
    fn overlay_visibility_table() {
        assert!(!LoginState::Unknown.overlay_visible());
        assert!(!LoginState::LoggedIn.overlay_visible());
        assert!(!LoginState::NotLoggedIn.overlay_visible());
        assert!(LoginState::ServerRequiresLogin.overlay_visible());
        assert!(LoginState::UserRequestedLogin.overlay_visible());
    }
}
