// Tagged fetch resolution.
//
// Every cancellable request resolves to exactly one of three shapes.
// Callers match on the tag; nothing here is ever propagated with `?`.

/// HTTP status code the server uses to signal that a session is required.
pub const STATUS_UNAUTHENTICATED: u16 = 401;

/// A fetch failure that is not a cancellation.
///
/// `status` is present when the server answered with a non-success code;
/// absent for connection-level failures (refused, DNS, timeout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub status: Option<u16>,
    pub message: String,
}

impl FetchError {
    /// True when the server rejected the request for lack of a valid
    /// session. Drives the login state machine instead of the error banner.
    pub fn is_unauthenticated(&self) -> bool {
        self.status == Some(STATUS_UNAUTHENTICATED)
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {status}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Resolution of a cancellable fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    /// The fetch was cancelled (superseded or torn down). Benign; callers
    /// mutate no state on this arm.
    Aborted,
    /// The fetch failed.
    Error(FetchError),
    /// The fetch completed with a response.
    Success(T),
}
