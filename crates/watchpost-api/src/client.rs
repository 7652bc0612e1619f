// HTTP client for the NVR server.
//
// Wraps `reqwest::Client` with cookie-based session auth. Login/logout are
// plain Result-returning calls; the top-level fetch is cancellable and
// resolves to a tagged `FetchOutcome` so supersession is never reported as
// a failure.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::outcome::{FetchError, FetchOutcome};
use crate::transport::TransportConfig;
use crate::types::TopLevel;

/// Client for the NVR server's JSON API.
///
/// Cheap to clone — the underlying `reqwest::Client` (and its cookie jar)
/// is shared between clones, so a login performed through one clone is
/// visible to all of them.
#[derive(Debug, Clone)]
pub struct NvrClient {
    http: reqwest::Client,
    base_url: Url,
}

impl NvrClient {
    /// Create a new client for the given server root URL.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (session auth requires cookies).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client` (tests).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Authenticate with the server using username/password.
    ///
    /// On success the session cookie is stored in the client's cookie jar
    /// and sent on all subsequent requests. The session's CSRF token is NOT
    /// returned here; it arrives with the next top-level fetch.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.api_url("/api/login")?;

        debug!("logging in at {}", url);

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        debug!("login successful");
        Ok(())
    }

    /// End the current session.
    ///
    /// Requires the CSRF token from the session being ended; the server
    /// rejects unguarded logout requests. Cancellable: a superseded or
    /// torn-down call resolves `Aborted` and must not be treated as a
    /// failed logout.
    pub async fn logout(&self, csrf: &str, cancel: &CancellationToken) -> FetchOutcome<()> {
        let url = match self.api_url("/api/logout") {
            Ok(url) => url,
            Err(e) => {
                return FetchOutcome::Error(FetchError {
                    status: None,
                    message: e.to_string(),
                });
            }
        };

        debug!("logging out at {}", url);

        let request = self.http.post(url).json(&json!({ "csrf": csrf })).send();

        let resp = tokio::select! {
            biased;
            () = cancel.cancelled() => return FetchOutcome::Aborted,
            resp = request => resp,
        };

        match resp {
            Ok(resp) if resp.status().is_success() => FetchOutcome::Success(()),
            Ok(resp) => error_outcome(resp).await,
            Err(e) => FetchOutcome::Error(transport_error(&e)),
        }
    }

    // ── Top-level fetch ──────────────────────────────────────────────

    /// Fetch the top-level snapshot: session, cameras, and time zone.
    ///
    /// Resolves `Aborted` if the token fires before the response arrives.
    /// The caller's generation guard remains authoritative regardless; this
    /// method merely avoids waiting out a request nobody will use.
    pub async fn top_level(&self, cancel: &CancellationToken) -> FetchOutcome<TopLevel> {
        let url = match self.api_url("/api/") {
            Ok(url) => url,
            Err(e) => {
                return FetchOutcome::Error(FetchError {
                    status: None,
                    message: e.to_string(),
                });
            }
        };

        debug!("GET {}", url);

        let request = self.http.get(url).send();

        let resp = tokio::select! {
            biased;
            () = cancel.cancelled() => return FetchOutcome::Aborted,
            resp = request => resp,
        };

        let resp = match resp {
            Ok(resp) => resp,
            Err(e) => return FetchOutcome::Error(transport_error(&e)),
        };

        let status = resp.status();
        if !status.is_success() {
            return error_outcome(resp).await;
        }

        match resp.json::<TopLevel>().await {
            Ok(top) => FetchOutcome::Success(top),
            Err(e) => FetchOutcome::Error(FetchError {
                status: None,
                message: format!("malformed top-level response: {e}"),
            }),
        }
    }
}

/// Build the error arm for a non-success HTTP response, using the body as
/// the message when the server sent one.
async fn error_outcome<T>(resp: reqwest::Response) -> FetchOutcome<T> {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        format!("HTTP {status}")
    } else {
        body
    };
    FetchOutcome::Error(FetchError {
        status: Some(status),
        message,
    })
}

fn transport_error(e: &reqwest::Error) -> FetchError {
    FetchError {
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    }
}
