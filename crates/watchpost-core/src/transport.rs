// ── Transport seam ──
//
// The controller talks to the server through this trait so the refresh
// cycle can be driven by a scripted transport in tests. The production
// implementation is `watchpost_api::NvrClient`.

use tokio_util::sync::CancellationToken;

use watchpost_api::{FetchOutcome, NvrClient, types::TopLevel};

/// Network operations the session controller depends on.
///
/// Both calls take a cancellation token and resolve to a tagged
/// [`FetchOutcome`]; `Aborted` is a normal resolution, not an error. An
/// implementation is free to ignore the token — the controller's generation
/// guard discards stale results either way.
pub trait Transport: Clone + Send + Sync + 'static {
    /// Fetch the top-level snapshot (session, cameras, time zone).
    fn top_level(
        &self,
        cancel: &CancellationToken,
    ) -> impl Future<Output = FetchOutcome<TopLevel>> + Send;

    /// End the session identified by `csrf`.
    fn logout(
        &self,
        csrf: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = FetchOutcome<()>> + Send;
}

impl Transport for NvrClient {
    async fn top_level(&self, cancel: &CancellationToken) -> FetchOutcome<TopLevel> {
        NvrClient::top_level(self, cancel).await
    }

    async fn logout(&self, csrf: &str, cancel: &CancellationToken) -> FetchOutcome<()> {
        NvrClient::logout(self, csrf, cancel).await
    }
}
