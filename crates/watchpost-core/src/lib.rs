//! Session and data-refresh coordination for the watchpost client.
//!
//! This crate owns the state that must never desynchronize: whether the
//! user is authenticated, the server-provided reference snapshot (cameras
//! plus time zone, fetched atomically), and which top-level activity the
//! user is looking at.
//!
//! - **[`SessionController`]** — Composition root. Holds the typed
//!   [`UiState`] container in a single `watch` channel, runs the
//!   generation-counted refresh cycle, and exposes the callbacks the
//!   presentation layer wires to its controls.
//!
//! - **[`LoginState`]** ([`login`]) — Five-state authentication machine.
//!   Illegal transitions are ignored, never panicked on.
//!
//! - **[`view`]** — Pure derivation of the error banner, the data-bearing
//!   routed view, and the per-activity auxiliary control. Recomputed from
//!   state on every change; never stored where it could go stale.
//!
//! - **[`Transport`]** ([`transport`]) — The seam to the HTTP layer. The
//!   real implementation is [`watchpost_api::NvrClient`]; tests script it.

pub mod controller;
pub mod login;
pub mod model;
pub mod transport;
pub mod view;

pub use controller::{Notice, SessionController, UiState};
pub use login::LoginState;
pub use model::{Activity, Camera, ReferenceSnapshot, Session};
pub use transport::Transport;
pub use view::{ActivityControl, RoutedView};

// Re-exported so consumers match on fetch failures without naming the api
// crate directly.
pub use watchpost_api::{FetchError, FetchOutcome};
