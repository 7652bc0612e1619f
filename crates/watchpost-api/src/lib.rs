//! Async HTTP client for the NVR server API.
//!
//! The server exposes a small JSON surface: a cookie-authenticated login,
//! a CSRF-guarded logout, and a single top-level endpoint that returns the
//! session (if any), the camera list, and the server's time zone in one
//! atomic response.
//!
//! Fetches that can be superseded return a [`FetchOutcome`] rather than a
//! `Result`: cancellation (`Aborted`) is a benign, expected resolution and
//! must never be conflated with a transport failure.

pub mod client;
pub mod error;
pub mod outcome;
pub mod transport;
pub mod types;

pub use client::NvrClient;
pub use error::Error;
pub use outcome::{FetchError, FetchOutcome};
pub use transport::{TlsMode, TransportConfig};
pub use types::{Camera, Session, TopLevel, User};
