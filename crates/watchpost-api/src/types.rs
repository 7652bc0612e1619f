// Wire types for the NVR server's JSON API.
//
// Field names follow the server's camelCase convention; unknown fields are
// tolerated so newer servers don't break older clients.

use serde::Deserialize;

/// The top-level response: session, cameras, and time zone in one atomic
/// payload. Consumers must treat the camera list and time zone as a unit;
/// there is no endpoint that returns one without the other.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TopLevel {
    /// IANA name of the server's time zone (e.g. `America/Los_Angeles`).
    pub time_zone_name: String,

    /// All cameras the requesting user may see. May legitimately be empty.
    #[serde(default)]
    pub cameras: Vec<Camera>,

    /// The authenticated user, absent for anonymous access.
    pub user: Option<User>,
}

/// The authenticated user as reported by the top-level endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,

    /// The credential bundle for this session. Absent when the user is
    /// known (e.g. via a permanent cookie) but holds no live session.
    pub session: Option<Session>,
}

/// Opaque credential bundle issued by the server on login.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Anti-forgery token; required on every state-changing request.
    pub csrf: String,
}

/// A camera as described by the server. Display metadata only — the
/// client never interprets these fields beyond showing them.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub uuid: String,
    pub short_name: String,
    #[serde(default)]
    pub description: String,
}
