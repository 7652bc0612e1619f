// ── Domain model ──
//
// Small on purpose: the core treats cameras as opaque display records and
// the session as an opaque credential bundle. Conversion from the wire
// shapes happens here so the rest of the crate never sees serde types.

use watchpost_api::types;

/// A camera as shown to the user. Identity plus display metadata; the core
/// never interprets these fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Camera {
    pub uuid: String,
    pub short_name: String,
    pub description: String,
}

impl From<types::Camera> for Camera {
    fn from(wire: types::Camera) -> Self {
        Self {
            uuid: wire.uuid,
            short_name: wire.short_name,
            description: wire.description,
        }
    }
}

/// The credential bundle for the live session. Present iff the login state
/// is `LoggedIn`; cleared on logout and on authorization failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Name of the authenticated user.
    pub user_name: String,
    /// Anti-forgery token, required by the logout endpoint.
    pub csrf: String,
}

/// The server-provided reference data, fetched atomically: either the whole
/// tuple is present or none of it is. Partial snapshots never exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSnapshot {
    pub cameras: Vec<Camera>,
    pub time_zone_name: String,
}

/// Split a top-level wire response into the reference snapshot and the
/// session it carried (if any).
pub(crate) fn split_top_level(top: types::TopLevel) -> (ReferenceSnapshot, Option<Session>) {
    let session = top.user.and_then(|user| {
        let name = user.name;
        user.session.map(|s| Session {
            user_name: name,
            csrf: s.csrf,
        })
    });
    let snapshot = ReferenceSnapshot {
        cameras: top.cameras.into_iter().map(Camera::from).collect(),
        time_zone_name: top.time_zone_name,
    };
    (snapshot, session)
}

/// The active top-level view. Independent of the data; read by the derived
/// view state to pick the auxiliary control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activity {
    /// Recording list view.
    #[default]
    List,
    /// Live multiview.
    Live,
}
