//! Derived view state.
//!
//! Everything here is a pure function of [`UiState`]: the presentation
//! layer recomputes these on each render instead of caching them, so the
//! screen can never disagree with the state container.

use watchpost_api::FetchError;

use crate::controller::UiState;
use crate::model::{Activity, Camera};

/// Guidance appended to the error banner. Refreshes are never retried
/// automatically; recovery is an explicit user action.
pub const RETRY_GUIDANCE: &str = "press r to retry";

/// The main view to mount, with the data it needs. `None` means nothing is
/// routed yet (no snapshot, or a snapshot with zero cameras) and the frame
/// shows only the chrome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutedView<'a> {
    List {
        cameras: &'a [Camera],
        time_zone_name: &'a str,
        selectors_visible: bool,
    },
    Live {
        cameras: &'a [Camera],
        layout: usize,
    },
}

/// The per-activity control rendered in the header bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityControl {
    /// List view: show/hide the per-camera selector column.
    SelectorToggle,
    /// Live view: pick the multiview grid layout.
    MultiviewChooser { layout: usize },
}

/// Banner text for a failed refresh, or `None` when the last fetch was
/// clean. The server's message is shown verbatim.
pub fn error_banner(error: Option<&FetchError>) -> Option<String> {
    error.map(|e| format!("{e} ({RETRY_GUIDANCE})"))
}

/// The view to route to, if any. A present-but-empty camera list routes
/// nothing: there is no placeholder rendering for a server with no
/// cameras configured.
pub fn routed_view(state: &UiState) -> Option<RoutedView<'_>> {
    let snapshot = state.snapshot.as_ref()?;
    if snapshot.cameras.is_empty() {
        return None;
    }
    Some(match state.activity {
        Activity::List => RoutedView::List {
            cameras: &snapshot.cameras,
            time_zone_name: &snapshot.time_zone_name,
            selectors_visible: state.list_selectors_visible,
        },
        Activity::Live => RoutedView::Live {
            cameras: &snapshot.cameras,
            layout: state.multiview_layout,
        },
    })
}

/// The header control for the current activity. Suppressed whenever an
/// error banner is up or no camera exists, so the user can't operate a
/// control whose view isn't mounted.
pub fn activity_control(state: &UiState) -> Option<ActivityControl> {
    if state.error.is_some() {
        return None;
    }
    let snapshot = state.snapshot.as_ref()?;
    if snapshot.cameras.is_empty() {
        return None;
    }
    Some(match state.activity {
        Activity::List => ActivityControl::SelectorToggle,
        Activity::Live => ActivityControl::MultiviewChooser {
            layout: state.multiview_layout,
        },
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use crate::model::ReferenceSnapshot;

    use super::*;

    fn camera(uuid: &str) -> Camera {
        Camera {
            uuid: uuid.into(),
            short_name: format!("cam-{uuid}"),
            description: String::new(),
        }
    }

    fn state_with(cameras: Vec<Camera>) -> UiState {
        UiState {
            snapshot: Some(ReferenceSnapshot {
                cameras,
                time_zone_name: "America/Los_Angeles".into(),
            }),
            ..UiState::default()
        }
    }

    #[test]
    fn nothing_routed_without_snapshot() {
        let state = UiState::default();
        assert_eq!(routed_view(&state), None);
        assert_eq!(activity_control(&state), None);
    }

    #[test]
    fn nothing_routed_with_zero_cameras() {
        let state = state_with(vec![]);
        assert_eq!(routed_view(&state), None);
        assert_eq!(activity_control(&state), None);
    }

    #[test]
    fn list_view_routes_with_cameras() {
        let state = state_with(vec![camera("a")]);
        match routed_view(&state).unwrap() {
            RoutedView::List {
                cameras,
                time_zone_name,
                selectors_visible,
            } => {
                assert_eq!(cameras.len(), 1);
                assert_eq!(time_zone_name, "America/Los_Angeles");
                assert!(selectors_visible);
            }
            other => panic!("unexpected view: {other:?}"),
        }
        assert_eq!(activity_control(&state), Some(ActivityControl::SelectorToggle));
    }

    #[test]
    fn live_view_carries_layout() {
        let mut state = state_with(vec![camera("a"), camera("b")]);
        state.activity = Activity::Live;
        state.multiview_layout = 2;

        match routed_view(&state).unwrap() {
            RoutedView::Live { cameras, layout } => {
                assert_eq!(cameras.len(), 2);
                assert_eq!(layout, 2);
            }
            other => panic!("unexpected view: {other:?}"),
        }
        assert_eq!(
            activity_control(&state),
            Some(ActivityControl::MultiviewChooser { layout: 2 })
        );
    }

    #[test]
    fn error_suppresses_the_control_but_not_the_view() {
        let mut state = state_with(vec![camera("a")]);
        state.error = Some(FetchError {
            status: Some(503),
            message: "HTTP 503".into(),
        });

        // Stale data stays on screen under the banner.
        assert!(routed_view(&state).is_some());
        assert_eq!(activity_control(&state), None);
    }

    #[test]
    fn banner_shows_message_verbatim_with_guidance() {
        let banner = error_banner(Some(&FetchError {
            status: None,
            message: "connection refused".into(),
        }))
        .unwrap();
        assert!(banner.starts_with("connection refused"));
        assert!(banner.contains(RETRY_GUIDANCE));

        assert_eq!(error_banner(None), None);
    }
}
