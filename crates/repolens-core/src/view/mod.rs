//! Form-and-result view state.
//!
//! The view is an immutable [`ViewState`] value. Every change goes through
//! [`ViewState::apply`], a pure function of the current state and a
//! [`ViewEvent`]. Events that carry a handle only apply while that handle is
//! the current one, so answers for a replaced submission are dropped.

pub mod model;
pub mod render;

pub use model::{ViewEvent, ViewState};
pub use render::{method_line, ViewModel, FETCHING_MESSAGE, IN_PROGRESS_MESSAGE};

use tracing::debug;

impl ViewState {
    /// Compute the state that follows `event`.
    pub fn apply(&self, event: ViewEvent) -> ViewState {
        use ViewEvent as E;
        use ViewState as S;

        match (self, event) {
            // Submitting is allowed from anywhere and discards the old handle.
            (_, E::Submit { repo_url, ticket }) => S::Submitting { repo_url, ticket },

            (
                S::Submitting { repo_url, ticket },
                E::Accepted {
                    ticket: incoming,
                    handle,
                    at,
                },
            ) if *ticket == incoming => S::Submitted {
                repo_url: repo_url.clone(),
                handle,
                submitted_at: at,
                attempts: 0,
            },

            (
                S::Submitting { repo_url, ticket },
                E::SubmitFailed {
                    ticket: incoming,
                    error,
                },
            ) if *ticket == incoming => S::Failed {
                repo_url: repo_url.clone(),
                handle: None,
                error,
            },

            (
                S::Submitted {
                    repo_url,
                    handle,
                    submitted_at,
                    ..
                },
                E::FetchStarted {
                    handle: incoming,
                    attempt,
                },
            ) if *handle == incoming => S::Fetching {
                repo_url: repo_url.clone(),
                handle: incoming,
                submitted_at: *submitted_at,
                attempt,
            },

            (
                S::Fetching {
                    repo_url,
                    handle,
                    submitted_at,
                    attempt,
                },
                E::NotReady { handle: incoming },
            ) if *handle == incoming => S::Submitted {
                repo_url: repo_url.clone(),
                handle: incoming,
                submitted_at: *submitted_at,
                attempts: *attempt,
            },

            (
                S::Submitted {
                    repo_url, handle, ..
                }
                | S::Fetching {
                    repo_url, handle, ..
                },
                E::Fetched {
                    handle: incoming,
                    result,
                },
            ) if *handle == incoming => S::Resolved {
                repo_url: repo_url.clone(),
                handle: incoming,
                result,
            },

            (
                S::Submitted {
                    repo_url, handle, ..
                }
                | S::Fetching {
                    repo_url, handle, ..
                },
                E::FetchFailed {
                    handle: incoming,
                    error,
                },
            ) if *handle == incoming => S::Failed {
                repo_url: repo_url.clone(),
                handle: Some(incoming),
                error,
            },

            (state, event) => {
                debug!(state = state.name(), ?event, "Ignoring event");
                state.clone()
            }
        }
    }
}
