pub mod auth;
pub mod error;
pub mod middleware;
pub mod notes;
pub mod routes;
pub mod state;
pub mod token;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, AppStateInner};

/// Treat an empty string the same as a missing field.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
