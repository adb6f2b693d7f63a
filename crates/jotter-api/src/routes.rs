use axum::{
    Json, Router, middleware,
    http::StatusCode,
    routing::{delete, get, post, put},
};

use jotter_types::api::StatusResponse;

use crate::auth;
use crate::middleware::require_auth;
use crate::notes;
use crate::state::AppState;

/// All routes, without transport layers (CORS, tracing). The binary adds
/// those; tests drive this router directly.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(welcome))
        .route("/create-account", post(auth::register))
        .route("/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/get-user", get(auth::get_user))
        .route("/add-note", post(notes::add_note))
        .route("/edit-note/{note_id}", put(notes::edit_note))
        .route("/get-all-notes", get(notes::get_all_notes))
        .route("/delete-note/{note_id}", delete(notes::delete_note))
        .route("/get-pinned-notes", get(notes::get_pinned_notes))
        .route("/update-pin-status/{note_id}", put(notes::update_pin_status))
        .route("/search-notes", get(notes::search_notes))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(route_not_found)
        .with_state(state)
}

async fn welcome() -> Json<StatusResponse> {
    Json(StatusResponse::ok("Welcome to the API"))
}

async fn route_not_found() -> (StatusCode, Json<StatusResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(StatusResponse::failed("Route not found.")),
    )
}
