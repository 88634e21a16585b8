pub mod directory;
pub mod error;
pub mod messages;
pub mod recipients;
pub mod rules;
pub mod schedule;
pub mod state;

use axum::{
    Router,
    routing::{get, put},
};

pub use error::{ApiError, ApiJson, ApiResult};
pub use state::{AppState, AppStateInner};

/// JSON routes for both tables. Indices in paths are list positions as
/// returned by the matching list endpoint.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/recipients",
            get(recipients::list_recipients).post(recipients::create_recipient),
        )
        .route(
            "/api/recipients/{index}",
            put(recipients::update_recipient).delete(recipients::delete_recipient),
        )
        .route(
            "/api/schedule",
            get(messages::list_messages).post(messages::create_message),
        )
        .route("/api/schedule/draft", get(messages::get_draft))
        .route(
            "/api/schedule/{index}",
            put(messages::update_message).delete(messages::delete_message),
        )
        .with_state(state)
}
