mod error;
mod handlers;
mod middleware;
mod state;

pub use error::{ApiError, ApiErrorBody, ApiErrorMessage, codes};
pub use state::AppState;

use axum::Router;
use axum::middleware::from_fn;
use axum::routing::get;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/forms/{form_id}/filteredResponses",
            get(handlers::filtered_responses),
        )
        .route("/healthz", get(handlers::healthz))
        .layer(from_fn(middleware::log_responses))
        .with_state(state)
}
