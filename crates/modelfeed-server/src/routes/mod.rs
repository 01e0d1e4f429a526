pub mod errors;
pub mod manifest;
pub mod models;
pub mod status;

use std::sync::Arc;

use axum::Router;

// Function to configure all routes
pub fn configure(state: Arc<crate::state::AppState>) -> Router {
    Router::new()
        .merge(status::routes())
        .merge(manifest::routes(state.clone()))
        .merge(models::routes(state))
}
