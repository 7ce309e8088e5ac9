use axum::{Router, routing::get};

pub mod organizations;
pub mod predictions;
pub mod system;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .route("/stats/predictions", get(predictions::get_predictions))
        .route("/stats/organizations", get(organizations::get_organization_patterns))
        .nest("/organizations", organizations::router())
}
