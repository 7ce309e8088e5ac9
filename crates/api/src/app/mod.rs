//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: history provider, clock and forecast cache handles
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: query/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the black-box tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", routes::router())
        .layer(Extension(services))
}
