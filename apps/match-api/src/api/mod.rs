//! Match API routes

use axum::Router;
use domain_uniclass::{MatchRepository, MatchService, handlers};

/// Create the match router
pub fn routes<R: MatchRepository + 'static>(service: MatchService<R>) -> Router {
    Router::new().nest("/match", handlers::router(service))
}
