//! REST handlers for batch uniclass matching

use axum::{Json, Router, extract::State, routing::post};
use axum_helpers::ValidatedJson;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use validator::Validate;

use crate::error::UniclassResult;
use crate::models::{MatchQuery, MatchRecord};
use crate::repository::MatchRepository;
use crate::service::MatchService;

// ===== Request/Response DTOs =====

/// A batch of queries to classify
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct MatchRequest {
    #[validate(length(min = 1, message = "queries must be a non-empty list"))]
    pub queries: Vec<MatchQuery>,
}

/// Results for a processed batch, aligned with the request order
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MatchResponse {
    pub success: bool,
    pub processed: usize,
    pub results: Vec<MatchRecord>,
}

// ===== Handlers =====

/// Match a batch of free-text queries against the uniclass tables
#[utoipa::path(
    post,
    path = "/",
    tag = "uniclass",
    request_body = MatchRequest,
    responses(
        (status = 200, description = "One result per query, in request order", body = MatchResponse),
        (status = 400, description = "Missing, empty or malformed query list"),
        (status = 500, description = "Match backend failure or internal error")
    )
)]
pub async fn match_batch<R: MatchRepository>(
    State(service): State<Arc<MatchService<R>>>,
    ValidatedJson(request): ValidatedJson<MatchRequest>,
) -> UniclassResult<Json<MatchResponse>> {
    let results = service.match_batch(&request.queries).await?;

    Ok(Json(MatchResponse {
        success: true,
        processed: results.len(),
        results,
    }))
}

/// OpenAPI documentation for the uniclass match API
#[derive(OpenApi)]
#[openapi(
    paths(match_batch),
    components(schemas(MatchRequest, MatchResponse, MatchQuery, MatchRecord)),
    tags(
        (name = "uniclass", description = "Semantic matching against the Uniclass classification tables")
    )
)]
pub struct MatchApiDoc;

/// Create the uniclass match router
pub fn router<R: MatchRepository + 'static>(service: MatchService<R>) -> Router {
    Router::new()
        .route("/", post(match_batch))
        .with_state(Arc::new(service))
}
