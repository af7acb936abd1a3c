//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for Match API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Match API",
        version = "0.1.0",
        description = "Batch semantic matching of free-text queries against the Uniclass classification tables",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/match", api = domain_uniclass::MatchApiDoc)
    ),
    tags(
        (name = "uniclass", description = "Uniclass matching endpoints")
    )
)]
pub struct ApiDoc;
