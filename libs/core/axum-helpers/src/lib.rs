//! Shared axum plumbing for the workspace APIs.
//!
//! Provides the standardized error envelope ([`errors::AppError`],
//! [`errors::ErrorResponse`]), a validating JSON extractor, and server
//! assembly helpers (OpenAPI documentation routes, CORS, tracing,
//! graceful shutdown, health endpoint).

pub mod errors;
pub mod extractors;
pub mod server;

pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use extractors::ValidatedJson;
pub use server::{create_app, create_production_app, create_router, health_router};
