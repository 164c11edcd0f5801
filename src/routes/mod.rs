use crate::server::Server;
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod allocation_admin;
pub mod docs;
pub mod health;
pub mod reports;

pub use allocation_admin::create_allocation_admin_routes;
pub use docs::create_docs_routes;
pub use health::create_health_routes;
pub use reports::create_report_routes;

/// Error body rendered by [`crate::error::AppError`]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Error category, e.g. "Bad request"
    pub error: String,
    pub message: String,
}

/// Every route mounted under `/api`
pub fn create_api_routes() -> Router<Server> {
    Router::new()
        .merge(create_allocation_admin_routes())
        .merge(create_report_routes())
        .merge(create_docs_routes())
}
