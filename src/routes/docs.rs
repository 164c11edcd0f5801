use crate::server::Server;
use axum::{Json, Router, routing::get};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cost Allocation API",
        version = "1.0.0",
        description = "Monthly allocation administration and venture cost reports"
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::allocation_admin::get_allocations,
        crate::routes::allocation_admin::save_allocations,
        crate::routes::reports::get_ventures_report,
        crate::routes::reports::get_ventures_report_csv,
        crate::routes::reports::get_ventures_report_progress,
    ),
    components(
        schemas(
            crate::routes::ApiErrorResponse,
            crate::health::OverallHealthResponse,
            crate::health::HealthStatus,
            crate::health::HealthCheckResult,
            crate::health::HealthSummary,
            crate::allocation::NamedRef,
            crate::allocation::BaseUsageRow,
            crate::allocation::TeamCostRow,
            crate::allocation::DynamicExtraCostRow,
            crate::allocation::ExtraCostEntry,
            crate::allocation::ExtraCostGroup,
            crate::allocation::AllocationAdminContent,
            crate::allocation::SaveResponse,
            crate::report::ReportTable,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Allocation Admin", description = "Monthly allocation inputs"),
        (name = "Reports", description = "Venture cost reports"),
    )
)]
pub struct ApiDoc;

pub fn create_docs_routes() -> Router<Server> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
