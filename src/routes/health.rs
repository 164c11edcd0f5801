use crate::{error::AppError, health::OverallHealthResponse, server::Server};
use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HealthCheckQuery {
    /// `all` or the name of one component, e.g. `database`
    #[serde(default)]
    check: Option<String>,
}

/// Create health check routes
///
/// Without a `check` parameter only liveness is reported; registered
/// components run when named or when `check=all`.
pub fn create_health_routes() -> Router<Server> {
    Router::new().route("/", get(health_check))
}

#[utoipa::path(
    get,
    path = "/health",
    summary = "Health Check",
    tags = ["Health"],
    params(HealthCheckQuery),
    responses(
        (status = 200, description = "Health summary", body = OverallHealthResponse)
    )
)]
pub(crate) async fn health_check(
    State(server): State<Server>,
    Query(params): Query<HealthCheckQuery>,
) -> Result<Json<OverallHealthResponse>, AppError> {
    let filter = params.check.as_deref();
    Ok(Json(server.health_service.check_health(filter).await))
}
