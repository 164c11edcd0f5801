use crate::{
    allocation::{AllocateType, AllocationAdminContent, SaveRequest, SaveResponse},
    error::AppError,
    period::Period,
    routes::ApiErrorResponse,
    server::Server,
};
use axum::{
    Router,
    body::Bytes,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::header,
    response::Json,
    routing::{get, post},
};
use tracing::debug;

pub fn create_allocation_admin_routes() -> Router<Server> {
    Router::new()
        .route("/allocationadmin/{year}/{month}", get(get_allocations))
        .route(
            "/allocationadmin/{year}/{month}/{allocate_type}",
            post(save_allocations),
        )
}

/// Body of an allocation write: JSON rows, or an extra-cost CSV upload
#[derive(Debug)]
pub enum AllocationUpload {
    Json(serde_json::Value),
    File {
        bytes: Bytes,
        extra_cost_type_id: i32,
    },
}

impl<S> FromRequest<S> for AllocationUpload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            let value = serde_json::from_slice(&body)
                .map_err(|e| AppError::BadRequest(format!("Invalid JSON: {}", e)))?;
            return Ok(AllocationUpload::Json(value));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let mut file = None;
        let mut extra_cost_type_id = None;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("file") => {
                    file = Some(
                        field
                            .bytes()
                            .await
                            .map_err(|e| AppError::BadRequest(e.to_string()))?,
                    );
                }
                Some("extra_cost_type_id") => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    let id = text.trim().parse::<i32>().map_err(|_| {
                        AppError::BadRequest(format!("Invalid extra_cost_type_id: {}", text))
                    })?;
                    extra_cost_type_id = Some(id);
                }
                _ => {}
            }
        }

        match (file, extra_cost_type_id) {
            (Some(bytes), Some(extra_cost_type_id)) => Ok(AllocationUpload::File {
                bytes,
                extra_cost_type_id,
            }),
            (None, _) => Err(AppError::BadRequest("Missing file field".to_string())),
            (_, None) => Err(AppError::BadRequest(
                "Missing extra_cost_type_id field".to_string(),
            )),
        }
    }
}

/// Allocation inputs for one month
#[utoipa::path(
    get,
    path = "/api/allocationadmin/{year}/{month}",
    summary = "Get Allocations",
    description = "Base usages, team costs, dynamic extra costs and extra costs for a month",
    tags = ["Allocation Admin"],
    params(
        ("year" = i32, Path, description = "Year, e.g. 2024"),
        ("month" = u32, Path, description = "Month number, 1-12")
    ),
    responses(
        (status = 200, description = "Allocation tree", body = AllocationAdminContent),
        (status = 400, description = "Invalid month", body = ApiErrorResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse)
    )
)]
pub(crate) async fn get_allocations(
    State(server): State<Server>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<AllocationAdminContent>, AppError> {
    let period = Period::from_year_month(year, month)?;
    let content = server.allocation_service.get_allocations(&period).await?;
    Ok(Json(content))
}

/// Replace one category of allocation inputs for a month
#[utoipa::path(
    post,
    path = "/api/allocationadmin/{year}/{month}/{allocate_type}",
    summary = "Save Allocations",
    description = "JSON `{ \"rows\": [...] }` for any category, or a multipart CSV upload \
                   (`file`, `extra_cost_type_id`) for extra costs",
    tags = ["Allocation Admin"],
    params(
        ("year" = i32, Path, description = "Year, e.g. 2024"),
        ("month" = u32, Path, description = "Month number, 1-12"),
        ("allocate_type" = String, Path,
            description = "baseusages | extracosts | dynamicextracosts | teamcosts")
    ),
    request_body(content = serde_json::Value, description = "Rows in the shape returned by the GET endpoint"),
    responses(
        (status = 200, description = "Saved, or upload rejected with per-row errors", body = SaveResponse),
        (status = 400, description = "Unknown type, invalid body or unknown referenced record", body = ApiErrorResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse)
    )
)]
pub(crate) async fn save_allocations(
    State(server): State<Server>,
    Path((year, month, allocate_type)): Path<(i32, u32, String)>,
    upload: AllocationUpload,
) -> Result<Json<SaveResponse>, AppError> {
    let kind: AllocateType = allocate_type.parse()?;
    let period = Period::from_year_month(year, month)?;

    match upload {
        AllocationUpload::File {
            bytes,
            extra_cost_type_id,
        } => {
            if kind != AllocateType::ExtraCosts {
                return Err(AppError::BadRequest(format!(
                    "File upload is not supported for {}",
                    kind
                )));
            }
            debug!(size = bytes.len(), extra_cost_type_id, "Received extra cost file");
            let response = server
                .allocation_service
                .upload_extra_costs(&period, extra_cost_type_id, &bytes)
                .await?;
            Ok(Json(response))
        }
        AllocationUpload::Json(body) => {
            let request = SaveRequest::from_json(kind, body)?;
            server.allocation_service.save(&period, request).await?;
            Ok(Json(SaveResponse::ok()))
        }
    }
}
