use crate::{
    csv_codec::make_csv_response,
    error::AppError,
    report::{ReportParams, ReportProgress, ReportTable},
    routes::ApiErrorResponse,
    server::Server,
};
use axum::{
    Router,
    extract::{Query, State},
    response::{
        Json, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use futures_util::{Stream, StreamExt, stream};
use serde_json::json;
use tracing::{info, warn};

pub fn create_report_routes() -> Router<Server> {
    Router::new()
        .route("/reports/ventures", get(get_ventures_report))
        .route("/reports/ventures/csv", get(get_ventures_report_csv))
        .route("/reports/ventures/progress", get(get_ventures_report_progress))
}

/// All-ventures report as JSON
#[utoipa::path(
    get,
    path = "/api/reports/ventures",
    summary = "All Ventures Report",
    tags = ["Reports"],
    params(ReportParams),
    responses(
        (status = 200, description = "Completed report", body = ReportTable),
        (status = 400, description = "Invalid date range", body = ApiErrorResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse)
    )
)]
pub(crate) async fn get_ventures_report(
    State(server): State<Server>,
    Query(params): Query<ReportParams>,
) -> Result<Json<ReportTable>, AppError> {
    params.period()?;
    let table = server.report_generator.run(params).await?;
    Ok(Json(table))
}

/// All-ventures report as a CSV download
#[utoipa::path(
    get,
    path = "/api/reports/ventures/csv",
    summary = "All Ventures Report (CSV)",
    description = "Header plus rows, encoded with the configured export encoding",
    tags = ["Reports"],
    params(ReportParams),
    responses(
        (status = 200, description = "CSV file", content_type = "application/csv"),
        (status = 400, description = "Invalid date range", body = ApiErrorResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse)
    )
)]
pub(crate) async fn get_ventures_report_csv(
    State(server): State<Server>,
    Query(params): Query<ReportParams>,
) -> Result<Response, AppError> {
    params.period()?;
    let table = server.report_generator.run(params).await?;

    info!(rows = table.rows.len(), "Exporting venture report");
    let response = make_csv_response(
        table.text_rows(),
        &server.config.report.export_filename,
        &server.config.csv.export_dialect(),
    )?;
    Ok(response)
}

/// All-ventures report as a progress stream
#[utoipa::path(
    get,
    path = "/api/reports/ventures/progress",
    summary = "All Ventures Report Progress",
    description = "Server-sent events: `progress` with `{percent, rows}` after every venture, \
                   then `complete` with the finished table. A failure ends the stream with an \
                   `error` event.",
    tags = ["Reports"],
    params(ReportParams),
    responses(
        (status = 200, description = "Event stream", content_type = "text/event-stream"),
        (status = 400, description = "Invalid date range", body = ApiErrorResponse)
    )
)]
pub(crate) async fn get_ventures_report_progress(
    State(server): State<Server>,
    Query(params): Query<ReportParams>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    params.period()?;
    let header = server
        .report_generator
        .header(chrono::Local::now().date_naive())
        .await?;

    let events = server
        .report_generator
        .generate(params)
        .flat_map(move |item| {
            let events = match item {
                Ok(progress) => progress_events(&header, progress),
                Err(err) => {
                    warn!(error = %err, "Venture report failed");
                    vec![Ok(Event::default().event("error").data(err.to_string()))]
                }
            };
            stream::iter(events)
        });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn progress_events(header: &[String], progress: ReportProgress) -> Vec<Result<Event, axum::Error>> {
    let mut events = vec![Event::default().event("progress").json_data(json!({
        "percent": progress.percent,
        "rows": progress.rows.len(),
    }))];

    if progress.percent == 100 {
        let table = ReportTable {
            header: header.to_vec(),
            rows: progress.into_rows(),
        };
        events.push(Event::default().event("complete").json_data(&table));
    }
    events
}
