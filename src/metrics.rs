use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::{Duration, Instant};
use tracing::info;

/// Install the Prometheus recorder with its own HTTP listener
pub fn init_metrics_with_port(
    port: u16,
) -> Result<PrometheusHandle, Box<dyn std::error::Error + Send + Sync>> {
    let builder = PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .add_global_label("service", "cost_allocation");

    let handle = builder.install_recorder()?;

    info!("Metrics server started on :{}/metrics", port);
    Ok(handle)
}

/// Middleware to collect HTTP request metrics
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let status = response.status();
    let labels = [
        ("method", method),
        ("path", path),
        ("status", status.as_str().to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
    gauge!("http_requests_active").decrement(1.0);

    if status.is_server_error() {
        counter!("http_errors_total", &labels[..2]).increment(1);
    }

    response
}

/// Track one allocation category write
pub fn track_allocation_save(allocate_type: &'static str, success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("allocation_saves_total",
        "allocate_type" => allocate_type,
        "result" => result
    )
    .increment(1);
}

/// Track an extra-cost file import
pub fn track_csv_import(records: usize, errors: usize) {
    let result = if errors == 0 { "clean" } else { "rejected" };
    counter!("csv_imports_total", "result" => result).increment(1);
    counter!("csv_import_rows_total").increment(records as u64);
    counter!("csv_import_errors_total").increment(errors as u64);
}

/// Track a completed venture report
pub fn track_report_generation(rows: usize, duration: Duration) {
    counter!("report_runs_total").increment(1);
    histogram!("report_rows").record(rows as f64);
    histogram!("report_duration_seconds").record(duration.as_secs_f64());
}
