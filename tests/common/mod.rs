use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use cost_allocation::{Config, Server, test_utils::TestServerBuilder};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::str::FromStr;
use tower::ServiceExt;

const BOUNDARY: &str = "----cost-allocation-test-boundary";

/// Router plus the server behind it, on a fresh in-memory database
pub struct TestHarness {
    pub server: Server,
    pub app: Router,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let server = TestServerBuilder::new().with_config(config).build().await;
        let app = server.create_app();
        Self { server, app }
    }

    pub fn db(&self) -> &DatabaseConnection {
        self.server.database.connection()
    }

    pub async fn make_request(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.make_request(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let response = self.get(uri).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = self.make_request(request).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    /// Extra-cost upload as the admin UI sends it
    pub async fn post_csv(
        &self,
        uri: &str,
        file: &[u8],
        extra_cost_type_id: i32,
    ) -> (StatusCode, Value) {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"extra_cost_type_id\"\r\n\r\n{extra_cost_type_id}\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"costs.csv\"\r\nContent-Type: text/csv\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(file);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = self.make_request(request).await;
        let status = response.status();
        (status, body_json(response).await)
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Decimal from a JSON string or number
#[allow(dead_code)]
pub fn dec(value: &Value) -> Decimal {
    match value {
        Value::String(text) => Decimal::from_str(text).unwrap(),
        Value::Number(number) => Decimal::from_str(&number.to_string()).unwrap(),
        other => panic!("not a decimal: {other}"),
    }
}
