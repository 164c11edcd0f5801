use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    pub duration_ms: Option<u64>,
}

impl HealthCheckResult {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: None,
            details: None,
            duration_ms: None,
        }
    }

    pub fn healthy_with_details(details: serde_json::Value) -> Self {
        Self {
            details: Some(details),
            ..Self::healthy()
        }
    }

    pub fn unhealthy_with_details(message: String, details: serde_json::Value) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            message: Some(message),
            details: Some(details),
            duration_ms: None,
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

#[async_trait]
pub trait HealthChecker: Send + Sync {
    /// Component name, also the value accepted by `?check=`
    fn name(&self) -> &str;

    async fn check(&self) -> HealthCheckResult;
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OverallHealthResponse {
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub checks: HashMap<String, HealthCheckResult>,
    pub summary: HealthSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthSummary {
    pub total_checks: usize,
    pub healthy_count: usize,
    pub degraded_count: usize,
    pub unhealthy_count: usize,
    pub total_duration_ms: u64,
}

#[derive(Default)]
pub struct HealthService {
    checkers: Arc<RwLock<HashMap<String, Arc<dyn HealthChecker>>>>,
}

impl HealthService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, checker: Arc<dyn HealthChecker>) {
        let name = checker.name().to_string();
        self.checkers.write().await.insert(name, checker);
    }

    /// Run every checker for `all`, the named one otherwise, none without a filter
    pub async fn check_health(&self, filter: Option<&str>) -> OverallHealthResponse {
        let checkers = self.checkers.read().await;
        let selected: Vec<_> = match filter {
            Some("all") => checkers.iter().collect(),
            Some(name) => checkers.iter().filter(|(key, _)| key.as_str() == name).collect(),
            None => Vec::new(),
        };

        let mut results = HashMap::new();
        let mut total_duration = 0u64;
        for (name, checker) in selected {
            let start = Instant::now();
            let result = checker.check().await;
            let duration = start.elapsed().as_millis() as u64;
            total_duration += duration;
            results.insert(name.clone(), result.with_duration(duration));
        }

        let count = |status: HealthStatus| results.values().filter(|r| r.status == status).count();
        let summary = HealthSummary {
            total_checks: results.len(),
            healthy_count: count(HealthStatus::Healthy),
            degraded_count: count(HealthStatus::Degraded),
            unhealthy_count: count(HealthStatus::Unhealthy),
            total_duration_ms: total_duration,
        };

        let status = if summary.unhealthy_count > 0 {
            HealthStatus::Unhealthy
        } else if summary.degraded_count > 0 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        OverallHealthResponse {
            status,
            service: "cost-allocation".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            checks: results,
            summary,
        }
    }

    pub async fn registered_checkers(&self) -> Vec<String> {
        self.checkers.read().await.keys().cloned().collect()
    }
}
