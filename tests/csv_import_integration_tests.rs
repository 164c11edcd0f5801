//! Extra-cost file import: resolution, error collection and the upload endpoint

use axum::http::StatusCode;
use cost_allocation::Config;
use cost_allocation::allocation::ServiceEnvironmentRef;
use cost_allocation::database::entities::ExtraCosts;
use cost_allocation::test_utils::{
    create_environment, create_extra_cost_type, create_service, create_service_environment,
};
use rust_decimal::Decimal;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

mod common;
use common::TestHarness;

const UPLOAD: &str = "/api/allocationadmin/2024/3/extracosts";

/// Payments (sc-001) deployed to prod; returns the prod service environment id
async fn seed(harness: &TestHarness) -> i32 {
    let db = harness.db();
    let service = create_service(db, "Payments", Some("sc-001"), None).await;
    let prod = create_environment(db, "prod").await;
    create_service_environment(db, service.id, prod.id).await.id
}

fn target_id(target: &Option<ServiceEnvironmentRef>) -> Option<i32> {
    match target {
        Some(ServiceEnvironmentRef::Resolved(record)) => Some(record.id),
        _ => None,
    }
}

#[tokio::test]
async fn test_import_by_service_uid() {
    let harness = TestHarness::new().await;
    let service_environment_id = seed(&harness).await;

    let outcome = harness
        .server
        .allocation_service
        .import_extra_costs(b"cost;forecast_cost;service_uid;environment\n10;12;sc-001;prod")
        .await
        .unwrap();

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].cost, Decimal::from(10));
    assert_eq!(outcome.records[0].forecast_cost, Decimal::from(12));
    assert_eq!(outcome.records[0].id, None);
    assert_eq!(target_id(&outcome.records[0].target), Some(service_environment_id));
}

#[tokio::test]
async fn test_import_by_env_id_and_name() {
    let harness = TestHarness::new().await;
    let service_environment_id = seed(&harness).await;

    let file = format!(
        "cost;forecast_cost;service_env_id;service_name;environment\n\
         1,5;2;{service_environment_id};;\n\
         3;4;;Payments;prod\n"
    );
    let outcome = harness
        .server
        .allocation_service
        .import_extra_costs(file.as_bytes())
        .await
        .unwrap();

    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    assert_eq!(outcome.records[0].cost, Decimal::new(15, 1));
    assert_eq!(target_id(&outcome.records[0].target), Some(service_environment_id));
    assert_eq!(target_id(&outcome.records[1].target), Some(service_environment_id));
}

#[tokio::test]
async fn test_reimport_is_stable() {
    let harness = TestHarness::new().await;
    seed(&harness).await;
    let file = b"cost;forecast_cost;service_uid;environment\n10;12;sc-001;prod\n7;8;sc-404;prod\n";

    let service = &harness.server.allocation_service;
    let first = service.import_extra_costs(file).await.unwrap();
    let second = service.import_extra_costs(file).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unresolvable_row_yields_one_error_and_placeholder() {
    let harness = TestHarness::new().await;
    seed(&harness).await;

    let outcome = harness
        .server
        .allocation_service
        .import_extra_costs(b"cost;forecast_cost;service_uid;environment\n10;12;sc-001;staging")
        .await
        .unwrap();

    assert_eq!(
        outcome.errors,
        vec!["Service environment for service: sc-001, environment: staging does not exist."]
    );
    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.records[0].target.is_none());
    assert_eq!(outcome.records[0].cost, Decimal::from(10));
}

#[tokio::test]
async fn test_invalid_cost_reported_with_line() {
    let harness = TestHarness::new().await;
    seed(&harness).await;

    let outcome = harness
        .server
        .allocation_service
        .import_extra_costs(b"cost;forecast_cost;service_uid;environment\n10;12;sc-001;prod\nabc;1;sc-001;prod")
        .await
        .unwrap();

    assert_eq!(outcome.errors, vec!["Invalid cost value 'abc' in line 3."]);
    assert_eq!(outcome.records[1].cost, Decimal::ZERO);
}

#[tokio::test]
async fn test_upload_saves_batch() {
    let harness = TestHarness::new().await;
    let service_environment_id = seed(&harness).await;
    let licences = create_extra_cost_type(harness.db(), "Licences").await;

    let (status, json) = harness
        .post_csv(
            UPLOAD,
            b"cost;forecast_cost;service_uid;environment\n10;12;sc-001;prod\n",
            licences.id,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"status": true}));

    let saved = ExtraCosts::find().all(harness.db()).await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].service_environment_id, service_environment_id);
    assert_eq!(saved[0].extra_cost_type_id, licences.id);
    assert_eq!(saved[0].forecast_cost, Decimal::from(12));
}

#[tokio::test]
async fn test_upload_with_errors_saves_nothing() {
    let harness = TestHarness::new().await;
    seed(&harness).await;
    let licences = create_extra_cost_type(harness.db(), "Licences").await;

    let (status, json) = harness
        .post_csv(
            UPLOAD,
            b"cost;forecast_cost;service_uid;environment\n10;12;sc-001;prod\n5;5;sc-002;prod\n",
            licences.id,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], false);
    assert_eq!(
        json["errors"],
        json!(["Service environment for service: sc-002, environment: prod does not exist."])
    );
    assert_eq!(ExtraCosts::find().count(harness.db()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_upload_only_for_extra_costs() {
    let harness = TestHarness::new().await;
    seed(&harness).await;

    let (status, _) = harness
        .post_csv(
            "/api/allocationadmin/2024/3/teamcosts",
            b"cost;forecast_cost;service_uid;environment\n10;12;sc-001;prod\n",
            1,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_empty_file_rejected() {
    let harness = TestHarness::new().await;
    let licences = create_extra_cost_type(harness.db(), "Licences").await;

    let (status, json) = harness.post_csv(UPLOAD, b"", licences.id).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "CSV error");
}

#[tokio::test]
async fn test_import_in_configured_encoding() {
    let mut config = Config::default();
    config.csv.import_encoding = "windows-1250".to_string();
    let harness = TestHarness::with_config(config).await;

    let db = harness.db();
    let service = create_service(db, "Účetnictví", None, None).await;
    let prod = create_environment(db, "prod").await;
    let target = create_service_environment(db, service.id, prod.id).await;

    let (file, _, _) = encoding_rs::WINDOWS_1250
        .encode("cost;forecast_cost;service_name;environment\n4;4;Účetnictví;prod\n");
    let outcome = harness
        .server
        .allocation_service
        .import_extra_costs(&file)
        .await
        .unwrap();

    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    assert_eq!(target_id(&outcome.records[0].target), Some(target.id));
}
