//! Allocation admin API: reading the monthly tree and saving each category

use axum::http::StatusCode;
use cost_allocation::database::entities::{
    ExtraCosts, TeamCosts, UsagePrices, extra_costs, usage_types,
};
use cost_allocation::test_utils::{
    create_dynamic_extra_cost_type, create_environment, create_extra_cost, create_extra_cost_type,
    create_service, create_service_environment, create_team, create_usage_price, create_usage_type,
    create_warehouse, month,
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

mod common;
use common::{TestHarness, dec};

const MARCH: &str = "/api/allocationadmin/2024/3";

#[tokio::test]
async fn test_read_tree_lists_dictionaries_for_empty_month() {
    let harness = TestHarness::new().await;
    let db = harness.db();

    let power = create_usage_type(db, "Power", usage_types::BASE_USAGE_KIND, false).await;
    let storage = create_usage_type(db, "Storage", usage_types::BASE_USAGE_KIND, true).await;
    create_usage_type(db, "CPU", usage_types::SERVICE_USAGE_KIND, false).await;
    let dc1 = create_warehouse(db, "DC1", true).await;
    let dc2 = create_warehouse(db, "DC2", true).await;
    create_warehouse(db, "Archive", false).await;
    let team = create_team(db, "Ops").await;
    let dynamic = create_dynamic_extra_cost_type(db, "Support").await;
    let licences = create_extra_cost_type(db, "Licences").await;

    let (status, json) = harness.get_json(MARCH).await;
    assert_eq!(status, StatusCode::OK);

    let base_rows = json["baseusages"]["rows"].as_array().unwrap();
    assert_eq!(base_rows.len(), 3);
    assert_eq!(base_rows[0]["type"], json!({"id": power.id, "name": "Power"}));
    assert!(base_rows[0].get("warehouse").is_none());
    assert_eq!(base_rows[1]["type"]["id"], storage.id);
    assert_eq!(base_rows[1]["warehouse"]["id"], dc1.id);
    assert_eq!(base_rows[2]["warehouse"]["id"], dc2.id);
    assert_eq!(dec(&base_rows[0]["cost"]), Decimal::ZERO);

    let team_rows = json["teamcosts"]["rows"].as_array().unwrap();
    assert_eq!(team_rows.len(), 1);
    assert_eq!(team_rows[0]["team"]["id"], team.id);
    assert_eq!(team_rows[0]["members"], 0);

    let dynamic_rows = json["dynamicextracosts"]["rows"].as_array().unwrap();
    assert_eq!(dynamic_rows[0]["dynamic_extra_cost_type"]["id"], dynamic.id);

    let extra_rows = json["extracosts"]["rows"].as_array().unwrap();
    assert_eq!(extra_rows[0]["extra_cost_type"]["id"], licences.id);
    assert_eq!(extra_rows[0]["extra_costs"], json!([]));

    assert_eq!(json["teamcosts"]["name"], "Team Costs");
    assert_eq!(json["dynamicextracosts"]["template"], "tabdynamicextracosts.html");
}

#[tokio::test]
async fn test_save_base_usages_creates_then_updates() {
    let harness = TestHarness::new().await;
    let db = harness.db();
    let power = create_usage_type(db, "Power", usage_types::BASE_USAGE_KIND, false).await;
    let storage = create_usage_type(db, "Storage", usage_types::BASE_USAGE_KIND, true).await;
    let dc1 = create_warehouse(db, "DC1", true).await;

    let body = json!({"rows": [
        {"type": {"id": power.id}, "cost": "100", "forecast_cost": "120"},
        {"type": {"id": storage.id}, "warehouse": {"id": dc1.id}, "cost": 40, "forecast_cost": 44}
    ]});
    let (status, json) = harness
        .post_json(&format!("{MARCH}/baseusages"), body)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"status": true}));

    let body = json!({"rows": [
        {"type": {"id": power.id}, "cost": "150", "forecast_cost": "160"}
    ]});
    let (status, _) = harness
        .post_json(&format!("{MARCH}/baseusages"), body)
        .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(UsagePrices::find().count(db).await.unwrap(), 2);

    let (_, json) = harness.get_json(MARCH).await;
    let rows = json["baseusages"]["rows"].as_array().unwrap();
    assert_eq!(dec(&rows[0]["cost"]), Decimal::from(150));
    assert_eq!(dec(&rows[0]["forecast_cost"]), Decimal::from(160));
    assert_eq!(dec(&rows[1]["cost"]), Decimal::from(40));

    // a different month is untouched
    let (_, json) = harness.get_json("/api/allocationadmin/2024/4").await;
    let rows = json["baseusages"]["rows"].as_array().unwrap();
    assert_eq!(dec(&rows[0]["cost"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_unsplit_type_reads_price_saved_with_warehouse() {
    let harness = TestHarness::new().await;
    let db = harness.db();
    let power = create_usage_type(db, "Power", usage_types::BASE_USAGE_KIND, false).await;
    let dc1 = create_warehouse(db, "DC1", true).await;
    create_usage_price(db, power.id, Some(dc1.id), &month(2024, 3), Decimal::ZERO, Decimal::from(75)).await;

    let (_, json) = harness.get_json(MARCH).await;
    let rows = json["baseusages"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].get("warehouse").is_none());
    assert_eq!(dec(&rows[0]["cost"]), Decimal::from(75));
    assert_eq!(dec(&rows[0]["forecast_cost"]), Decimal::from(75));
}

#[tokio::test]
async fn test_unknown_usage_type_persists_nothing() {
    let harness = TestHarness::new().await;
    let db = harness.db();
    let power = create_usage_type(db, "Power", usage_types::BASE_USAGE_KIND, false).await;

    let body = json!({"rows": [
        {"type": {"id": power.id}, "cost": "100", "forecast_cost": "100"},
        {"type": {"id": 999}, "cost": "5", "forecast_cost": "5"}
    ]});
    let (status, json) = harness
        .post_json(&format!("{MARCH}/baseusages"), body)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "No usage type with id 999");
    assert_eq!(UsagePrices::find().count(db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_warehouse_rejected() {
    let harness = TestHarness::new().await;
    let storage =
        create_usage_type(harness.db(), "Storage", usage_types::BASE_USAGE_KIND, true).await;

    let body = json!({"rows": [
        {"type": {"id": storage.id}, "warehouse": {"id": 42}, "cost": "1", "forecast_cost": "1"}
    ]});
    let (status, _) = harness
        .post_json(&format!("{MARCH}/baseusages"), body)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_save_team_costs() {
    let harness = TestHarness::new().await;
    let db = harness.db();
    let ops = create_team(db, "Ops").await;

    let body = json!({"rows": [
        {"team": {"id": ops.id, "name": "Ops"}, "cost": "2500", "forecast_cost": "2600", "members": 5}
    ]});
    let (status, _) = harness
        .post_json(&format!("{MARCH}/teamcosts"), body.clone())
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = harness.post_json(&format!("{MARCH}/teamcosts"), body).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(TeamCosts::find().count(db).await.unwrap(), 1);

    let (_, json) = harness.get_json(MARCH).await;
    let row = &json["teamcosts"]["rows"][0];
    assert_eq!(row["members"], 5);
    assert_eq!(dec(&row["cost"]), Decimal::from(2500));
    assert_eq!(dec(&row["forecast_cost"]), Decimal::from(2600));
}

#[tokio::test]
async fn test_unknown_team_rejected() {
    let harness = TestHarness::new().await;

    let body = json!({"rows": [{"team": {"id": 99}, "cost": "1", "forecast_cost": "1", "members": 1}]});
    let (status, json) = harness.post_json(&format!("{MARCH}/teamcosts"), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Team with id 99 does not exist");
}

#[tokio::test]
async fn test_save_dynamic_extra_costs() {
    let harness = TestHarness::new().await;
    let support = create_dynamic_extra_cost_type(harness.db(), "Support").await;

    let body = json!({"rows": [
        {"dynamic_extra_cost_type": {"id": support.id}, "cost": "300", "forecast_cost": "310"}
    ]});
    let (status, _) = harness
        .post_json(&format!("{MARCH}/dynamicextracosts"), body)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = harness.get_json(MARCH).await;
    let row = &json["dynamicextracosts"]["rows"][0];
    assert_eq!(dec(&row["cost"]), Decimal::from(300));
    assert_eq!(dec(&row["forecast_cost"]), Decimal::from(310));
}

#[tokio::test]
async fn test_extra_cost_batch_replaces_rows() {
    let harness = TestHarness::new().await;
    let db = harness.db();
    let service = create_service(db, "Payments", Some("sc-001"), None).await;
    let prod = create_environment(db, "prod").await;
    let test = create_environment(db, "test").await;
    create_service_environment(db, service.id, prod.id).await;
    create_service_environment(db, service.id, test.id).await;
    let licences = create_extra_cost_type(db, "Licences").await;

    let body = json!({"rows": [{
        "extra_cost_type": {"id": licences.id, "name": "Licences"},
        "extra_costs": [
            {"cost": "10", "forecast_cost": "11", "service": service.id, "env": prod.id},
            {"cost": "20", "forecast_cost": "21", "service": service.id, "env": test.id},
            {"cost": "99", "forecast_cost": "99", "service": 0, "env": 0}
        ]
    }]});
    let (status, _) = harness
        .post_json(&format!("{MARCH}/extracosts"), body)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = harness.get_json(MARCH).await;
    let saved = json["extracosts"]["rows"][0]["extra_costs"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(saved.len(), 2);
    let kept = saved
        .iter()
        .find(|entry| entry["env"] == prod.id)
        .unwrap()
        .clone();
    assert_eq!(kept["service"], service.id);

    // resubmit only the prod row, with a new amount
    let body = json!({"rows": [{
        "extra_cost_type": {"id": licences.id},
        "extra_costs": [
            {"id": kept["id"], "cost": "15", "forecast_cost": "16", "service": service.id, "env": prod.id}
        ]
    }]});
    let (status, _) = harness
        .post_json(&format!("{MARCH}/extracosts"), body)
        .await;
    assert_eq!(status, StatusCode::OK);

    let remaining = ExtraCosts::find().all(db).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(Some(remaining[0].id), kept["id"].as_i64().map(|id| id as i32));
    assert_eq!(remaining[0].cost, Decimal::from(15));
}

#[tokio::test]
async fn test_extra_cost_batch_replaces_whole_month() {
    let harness = TestHarness::new().await;
    let db = harness.db();
    let service = create_service(db, "Payments", None, None).await;
    let prod = create_environment(db, "prod").await;
    let target = create_service_environment(db, service.id, prod.id).await;
    let licences = create_extra_cost_type(db, "Licences").await;
    let hosting = create_extra_cost_type(db, "Hosting").await;

    create_extra_cost(db, hosting.id, target.id, &month(2024, 3), Decimal::TWO, Decimal::TWO).await;
    create_extra_cost(db, licences.id, target.id, &month(2024, 4), Decimal::TEN, Decimal::TEN).await;

    let body = json!({"rows": [{
        "extra_cost_type": {"id": licences.id},
        "extra_costs": [{"cost": "1", "forecast_cost": "1", "service": service.id, "env": prod.id}]
    }]});
    let (status, _) = harness
        .post_json(&format!("{MARCH}/extracosts"), body)
        .await;
    assert_eq!(status, StatusCode::OK);

    let remaining = ExtraCosts::find().all(db).await.unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|cost| cost.extra_cost_type_id == licences.id));
    assert!(
        remaining
            .iter()
            .any(|cost| cost.start_date == month(2024, 3).start && cost.cost == Decimal::ONE)
    );
    assert!(remaining.iter().any(|cost| cost.start_date == month(2024, 4).start));
}

#[tokio::test]
async fn test_empty_extra_cost_batch_clears_month() {
    let harness = TestHarness::new().await;
    let db = harness.db();
    let service = create_service(db, "Payments", None, None).await;
    let prod = create_environment(db, "prod").await;
    let target = create_service_environment(db, service.id, prod.id).await;
    let licences = create_extra_cost_type(db, "Licences").await;

    create_extra_cost(db, licences.id, target.id, &month(2024, 3), Decimal::ONE, Decimal::ONE).await;
    create_extra_cost(db, licences.id, target.id, &month(2024, 4), Decimal::TEN, Decimal::TEN).await;

    let (status, _) = harness
        .post_json(&format!("{MARCH}/extracosts"), json!({"rows": []}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let remaining = ExtraCosts::find().all(db).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].start_date, month(2024, 4).start);
}

#[tokio::test]
async fn test_missing_service_environment_rolls_back() {
    let harness = TestHarness::new().await;
    let db = harness.db();
    let service = create_service(db, "Payments", None, None).await;
    let prod = create_environment(db, "prod").await;
    let staging = create_environment(db, "staging").await;
    create_service_environment(db, service.id, prod.id).await;
    let licences = create_extra_cost_type(db, "Licences").await;

    let body = json!({"rows": [{
        "extra_cost_type": {"id": licences.id},
        "extra_costs": [
            {"cost": "10", "forecast_cost": "10", "service": service.id, "env": prod.id},
            {"cost": "20", "forecast_cost": "20", "service": service.id, "env": staging.id}
        ]
    }]});
    let (status, json) = harness
        .post_json(&format!("{MARCH}/extracosts"), body)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["message"],
        format!(
            "Service environment does not exist for service with ID {} and environment with ID {}",
            service.id, staging.id
        )
    );
    assert_eq!(ExtraCosts::find().count(db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_extra_cost_id_rejected() {
    let harness = TestHarness::new().await;
    let db = harness.db();
    let service = create_service(db, "Payments", None, None).await;
    let prod = create_environment(db, "prod").await;
    create_service_environment(db, service.id, prod.id).await;
    let licences = create_extra_cost_type(db, "Licences").await;

    let body = json!({"rows": [{
        "extra_cost_type": {"id": licences.id},
        "extra_costs": [{"id": 404, "cost": "1", "forecast_cost": "1", "service": service.id, "env": prod.id}]
    }]});
    let (status, json) = harness
        .post_json(&format!("{MARCH}/extracosts"), body)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Extra cost with id 404 does not exist");
    assert_eq!(
        ExtraCosts::find()
            .filter(extra_costs::Column::ExtraCostTypeId.eq(licences.id))
            .count(db)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_invalid_requests() {
    let harness = TestHarness::new().await;

    let (status, _) = harness
        .post_json(&format!("{MARCH}/salaries"), json!({"rows": []}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = harness
        .post_json(&format!("{MARCH}/teamcosts"), json!({"items": []}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = harness
        .post_json(&format!("{MARCH}/teamcosts"), json!({"rows": [{"cost": "1"}]}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = harness.get_json("/api/allocationadmin/2024/0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
