mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;
use uuid::Uuid;

fn mutation_body(
    material_id: Uuid,
    action: &str,
    quantity: i32,
    machine_id: Option<Uuid>,
) -> serde_json::Value {
    json!({
        "material_id": material_id,
        "action": action,
        "quantity": quantity,
        "owner_name": "A. Fitter",
        "assigned_date": "2024-06-10",
        "work_type": if action == "Add" { "Add New Stock" } else { "Breakdown Maintainance" },
        "machine_id": machine_id,
        "remarks": "entered at the counter",
    })
}

#[tokio::test]
async fn health_endpoints_answer_without_auth() {
    let app = TestApp::new().await;

    let (status, body) = app.anonymous_request(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");

    let (status, body) = app
        .anonymous_request(Method::GET, "/health/ready", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let app = TestApp::new().await;

    let (status, _) = app
        .anonymous_request(Method::GET, "/api/v1/materials", None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .anonymous_request(
            Method::POST,
            "/api/v1/stock/mutations",
            Some(mutation_body(Uuid::new_v4(), "Add", 1, None)),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_me_round_trip() {
    let app = TestApp::new().await;

    let (status, body) = app
        .anonymous_request(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({
                "name": "Store Keeper",
                "email": "keeper@example.com",
                "password": "keeper-pass-1",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    assert_eq!(body["role"], "member");
    assert!(body.get("password_hash").is_none());

    // Duplicate email is rejected.
    let (status, _) = app
        .anonymous_request(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({
                "name": "Imposter",
                "email": "keeper@example.com",
                "password": "another-pass-1",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, login) = app
        .anonymous_request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({ "email": "keeper@example.com", "password": "keeper-pass-1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["token_type"], "Bearer");
    assert!(login["access_token"].as_str().is_some());

    let (status, _) = app
        .anonymous_request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({ "email": "keeper@example.com", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, me) = app.request(Method::GET, "/api/v1/auth/me", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "admin@example.com");
}

#[tokio::test]
async fn stock_mutation_flow_over_http() {
    let app = TestApp::new().await;
    let category_id = app.create_category("Bearings").await;
    let machine_id = app.create_machine("Press 1").await;
    let material_id = app
        .create_material("Bearing 6204", category_id, Some(machine_id), 0)
        .await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/stock/mutations",
            Some(mutation_body(material_id, "Add", 10, None)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "add failed: {body}");
    assert_eq!(body["new_quantity"], 10);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/stock/mutations",
            Some(mutation_body(material_id, "Remove", 4, Some(machine_id))),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "remove failed: {body}");
    assert_eq!(body["previous_quantity"], 10);
    assert_eq!(body["new_quantity"], 6);

    let (status, level) = app
        .request(Method::GET, &format!("/api/v1/stock/{material_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(level["quantity"], 6);
    assert_eq!(level["owner_name"], "A. Fitter");

    let (status, report) = app
        .request(
            Method::GET,
            &format!("/api/v1/stock/{material_id}/audit"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["consistent"], true);
    assert_eq!(report["transaction_count"], 2);
    assert_eq!(report["recorded_quantity"], 6);
}

#[tokio::test]
async fn overdraw_and_bad_input_map_to_http_errors() {
    let app = TestApp::new().await;
    let category_id = app.create_category("Belts").await;
    let machine_id = app.create_machine("Conveyor 2").await;
    let material_id = app
        .create_material("V-Belt A42", category_id, Some(machine_id), 0)
        .await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/stock/mutations",
            Some(mutation_body(material_id, "Add", 2, None)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/stock/mutations",
            Some(mutation_body(material_id, "Remove", 5, Some(machine_id))),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"]
        .as_str()
        .unwrap_or_default()
        .contains("Insufficient stock"));

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/stock/mutations",
            Some(mutation_body(material_id, "Add", 0, None)),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Removal without a machine is invalid.
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/stock/mutations",
            Some(mutation_body(material_id, "Remove", 1, None)),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // State is unchanged after all the failures.
    let (_, level) = app
        .request(Method::GET, &format!("/api/v1/stock/{material_id}"), None)
        .await;
    assert_eq!(level["quantity"], 2);
}

#[tokio::test]
async fn history_filters_by_material_and_month() {
    let app = TestApp::new().await;
    let category_id = app.create_category("Filters").await;
    let machine_id = app.create_machine("Compressor").await;
    let first = app
        .create_material("Oil filter", category_id, Some(machine_id), 0)
        .await;
    let second = app
        .create_material("Air filter", category_id, Some(machine_id), 0)
        .await;

    for material_id in [first, second] {
        let (status, _) = app
            .request(
                Method::POST,
                "/api/v1/stock/mutations",
                Some(mutation_body(material_id, "Add", 3, None)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/v1/history?material_id={first}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["transactions"][0]["material_id"], json!(first));

    let (status, body) = app
        .request(Method::GET, "/api/v1/history?month=2024-06", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (status, body) = app
        .request(Method::GET, "/api/v1/history?month=2024-07", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);

    let (status, _) = app
        .request(Method::GET, "/api/v1/history?month=not-a-month", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn low_stock_reads_the_materialized_records() {
    let app = TestApp::new().await;
    let category_id = app.create_category("Lubricants").await;
    let low = app
        .create_material("Grease EP2", category_id, None, 5)
        .await;
    let healthy = app
        .create_material("Oil 68", category_id, None, 5)
        .await;
    let untouched = app
        .create_material("Oil 32", category_id, None, 2)
        .await;

    for (material_id, quantity) in [(low, 3), (healthy, 10)] {
        let (status, _) = app
            .request(
                Method::POST,
                "/api/v1/stock/mutations",
                Some(mutation_body(material_id, "Add", quantity, None)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .request(Method::GET, "/api/v1/materials/low-stock", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().expect("array body");
    let names: Vec<&str> = items
        .iter()
        .filter_map(|i| i["material_name"].as_str())
        .collect();
    assert!(names.contains(&"Grease EP2"));
    // Never mutated, so zero on hand and below its threshold.
    assert!(names.contains(&"Oil 32"));
    assert!(!names.contains(&"Oil 68"));

    let grease = items
        .iter()
        .find(|i| i["material_name"] == "Grease EP2")
        .unwrap();
    assert_eq!(grease["current_quantity"], 3);
    assert_eq!(grease["min_quantity"], 5);
    assert_eq!(grease["category_name"], "Lubricants");
    let _ = untouched;
}

#[tokio::test]
async fn members_mutate_stock_but_cannot_administer_the_registry() {
    let app = TestApp::new().await;
    let category_id = app.create_category("Chains").await;
    let material_id = app
        .create_material("Chain 08B", category_id, None, 0)
        .await;
    let member = app.member_token("Line Operator", "operator@example.com").await;

    let (status, _) = app
        .request_as(
            &member,
            Method::POST,
            "/api/v1/categories",
            Some(json!({ "name": "Sprockets" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request_as(
            &member,
            Method::DELETE,
            &format!("/api/v1/materials/{material_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Stock mutations are open to members and record them as the actor.
    let (status, body) = app
        .request_as(
            &member,
            Method::POST,
            "/api/v1/stock/mutations",
            Some(mutation_body(material_id, "Add", 6, None)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "member add failed: {body}");
    assert_eq!(body["new_quantity"], 6);
}

#[tokio::test]
async fn registry_guards_and_deletion_flow() {
    let app = TestApp::new().await;
    let category_id = app.create_category("Gaskets").await;
    let material_id = app
        .create_material("Gasket 50mm", category_id, None, 0)
        .await;

    // Category deletion is refused while a material references it.
    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/categories/{category_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/stock/mutations",
            Some(mutation_body(material_id, "Add", 4, None)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/materials/{material_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The material and its stock record are gone; history is retained.
    let (status, _) = app
        .request(Method::GET, &format!("/api/v1/stock/{material_id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/v1/history?material_id={material_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    // With the material gone the category can be deleted.
    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/categories/{category_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
