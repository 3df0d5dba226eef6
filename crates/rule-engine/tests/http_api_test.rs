//! HTTP 接口测试
//!
//! 通过 `tower::ServiceExt::oneshot` 直接调用路由，不启动网络监听。

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rule_engine::MemoryRuleRepository;
use rule_engine::http::{AppState, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;

fn create_test_app() -> Router {
    build_router(AppState::new(Arc::new(MemoryRuleRepository::new())))
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    read(response).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn create(app: &Router, rule: &str) -> String {
    let (status, body) = post(app, "/create_rule", json!({"rule_string": rule})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_create_rule_returns_id_and_ast() {
    let app = create_test_app();
    let (status, body) = post(&app, "/create_rule", json!({"rule_string": "age > 30"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["code"], "SUCCESS");

    let ast: Value = serde_json::from_str(body["data"]["ast"].as_str().unwrap()).unwrap();
    assert_eq!(
        ast,
        json!({"type": "operand", "value": "age > 30", "left": null, "right": null})
    );
}

#[tokio::test]
async fn test_create_rule_parse_error() {
    let app = create_test_app();
    let (status, body) = post(&app, "/create_rule", json!({"rule_string": "(age > 30"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "PARSE_ERROR");
}

#[tokio::test]
async fn test_create_rule_too_long() {
    let app = create_test_app();
    let rule = "age > 30 AND ".repeat(400) + "age > 30";
    let (status, body) = post(&app, "/create_rule", json!({"rule_string": rule})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_evaluate_rule() {
    let app = create_test_app();
    let id = create(&app, "age > 30 AND department = 'Sales'").await;

    let (status, body) = post(
        &app,
        "/evaluate_rule",
        json!({"rule_id": id, "data": {"age": 35, "department": "Sales"}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], true);
    assert!(body["data"].get("trace").is_none());

    let (_, body) = post(
        &app,
        "/evaluate_rule",
        json!({"rule_id": id, "data": {"age": 35, "department": "HR"}, "trace": true}),
    )
    .await;
    assert_eq!(body["data"]["result"], false);
    assert_eq!(body["data"]["matched_conditions"], json!(["age > 30"]));
    assert!(!body["data"]["trace"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_evaluate_errors() {
    let app = create_test_app();

    let (status, body) = post(
        &app,
        "/evaluate_rule",
        json!({"rule_id": "nope", "data": {"age": 35}}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "RULE_NOT_FOUND");

    let id = create(&app, "age > 30").await;
    let (status, body) = post(
        &app,
        "/evaluate_rule",
        json!({"rule_id": id, "data": {"salary": 1}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "TYPE_MISMATCH");
}

#[tokio::test]
async fn test_combine_rules() {
    let app = create_test_app();
    let age = create(&app, "age > 30").await;
    let salary = create(&app, "salary > 50000").await;

    let (status, body) = post(&app, "/combine_rules", json!({"rule_ids": [age, salary]})).await;
    assert_eq!(status, StatusCode::OK);
    let combined = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = post(
        &app,
        "/evaluate_rule",
        json!({"rule_id": combined, "data": {"age": 35, "salary": 60000}}),
    )
    .await;
    assert_eq!(body["data"]["result"], true);

    let (status, body) = get(&app, &format!("/rules/{}", combined)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rule_string"], "age > 30 AND salary > 50000");
}

#[tokio::test]
async fn test_combine_empty() {
    let app = create_test_app();
    let (status, body) = post(&app, "/combine_rules", json!({"rule_ids": []})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "EMPTY_COMBINATION");
}

#[tokio::test]
async fn test_combine_blank_id() {
    let app = create_test_app();
    let id = create(&app, "age > 30").await;

    for ids in [json!([""]), json!([id, "  "])] {
        let (status, body) = post(&app, "/combine_rules", json!({"rule_ids": ids})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_long_chain_round_trip() {
    let app = create_test_app();
    // 300 个条件，接近文本长度上限
    let rule = vec!["age > 30"; 300].join(" AND ");
    let id = create(&app, &rule).await;

    let (status, body) = post(
        &app,
        "/evaluate_rule",
        json!({"rule_id": id, "data": {"age": 35}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], true);

    let (status, body) = post(&app, "/combine_rules", json!({"rule_ids": [id, id]})).await;
    assert_eq!(status, StatusCode::OK);
    let combined = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = post(
        &app,
        "/evaluate_rule",
        json!({"rule_id": combined, "data": {"age": 20}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"], false);
}

#[tokio::test]
async fn test_modify_rule() {
    let app = create_test_app();
    let id = create(&app, "age > 30").await;

    let (status, body) = post(
        &app,
        "/modify_rule",
        json!({"rule_id": id, "new_rule_string": "age > 40"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = post(
        &app,
        "/evaluate_rule",
        json!({"rule_id": id, "data": {"age": 35}}),
    )
    .await;
    assert_eq!(body["data"]["result"], false);

    let (status, _) = post(
        &app,
        "/modify_rule",
        json!({"rule_id": "nope", "new_rule_string": "age > 40"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_unknown_rule() {
    let app = create_test_app();
    let (status, body) = get(&app, "/rules/unknown").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
