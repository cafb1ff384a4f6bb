//! Integration tests for dispatch and data operations against a mock
//! Slate deployment.

mod common;

use common::{bootstrap, connect, connect_with_timeout, mount_fields, TOKEN};
use pretty_assertions::assert_eq;
use slate::{Condition, Query, SlateError};
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn find_one_translates_filters_and_sends_token() {
    let server = MockServer::start().await;
    bootstrap(&server).await;
    mount_fields(&server, "task", &["id", "name", "status"]).await;

    Mock::given(method("POST"))
        .and(path("/api/task/find"))
        .and(header("token", TOKEN))
        .and(body_partial_json(serde_json::json!({
            "filter": {"task": {"status": ["-eq", "open"]}},
            "module": {"code": "task", "id": 4}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "data": [{"id": 31, "name": "comp"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let record = client
        .find_one(
            "task",
            Query::filtered(vec![Condition::new("status", "==", "open")]),
        )
        .await
        .unwrap()
        .expect("one record");

    assert_eq!(record.id(), Some(31));
    assert_eq!(record.module.code, "task");
}

#[tokio::test]
async fn select_tags_every_row_with_the_module() {
    let server = MockServer::start().await;
    bootstrap(&server).await;
    mount_fields(&server, "task", &["id", "status"]).await;

    Mock::given(method("POST"))
        .and(path("/api/task/select"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "data": {"rows": [{"id": 1}, {"id": 2}], "total": 2}
        })))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let records = client.select("task", Query::default()).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id(), Some(1));
    assert!(records.iter().all(|r| r.module.code == "task"));
}

#[tokio::test]
async fn summary_returns_the_scalar_total() {
    let server = MockServer::start().await;
    bootstrap(&server).await;
    mount_fields(&server, "task", &["id", "status"]).await;

    Mock::given(method("POST"))
        .and(path("/api/task/select"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "data": {"rows": [], "total": 42}
        })))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let total = client
        .summary("task", vec![Condition::new("status", "==", "open")])
        .await
        .unwrap();
    assert_eq!(total, 42);
}

#[tokio::test]
async fn create_payload_is_data_with_module_tag() {
    let server = MockServer::start().await;
    bootstrap(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/task/create"))
        .and(body_json(serde_json::json!({
            "name": "comp",
            "module": {"code": "task", "id": 4}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "data": {"id": 7, "name": "comp"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let created = client
        .create("task", serde_json::json!({"name": "comp"}))
        .await
        .unwrap()
        .expect("created record");
    assert_eq!(created.id(), Some(7));
}

#[tokio::test]
async fn update_payload_carries_module_and_target_id() {
    let server = MockServer::start().await;
    bootstrap(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/task/update"))
        .and(body_json(serde_json::json!({
            "id": 7,
            "status": "done",
            "module": {"code": "task", "id": 4}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "data": {"id": 7, "status": "done"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let updated = client
        .update("task", 7, serde_json::json!({"status": "done"}))
        .await
        .unwrap()
        .expect("updated record");
    assert_eq!(updated.get("status"), Some(&serde_json::json!("done")));
}

#[tokio::test]
async fn delete_payload_is_the_id_only() {
    let server = MockServer::start().await;
    bootstrap(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/task/delete"))
        .and(body_json(serde_json::json!({"id": 7})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": 200, "data": "ok"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let result = client.delete("task", 7).await.unwrap();
    assert_eq!(result, serde_json::json!("ok"));
}

#[tokio::test]
async fn entity_modules_share_the_entity_segment() {
    let server = MockServer::start().await;
    bootstrap(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/entity/delete"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": 200, "data": true})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    client.delete("shot", 3).await.unwrap();
}

#[tokio::test]
async fn snake_case_modules_camel_case_their_segment() {
    let server = MockServer::start().await;
    bootstrap(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/dirTemplate/getParentDir"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "data": "/projects/alpha"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let parent = client.get_parent_dir(5).await.unwrap();
    assert_eq!(parent, serde_json::json!("/projects/alpha"));
}

#[tokio::test]
async fn protocol_failure_raises_with_body_status() {
    let server = MockServer::start().await;
    bootstrap(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/task/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 500,
            "message": "cannot delete"
        })))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let err = client.delete("task", 7).await.unwrap_err();
    match err {
        SlateError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "cannot delete");
        }
        other => panic!("expected protocol failure, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_failure_raises_with_http_status() {
    let server = MockServer::start().await;
    bootstrap(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/task/delete"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let err = client.delete("task", 7).await.unwrap_err();
    match err {
        SlateError::Http { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal error");
        }
        other => panic!("expected HTTP failure, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_module_fails_before_any_request() {
    let server = MockServer::start().await;
    bootstrap(&server).await;

    let client = connect(&server).await;
    let err = client.delete("nope", 1).await.unwrap_err();
    assert!(matches!(err, SlateError::UnknownModule(name) if name == "nope"));
}

#[tokio::test]
async fn unknown_operation_fails_before_any_request() {
    let server = MockServer::start().await;
    bootstrap(&server).await;

    let client = connect(&server).await;
    let err = client
        .call("task", "frobnicate", slate::CallArgs::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SlateError::UnknownOperation { .. }));
}

#[tokio::test]
async fn rejected_login_aborts_construction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login/in"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 401,
            "message": "bad credentials"
        })))
        .mount(&server)
        .await;

    let config = slate::SlateConfig::new(server.uri(), "pipeline_bot", "wrong");
    let err = slate::Slate::connect(&config).await.unwrap_err();
    assert!(matches!(err, SlateError::Api { status: 401, .. }));
}

#[tokio::test]
async fn hung_service_surfaces_a_timeout_error() {
    let server = MockServer::start().await;
    bootstrap(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/task/delete"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": 200, "data": true}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = connect_with_timeout(&server, 1).await;
    let err = client.delete("task", 7).await.unwrap_err();
    assert!(matches!(err, SlateError::Timeout { .. }));
}

#[tokio::test]
async fn fields_merges_fixed_and_custom_catalogs() {
    let server = MockServer::start().await;
    bootstrap(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/asset/fields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "data": {
                "fixed_field": {"id": "int", "name": "str"},
                "custom_field": {"category": "str"}
            }
        })))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let fields = client.fields("asset").await.unwrap();
    assert_eq!(fields.len(), 3);
    assert!(fields.contains_key("category"));
}
