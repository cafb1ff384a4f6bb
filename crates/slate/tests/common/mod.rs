//! Shared helpers for client integration tests: a mock Slate deployment
//! that answers the login and module-catalog bootstrap.

use slate::{Slate, SlateConfig};
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

pub const TOKEN: &str = "test-token";

/// Mount the login and module catalog endpoints every session needs.
pub async fn bootstrap(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/login/in"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "message": "",
            "data": {"token": TOKEN}
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/module/getModuleData"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "data": {
                "rows": [
                    {"code": "user", "id": 1, "type": "fixed"},
                    {"code": "media", "id": 2, "type": "fixed"},
                    {"code": "task", "id": 4, "type": "fixed"},
                    {"code": "asset", "id": 5, "type": "fixed"},
                    {"code": "dir_template", "id": 9, "type": "fixed"},
                    {"code": "shot", "id": 12, "type": "entity"}
                ],
                "total": 6
            }
        })))
        .mount(server)
        .await;
}

/// Connect a client against the mock deployment.
pub async fn connect(server: &MockServer) -> Slate {
    connect_with_timeout(server, 30).await
}

pub async fn connect_with_timeout(server: &MockServer, timeout_secs: u64) -> Slate {
    let mut config = SlateConfig::new(server.uri(), "pipeline_bot", "secret");
    config.timeout_secs = timeout_secs;
    Slate::connect(&config).await.expect("session bootstrap")
}

/// Mount a `fields` catalog for a module, needed by query translation.
pub async fn mount_fields(server: &MockServer, module_segment: &str, names: &[&str]) {
    let fixed: serde_json::Map<String, serde_json::Value> = names
        .iter()
        .map(|n| (n.to_string(), serde_json::json!("str")))
        .collect();
    Mock::given(method("POST"))
        .and(path(format!("/api/{module_segment}/fields")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "data": {"fixed_field": fixed, "custom_field": {}}
        })))
        .mount(server)
        .await;
}

/// Matches requests that carry no session token header.
pub struct NoTokenHeader;

impl Match for NoTokenHeader {
    fn matches(&self, request: &Request) -> bool {
        request.headers.get("token").is_none()
    }
}

/// Matches requests whose raw body contains the given bytes.
pub struct BodyContains(pub &'static [u8]);

impl Match for BodyContains {
    fn matches(&self, request: &Request) -> bool {
        request
            .body
            .windows(self.0.len())
            .any(|window| window == self.0)
    }
}
