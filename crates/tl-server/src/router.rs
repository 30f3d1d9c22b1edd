use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handler;
use crate::session::SessionStore;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new(config.max_sessions, config.hash_algorithm)),
        }
    }
}

/// Build the axum router with all Trackline endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/v1/sessions", post(handler::create_session))
        .route("/v1/sessions/:id", axum::routing::delete(handler::delete_session))
        .route("/v1/sessions/:id/records", get(handler::list_records))
        .route("/v1/sessions/:id/events", post(handler::submit_event))
        .route("/v1/sessions/:id/validate", get(handler::validate_session))
        .route(
            "/v1/sessions/:id/packages/:package_id",
            get(handler::package_history),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use super::*;

    fn app() -> Router {
        build_router(AppState::new(&ServerConfig::default()))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn open_session(app: &Router) -> String {
        let (status, body) = send(app, "POST", "/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = send(&app(), "GET", "/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn info_endpoint() {
        let (status, body) = send(&app(), "GET", "/v1/info", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hash_algorithm"], "sha256");
    }

    #[tokio::test]
    async fn new_session_renders_genesis() {
        let app = app();
        let id = open_session(&app).await;
        let (status, body) = send(&app, "GET", &format!("/v1/sessions/{id}/records"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
        let records = body["records"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["payload"], "Genesis Block");
        assert_eq!(records[0]["previous_digest"], "0");
    }

    #[tokio::test]
    async fn submit_appends_and_rerenders() {
        let app = app();
        let id = open_session(&app).await;
        let uri = format!("/v1/sessions/{id}/events");

        send(&app, "POST", &uri, Some(json!({"package_id": "PKG1", "status": "Shipped"}))).await;
        let (status, body) = send(
            &app,
            "POST",
            &uri,
            Some(json!({"package_id": "PKG1", "status": "Delivered"})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["valid"], true);
        let records = body["records"].as_array().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2]["payload"]["status"], "Delivered");
        assert_eq!(records[2]["previous_digest"], records[1]["digest"]);
        assert_eq!(records[1]["previous_digest"], records[0]["digest"]);
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_without_appending() {
        let app = app();
        let id = open_session(&app).await;
        let (status, body) = send(
            &app,
            "POST",
            &format!("/v1/sessions/{id}/events"),
            Some(json!({"package_id": "PKG1"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], 422);

        let (_, body) = send(&app, "GET", &format!("/v1/sessions/{id}/records"), None).await;
        assert_eq!(body["records"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn validate_reports_clean_chain() {
        let app = app();
        let id = open_session(&app).await;
        send(
            &app,
            "POST",
            &format!("/v1/sessions/{id}/events"),
            Some(json!({"package_id": "PKG1", "status": "Shipped"})),
        )
        .await;
        let (status, body) = send(&app, "GET", &format!("/v1/sessions/{id}/validate"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
        assert_eq!(body["record_count"], 2);
        assert!(body["violations"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn package_history_endpoint() {
        let app = app();
        let id = open_session(&app).await;
        let uri = format!("/v1/sessions/{id}/events");
        for status in ["Shipped", "In Transit"] {
            send(&app, "POST", &uri, Some(json!({"package_id": "PKG7", "status": status}))).await;
        }

        let (status, body) =
            send(&app, "GET", &format!("/v1/sessions/{id}/packages/PKG7"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["latest_status"], "In Transit");
        assert_eq!(body["history"]["events"].as_array().unwrap().len(), 2);

        let (status, _) =
            send(&app, "GET", &format!("/v1/sessions/{id}/packages/NOPE"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sessions_are_isolated_and_closable() {
        let app = app();
        let a = open_session(&app).await;
        let b = open_session(&app).await;
        send(
            &app,
            "POST",
            &format!("/v1/sessions/{a}/events"),
            Some(json!({"package_id": "PKG1", "status": "Shipped"})),
        )
        .await;

        let (_, body) = send(&app, "GET", &format!("/v1/sessions/{b}/records"), None).await;
        assert_eq!(body["records"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, "DELETE", &format!("/v1/sessions/{a}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = send(&app, "GET", &format!("/v1/sessions/{a}/records"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 404);
    }

    fn assert_error_body(body: &Value, status: StatusCode) {
        assert_eq!(body["error"]["code"], status.as_u16());
        assert!(body["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn null_status_hits_presence_check() {
        let app = app();
        let id = open_session(&app).await;
        let (status, body) = send(
            &app,
            "POST",
            &format!("/v1/sessions/{id}/events"),
            Some(json!({"package_id": "PKG1", "status": null})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_error_body(&body, status);
        assert!(body["error"]["message"].as_str().unwrap().contains("please fill in: status"));
    }

    #[tokio::test]
    async fn malformed_session_id_is_json_bad_request() {
        let app = app();
        for uri in [
            "/v1/sessions/not-a-uuid/records",
            "/v1/sessions/not-a-uuid/validate",
            "/v1/sessions/not-a-uuid/packages/PKG1",
        ] {
            let (status, body) = send(&app, "GET", uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_error_body(&body, status);
        }
        let (status, body) = send(&app, "DELETE", "/v1/sessions/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error_body(&body, status);
    }

    #[tokio::test]
    async fn rejected_bodies_use_json_error_shape() {
        let app = app();
        let id = open_session(&app).await;
        let uri = format!("/v1/sessions/{id}/events");

        // no content type
        let request = Request::builder()
            .method("POST")
            .uri(&uri)
            .body(Body::from(r#"{"package_id":"PKG1","status":"Shipped"}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_error_body(&body, status);

        // broken syntax and wrong field type
        for raw in ["{\"package_id\":", r#"{"package_id":7,"status":"Shipped"}"#] {
            let request = Request::builder()
                .method("POST")
                .uri(&uri)
                .header("content-type", "application/json")
                .body(Body::from(raw))
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{raw}");
            assert_error_body(&body, status);
        }

        let (_, body) = send(&app, "GET", &format!("/v1/sessions/{id}/records"), None).await;
        assert_eq!(body["records"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn session_limit_returns_503() {
        let config = ServerConfig {
            max_sessions: 1,
            ..ServerConfig::default()
        };
        let app = build_router(AppState::new(&config));
        open_session(&app).await;
        let (status, _) = send(&app, "POST", "/v1/sessions", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
