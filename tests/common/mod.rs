#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use stockroom_api::{
    api_v1_routes,
    auth::{AuthConfig, AuthService, RegisterRequest},
    config::AppConfig,
    db::{self, DbConfig},
    events::{self, EventSender},
    handlers::{health::health_router, AppServices},
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_purposes_only_32chars";

/// Helper harness for spinning up an application backed by an in-memory SQLite
/// database. A single pooled connection keeps the schema alive for the whole
/// test.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub token: String,
    pub user_id: Uuid,
}

impl TestApp {
    /// Construct a new test application with fresh database state and a
    /// logged-in admin account.
    pub async fn new() -> Self {
        let db_cfg = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let pool = db::establish_connection_with_config(&db_cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool).await.expect("migrations failed");
        let db_arc = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        tokio::spawn(events::process_events(event_rx));

        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_JWT_SECRET.to_string(),
            "test".to_string(),
        );
        let auth = Arc::new(AuthService::new(
            AuthConfig::new(cfg.jwt_secret.clone(), Duration::from_secs(3600)),
            db_arc.clone(),
        ));
        let services = AppServices::new(db_arc.clone(), event_sender.clone(), cfg.stock_retry_attempts);

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            auth: auth.clone(),
            services,
        };

        let router = Router::new()
            .nest("/health", health_router())
            .nest("/api/v1", api_v1_routes())
            .with_state(state.clone());

        let user = auth
            .register(RegisterRequest {
                name: "Test Admin".to_string(),
                email: "admin@example.com".to_string(),
                password: "password123".to_string(),
                role: Some("admin".to_string()),
            })
            .await
            .expect("failed to register admin");
        let tokens = auth
            .login("admin@example.com", "password123")
            .await
            .expect("failed to log in admin");

        Self {
            router,
            state,
            token: tokens.access_token,
            user_id: user.id,
        }
    }

    /// Issue an authenticated request and return (status, parsed JSON body).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.raw_request(method, uri, body, Some(&self.token)).await
    }

    /// Issue a request authenticated with a specific token.
    pub async fn request_as(
        &self,
        token: &str,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.raw_request(method, uri, body, Some(token)).await
    }

    /// Register a member account through the API and return its access token.
    pub async fn member_token(&self, name: &str, email: &str) -> String {
        let (status, body) = self
            .anonymous_request(
                Method::POST,
                "/api/v1/auth/register",
                Some(json!({ "name": name, "email": email, "password": "member-pass-1" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "member register failed: {body}");

        let (status, login) = self
            .anonymous_request(
                Method::POST,
                "/api/v1/auth/login",
                Some(json!({ "email": email, "password": "member-pass-1" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "member login failed: {login}");
        login["access_token"]
            .as_str()
            .expect("login returned no token")
            .to_string()
    }

    /// Issue a request without an Authorization header.
    pub async fn anonymous_request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.raw_request(method, uri, body, None).await
    }

    async fn raw_request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("failed to build request"),
            None => builder.body(Body::empty()).expect("failed to build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Create a category through the API and return its id.
    pub async fn create_category(&self, name: &str) -> Uuid {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/categories",
                Some(json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "category create failed: {body}");
        parse_id(&body)
    }

    /// Create a machine through the API and return its id.
    pub async fn create_machine(&self, name: &str) -> Uuid {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/machines",
                Some(json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "machine create failed: {body}");
        parse_id(&body)
    }

    /// Create a material through the API and return its id.
    pub async fn create_material(
        &self,
        name: &str,
        category_id: Uuid,
        machine_id: Option<Uuid>,
        min_quantity: i32,
    ) -> Uuid {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/materials",
                Some(json!({
                    "name": name,
                    "category_id": category_id,
                    "machine_id": machine_id,
                    "unit_price": "42.50",
                    "location": "Store A",
                    "cupboard": "C1",
                    "shelf": "S3",
                    "min_quantity": min_quantity,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "material create failed: {body}");
        parse_id(&body)
    }
}

pub fn parse_id(body: &Value) -> Uuid {
    body.get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(|| panic!("response has no id: {body}"))
}
