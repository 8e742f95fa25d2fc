//! In-process harness for route tests

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header, request::Builder},
};
use inventory_auth::{TOKEN_TTL_HOURS, TokenService};
use inventory_db::{Database, NewProduct, Role};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::routes::create_router;
use crate::state::AppState;

fn authorized(builder: Builder, token: Option<&str>) -> Builder {
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}

fn request_body(body: Option<Value>) -> Body {
    body.map_or_else(Body::empty, |json| Body::from(json.to_string()))
}

pub(crate) struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Database::in_memory().await.unwrap();
        let tokens = Arc::new(TokenService::new("route-test-secret", TOKEN_TTL_HOURS).unwrap());
        let state = AppState::new(db, tokens).unwrap();
        let router = create_router(state.clone(), None);
        Self { router, state }
    }

    /// Send a request and return the status and raw body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = authorized(Request::builder().method(method).uri(uri), token);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        self.dispatch(builder, request_body(body)).await
    }

    /// Send a body as-is, with an optional content type
    pub async fn call_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = authorized(Request::builder().method(method).uri(uri), token);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let (status, bytes) = self.dispatch(builder, Body::from(body.to_string())).await;
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn dispatch(&self, builder: Builder, body: Body) -> (StatusCode, Vec<u8>) {
        let request = builder.body(body).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    /// Send a request and decode the JSON body (`Null` when there is none)
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = self.send(method, uri, token, body).await;
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn register(&self, email: &str, password: &str, role: Role) -> i64 {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/auth/registro",
                None,
                Some(serde_json::json!({
                    "correo_electronico": email,
                    "contrasena": password,
                    "id_rol": role.id(),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
        body["userId"].as_i64().unwrap()
    }

    /// Register a user with the given role and log them in
    pub async fn token_for(&self, role: Role) -> String {
        let email = format!("{}@inventario.test", role.as_str());
        self.register(&email, "secreto", role).await;

        let (status, body) = self
            .call(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({
                    "correo_electronico": email,
                    "contrasena": "secreto",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Insert a product directly, bypassing the routes
    pub async fn product(&self, barcode: &str, current_stock: i64) -> i64 {
        self.state
            .db
            .create_product(NewProduct {
                name: format!("Producto {}", barcode),
                barcode: barcode.to_string(),
                current_stock,
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }
}
