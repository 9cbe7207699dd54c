#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use task_api_rust::app::app;
use task_api_rust::testing::{test_state, MemoryStore};

pub const EMAIL: &str = "a@x.com";
pub const PASSWORD: &str = "secret123";

/// Router over a fresh in-memory store; clones share the store.
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body).context("response body is not JSON")
    }

    /// The `token` value from `Set-Cookie`, if the response set one.
    pub fn session_token(&self) -> Option<String> {
        let cookie = self.set_cookie.as_deref()?;
        let first = cookie.split(';').next()?;
        let value = first.strip_prefix("token=")?;
        (!value.is_empty()).then(|| value.to_string())
    }
}

impl TestApp {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let router = app(test_state(&store));
        Self { router, store }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("token={token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(response.into_body(), usize::MAX).await?.to_vec();

        Ok(TestResponse { status, set_cookie, body })
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<TestResponse> {
        self.send(
            Method::POST,
            "/signup",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TestResponse> {
        self.send(
            Method::POST,
            "/login",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Sign up and log in, returning the session token.
    pub async fn session(&self, email: &str) -> Result<String> {
        let res = self.signup(email, PASSWORD).await?;
        anyhow::ensure!(res.status == StatusCode::OK, "signup failed: {}", res.status);
        let res = self.login(email, PASSWORD).await?;
        res.session_token().context("login did not set a session cookie")
    }
}
