//! Bearer token check for the API and event stream routes
//!
//! With no token configured every request passes through. WebSocket and SSE
//! clients may send the token as `?token=` since browsers cannot set headers
//! on those connections.

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tower::Layer;

pub const UNAUTHORIZED_MESSAGE: &str = "Invalid or missing Bearer token";

#[derive(Clone)]
pub struct AuthLayer {
    token: Option<Arc<String>>,
}

impl AuthLayer {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()).map(Arc::new),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            token: self.token.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    token: Option<Arc<String>>,
}

impl<S> tower::Service<Request> for AuthMiddleware<S>
where
    S: tower::Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let token = self.token.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(token) = token else {
                return inner.call(req).await;
            };

            // CORS preflight carries no credentials
            if req.method() == Method::OPTIONS {
                return inner.call(req).await;
            }

            let path = req.uri().path();
            let is_stream = path.starts_with("/ws/") || path.ends_with("/events");
            let requires_auth = path.starts_with("/api/") || path.starts_with("/ws/");
            if !requires_auth {
                return inner.call(req).await;
            }

            if is_stream && query_token(&req).as_deref() == Some(token.as_str()) {
                return inner.call(req).await;
            }

            if bearer_token(&req) == Some(token.as_str()) {
                return inner.call(req).await;
            }

            log::debug!("Rejected unauthenticated request to {}", path);
            Ok(unauthorized())
        })
    }
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn query_token(req: &Request) -> Option<String> {
    let query = req.uri().query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Unauthorized", "details": UNAUTHORIZED_MESSAGE })),
    )
        .into_response()
}

/// Random 16-byte token, hex encoded
pub fn generate_auth_token() -> String {
    use rand::Rng;
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
