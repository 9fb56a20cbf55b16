//! API Middleware
//!
//! Bearer-token authentication for Axum handlers, plus the shared-secret
//! guard used by the anonymous signup and password-reset endpoints.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderValue},
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use subtle::ConstantTimeEq;
use tower::{Layer, Service};

use crate::auth::token_service::{extract_bearer_token, TokenService};
use crate::shared::error::PlatformError;

/// Header carrying the signup shared secret
pub const SIGNUP_SECRET_HEADER: &str = "secret";

/// Request-scoped state the extractors read from extensions
#[derive(Clone)]
pub struct AppState {
    pub token_service: Arc<TokenService>,
    /// When set, signup and password reset require a matching `secret` header
    pub signup_secret: Option<Arc<str>>,
}

/// Identity carried by a verified bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: String,
}

/// Authenticated user extractor
pub struct Authenticated(pub AuthContext);

impl std::ops::Deref for Authenticated {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn app_state(parts: &Parts) -> Result<&AppState, PlatformError> {
    parts
        .extensions
        .get::<AppState>()
        .ok_or_else(|| PlatformError::internal("Auth layer not configured"))
}

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = PlatformError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path();
        let app_state = app_state(parts).inspect_err(|e| e.log("authenticate", path))?;

        let user_id = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(|| PlatformError::unauthorized("Missing authentication token"))
            .and_then(|token| app_state.token_service.verify(token))
            .inspect_err(|e| e.log("authenticate", path))?;

        Ok(Authenticated(AuthContext { user_id }))
    }
}

/// Passes when no signup secret is configured or the `secret` header matches it
pub struct SignupSecret;

#[async_trait]
impl<S> FromRequestParts<S> for SignupSecret
where
    S: Send + Sync,
{
    type Rejection = PlatformError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path();
        let Some(expected) = app_state(parts)
            .inspect_err(|e| e.log("signup_secret", path))?
            .signup_secret
            .clone()
        else {
            return Ok(SignupSecret);
        };

        let provided = parts
            .headers
            .get(SIGNUP_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if expected.as_bytes().ct_eq(provided.as_bytes()).into() {
            Ok(SignupSecret)
        } else {
            let err = PlatformError::unauthorized("Missing or invalid secret header");
            err.log("signup_secret", path);
            Err(err)
        }
    }
}

/// Middleware layer that injects AppState into request extensions
#[derive(Clone)]
pub struct AuthLayer {
    state: AppState,
}

impl AuthLayer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    state: AppState,
}

impl<S, B> Service<axum::http::Request<B>> for AuthMiddleware<S>
where
    S: Service<axum::http::Request<B>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(self.state.clone());
        Box::pin(self.inner.call(req))
    }
}
