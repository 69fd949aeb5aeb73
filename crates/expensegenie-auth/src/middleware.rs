//! Authentication Middleware for Axum
//!
//! [`AuthLayer`] guards a sub-router: requests without a valid bearer token
//! never reach the handler. The authenticated user is stored in the request
//! extensions and read back with the [`RequireAuth`] extractor.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::Response,
};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::error::{AuthError, ErrorResponse};
use crate::jwt::JwtService;
use crate::types::AuthenticatedUser;

/// Authentication middleware layer
#[derive(Clone)]
pub struct AuthLayer {
    jwt: Arc<JwtService>,
}

impl AuthLayer {
    pub fn new(jwt: Arc<JwtService>) -> Self {
        Self { jwt }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            jwt: self.jwt.clone(),
        }
    }
}

/// Authentication middleware service
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    jwt: Arc<JwtService>,
}

impl<S> Service<Request> for AuthMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let jwt = self.jwt.clone();
        // Take the service that was driven to readiness
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match authenticate_request(req.headers(), &jwt) {
                Ok(user) => {
                    tracing::debug!(user_id = %user.user_id, "Authenticated request");
                    let (mut parts, body) = req.into_parts();
                    parts.extensions.insert(user);
                    inner.call(Request::from_parts(parts, body)).await
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Rejected request");
                    Ok(auth_error_response(e))
                }
            }
        })
    }
}

/// Read the bearer token and validate it
pub fn authenticate_request(
    headers: &HeaderMap,
    jwt: &JwtService,
) -> Result<AuthenticatedUser, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
    jwt.authenticate(token)
}

/// The token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Create error response for authentication errors
pub fn auth_error_response(error: AuthError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse::from(&error);

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap_or_default()))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

/// Extractor for the authenticated user; 401 when the layer did not run
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or_else(|| auth_error_response(AuthError::MissingToken))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use axum::{routing::get, Router};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new(JwtConfig {
            secret: "middleware-test-secret-0123456789abcdef".into(),
            ..JwtConfig::default()
        }))
    }

    async fn whoami(RequireAuth(user): RequireAuth) -> String {
        user.username
    }

    fn app(jwt: Arc<JwtService>) -> Router {
        Router::new()
            .route("/me", get(whoami))
            .route_layer(AuthLayer::new(jwt))
    }

    async fn call(app: Router, authorization: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/me");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    #[tokio::test]
    async fn test_missing_token() {
        let (status, body) = call(app(jwt()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Unauthorized: No token provided"));
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let (status, body) = call(app(jwt()), Some("Bearer not-a-jwt")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Unauthorized: Invalid token"));
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let jwt = jwt();
        let issued = jwt.issue(Uuid::new_v4(), "maria", "maria@example.com").unwrap();
        let header_value = format!("Bearer {}", issued.token);

        let (status, body) = call(app(jwt), Some(&header_value)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "maria");
    }
}
