//! Request logging middleware and the (stub) auth helpers.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::key_generator::client_ip;

/// Logs every request/response pair under a generated request id.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0);
    let client = client_ip(request.headers(), peer);

    info!(
        %request_id,
        method = %method,
        uri = %uri,
        client_ip = %client,
        "incoming request"
    );

    let response = next.run(request).await;

    info!(
        %request_id,
        method = %method,
        uri = %uri,
        status = %response.status(),
        "request completed"
    );

    response
}

/// Caller identity as decoded from the (unverified) bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub roles: Vec<String>,
}

/// Parses the `Authorization: Bearer <token>` header and returns a fixed
/// user. The token itself is NOT verified; this is a stub kept for parity
/// with the deployed system and is not wired into the item routes.
pub fn authenticate(headers: &HeaderMap) -> Result<AuthUser, AppError> {
    let header = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("Token de autorización no proporcionado".into())
        })?;

    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(AuthUser {
            id: "user-123".into(),
            roles: vec!["user".into()],
        }),
        _ => Err(AppError::Unauthorized("Formato de token inválido".into())),
    }
}

/// Checks that the user holds one of the required roles. An empty requirement
/// list allows everyone.
pub fn authorize(user: &AuthUser, required_roles: &[&str]) -> Result<(), AppError> {
    if required_roles.is_empty() {
        return Ok(());
    }

    if user.roles.iter().any(|role| required_roles.contains(&role.as_str())) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "No tiene permisos suficientes para esta operación".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_authenticate_without_header() {
        let err = authenticate(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_authenticate_rejects_non_bearer_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcg=="));
        let err = authenticate(&headers).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_authenticate_accepts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));
        let user = authenticate(&headers).unwrap();
        assert_eq!(user.id, "user-123");
        assert_eq!(user.roles, vec!["user".to_string()]);
    }

    #[test]
    fn test_authorize_with_matching_role() {
        let user = AuthUser {
            id: "user-123".into(),
            roles: vec!["user".into()],
        };
        assert!(authorize(&user, &["admin", "user"]).is_ok());
    }

    #[test]
    fn test_authorize_without_matching_role() {
        let user = AuthUser {
            id: "user-123".into(),
            roles: vec!["user".into()],
        };
        let err = authorize(&user, &["admin"]).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_authorize_with_no_required_roles() {
        let user = AuthUser {
            id: "user-123".into(),
            roles: vec![],
        };
        assert!(authorize(&user, &[]).is_ok());
    }
}
