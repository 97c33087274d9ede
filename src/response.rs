use axum::http::{header::HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Machine-readable code attached to rate-limit rejections.
pub const TOO_MANY_REQUESTS_CODE: &str = "TOO_MANY_REQUESTS";

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
}

/// Builds a response with the JSON body and the permissive CORS headers every
/// endpoint carries. `Content-Type: application/json` comes from `Json`.
pub fn format_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    let mut response = (status, Json(body)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        "access-control-allow-origin",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "access-control-allow-credentials",
        HeaderValue::from_static("true"),
    );
    response
}

pub fn success<T: Serialize>(body: &T) -> Response {
    format_response(StatusCode::OK, body)
}

pub fn created<T: Serialize>(body: &T) -> Response {
    format_response(StatusCode::CREATED, body)
}

pub fn bad_request(message: &str) -> Response {
    format_response(
        StatusCode::BAD_REQUEST,
        &ErrorBody { error: message, code: None },
    )
}

pub fn unauthorized(message: &str) -> Response {
    format_response(
        StatusCode::UNAUTHORIZED,
        &ErrorBody { error: message, code: None },
    )
}

pub fn forbidden(message: &str) -> Response {
    format_response(
        StatusCode::FORBIDDEN,
        &ErrorBody { error: message, code: None },
    )
}

pub fn not_found(message: &str) -> Response {
    format_response(
        StatusCode::NOT_FOUND,
        &ErrorBody { error: message, code: None },
    )
}

pub fn too_many_requests(message: &str) -> Response {
    format_response(
        StatusCode::TOO_MANY_REQUESTS,
        &ErrorBody {
            error: message,
            code: Some(TOO_MANY_REQUESTS_CODE),
        },
    )
}

pub fn server_error(message: &str) -> Response {
    format_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &ErrorBody { error: message, code: None },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cors_headers_present() {
        let response = success(&json!({"message": "ok"}));
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-credentials"], "true");
        assert_eq!(headers["content-type"], "application/json");
    }

    #[test]
    fn test_created_status() {
        let response = created(&json!({"id": 1}));
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_error_body_shape() {
        let response = bad_request("ID no válido o no proporcionado");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_too_many_requests_carries_code() {
        let response = too_many_requests("Demasiadas solicitudes");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
