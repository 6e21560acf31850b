//! Tests for error handling and IntoResponse implementation.

use crate::error::*;
use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use tablegate_core::{AuthError, ExecutionError, Verdict};

async fn body_json(error: ServerError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    (parts.status, serde_json::from_slice(&bytes).unwrap())
}

#[test]
fn test_status_code_correctness() {
    let test_cases = [
        (ServerError::Unauthorized("".into()), StatusCode::UNAUTHORIZED),
        (ServerError::Forbidden("".into()), StatusCode::FORBIDDEN),
        (ServerError::InvalidRequest("".into()), StatusCode::BAD_REQUEST),
        (ServerError::NotFound("".into()), StatusCode::NOT_FOUND),
        (ServerError::Unavailable("".into()), StatusCode::SERVICE_UNAVAILABLE),
        (
            ServerError::Auth(AuthError::Unavailable("throttled".into())),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        (
            ServerError::Auth(AuthError::Backend("no table".into())),
            StatusCode::BAD_GATEWAY,
        ),
        (
            ServerError::Store(ExecutionError::Unavailable("timeout".into())),
            StatusCode::BAD_GATEWAY,
        ),
        (
            ServerError::Store(ExecutionError::Rejected {
                code: "ValidationException".into(),
                message: "bad key".into(),
            }),
            StatusCode::BAD_REQUEST,
        ),
        (
            ServerError::Store(ExecutionError::Unsupported("list-tables".into())),
            StatusCode::BAD_REQUEST,
        ),
        (ServerError::Internal("".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (error, expected_status) in test_cases {
        let response = error.into_response();
        let (parts, _body) = response.into_parts();
        assert_eq!(parts.status, expected_status);
    }
}

#[tokio::test]
async fn test_body_carries_message_and_code() {
    let (status, body) = body_json(ServerError::Forbidden(
        "authorization error: missing permission 'customer:delete'".into(),
    ))
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"],
        "authorization error: missing permission 'customer:delete'"
    );
    assert_eq!(body["code"], 403);
}

#[tokio::test]
async fn test_store_rejection_keeps_store_message() {
    let (_, body) = body_json(ServerError::Store(ExecutionError::Rejected {
        code: "ValidationException".into(),
        message: "The provided key element does not match the schema".into(),
    }))
    .await;
    assert_eq!(
        body["error"],
        "ValidationException: The provided key element does not match the schema"
    );
}

#[tokio::test]
async fn test_internal_errors_are_not_leaked() {
    let (status, body) = body_json(ServerError::Internal("secret path /etc/x".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal error");
}

#[test]
fn test_unauthorized_sets_www_authenticate() {
    let response = ServerError::Unauthorized("session expired".into()).into_response();
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );

    let response = ServerError::Forbidden("no".into()).into_response();
    assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
}

#[test]
fn test_from_verdict() {
    assert!(ServerError::from_verdict(&Verdict::Allowed {
        permission: "customer:read".into()
    })
    .is_none());

    let denied = ServerError::from_verdict(&Verdict::Denied {
        required: "customer:write".into(),
    })
    .unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        denied.to_string(),
        "Forbidden: authorization error: missing permission 'customer:write'"
    );

    let rejected = ServerError::from_verdict(&Verdict::Rejected).unwrap();
    assert_eq!(rejected.status(), StatusCode::FORBIDDEN);

    let malformed = ServerError::from_verdict(&Verdict::Malformed {
        reason: "empty command".into(),
    })
    .unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

    let unavailable = ServerError::from_verdict(&Verdict::Indeterminate {
        reason: "role 'writer' could not be resolved right now: throttled".into(),
    })
    .unwrap();
    assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[test]
fn test_error_types_are_send_sync() {
    fn is_send<T: Send>() {}
    fn is_sync<T: Sync>() {}

    is_send::<ServerError>();
    is_sync::<ServerError>();
}

#[test]
fn test_error_nested_quotes() {
    let error = ServerError::InvalidRequest(r#"Field "key" has invalid value "x""#.to_string());
    let response = error.into_response();
    let (parts, _body) = response.into_parts();

    assert_eq!(parts.status, StatusCode::BAD_REQUEST);
}
