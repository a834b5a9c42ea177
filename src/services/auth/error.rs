/*
 * Responsibility
 * - Token 検証/発行まわりのエラー分類 (AuthError)
 * - IntoResponse: 検証系の失敗はすべて同じ 401 に潰す (理由は外に出さない)
 */
use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Fixed response body for every rejected request.
pub const UNAUTHORIZED_BODY: &str = "unauthorized token";

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no token found in request")]
    NoToken,

    #[error("malformed token: {0}")]
    MalformedToken(&'static str),

    #[error("signature verification failed")]
    SignatureInvalid,

    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("token is expired")]
    Expired,

    #[error("token is not valid yet")]
    NotYetValid,

    #[error("failed to sign token: {0}")]
    SigningError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            UNAUTHORIZED_BODY,
        )
            .into_response()
    }
}
