use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::services::auth::AuthError;

use super::VerificationContext;

/// Handler で VerificationContext を受け取るための extractor
/// RequestFilter が request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す（filter が掛かっていないルート）
pub struct Verified(pub VerificationContext);

impl<S> FromRequestParts<S> for Verified
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VerificationContext>()
            .cloned()
            .map(Verified)
            .ok_or(AuthError::NoToken)
    }
}
