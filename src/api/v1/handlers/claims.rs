/*
 * Responsibility
 * - GET /me: 検証済み token の中身を返す
 * - GET /claims/{name}: 単一 claim を返す (無ければ 404)
 */
use axum::{Json, extract::Path};
use serde::Serialize;
use serde_json::Value;

use crate::api::v1::extractors::Verified;
use crate::error::AppError;
use crate::services::auth::Claims;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub sub: Option<String>,
    pub alg: String,
    pub expires_at: Option<i64>,
    pub claims: Claims,
}

pub async fn me(Verified(ctx): Verified) -> Json<MeResponse> {
    let token = ctx.token;

    Json(MeResponse {
        sub: token.subject().map(str::to_string),
        alg: token.alg().to_string(),
        expires_at: token.expires_at,
        claims: token.claims,
    })
}

pub async fn claim(
    Verified(ctx): Verified,
    Path(name): Path<String>,
) -> Result<Json<Value>, AppError> {
    ctx.token
        .claims
        .get(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("claim '{name}'")))
}
