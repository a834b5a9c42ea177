/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health は公開, それ以外は RequestFilter を通す
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::v1::handlers::{
    claims::{claim, me},
    health::health,
};

pub fn routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route("/claims/{name}", get(claim));

    Router::new()
        .route("/health", get(health))
        .merge(state.filter.wrap(protected))
}
