/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - Authenticator は起動時に一度だけ作り、全リクエストで読み取り専用に共有する
 */
use std::sync::Arc;

use crate::middleware::auth::RequestFilter;
use crate::services::auth::Authenticator;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<Authenticator>,
    pub filter: RequestFilter,
}

impl AppState {
    pub fn new(auth: Arc<Authenticator>, aliases: Vec<String>) -> Self {
        let filter = RequestFilter::new(auth.clone(), aliases);
        Self { auth, filter }
    }
}
