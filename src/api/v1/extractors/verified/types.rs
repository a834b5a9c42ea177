/*
 * Responsibility
 * - Handler から見える「検証済み token」の型
 * - middleware (RequestFilter) が検証に成功した時だけ request extensions に格納する
 *
 * Notes
 * - 署名検証/exp チェックは middleware/services 側の責務
 * - claims → 認可 (この caller が X をしてよいか) の判断はここではしない
 */
use crate::services::auth::Token;

/// Per-request result of a successful verification.
#[derive(Debug, Clone)]
pub struct VerificationContext {
    /// Encoded token exactly as presented by the client.
    pub raw: String,
    pub token: Token,
}

impl VerificationContext {
    pub fn new(raw: String, token: Token) -> Self {
        Self { raw, token }
    }

    pub fn subject(&self) -> Option<&str> {
        self.token.subject()
    }
}
