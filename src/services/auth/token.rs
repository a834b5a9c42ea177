use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::claims::Claims;
use super::signing::SigningMethod;

/// JOSE header of a compact token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,
}

impl Header {
    pub fn new(alg: &str) -> Self {
        Self {
            alg: alg.to_string(),
            typ: Some("JWT".to_string()),
            kid: None,
            cty: None,
        }
    }
}

/// A parsed token.
///
/// - `valid` is only ever set by signature verification (`Parser::parse`); a
///   freshly encoded token carries `valid = false`.
/// - `expires_at` is the `exp` claim read under the parser's numeric-date policy.
#[derive(Debug, Clone)]
pub struct Token {
    pub header: Header,
    pub claims: Claims,
    pub method: Arc<dyn SigningMethod>,
    pub valid: bool,
    pub raw: String,
    pub expires_at: Option<i64>,
}

impl Token {
    pub fn alg(&self) -> &str {
        self.method.name()
    }

    pub fn subject(&self) -> Option<&str> {
        self.claims.get_str("sub")
    }

    /// `exp + leeway < now`; with zero leeway this is the plain `exp < now`.
    pub fn is_expired_at(&self, now: i64, leeway_seconds: u64) -> bool {
        let leeway = i64::try_from(leeway_seconds).unwrap_or(i64::MAX);
        matches!(self.expires_at, Some(exp) if exp.saturating_add(leeway) < now)
    }
}

/// NumericDate "now": current UTC time in epoch seconds.
pub fn epoch_now() -> i64 {
    chrono::Utc::now().timestamp()
}
