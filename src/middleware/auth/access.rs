//! Token gate: 検出 → 検証 → VerificationContext を extensions に入れる
//!
//! Token discovery order (first hit wins):
//! 1. query parameter `jwt`
//! 2. configured query-parameter aliases, in order
//! 3. `Authorization: Bearer <token>` (scheme is case-insensitive)
//! 4. cookie `jwt`
//!
//! Every failure is answered with the same 401 `unauthorized token`; the
//! concrete cause is only logged.

use std::{fmt, sync::Arc};

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, Uri, header},
    middleware::{self, Next},
    response::Response,
};
use cookie::Cookie;

use crate::api::v1::extractors::VerificationContext;
use crate::services::auth::{AuthError, Authenticator, epoch_now, signing};

const TOKEN_PARAM: &str = "jwt";
const TOKEN_COOKIE: &str = "jwt";
const BEARER_PREFIX: &str = "bearer ";

/// Where the candidate token was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Query,
    QueryAlias(String),
    AuthorizationHeader,
    Cookie,
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Query => write!(f, "query:{}", TOKEN_PARAM),
            TokenSource::QueryAlias(name) => write!(f, "query:{}", name),
            TokenSource::AuthorizationHeader => write!(f, "header:authorization"),
            TokenSource::Cookie => write!(f, "cookie:{}", TOKEN_COOKIE),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RequestFilter {
    auth: Arc<Authenticator>,
    aliases: Arc<[String]>,
}

impl RequestFilter {
    /// `aliases` are extra query-parameter names probed (in order) when `jwt` is absent.
    pub fn new<I, S>(auth: Arc<Authenticator>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let aliases = aliases
            .into_iter()
            .map(Into::<String>::into)
            .filter(|name| !name.is_empty())
            .collect();

        Self { auth, aliases }
    }

    pub fn without_aliases(auth: Arc<Authenticator>) -> Self {
        Self::new(auth, std::iter::empty::<String>())
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Wrap every route of `router` with the gate.
    ///
    /// 例：
    /// ```ignore
    /// let me = Router::new().route("/me", get(me));
    /// let me = RequestFilter::without_aliases(state.auth.clone()).wrap(me);
    /// ```
    pub fn wrap<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(middleware::from_fn_with_state(self.clone(), filter_middleware))
    }

    pub fn authenticate(
        &self,
        uri: &Uri,
        headers: &HeaderMap,
    ) -> Result<VerificationContext, AuthError> {
        self.authenticate_at(uri, headers, epoch_now())
    }

    pub fn authenticate_at(
        &self,
        uri: &Uri,
        headers: &HeaderMap,
        now: i64,
    ) -> Result<VerificationContext, AuthError> {
        let (source, raw) = self.find_token(uri, headers).ok_or(AuthError::NoToken)?;
        tracing::debug!(source = %source, "token candidate found");

        let token = self.auth.decode(&raw)?;
        if !token.valid {
            return Err(AuthError::SignatureInvalid);
        }
        if !signing::same_method(token.method.as_ref(), self.auth.method()) {
            return Err(AuthError::UnsupportedAlgorithm(token.header.alg));
        }
        let leeway = self.auth.parser().settings().leeway_seconds;
        if token.is_expired_at(now, leeway) {
            return Err(AuthError::Expired);
        }

        Ok(VerificationContext::new(raw, token))
    }

    pub fn find_token(&self, uri: &Uri, headers: &HeaderMap) -> Option<(TokenSource, String)> {
        let query = uri.query().unwrap_or_default();

        if let Some(token) = query_param(query, TOKEN_PARAM) {
            return Some((TokenSource::Query, token));
        }
        for alias in self.aliases.iter() {
            if let Some(token) = query_param(query, alias) {
                return Some((TokenSource::QueryAlias(alias.clone()), token));
            }
        }
        if let Some(token) = bearer_token(headers) {
            return Some((TokenSource::AuthorizationHeader, token.to_string()));
        }
        cookie_value(headers, TOKEN_COOKIE).map(|token| (TokenSource::Cookie, token))
    }
}

async fn filter_middleware(
    State(filter): State<RequestFilter>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let ctx = match filter.authenticate(req.uri(), req.headers()) {
        Ok(ctx) => ctx,
        Err(err) => {
            tracing::warn!(error = %err, path = %req.uri().path(), "token rejected");
            return Err(err);
        }
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}

/// First value of `name`; an empty first value counts as absent.
fn query_param(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_at_checked(BEARER_PREFIX.len())?;

    if scheme.eq_ignore_ascii_case(BEARER_PREFIX) && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// First cookie called `name` across all `Cookie` headers; surrounding quotes are dropped.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| Cookie::split_parse(v))
        .filter_map(|cookie| cookie.ok())
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value_trimmed().to_string())
        .filter(|value| !value.is_empty())
}
