//! Bearer-token gate for axum services.
//!
//! - `Authenticator`: encode/decode compact signed tokens with one bound
//!   signing method (HMAC, RSA, ECDSA, EdDSA).
//! - `RequestFilter`: finds the token in a request (query `jwt`, aliases,
//!   `Authorization: Bearer`, cookie `jwt`), verifies it and stores a
//!   `VerificationContext` in the request extensions.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

pub use api::v1::extractors::{VerificationContext, Verified};
pub use middleware::auth::{RequestFilter, TokenSource};
pub use services::auth::{
    AuthError, Authenticator, Claims, Header, NumericDates, Parser, ParserSettings, SigningMethod,
    Token,
};
