/*
 * Responsibility
 * - ドメインロジック (HTTP に依存しない部分)
 * - auth: token の encode/decode, 署名方式, claims
 */
pub mod auth;
