/*!
 * Verified token extractor
 *
 * Responsibility:
 * - 検証済み token のコンテキスト（VerificationContext）を handler に提供する
 * - axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - VerificationContext
 * - Verified
 */

mod core;
mod types;

pub use core::Verified;
pub use types::VerificationContext;
