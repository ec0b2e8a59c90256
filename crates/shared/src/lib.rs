//! # FarmMate 共有ユーティリティ
//!
//! FarmMate の全クレートから利用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - 他のすべてのクレート（domain, infra, api）から依存される
//! - ビジネスロジックを含まない純粋なデータ構造のみを配置
//! - axum には依存しない（HTTP レスポンスへの変換は api クレートの責務）

pub mod error_response;
pub mod health;
pub mod observability;

pub use error_response::ErrorResponse;
pub use health::HealthResponse;
