//! # エラーレスポンス
//!
//! 全エンドポイントで共通のエラーレスポンス構造体を提供する。
//!
//! ```json
//! {"status": "error", "message": "...", "code": 1003, "status_code": 400}
//! ```
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換は api クレートの責務（shared に axum 依存を入れない）
//! - `code` はアプリケーション固有の番号で、HTTP ステータスとは独立している。
//!   クライアントは `message` ではなく `code` で分岐する

use serde::{Deserialize, Serialize};

/// `status` フィールドの固定値
pub const ERROR_STATUS: &str = "error";

/// 未知の失敗に対して返すメッセージ
pub const FALLBACK_MESSAGE: &str = "Unexpected error occurred";

/// 未知の失敗に対して返すエラーコード
pub const FALLBACK_CODE: u32 = 2000;

/// 未知の失敗に対して返す HTTP ステータス
pub const FALLBACK_STATUS_CODE: u16 = 500;

/// エラーレスポンス
///
/// `status_code` は HTTP レスポンスのステータスと常に一致させる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
   pub status:      String,
   pub message:     String,
   pub code:        u32,
   pub status_code: u16,
}

impl ErrorResponse {
   /// 汎用コンストラクタ
   pub fn new(message: impl Into<String>, code: u32, status_code: u16) -> Self {
      Self {
         status: ERROR_STATUS.to_string(),
         message: message.into(),
         code,
         status_code,
      }
   }

   /// 未知の失敗に対するフォールバック
   ///
   /// 元の失敗の内容は一切含めない。
   pub fn fallback() -> Self {
      Self::new(FALLBACK_MESSAGE, FALLBACK_CODE, FALLBACK_STATUS_CODE)
   }
}
