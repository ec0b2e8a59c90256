//! # API エラーハンドリング
//!
//! ハンドラから返るすべての失敗を、共通のエラーレスポンスに変換する。
//!
//! ```json
//! {"status": "error", "message": "No image uploaded.", "code": 1003, "status_code": 400}
//! ```
//!
//! ## エラーの流れ
//!
//! ```text
//! StructuredError / InfraError / anyhow::Error / 認証ゲートの拒否
//!        ↓ ?
//! ApiError
//!        ↓ IntoResponse（ログ出力 + translate）
//! HTTP レスポンス (StatusCode + ErrorResponse)
//! ```
//!
//! [`translate`] は純粋な対応表の参照で、状態も I/O も持たない。
//! 元の失敗のログ出力は [`IntoResponse`] 実装側で行い、レスポンス本文には影響しない。

use std::any::Any;

use axum::{
   Json,
   extract::multipart::MultipartError,
   http::StatusCode,
   response::{IntoResponse, Response},
};
use farmmate_domain::{ErrorKind, StructuredError};
use farmmate_infra::{InfraError, InfraErrorKind};
use farmmate_shared::ErrorResponse;
use thiserror::Error;

/// API 層で発生するエラー
///
/// すべてのハンドラは `Result<impl IntoResponse, ApiError>` を返す。
#[derive(Debug, Error)]
pub enum ApiError {
   /// 種別付きのエラー（ハンドラ・ユースケースが前提条件違反で生成する）
   #[error(transparent)]
   Structured(#[from] StructuredError),

   /// 認証ゲートによる拒否（有効なセッションがない）
   ///
   /// `Unauthorized` と同じ 401 / 1201 に正規化する。
   #[error("認証されていません")]
   PermissionDenied,

   /// インフラ層のエラー（クライアントには詳細を返さない）
   #[error(transparent)]
   Infra(#[from] InfraError),

   /// 分類できないエラー（クライアントには詳細を返さない）
   #[error(transparent)]
   Unexpected(#[from] anyhow::Error),
}

impl From<ErrorKind> for ApiError {
   fn from(kind: ErrorKind) -> Self {
      Self::Structured(StructuredError::new(kind))
   }
}

impl From<MultipartError> for ApiError {
   fn from(err: MultipartError) -> Self {
      tracing::debug!("multipart の読み取りに失敗: {err}");
      Self::Structured(StructuredError::bad_request())
   }
}

/// 失敗を HTTP ステータスとエラーレスポンスに変換する
///
/// 本文の `status_code` と HTTP ステータスは常に一致する。
pub fn translate(error: &ApiError) -> (StatusCode, ErrorResponse) {
   match error {
      ApiError::Structured(e) => translate_structured(e),
      ApiError::PermissionDenied => translate_structured(&StructuredError::unauthorized()),
      ApiError::Infra(_) | ApiError::Unexpected(_) => fallback(),
   }
}

fn translate_structured(error: &StructuredError) -> (StatusCode, ErrorResponse) {
   match StatusCode::from_u16(error.status_code()) {
      Ok(status) => (
         status,
         ErrorResponse::new(error.message(), error.error_code(), error.status_code()),
      ),
      Err(_) => fallback(),
   }
}

fn fallback() -> (StatusCode, ErrorResponse) {
   (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::fallback())
}

fn infra_kind_name(kind: &InfraErrorKind) -> &'static str {
   match kind {
      InfraErrorKind::Conflict { .. } => "conflict",
      InfraErrorKind::Unavailable(_) => "unavailable",
      InfraErrorKind::InvalidInput(_) => "invalid_input",
      InfraErrorKind::PasswordHash(_) => "password_hash",
      InfraErrorKind::Unexpected(_) => "unexpected",
   }
}

impl ApiError {
   /// 元の失敗をログに残す
   ///
   /// 5xx になるものは error、クライアント起因のものは debug で出力する。
   fn log(&self) {
      match self {
         ApiError::Structured(e) if e.kind().is_server_error() => {
            tracing::error!(
               error.category = "application",
               error.kind = e.kind().as_str(),
               error.code = e.error_code(),
               "{}",
               e.message()
            );
         }
         ApiError::Structured(e) => {
            tracing::debug!(
               error.kind = e.kind().as_str(),
               error.code = e.error_code(),
               "{}",
               e.message()
            );
         }
         ApiError::PermissionDenied => {
            tracing::debug!(error.kind = "permission_denied", "有効なセッションがありません");
         }
         ApiError::Infra(e) => {
            tracing::error!(
               error.category = "infrastructure",
               error.kind = infra_kind_name(e.kind()),
               span_trace = %e.span_trace(),
               "インフラ層で失敗: {e}"
            );
         }
         ApiError::Unexpected(e) => {
            tracing::error!(
               error.category = "unexpected",
               error.kind = "unknown",
               "予期しないエラー: {e:#}"
            );
         }
      }
   }
}

impl IntoResponse for ApiError {
   fn into_response(self) -> Response {
      self.log();
      let (status, body) = translate(&self);
      (status, Json(body)).into_response()
   }
}

/// ハンドラ内の panic をフォールバックのエラーレスポンスに変換する
///
/// `CatchPanicLayer::custom` に渡す。panic の内容はログにのみ残す。
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
   let detail = payload
      .downcast_ref::<String>()
      .map(String::as_str)
      .or_else(|| payload.downcast_ref::<&str>().copied())
      .unwrap_or("unknown panic payload");

   tracing::error!(
      error.category = "panic",
      error.kind = "unknown",
      "ハンドラで panic が発生: {detail}"
   );

   let (status, body) = fallback();
   (status, Json(body)).into_response()
}
