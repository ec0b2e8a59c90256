//! # 構造化エラー定義
//!
//! リクエスト処理中に前提条件が崩れたことを表すエラー型。
//! ハンドラ境界で HTTP レスポンス（`{status, message, code, status_code}`）に変換される。
//!
//! ## エラー種別と既定値
//!
//! | 種別 | HTTP ステータス | エラーコード |
//! |------|----------------|-------------|
//! | `Validation` | 400 | 1001 |
//! | `BadRequest` | 400 | 1002 |
//! | `MissingPart` | 400 | 1003 |
//! | `DuplicateResource` | 400 | 1004 |
//! | `Unauthorized` | 401 | 1201 |
//! | `AccessDenied` | 401 | 1202 |
//! | `Forbidden` | 403 | 1101 |
//! | `ResourceAccessForbidden` | 403 | 1102 |
//! | `NotFound` | 404 | 1301 |
//! | `InvalidRequest` | 405 | 1002 |
//! | `InternalServer` | 500 | 2000 |
//! | `Unknown` | 500 | 2000 |
//!
//! エラーコードはメッセージの文言変更に影響されない安定した識別子であり、
//! HTTP ステータスとは独立している（`BadRequest` と `InvalidRequest` は同じ 1002 を共有する）。
//!
//! ## 使用例
//!
//! ```rust
//! use farmmate_domain::{ErrorKind, StructuredError};
//!
//! let error = StructuredError::missing_part().with_message("No image uploaded.");
//! assert_eq!(error.kind(), ErrorKind::MissingPart);
//! assert_eq!(error.status_code(), 400);
//! assert_eq!(error.error_code(), 1003);
//! assert_eq!(error.message(), "No image uploaded.");
//! ```

use strum::{EnumIter, IntoStaticStr};
use thiserror::Error;

/// エラー種別
///
/// 種別ごとに既定のメッセージ・HTTP ステータス・エラーコードを持つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
   /// 入力値の検証失敗
   Validation,
   /// リクエストの送信形式が不正
   BadRequest,
   /// 必須要素（アップロードファイル等）の欠落
   MissingPart,
   /// 重複リソースの作成
   DuplicateResource,
   /// 認証失敗
   Unauthorized,
   /// アクセス拒否
   AccessDenied,
   /// ロールベースのアクセス制御違反
   Forbidden,
   /// 他ユーザーのリソースへのアクセス
   ResourceAccessForbidden,
   /// 存在しないリソースへのアクセス
   NotFound,
   /// 許可されていない HTTP メソッド
   InvalidRequest,
   /// サーバー内部エラー
   InternalServer,
   /// 分類できない失敗
   Unknown,
}

impl ErrorKind {
   /// 既定の HTTP ステータス
   pub const fn status_code(self) -> u16 {
      match self {
         Self::Validation | Self::BadRequest | Self::MissingPart | Self::DuplicateResource => {
            400
         }
         Self::Unauthorized | Self::AccessDenied => 401,
         Self::Forbidden | Self::ResourceAccessForbidden => 403,
         Self::NotFound => 404,
         Self::InvalidRequest => 405,
         Self::InternalServer | Self::Unknown => 500,
      }
   }

   /// 既定のエラーコード
   pub const fn error_code(self) -> u32 {
      match self {
         Self::Validation => 1001,
         Self::BadRequest | Self::InvalidRequest => 1002,
         Self::MissingPart => 1003,
         Self::DuplicateResource => 1004,
         Self::Forbidden => 1101,
         Self::ResourceAccessForbidden => 1102,
         Self::Unauthorized => 1201,
         Self::AccessDenied => 1202,
         Self::NotFound => 1301,
         Self::InternalServer | Self::Unknown => 2000,
      }
   }

   /// 既定のメッセージ
   pub const fn default_message(self) -> &'static str {
      match self {
         Self::Validation => "Validation failed for request",
         Self::BadRequest => "Wrong request transmission",
         Self::MissingPart => "Missing essential parts",
         Self::DuplicateResource => "Delivery of duplicate resources",
         Self::Unauthorized => "Authentication failed",
         Self::AccessDenied => "Access denied",
         Self::Forbidden => "Role-based access control error",
         Self::ResourceAccessForbidden => "Resource access permission error",
         Self::NotFound => "Attempting to access a non-existent resource",
         Self::InvalidRequest => "Invalid request method",
         Self::InternalServer => "Server internal error",
         Self::Unknown => "Unexpected error occurred",
      }
   }

   /// サーバー側の原因（5xx）かどうか
   pub const fn is_server_error(self) -> bool {
      self.status_code() >= 500
   }

   /// ログ出力用の名前（snake_case）
   pub fn as_str(self) -> &'static str {
      self.into()
   }
}

/// 構造化エラー
///
/// [`ErrorKind`] のインスタンス。メッセージとエラーコードは生成時に上書きできるが、
/// HTTP ステータスは種別で固定され上書きできない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StructuredError {
   kind:       ErrorKind,
   message:    String,
   error_code: u32,
}

impl StructuredError {
   /// 既定のメッセージ・エラーコードで生成する
   pub fn new(kind: ErrorKind) -> Self {
      Self {
         kind,
         message: kind.default_message().to_string(),
         error_code: kind.error_code(),
      }
   }

   /// メッセージを上書きする
   #[must_use]
   pub fn with_message(self, message: impl Into<String>) -> Self {
      Self {
         message: message.into(),
         ..self
      }
   }

   /// エラーコードを上書きする
   #[must_use]
   pub fn with_error_code(self, error_code: u32) -> Self {
      Self { error_code, ..self }
   }

   pub fn kind(&self) -> ErrorKind {
      self.kind
   }

   pub fn message(&self) -> &str {
      &self.message
   }

   pub fn error_code(&self) -> u32 {
      self.error_code
   }

   /// HTTP ステータス（種別で固定）
   pub fn status_code(&self) -> u16 {
      self.kind.status_code()
   }

   // ===== 種別ごとのコンストラクタ =====

   pub fn validation() -> Self {
      Self::new(ErrorKind::Validation)
   }

   pub fn bad_request() -> Self {
      Self::new(ErrorKind::BadRequest)
   }

   pub fn missing_part() -> Self {
      Self::new(ErrorKind::MissingPart)
   }

   pub fn duplicate_resource() -> Self {
      Self::new(ErrorKind::DuplicateResource)
   }

   pub fn unauthorized() -> Self {
      Self::new(ErrorKind::Unauthorized)
   }

   pub fn access_denied() -> Self {
      Self::new(ErrorKind::AccessDenied)
   }

   pub fn forbidden() -> Self {
      Self::new(ErrorKind::Forbidden)
   }

   pub fn resource_access_forbidden() -> Self {
      Self::new(ErrorKind::ResourceAccessForbidden)
   }

   pub fn not_found() -> Self {
      Self::new(ErrorKind::NotFound)
   }

   pub fn invalid_request() -> Self {
      Self::new(ErrorKind::InvalidRequest)
   }

   pub fn internal_server() -> Self {
      Self::new(ErrorKind::InternalServer)
   }

   pub fn unknown() -> Self {
      Self::new(ErrorKind::Unknown)
   }
}

impl From<ErrorKind> for StructuredError {
   fn from(kind: ErrorKind) -> Self {
      Self::new(kind)
   }
}
