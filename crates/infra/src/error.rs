//! # インフラ層エラー定義
//!
//! 永続化・セッション・外部サービス呼び出しで発生するエラーを表現する。
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別
//!
//! convenience constructor で生成した時点のスパン情報が自動的に記録される。
//! API 層ではクライアントに詳細を返さず、フォールバックのエラー本文に変換する。

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// エラー種別に応じた処理には [`kind()`](InfraError::kind) を使用する:
///
/// ```ignore
/// match error.kind() {
///     InfraErrorKind::Conflict { entity, key } => { /* 一意制約違反 */ }
///     _ => { /* その他 */ }
/// }
/// ```
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
   kind:       InfraErrorKind,
   span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
   /// 一意制約違反
   #[error("競合が発生しました: {entity}({key})")]
   Conflict {
      /// エンティティ名（例: "User"）
      entity: String,
      /// 重複したキー
      key:    String,
   },

   /// 外部サービスが利用できない
   ///
   /// 接続失敗のほか、依存先が設定されていない場合にも使う。
   #[error("外部サービスを利用できません: {0}")]
   Unavailable(String),

   /// 外部サービスに渡した入力が受け付けられなかった
   #[error("入力エラー: {0}")]
   InvalidInput(String),

   /// パスワードハッシュの生成・解析に失敗
   #[error("パスワードハッシュエラー: {0}")]
   PasswordHash(String),

   /// 予期しないエラー
   #[error("予期しないエラー: {0}")]
   Unexpected(String),
}

impl InfraError {
   /// エラー種別を取得する
   pub fn kind(&self) -> &InfraErrorKind {
      &self.kind
   }

   /// SpanTrace を取得する
   pub fn span_trace(&self) -> &SpanTrace {
      &self.span_trace
   }

   /// Conflict バリアントの場合、entity と key を返す
   pub fn as_conflict(&self) -> Option<(&str, &str)> {
      match &self.kind {
         InfraErrorKind::Conflict { entity, key } => Some((entity, key)),
         _ => None,
      }
   }

   fn with_kind(kind: InfraErrorKind) -> Self {
      Self {
         kind,
         span_trace: SpanTrace::capture(),
      }
   }

   // ===== Convenience constructors =====

   /// 一意制約違反エラーを生成する
   pub fn conflict(entity: impl Into<String>, key: impl Into<String>) -> Self {
      Self::with_kind(InfraErrorKind::Conflict {
         entity: entity.into(),
         key:    key.into(),
      })
   }

   /// 外部サービス利用不可エラーを生成する
   pub fn unavailable(msg: impl Into<String>) -> Self {
      Self::with_kind(InfraErrorKind::Unavailable(msg.into()))
   }

   /// 入力エラーを生成する
   pub fn invalid_input(msg: impl Into<String>) -> Self {
      Self::with_kind(InfraErrorKind::InvalidInput(msg.into()))
   }

   /// パスワードハッシュエラーを生成する
   pub fn password_hash(msg: impl Into<String>) -> Self {
      Self::with_kind(InfraErrorKind::PasswordHash(msg.into()))
   }

   /// 予期しないエラーを生成する
   pub fn unexpected(msg: impl Into<String>) -> Self {
      Self::with_kind(InfraErrorKind::Unexpected(msg.into()))
   }
}

impl fmt::Debug for InfraError {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("InfraError")
         .field("kind", &self.kind)
         .field("span_trace", &self.span_trace)
         .finish()
   }
}

impl std::error::Error for InfraError {
   fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
      self.kind.source()
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;
   use tracing_subscriber::layer::SubscriberExt as _;

   use super::*;

   /// テスト用に ErrorLayer 付き subscriber を設定する
   fn with_error_layer(f: impl FnOnce()) {
      let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
      let _guard = tracing::subscriber::set_default(subscriber);
      f();
   }

   #[test]
   fn test_conflictでspan_traceがキャプチャされる() {
      with_error_layer(|| {
         let span = tracing::info_span!("test_insert_user");
         let _enter = span.enter();

         let err = InfraError::conflict("User", "username=farmer");

         assert_eq!(err.as_conflict(), Some(("User", "username=farmer")));
         let trace_str = format!("{}", err.span_trace());
         assert!(
            trace_str.contains("test_insert_user"),
            "SpanTrace がスパン名を含むこと: {trace_str}",
         );
      });
   }

   #[test]
   fn test_unavailableでspan_traceがキャプチャされる() {
      with_error_layer(|| {
         let span = tracing::info_span!("test_classify");
         let _enter = span.enter();

         let err = InfraError::unavailable("pest classifier");

         assert!(matches!(err.kind(), InfraErrorKind::Unavailable(msg) if msg == "pest classifier"));
         assert!(format!("{}", err.span_trace()).contains("test_classify"));
      });
   }

   #[test]
   fn test_conflict以外はas_conflictがnone() {
      assert!(InfraError::unexpected("x").as_conflict().is_none());
      assert!(InfraError::invalid_input("x").as_conflict().is_none());
      assert!(InfraError::password_hash("x").as_conflict().is_none());
   }

   #[test]
   fn test_displayがinfra_error_kindのメッセージを出力する() {
      let err = InfraError::conflict("User", "email=a@example.com");
      assert_eq!(format!("{err}"), "競合が発生しました: User(email=a@example.com)");
   }
}
