//! # ユースケース層
//!
//! 各機能のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリ・外部サービスを `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは抽出と応答の組み立てのみ、判断はユースケースに集約
//! - **エラー**: 失敗はすべて [`ApiError`] で返し、ハンドラはそのまま `?` で伝播する
//!
//! ## モジュール構成
//!
//! - `auth`: 会員登録・ログイン・アカウント管理
//! - `community`: 掲示板の投稿・コメント
//! - `detect`: 害虫画像診断
//! - `chatbot`: 農業相談チャット
//! - `soil`: 土壌検査・施肥処方

pub mod auth;
pub mod chatbot;
pub mod community;
pub mod detect;
pub mod soil;

use std::collections::HashMap;

pub use auth::{AuthUseCaseImpl, ChangePasswordInput, SignupInput};
pub use chatbot::{AskInput, ChatbotUseCaseImpl};
pub use community::{
   CommentInput,
   CommentView,
   CommunityUseCaseImpl,
   PostDetail,
   PostInput,
   PostListItem,
};
pub use detect::{DetectUseCaseImpl, DetectionRecord};
use farmmate_domain::{StructuredError, user::UserId};
use farmmate_infra::repository::UserRepository;
pub use soil::{SoilExamResult, SoilUseCaseImpl};

use crate::error::ApiError;

/// フォーム入力の検証に失敗したときのメッセージ
pub const FORM_VALIDATION_FAILED: &str = "Form validation failed";

/// 投稿者が削除済みの場合に表示する名前
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Validation 種別のエラーを組み立てる
pub(crate) fn validation_error(message: &str) -> ApiError {
   StructuredError::validation().with_message(message).into()
}

/// ドメインの検証エラーを "Form validation failed" に畳み込む
///
/// 個々の項目の詳細はレスポンスに含めず、debug ログにのみ残す。
pub(crate) fn form_invalid(err: StructuredError) -> ApiError {
   tracing::debug!(detail = err.message(), "フォームの検証に失敗");
   validation_error(FORM_VALIDATION_FAILED)
}

/// 空文字列を未入力として扱う
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
   value.filter(|v| !v.trim().is_empty())
}

/// ユーザー ID のリストからユーザー名を一括解決する
///
/// 返り値は `UserId → ユーザー名` の HashMap。
/// 削除済みのユーザーは含まれないため、呼び出し側で [`UNKNOWN_AUTHOR`] を補う。
pub(crate) async fn resolve_user_names(
   user_repo: &dyn UserRepository,
   user_ids: &[UserId],
) -> Result<HashMap<UserId, String>, ApiError> {
   if user_ids.is_empty() {
      return Ok(HashMap::new());
   }

   let users = user_repo.find_by_ids(user_ids).await?;

   Ok(users
      .into_iter()
      .map(|user| (user.id(), user.username().as_str().to_string()))
      .collect())
}

/// 解決済みの名前表から表示名を引く
pub(crate) fn display_name(names: &HashMap<UserId, String>, user_id: UserId) -> String {
   names
      .get(&user_id)
      .cloned()
      .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}
