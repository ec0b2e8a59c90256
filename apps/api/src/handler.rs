//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、判断はユースケースに委譲
//! - 失敗はすべて [`ApiError`](crate::error::ApiError) で返す

pub mod auth;
pub mod chatbot;
pub mod community;
pub mod detect;
pub mod health;
pub mod soil;

pub use auth::{
   AuthState,
   auth_check,
   change_password,
   change_username,
   check_username,
   delete_account,
   login,
   logout,
   signup,
};
use chrono::{DateTime, SecondsFormat, Utc};
pub use chatbot::{
   ChatbotState,
   ask,
   chat_history,
   chat_sessions,
   clear_chat_logs,
   delete_chat_session,
};
pub use community::{
   CommunityState,
   create_comment,
   create_post,
   delete_comment,
   delete_post,
   edit_comment,
   edit_post,
   get_post,
   list_comments,
   list_posts,
   my_commented_posts,
   my_posts,
};
pub use detect::{
   DetectState,
   delete_detection_session,
   detection_session_details,
   list_detection_sessions,
   upload_image_for_detection,
};
pub use health::health_check;
use serde::Serialize;
pub use soil::{SoilState, crop_names, soil_exam, soil_fertilizer_info};

/// `{"status": "success", "message": ...}` 形式の応答
#[derive(Debug, Serialize)]
pub struct StatusMessage {
   pub status:  &'static str,
   pub message: &'static str,
}

impl StatusMessage {
   pub fn success(message: &'static str) -> Self {
      Self {
         status: "success",
         message,
      }
   }
}

/// 日時を ISO 8601（ミリ秒精度、UTC は `Z`）で表す
pub(crate) fn iso8601(value: DateTime<Utc>) -> String {
   value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
   use chrono::TimeZone;
   use pretty_assertions::assert_eq;

   use super::*;

   #[test]
   fn test_iso8601はミリ秒とzで表す() {
      let value = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();

      assert_eq!(iso8601(value), "2024-05-01T09:30:00.000Z");
   }
}
