//! # 農業相談チャットハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /selfchatbot/chatbot/` - 質問する
//! - `POST /selfchatbot/clear_logs/` - 全記録の消去
//! - `GET /selfchatbot/chat_sessions/` - セッション一覧
//! - `GET /selfchatbot/chat_history/{session_id}/` - セッションのやり取り
//! - `DELETE /selfchatbot/delete_session/{session_id}/` - セッション削除
//!
//! いずれも要ログイン。

use std::sync::Arc;

use axum::{
   Json,
   extract::{FromRef, State},
   response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use super::{StatusMessage, iso8601};
use crate::{
   error::ApiError,
   extract::{AppJson, AppPath, AppQuery},
   session::{Authenticated, SessionGate},
   usecase::{AskInput, ChatbotUseCaseImpl},
};

/// チャット API の共有状態
pub struct ChatbotState {
   pub usecase: ChatbotUseCaseImpl,
   pub gate:    SessionGate,
}

impl FromRef<Arc<ChatbotState>> for SessionGate {
   fn from_ref(state: &Arc<ChatbotState>) -> Self {
      state.gate.clone()
   }
}

/// 質問リクエスト
#[derive(Debug, Deserialize)]
pub struct AskRequest {
   pub question:     Option<String>,
   pub session_id:   Option<String>,
   pub session_name: Option<String>,
}

/// 質問レスポンス
#[derive(Debug, Serialize)]
pub struct AskResponse {
   pub question:  String,
   pub answer:    String,
   pub timestamp: String,
}

/// セッション一覧の 1 行
#[derive(Debug, Serialize)]
pub struct ChatSessionDto {
   pub session_id:   String,
   pub session_name: String,
}

/// 履歴取得クエリ
#[derive(Debug, Deserialize)]
pub struct ChatHistoryQuery {
   pub session_name: Option<String>,
}

/// 履歴の 1 往復
///
/// `session_name` はクエリで渡された値をそのまま返す。
#[derive(Debug, Serialize)]
pub struct ChatHistoryDto {
   pub question:     String,
   pub answer:       String,
   pub timestamp:    String,
   pub session_name: String,
}

/// POST /selfchatbot/chatbot/
///
/// 同じセッションの過去のやり取りを文脈として回答を生成し、記録する。
#[tracing::instrument(skip_all)]
pub async fn ask(
   State(state): State<Arc<ChatbotState>>,
   Authenticated(session): Authenticated,
   AppJson(req): AppJson<AskRequest>,
) -> Result<impl IntoResponse, ApiError> {
   let turn = state
      .usecase
      .ask(
         session.user_id(),
         AskInput {
            question:     req.question,
            session_id:   req.session_id,
            session_name: req.session_name,
         },
      )
      .await?;

   Ok(Json(AskResponse {
      question:  turn.question().to_string(),
      answer:    turn.answer().to_string(),
      timestamp: turn.created_at().format("%Y-%m-%d %H:%M:%S").to_string(),
   }))
}

/// GET /selfchatbot/chat_sessions/
#[tracing::instrument(skip_all)]
pub async fn chat_sessions(
   State(state): State<Arc<ChatbotState>>,
   Authenticated(session): Authenticated,
) -> Result<impl IntoResponse, ApiError> {
   let sessions: Vec<ChatSessionDto> = state
      .usecase
      .sessions(session.user_id())
      .await?
      .into_iter()
      .map(|summary| ChatSessionDto {
         session_id:   summary.session_id.into_string(),
         session_name: summary.session_name,
      })
      .collect();
   Ok(Json(sessions))
}

/// GET /selfchatbot/chat_history/{session_id}/?session_name=
#[tracing::instrument(skip_all, fields(%session_id))]
pub async fn chat_history(
   State(state): State<Arc<ChatbotState>>,
   Authenticated(session): Authenticated,
   AppPath(session_id): AppPath<String>,
   AppQuery(query): AppQuery<ChatHistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
   let session_name = query.session_name.unwrap_or_default();
   let turns: Vec<ChatHistoryDto> = state
      .usecase
      .history(session.user_id(), session_id)
      .await?
      .into_iter()
      .map(|turn| ChatHistoryDto {
         question:     turn.question().to_string(),
         answer:       turn.answer().to_string(),
         timestamp:    iso8601(turn.created_at()),
         session_name: session_name.clone(),
      })
      .collect();
   Ok(Json(turns))
}

/// DELETE /selfchatbot/delete_session/{session_id}/
///
/// 記録がなくても成功を返す。
#[tracing::instrument(skip_all, fields(%session_id))]
pub async fn delete_chat_session(
   State(state): State<Arc<ChatbotState>>,
   Authenticated(session): Authenticated,
   AppPath(session_id): AppPath<String>,
) -> Result<impl IntoResponse, ApiError> {
   state
      .usecase
      .delete_session(session.user_id(), session_id)
      .await?;

   Ok(Json(StatusMessage::success(
      "Chat session deleted successfully",
   )))
}

/// POST /selfchatbot/clear_logs/
#[tracing::instrument(skip_all)]
pub async fn clear_chat_logs(
   State(state): State<Arc<ChatbotState>>,
   Authenticated(session): Authenticated,
) -> Result<impl IntoResponse, ApiError> {
   state.usecase.clear_logs(session.user_id()).await?;

   Ok(Json(StatusMessage::success("Chat logs cleared successfully")))
}
