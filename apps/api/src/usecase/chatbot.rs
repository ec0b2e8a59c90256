//! 農業相談チャットユースケース
//!
//! 履歴はユーザーとセッション ID の組ごとに分かれ、
//! 回答生成にはそのセッションのこれまでのやり取りだけを渡す。

use std::sync::Arc;

use farmmate_domain::{
   chat::{ChatExchange, ChatSessionId, ChatSessionSummary, ChatTurn, NewChatTurn},
   clock::Clock,
   user::UserId,
};
use farmmate_infra::{ChatService, repository::ChatLogRepository};

use super::{non_empty, validation_error};
use crate::error::ApiError;

/// 質問の入力
#[derive(Debug, Default)]
pub struct AskInput {
   pub question:     Option<String>,
   pub session_id:   Option<String>,
   pub session_name: Option<String>,
}

/// 農業相談チャットユースケース
pub struct ChatbotUseCaseImpl {
   chat_service:        Arc<dyn ChatService>,
   chat_log_repository: Arc<dyn ChatLogRepository>,
   clock:               Arc<dyn Clock>,
}

impl ChatbotUseCaseImpl {
   pub fn new(
      chat_service: Arc<dyn ChatService>,
      chat_log_repository: Arc<dyn ChatLogRepository>,
      clock: Arc<dyn Clock>,
   ) -> Self {
      Self {
         chat_service,
         chat_log_repository,
         clock,
      }
   }

   /// 質問に回答し、やり取りを記録する
   pub async fn ask(&self, user_id: UserId, input: AskInput) -> Result<ChatTurn, ApiError> {
      let (Some(question), Some(session_id)) =
         (non_empty(input.question), non_empty(input.session_id))
      else {
         return Err(validation_error(
            "Both question and session ID must be provided.",
         ));
      };
      let session_id = ChatSessionId::new(session_id)?;

      let history: Vec<ChatExchange> = self
         .chat_log_repository
         .list_by_session(user_id, &session_id)
         .await?
         .iter()
         .map(ChatTurn::to_exchange)
         .collect();

      let answer = self.chat_service.answer(&question, &history).await?;

      let turn = self
         .chat_log_repository
         .insert(NewChatTurn {
            user_id,
            session_id,
            session_name: input.session_name.unwrap_or_default(),
            question,
            answer,
            created_at: self.clock.now(),
         })
         .await?;

      tracing::debug!(turn_id = %turn.id(), history = history.len(), "チャットを記録しました");
      Ok(turn)
   }

   /// セッション一覧
   pub async fn sessions(&self, user_id: UserId) -> Result<Vec<ChatSessionSummary>, ApiError> {
      Ok(self.chat_log_repository.list_sessions(user_id).await?)
   }

   /// セッションのやり取りを古い順で取得する
   ///
   /// セッション ID として成立しない値は記録がないものとして扱う。
   pub async fn history(&self, user_id: UserId, session_id: String) -> Result<Vec<ChatTurn>, ApiError> {
      let Ok(session_id) = ChatSessionId::new(session_id) else {
         return Ok(Vec::new());
      };
      Ok(self
         .chat_log_repository
         .list_by_session(user_id, &session_id)
         .await?)
   }

   /// 自分のセッションの記録を削除し、削除件数を返す
   pub async fn delete_session(&self, user_id: UserId, session_id: String) -> Result<usize, ApiError> {
      let Ok(session_id) = ChatSessionId::new(session_id) else {
         return Ok(0);
      };
      let deleted = self
         .chat_log_repository
         .delete_session(user_id, &session_id)
         .await?;
      tracing::info!(%user_id, deleted, "チャットセッションを削除しました");
      Ok(deleted)
   }

   /// 自分のチャット記録をセッションを問わずすべて消去する
   pub async fn clear_logs(&self, user_id: UserId) -> Result<usize, ApiError> {
      let deleted = self.chat_log_repository.delete_all_for_user(user_id).await?;
      tracing::info!(%user_id, deleted, "チャット記録を消去しました");
      Ok(deleted)
   }
}
