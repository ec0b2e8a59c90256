//! # ChatLogRepository
//!
//! 農業相談チャットの記録を担当するリポジトリ。
//! 履歴は（ユーザー, セッション ID）の組で分離される。

use async_trait::async_trait;
use farmmate_domain::{
   chat::{ChatSessionId, ChatSessionSummary, ChatTurn, ChatTurnId, NewChatTurn},
   user::UserId,
};
use tokio::sync::RwLock;

use super::Table;
use crate::error::InfraError;

/// チャット記録リポジトリトレイト
#[async_trait]
pub trait ChatLogRepository: Send + Sync {
   /// 1 往復を記録する
   async fn insert(&self, input: NewChatTurn) -> Result<ChatTurn, InfraError>;

   /// セッションの記録を古い順で取得する
   async fn list_by_session(
      &self,
      user_id: UserId,
      session_id: &ChatSessionId,
   ) -> Result<Vec<ChatTurn>, InfraError>;

   /// ユーザーのセッション一覧を取得する
   ///
   /// セッション名は各セッション最初の記録のものを使う。
   async fn list_sessions(&self, user_id: UserId) -> Result<Vec<ChatSessionSummary>, InfraError>;

   /// セッションの記録をすべて削除し、削除件数を返す
   async fn delete_session(
      &self,
      user_id: UserId,
      session_id: &ChatSessionId,
   ) -> Result<usize, InfraError>;

   /// ユーザーの記録をセッションを問わずすべて削除し、削除件数を返す
   async fn delete_all_for_user(&self, user_id: UserId) -> Result<usize, InfraError>;
}

/// インメモリ実装の ChatLogRepository
#[derive(Debug, Default)]
pub struct InMemoryChatLogRepository {
   table: RwLock<Table<ChatTurn>>,
}

impl InMemoryChatLogRepository {
   pub fn new() -> Self {
      Self::default()
   }
}

fn in_session(turn: &ChatTurn, user_id: UserId, session_id: &ChatSessionId) -> bool {
   turn.user_id() == user_id && turn.session_id() == session_id
}

#[async_trait]
impl ChatLogRepository for InMemoryChatLogRepository {
   async fn insert(&self, input: NewChatTurn) -> Result<ChatTurn, InfraError> {
      let mut table = self.table.write().await;
      let id = table.next_id();
      let turn = ChatTurn::new(ChatTurnId::from(id), input);
      table.insert(id, turn.clone());
      Ok(turn)
   }

   async fn list_by_session(
      &self,
      user_id: UserId,
      session_id: &ChatSessionId,
   ) -> Result<Vec<ChatTurn>, InfraError> {
      Ok(self
         .table
         .read()
         .await
         .values()
         .filter(|t| in_session(t, user_id, session_id))
         .cloned()
         .collect())
   }

   async fn list_sessions(&self, user_id: UserId) -> Result<Vec<ChatSessionSummary>, InfraError> {
      let table = self.table.read().await;
      let mut sessions: Vec<ChatSessionSummary> = Vec::new();
      for turn in table.values().filter(|t| t.user_id() == user_id) {
         if sessions.iter().all(|s| &s.session_id != turn.session_id()) {
            sessions.push(ChatSessionSummary {
               session_id:   turn.session_id().clone(),
               session_name: turn.session_name().to_string(),
            });
         }
      }
      Ok(sessions)
   }

   async fn delete_session(
      &self,
      user_id: UserId,
      session_id: &ChatSessionId,
   ) -> Result<usize, InfraError> {
      let mut table = self.table.write().await;
      let mut deleted = 0;
      table.retain(|t| {
         let hit = in_session(t, user_id, session_id);
         deleted += usize::from(hit);
         !hit
      });
      Ok(deleted)
   }

   async fn delete_all_for_user(&self, user_id: UserId) -> Result<usize, InfraError> {
      let mut table = self.table.write().await;
      let mut deleted = 0;
      table.retain(|t| {
         let own = t.user_id() == user_id;
         deleted += usize::from(own);
         !own
      });
      Ok(deleted)
   }
}
