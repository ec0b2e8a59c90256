//! # セッション管理
//!
//! ログイン中のユーザーを Cookie のセッション ID から引くための
//! セッションストアを提供する。
//!
//! セッション ID は UUID v4。有効期限を過ぎたセッションは取得時に破棄し、
//! 作成時にも期限切れのものをまとめて掃除する。

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use farmmate_domain::user::UserId;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::InfraError;

/// セッションの既定の有効期限（秒）
/// 2 週間 = 1209600 秒
pub const SESSION_TTL_SECONDS: i64 = 1_209_600;

/// セッションデータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
   user_id:    UserId,
   created_at: DateTime<Utc>,
}

impl SessionData {
   /// 新しいセッションデータを作成する（作成日時は現在時刻）
   pub fn new(user_id: UserId) -> Self {
      Self {
         user_id,
         created_at: Utc::now(),
      }
   }

   pub fn user_id(&self) -> UserId {
      self.user_id
   }

   pub fn created_at(&self) -> DateTime<Utc> {
      self.created_at
   }
}

/// セッション管理トレイト
#[async_trait]
pub trait SessionManager: Send + Sync {
   /// セッションを作成し、セッション ID を返す
   async fn create(&self, data: &SessionData) -> Result<String, InfraError>;

   /// セッションを取得する
   ///
   /// 存在しない・期限切れの場合は `None`
   async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError>;

   /// セッションを削除する
   ///
   /// 存在しないセッションを削除しても成功とする。
   async fn delete(&self, session_id: &str) -> Result<(), InfraError>;

   /// ユーザーの全セッションを削除する（退会時）
   async fn delete_all_for_user(&self, user_id: UserId) -> Result<(), InfraError>;
}

/// インメモリのセッションマネージャ
#[derive(Debug)]
pub struct InMemorySessionManager {
   ttl:      Duration,
   sessions: RwLock<HashMap<String, SessionData>>,
}

impl InMemorySessionManager {
   pub fn new(ttl: Duration) -> Self {
      Self {
         ttl,
         sessions: RwLock::new(HashMap::new()),
      }
   }

   fn is_expired(&self, data: &SessionData) -> bool {
      data.created_at + self.ttl <= Utc::now()
   }
}

impl Default for InMemorySessionManager {
   fn default() -> Self {
      Self::new(Duration::seconds(SESSION_TTL_SECONDS))
   }
}

#[async_trait]
impl SessionManager for InMemorySessionManager {
   async fn create(&self, data: &SessionData) -> Result<String, InfraError> {
      let session_id = Uuid::new_v4().to_string();
      let mut sessions = self.sessions.write().await;

      // 一度も参照されないまま期限切れになったセッションが残り続けないようにする
      let before = sessions.len();
      sessions.retain(|_, existing| !self.is_expired(existing));
      let pruned = before - sessions.len();
      if pruned > 0 {
         tracing::debug!(pruned, "期限切れのセッションを掃除");
      }

      sessions.insert(session_id.clone(), data.clone());
      Ok(session_id)
   }

   async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError> {
      let found = self.sessions.read().await.get(session_id).cloned();

      match found {
         Some(data) if self.is_expired(&data) => {
            tracing::debug!(user_id = %data.user_id(), "期限切れのセッションを破棄");
            self.sessions.write().await.remove(session_id);
            Ok(None)
         }
         other => Ok(other),
      }
   }

   async fn delete(&self, session_id: &str) -> Result<(), InfraError> {
      self.sessions.write().await.remove(session_id);
      Ok(())
   }

   async fn delete_all_for_user(&self, user_id: UserId) -> Result<(), InfraError> {
      self.sessions
         .write()
         .await
         .retain(|_, data| data.user_id() != user_id);
      Ok(())
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;

   #[tokio::test]
   async fn test_作成したセッションを取得できる() {
      let manager = InMemorySessionManager::default();
      let data = SessionData::new(UserId::from(1));

      let session_id = manager.create(&data).await.unwrap();

      assert_eq!(manager.get(&session_id).await.unwrap(), Some(data));
      assert!(Uuid::parse_str(&session_id).is_ok());
   }

   #[tokio::test]
   async fn test_削除したセッションは取得できない() {
      let manager = InMemorySessionManager::default();
      let session_id = manager
         .create(&SessionData::new(UserId::from(1)))
         .await
         .unwrap();

      manager.delete(&session_id).await.unwrap();
      manager.delete(&session_id).await.unwrap();

      assert!(manager.get(&session_id).await.unwrap().is_none());
   }

   #[tokio::test]
   async fn test_期限切れのセッションは取得できない() {
      let manager = InMemorySessionManager::new(Duration::zero());
      let session_id = manager
         .create(&SessionData::new(UserId::from(1)))
         .await
         .unwrap();

      assert!(manager.get(&session_id).await.unwrap().is_none());
   }

   #[tokio::test]
   async fn test_ユーザーの全セッションを削除できる() {
      let manager = InMemorySessionManager::default();
      let a1 = manager
         .create(&SessionData::new(UserId::from(1)))
         .await
         .unwrap();
      let a2 = manager
         .create(&SessionData::new(UserId::from(1)))
         .await
         .unwrap();
      let b = manager
         .create(&SessionData::new(UserId::from(2)))
         .await
         .unwrap();

      manager.delete_all_for_user(UserId::from(1)).await.unwrap();

      assert!(manager.get(&a1).await.unwrap().is_none());
      assert!(manager.get(&a2).await.unwrap().is_none());
      assert!(manager.get(&b).await.unwrap().is_some());
   }

   #[tokio::test]
   async fn test_作成時に期限切れのセッションを掃除する() {
      let manager = InMemorySessionManager::new(Duration::zero());

      for user in 0..100 {
         manager
            .create(&SessionData::new(UserId::from(user)))
            .await
            .unwrap();
      }

      assert_eq!(manager.sessions.read().await.len(), 1);
   }

   #[tokio::test]
   async fn test_有効なセッションは掃除されない() {
      let manager = InMemorySessionManager::default();

      for user in 0..10 {
         manager
            .create(&SessionData::new(UserId::from(user)))
            .await
            .unwrap();
      }

      assert_eq!(manager.sessions.read().await.len(), 10);
   }
}
