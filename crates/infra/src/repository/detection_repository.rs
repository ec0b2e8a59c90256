//! # DetectionRepository
//!
//! 害虫診断履歴の永続化を担当するリポジトリ。
//! 履歴は診断したユーザー本人からのみ参照できる。

use async_trait::async_trait;
use farmmate_domain::{
   pest::{DetectionId, NewDetection, PestDetection},
   user::UserId,
};
use tokio::sync::RwLock;

use super::Table;
use crate::error::InfraError;

/// 診断履歴リポジトリトレイト
#[async_trait]
pub trait DetectionRepository: Send + Sync {
   /// 診断結果を記録する
   async fn insert(&self, input: NewDetection) -> Result<PestDetection, InfraError>;

   /// ユーザーの診断履歴を新しい順で取得する
   async fn list_by_user(&self, user_id: UserId) -> Result<Vec<PestDetection>, InfraError>;

   /// ユーザー本人の診断履歴を ID で検索する
   ///
   /// 他ユーザーの履歴は存在しないものとして `None` を返す。
   async fn find_for_user(
      &self,
      id: DetectionId,
      user_id: UserId,
   ) -> Result<Option<PestDetection>, InfraError>;

   /// 診断履歴を削除する
   async fn delete(&self, id: DetectionId) -> Result<(), InfraError>;
}

/// インメモリ実装の DetectionRepository
#[derive(Debug, Default)]
pub struct InMemoryDetectionRepository {
   table: RwLock<Table<PestDetection>>,
}

impl InMemoryDetectionRepository {
   pub fn new() -> Self {
      Self::default()
   }
}

#[async_trait]
impl DetectionRepository for InMemoryDetectionRepository {
   async fn insert(&self, input: NewDetection) -> Result<PestDetection, InfraError> {
      let mut table = self.table.write().await;
      let id = table.next_id();
      let detection = PestDetection::new(DetectionId::from(id), input);
      table.insert(id, detection.clone());
      Ok(detection)
   }

   async fn list_by_user(&self, user_id: UserId) -> Result<Vec<PestDetection>, InfraError> {
      let table = self.table.read().await;
      let mut detections: Vec<_> = table
         .values()
         .filter(|d| d.user_id() == user_id)
         .cloned()
         .collect();
      detections.sort_by(|a, b| {
         b.detection_date()
            .cmp(&a.detection_date())
            .then(b.id().cmp(&a.id()))
      });
      Ok(detections)
   }

   async fn find_for_user(
      &self,
      id: DetectionId,
      user_id: UserId,
   ) -> Result<Option<PestDetection>, InfraError> {
      Ok(self
         .table
         .read()
         .await
         .get(id.as_i64())
         .filter(|d| d.user_id() == user_id)
         .cloned())
   }

   async fn delete(&self, id: DetectionId) -> Result<(), InfraError> {
      self.table.write().await.remove(id.as_i64());
      Ok(())
   }
}
