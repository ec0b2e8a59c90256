//! # CommentRepository
//!
//! 投稿へのコメントの永続化を担当するリポジトリ。
//!
//! コメントを削除すると、その返信（子孫のコメント）も併せて削除される。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use farmmate_domain::{
   community::{Comment, CommentDraft, CommentId, PostId},
   user::UserId,
};
use tokio::sync::RwLock;

use super::Table;
use crate::error::InfraError;

/// コメントリポジトリトレイト
#[async_trait]
pub trait CommentRepository: Send + Sync {
   /// コメントを作成する
   async fn insert(&self, draft: CommentDraft) -> Result<Comment, InfraError>;

   /// ID でコメントを検索
   async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, InfraError>;

   /// 投稿のコメント一覧を古い順で取得する
   async fn list_by_post(&self, post_id: PostId) -> Result<Vec<Comment>, InfraError>;

   /// 投稿ごとのコメント数を取得する
   ///
   /// コメントがない投稿はマップに含まれない。
   async fn count_by_posts(&self, post_ids: &[PostId])
   -> Result<HashMap<PostId, usize>, InfraError>;

   /// 指定ユーザーがコメントした投稿の ID 一覧（重複なし）
   async fn post_ids_commented_by(&self, author_id: UserId) -> Result<Vec<PostId>, InfraError>;

   /// コメントを更新する
   async fn update(&self, comment: &Comment) -> Result<(), InfraError>;

   /// コメントとその返信を削除する
   async fn delete(&self, id: CommentId) -> Result<(), InfraError>;

   /// 投稿に付いたコメントをすべて削除する
   async fn delete_by_post(&self, post_id: PostId) -> Result<(), InfraError>;
}

/// インメモリ実装の CommentRepository
#[derive(Debug, Default)]
pub struct InMemoryCommentRepository {
   table: RwLock<Table<Comment>>,
}

impl InMemoryCommentRepository {
   pub fn new() -> Self {
      Self::default()
   }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
   async fn insert(&self, draft: CommentDraft) -> Result<Comment, InfraError> {
      let mut table = self.table.write().await;
      let id = table.next_id();
      let comment = Comment::new(CommentId::from(id), draft, Utc::now());
      table.insert(id, comment.clone());
      Ok(comment)
   }

   async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, InfraError> {
      Ok(self.table.read().await.get(id.as_i64()).cloned())
   }

   async fn list_by_post(&self, post_id: PostId) -> Result<Vec<Comment>, InfraError> {
      Ok(self
         .table
         .read()
         .await
         .values()
         .filter(|c| c.post_id() == post_id)
         .cloned()
         .collect())
   }

   async fn count_by_posts(
      &self,
      post_ids: &[PostId],
   ) -> Result<HashMap<PostId, usize>, InfraError> {
      let table = self.table.read().await;
      let mut counts = HashMap::new();
      for comment in table.values().filter(|c| post_ids.contains(&c.post_id())) {
         *counts.entry(comment.post_id()).or_insert(0) += 1;
      }
      Ok(counts)
   }

   async fn post_ids_commented_by(&self, author_id: UserId) -> Result<Vec<PostId>, InfraError> {
      let table = self.table.read().await;
      let mut seen = HashSet::new();
      Ok(table
         .values()
         .filter(|c| c.author_id() == author_id)
         .map(Comment::post_id)
         .filter(|id| seen.insert(*id))
         .collect())
   }

   async fn update(&self, comment: &Comment) -> Result<(), InfraError> {
      let mut table = self.table.write().await;
      if table.get(comment.id().as_i64()).is_none() {
         return Err(InfraError::unexpected(format!(
            "更新対象のコメントが存在しません: {}",
            comment.id()
         )));
      }
      table.insert(comment.id().as_i64(), comment.clone());
      Ok(())
   }

   async fn delete(&self, id: CommentId) -> Result<(), InfraError> {
      let mut table = self.table.write().await;

      // 返信は親より後に作成されるため、ID 順に 1 パスで子孫を集められる
      let mut doomed = HashSet::from([id]);
      for comment in table.values() {
         if comment.parent_id().is_some_and(|p| doomed.contains(&p)) {
            doomed.insert(comment.id());
         }
      }

      table.retain(|c| !doomed.contains(&c.id()));
      Ok(())
   }

   async fn delete_by_post(&self, post_id: PostId) -> Result<(), InfraError> {
      self.table.write().await.retain(|c| c.post_id() != post_id);
      Ok(())
   }
}
