//! # PostRepository
//!
//! 掲示板投稿の永続化を担当するリポジトリ。
//! 一覧系の操作はすべて新しい順（作成日時の降順）で返す。

use async_trait::async_trait;
use chrono::Utc;
use farmmate_domain::{
   community::{Post, PostDraft, PostId, PostType},
   user::UserId,
};
use tokio::sync::RwLock;

use super::Table;
use crate::error::InfraError;

/// 投稿リポジトリトレイト
#[async_trait]
pub trait PostRepository: Send + Sync {
   /// 投稿を作成する
   async fn insert(
      &self,
      author_id: UserId,
      draft: PostDraft,
      image_key: Option<String>,
   ) -> Result<Post, InfraError>;

   /// ID で投稿を検索
   async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, InfraError>;

   /// 投稿一覧を取得する（`post_type` 指定時はその種別のみ）
   async fn list(&self, post_type: Option<&PostType>) -> Result<Vec<Post>, InfraError>;

   /// 指定ユーザーの投稿一覧を取得する
   async fn list_by_author(&self, author_id: UserId) -> Result<Vec<Post>, InfraError>;

   /// 複数の ID で投稿を一括取得する
   async fn find_by_ids(&self, ids: &[PostId]) -> Result<Vec<Post>, InfraError>;

   /// 投稿を更新する
   async fn update(&self, post: &Post) -> Result<(), InfraError>;

   /// 投稿を削除する
   async fn delete(&self, id: PostId) -> Result<(), InfraError>;
}

/// インメモリ実装の PostRepository
#[derive(Debug, Default)]
pub struct InMemoryPostRepository {
   table: RwLock<Table<Post>>,
}

impl InMemoryPostRepository {
   pub fn new() -> Self {
      Self::default()
   }

   async fn collect_newest_first(&self, f: impl Fn(&Post) -> bool) -> Vec<Post> {
      self.table
         .read()
         .await
         .values()
         .rev()
         .filter(|p| f(p))
         .cloned()
         .collect()
   }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
   async fn insert(
      &self,
      author_id: UserId,
      draft: PostDraft,
      image_key: Option<String>,
   ) -> Result<Post, InfraError> {
      let mut table = self.table.write().await;
      let id = table.next_id();
      let post = Post::new(PostId::from(id), author_id, draft, image_key, Utc::now());
      table.insert(id, post.clone());
      Ok(post)
   }

   async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, InfraError> {
      Ok(self.table.read().await.get(id.as_i64()).cloned())
   }

   async fn list(&self, post_type: Option<&PostType>) -> Result<Vec<Post>, InfraError> {
      Ok(self
         .collect_newest_first(|p| post_type.is_none_or(|t| p.post_type() == t))
         .await)
   }

   async fn list_by_author(&self, author_id: UserId) -> Result<Vec<Post>, InfraError> {
      Ok(self
         .collect_newest_first(|p| p.is_authored_by(author_id))
         .await)
   }

   async fn find_by_ids(&self, ids: &[PostId]) -> Result<Vec<Post>, InfraError> {
      Ok(self.collect_newest_first(|p| ids.contains(&p.id())).await)
   }

   async fn update(&self, post: &Post) -> Result<(), InfraError> {
      let mut table = self.table.write().await;
      if table.get(post.id().as_i64()).is_none() {
         return Err(InfraError::unexpected(format!(
            "更新対象の投稿が存在しません: {}",
            post.id()
         )));
      }
      table.insert(post.id().as_i64(), post.clone());
      Ok(())
   }

   async fn delete(&self, id: PostId) -> Result<(), InfraError> {
      self.table.write().await.remove(id.as_i64());
      Ok(())
   }
}
