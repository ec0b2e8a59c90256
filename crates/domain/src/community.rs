//! # コミュニティ掲示板
//!
//! 投稿（[`Post`]）と、返信を持てるコメント（[`Comment`]）を表現する。

use chrono::{DateTime, Utc};

use crate::user::UserId;

define_serial_id! {
   /// 投稿 ID
   pub struct PostId;
}

define_serial_id! {
   /// コメント ID
   pub struct CommentId;
}

define_validated_string! {
   /// 投稿タイトル（最大 100 文字）
   pub struct PostTitle {
      label: "title",
      max_length: 100,
   }
}

define_validated_string! {
   /// 投稿種別（例: `"free"`, `"exchange"`, `"buy"`。最大 10 文字）
   pub struct PostType {
      label: "post_type",
      max_length: 10,
   }
}

define_validated_string! {
   /// 投稿・コメント本文
   pub struct Content {
      label: "content",
      max_length: 10_000,
   }
}

/// 投稿の作成・編集内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
   pub title:     PostTitle,
   pub content:   Content,
   pub post_type: PostType,
}

/// 投稿エンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
   id:            PostId,
   author_id:     UserId,
   title:         PostTitle,
   content:       Content,
   post_type:     PostType,
   /// オブジェクトストレージ上のキー
   image_key:     Option<String>,
   creation_date: DateTime<Utc>,
}

impl Post {
   pub fn new(
      id: PostId,
      author_id: UserId,
      draft: PostDraft,
      image_key: Option<String>,
      creation_date: DateTime<Utc>,
   ) -> Self {
      Self {
         id,
         author_id,
         title: draft.title,
         content: draft.content,
         post_type: draft.post_type,
         image_key,
         creation_date,
      }
   }

   pub fn id(&self) -> PostId {
      self.id
   }

   pub fn author_id(&self) -> UserId {
      self.author_id
   }

   pub fn title(&self) -> &PostTitle {
      &self.title
   }

   pub fn content(&self) -> &Content {
      &self.content
   }

   pub fn post_type(&self) -> &PostType {
      &self.post_type
   }

   pub fn image_key(&self) -> Option<&str> {
      self.image_key.as_deref()
   }

   pub fn creation_date(&self) -> DateTime<Utc> {
      self.creation_date
   }

   /// 投稿者本人かどうか
   pub fn is_authored_by(&self, user_id: UserId) -> bool {
      self.author_id == user_id
   }

   /// 本文を差し替えた新しいインスタンスを返す（画像と作成日時は維持）
   #[must_use]
   pub fn edited(self, draft: PostDraft) -> Self {
      Self {
         title: draft.title,
         content: draft.content,
         post_type: draft.post_type,
         ..self
      }
   }
}

/// 投稿一覧の 1 行（コメント数付き）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
   pub post:          Post,
   pub comment_count: usize,
}

/// コメントの作成内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
   pub post_id:   PostId,
   pub author_id: UserId,
   pub content:   Content,
   /// 返信先コメント
   pub parent_id: Option<CommentId>,
}

/// コメントエンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
   id:         CommentId,
   post_id:    PostId,
   author_id:  UserId,
   content:    Content,
   parent_id:  Option<CommentId>,
   created_at: DateTime<Utc>,
}

impl Comment {
   pub fn new(id: CommentId, draft: CommentDraft, created_at: DateTime<Utc>) -> Self {
      Self {
         id,
         post_id: draft.post_id,
         author_id: draft.author_id,
         content: draft.content,
         parent_id: draft.parent_id,
         created_at,
      }
   }

   pub fn id(&self) -> CommentId {
      self.id
   }

   pub fn post_id(&self) -> PostId {
      self.post_id
   }

   pub fn author_id(&self) -> UserId {
      self.author_id
   }

   pub fn content(&self) -> &Content {
      &self.content
   }

   pub fn parent_id(&self) -> Option<CommentId> {
      self.parent_id
   }

   pub fn created_at(&self) -> DateTime<Utc> {
      self.created_at
   }

   #[must_use]
   pub fn with_content(self, content: Content) -> Self {
      Self { content, ..self }
   }
}
