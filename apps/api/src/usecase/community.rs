//! 掲示板ユースケース
//!
//! 投稿の一覧・詳細・作成・編集・削除と、返信付きコメントを扱う。
//! 投稿の編集・削除は投稿者本人のみ、コメントの編集・削除は本人のコメントのみ可能。

use std::sync::Arc;

use farmmate_domain::{
   StructuredError,
   community::{
      Comment,
      CommentDraft,
      CommentId,
      Content,
      Post,
      PostDraft,
      PostId,
      PostSummary,
      PostTitle,
      PostType,
   },
   user::UserId,
};
use farmmate_infra::{
   ObjectStorage,
   repository::{CommentRepository, PostRepository, UserRepository},
   storage::POST_IMAGE_PREFIX,
};

use super::{display_name, form_invalid, resolve_user_names, validation_error};
use crate::{error::ApiError, extract::UploadedFile};

/// 画像以外のファイルがアップロードされたときのメッセージ
pub const INVALID_IMAGE_MESSAGE: &str = "Invalid file type, expected an image.";

/// 投稿の作成・編集の入力
#[derive(Debug, Default)]
pub struct PostInput {
   pub title:     Option<String>,
   pub content:   Option<String>,
   pub post_type: Option<String>,
}

impl PostInput {
   fn into_draft(self) -> Result<PostDraft, ApiError> {
      let required = |value: Option<String>, field: &str| {
         value.ok_or_else(|| {
            form_invalid(StructuredError::validation().with_message(format!("{field} is required")))
         })
      };

      Ok(PostDraft {
         title:     PostTitle::new(required(self.title, "title")?).map_err(form_invalid)?,
         content:   Content::new(required(self.content, "content")?).map_err(form_invalid)?,
         post_type: PostType::new(required(self.post_type, "post_type")?)
            .map_err(form_invalid)?,
      })
   }
}

/// コメント作成の入力
#[derive(Debug, Default)]
pub struct CommentInput {
   pub content:   Option<String>,
   pub parent_id: Option<CommentId>,
}

/// 投稿一覧の 1 行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostListItem {
   pub summary:     PostSummary,
   pub author_name: String,
}

/// コメントと投稿者名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentView {
   pub comment:     Comment,
   pub author_name: String,
}

/// 投稿詳細
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetail {
   pub post:        Post,
   pub author_name: String,
   pub image_url:   Option<String>,
   pub comments:    Vec<CommentView>,
}

/// 掲示板ユースケース
pub struct CommunityUseCaseImpl {
   post_repository:    Arc<dyn PostRepository>,
   comment_repository: Arc<dyn CommentRepository>,
   user_repository:    Arc<dyn UserRepository>,
   object_storage:     Arc<dyn ObjectStorage>,
}

impl CommunityUseCaseImpl {
   pub fn new(
      post_repository: Arc<dyn PostRepository>,
      comment_repository: Arc<dyn CommentRepository>,
      user_repository: Arc<dyn UserRepository>,
      object_storage: Arc<dyn ObjectStorage>,
   ) -> Self {
      Self {
         post_repository,
         comment_repository,
         user_repository,
         object_storage,
      }
   }

   /// 投稿一覧を新しい順で取得する
   ///
   /// `post_type` が空文字列の場合は絞り込まない。
   /// 種別として成立しない値（長すぎる等）は一致する投稿がないものとして扱う。
   pub async fn list_posts(&self, post_type: Option<String>) -> Result<Vec<PostListItem>, ApiError> {
      let filter = match post_type.filter(|t| !t.trim().is_empty()) {
         Some(raw) => match PostType::new(raw) {
            Ok(post_type) => Some(post_type),
            Err(_) => return Ok(Vec::new()),
         },
         None => None,
      };

      let posts = self.post_repository.list(filter.as_ref()).await?;
      let ids: Vec<PostId> = posts.iter().map(Post::id).collect();
      let counts = self.comment_repository.count_by_posts(&ids).await?;
      let names = self.author_names(&posts).await?;

      Ok(posts
         .into_iter()
         .map(|post| {
            let comment_count = counts.get(&post.id()).copied().unwrap_or(0);
            let author_name = display_name(&names, post.author_id());
            PostListItem {
               summary: PostSummary {
                  post,
                  comment_count,
               },
               author_name,
            }
         })
         .collect())
   }

   /// 投稿詳細をコメント付きで取得する
   pub async fn get_post(&self, post_id: PostId) -> Result<PostDetail, ApiError> {
      let post = self.find_post(post_id, "Post not found").await?;
      let comments = self.comment_repository.list_by_post(post_id).await?;

      let mut user_ids: Vec<UserId> = comments.iter().map(Comment::author_id).collect();
      user_ids.push(post.author_id());
      user_ids.sort();
      user_ids.dedup();
      let names = resolve_user_names(self.user_repository.as_ref(), &user_ids).await?;

      let image_url = post.image_key().map(|key| self.object_storage.url(key));
      let author_name = display_name(&names, post.author_id());
      let comments = comments
         .into_iter()
         .map(|comment| CommentView {
            author_name: display_name(&names, comment.author_id()),
            comment,
         })
         .collect();

      Ok(PostDetail {
         post,
         author_name,
         image_url,
         comments,
      })
   }

   /// 投稿を作成する
   ///
   /// 1. 入力の検証（"Form validation failed"）
   /// 2. 画像の種別確認と保存（任意）
   /// 3. 投稿の登録
   pub async fn create_post(
      &self,
      author_id: UserId,
      input: PostInput,
      image: Option<UploadedFile>,
   ) -> Result<Post, ApiError> {
      let draft = input.into_draft()?;

      let image_key = match image {
         Some(file) if !file.is_image() => return Err(validation_error(INVALID_IMAGE_MESSAGE)),
         Some(file) => Some(
            self.object_storage
               .put(
                  POST_IMAGE_PREFIX,
                  &file.file_name,
                  file.content_type.as_deref().unwrap_or_default(),
                  file.body,
               )
               .await?,
         ),
         None => None,
      };

      let post = self
         .post_repository
         .insert(author_id, draft, image_key)
         .await?;
      tracing::info!(post_id = %post.id(), %author_id, "投稿を作成しました");
      Ok(post)
   }

   /// 投稿を編集する（投稿者本人のみ）
   pub async fn edit_post(
      &self,
      user_id: UserId,
      post_id: PostId,
      input: PostInput,
   ) -> Result<Post, ApiError> {
      let post = self.find_own_post(user_id, post_id).await?;
      let draft = input.into_draft()?;

      let edited = post.edited(draft);
      self.post_repository.update(&edited).await?;
      Ok(edited)
   }

   /// 投稿をコメントごと削除する（投稿者本人のみ）
   pub async fn delete_post(&self, user_id: UserId, post_id: PostId) -> Result<(), ApiError> {
      self.find_own_post(user_id, post_id).await?;

      self.comment_repository.delete_by_post(post_id).await?;
      self.post_repository.delete(post_id).await?;
      tracing::info!(%post_id, %user_id, "投稿を削除しました");
      Ok(())
   }

   /// コメントを作成する
   ///
   /// 返信先は同じ投稿のコメントでなければならない。
   pub async fn create_comment(
      &self,
      author_id: UserId,
      post_id: PostId,
      input: CommentInput,
   ) -> Result<CommentView, ApiError> {
      let content = parse_content(input.content)?;
      self.find_post(post_id, "Post related to the comment not found")
         .await?;

      if let Some(parent_id) = input.parent_id {
         let parent = self.comment_repository.find_by_id(parent_id).await?;
         if parent.is_none_or(|p| p.post_id() != post_id) {
            return Err(validation_error("Parent comment does not belong to this post"));
         }
      }

      let comment = self
         .comment_repository
         .insert(CommentDraft {
            post_id,
            author_id,
            content,
            parent_id: input.parent_id,
         })
         .await?;
      let author_name = self.author_name(author_id).await?;

      Ok(CommentView {
         comment,
         author_name,
      })
   }

   /// 自分のコメントを編集する
   pub async fn edit_comment(
      &self,
      user_id: UserId,
      comment_id: CommentId,
      content: Option<String>,
   ) -> Result<Comment, ApiError> {
      let comment = self.find_own_comment(user_id, comment_id).await?;
      let content = parse_content(content)?;

      let edited = comment.with_content(content);
      self.comment_repository.update(&edited).await?;
      Ok(edited)
   }

   /// 自分のコメントを返信ごと削除する
   pub async fn delete_comment(&self, user_id: UserId, comment_id: CommentId) -> Result<(), ApiError> {
      self.find_own_comment(user_id, comment_id).await?;
      self.comment_repository.delete(comment_id).await?;
      Ok(())
   }

   /// 自分の投稿一覧
   pub async fn my_posts(&self, user_id: UserId) -> Result<Vec<(Post, String)>, ApiError> {
      let posts = self.post_repository.list_by_author(user_id).await?;
      self.with_author_names(posts).await
   }

   /// 自分がコメントした投稿の一覧
   pub async fn my_commented_posts(&self, user_id: UserId) -> Result<Vec<(Post, String)>, ApiError> {
      let post_ids = self
         .comment_repository
         .post_ids_commented_by(user_id)
         .await?;
      let posts = self.post_repository.find_by_ids(&post_ids).await?;
      self.with_author_names(posts).await
   }

   async fn find_post(&self, post_id: PostId, not_found: &str) -> Result<Post, ApiError> {
      self.post_repository
         .find_by_id(post_id)
         .await?
         .ok_or_else(|| StructuredError::not_found().with_message(not_found).into())
   }

   async fn find_own_post(&self, user_id: UserId, post_id: PostId) -> Result<Post, ApiError> {
      let post = self.find_post(post_id, "Post not found").await?;
      if !post.is_authored_by(user_id) {
         return Err(StructuredError::resource_access_forbidden()
            .with_message("Permission denied.")
            .into());
      }
      Ok(post)
   }

   /// 他人のコメントは存在しないものとして扱う
   async fn find_own_comment(
      &self,
      user_id: UserId,
      comment_id: CommentId,
   ) -> Result<Comment, ApiError> {
      self.comment_repository
         .find_by_id(comment_id)
         .await?
         .filter(|c| c.author_id() == user_id)
         .ok_or_else(|| {
            StructuredError::not_found()
               .with_message("Comment not found")
               .into()
         })
   }

   async fn author_name(&self, user_id: UserId) -> Result<String, ApiError> {
      let names = resolve_user_names(self.user_repository.as_ref(), &[user_id]).await?;
      Ok(display_name(&names, user_id))
   }

   async fn author_names(
      &self,
      posts: &[Post],
   ) -> Result<std::collections::HashMap<UserId, String>, ApiError> {
      let mut user_ids: Vec<UserId> = posts.iter().map(Post::author_id).collect();
      user_ids.sort();
      user_ids.dedup();
      resolve_user_names(self.user_repository.as_ref(), &user_ids).await
   }

   async fn with_author_names(&self, posts: Vec<Post>) -> Result<Vec<(Post, String)>, ApiError> {
      let names = self.author_names(&posts).await?;
      Ok(posts
         .into_iter()
         .map(|post| {
            let name = display_name(&names, post.author_id());
            (post, name)
         })
         .collect())
   }
}

fn parse_content(content: Option<String>) -> Result<Content, ApiError> {
   let content = content.ok_or_else(|| {
      form_invalid(StructuredError::validation().with_message("content is required"))
   })?;
   Content::new(content).map_err(form_invalid)
}

#[cfg(test)]
mod tests {
   use bytes::Bytes;
   use farmmate_domain::user::{Email, NewUser, PasswordHash, Username};
   use farmmate_infra::{
      InMemoryObjectStorage,
      repository::{InMemoryCommentRepository, InMemoryPostRepository, InMemoryUserRepository},
   };
   use pretty_assertions::assert_eq;

   use super::*;
   use crate::error::translate;

   struct Setup {
      sut:     CommunityUseCaseImpl,
      users:   Arc<InMemoryUserRepository>,
      storage: Arc<InMemoryObjectStorage>,
   }

   fn setup() -> Setup {
      let users = Arc::new(InMemoryUserRepository::new());
      let storage = Arc::new(InMemoryObjectStorage::new("http://media.test"));
      let sut = CommunityUseCaseImpl::new(
         Arc::new(InMemoryPostRepository::new()),
         Arc::new(InMemoryCommentRepository::new()),
         users.clone(),
         storage.clone(),
      );
      Setup {
         sut,
         users,
         storage,
      }
   }

   async fn add_user(users: &InMemoryUserRepository, name: &str) -> UserId {
      users
         .insert(NewUser {
            username:      Username::new(name).unwrap(),
            email:         Email::new(format!("{name}@example.com")).unwrap(),
            password_hash: PasswordHash::new("hash"),
         })
         .await
         .unwrap()
         .id()
   }

   fn post_input(title: &str, post_type: &str) -> PostInput {
      PostInput {
         title:     Some(title.to_string()),
         content:   Some("本文".to_string()),
         post_type: Some(post_type.to_string()),
      }
   }

   fn comment_input(content: &str, parent_id: Option<CommentId>) -> CommentInput {
      CommentInput {
         content: Some(content.to_string()),
         parent_id,
      }
   }

   fn error_of(err: &ApiError) -> (u16, u32, String) {
      let (status, body) = translate(err);
      (status.as_u16(), body.code, body.message)
   }

   #[tokio::test]
   async fn test_一覧は新しい順でコメント数と投稿者名を含む() {
      let Setup { sut, users, .. } = setup();
      let alice = add_user(&users, "alice").await;
      let bob = add_user(&users, "bob").await;
      let first = sut
         .create_post(alice, post_input("first", "free"), None)
         .await
         .unwrap();
      sut.create_post(bob, post_input("second", "buy"), None)
         .await
         .unwrap();
      sut.create_comment(bob, first.id(), comment_input("hi", None))
         .await
         .unwrap();

      let items = sut.list_posts(None).await.unwrap();

      let rows: Vec<(&str, &str, usize)> = items
         .iter()
         .map(|i| {
            (
               i.summary.post.title().as_str(),
               i.author_name.as_str(),
               i.summary.comment_count,
            )
         })
         .collect();
      assert_eq!(rows, vec![("second", "bob", 0), ("first", "alice", 1)]);
   }

   #[tokio::test]
   async fn test_種別で絞り込む() {
      let Setup { sut, users, .. } = setup();
      let alice = add_user(&users, "alice").await;
      sut.create_post(alice, post_input("a", "free"), None)
         .await
         .unwrap();
      sut.create_post(alice, post_input("b", "buy"), None)
         .await
         .unwrap();

      let free = sut.list_posts(Some("free".to_string())).await.unwrap();
      let all = sut.list_posts(Some(String::new())).await.unwrap();
      let too_long = sut.list_posts(Some("x".repeat(11))).await.unwrap();

      assert_eq!(free.len(), 1);
      assert_eq!(all.len(), 2);
      assert!(too_long.is_empty());
   }

   #[tokio::test]
   async fn test_詳細は画像urlとコメントを含む() {
      let Setup {
         sut,
         users,
         storage,
      } = setup();
      let alice = add_user(&users, "alice").await;
      let image = UploadedFile {
         file_name:    "field.png".to_string(),
         content_type: Some("image/png".to_string()),
         body:         Bytes::from_static(b"png"),
      };
      let post = sut
         .create_post(alice, post_input("with image", "free"), Some(image))
         .await
         .unwrap();
      let parent = sut
         .create_comment(alice, post.id(), comment_input("parent", None))
         .await
         .unwrap();
      sut.create_comment(
         alice,
         post.id(),
         comment_input("reply", Some(parent.comment.id())),
      )
      .await
      .unwrap();

      let detail = sut.get_post(post.id()).await.unwrap();

      let key = post.image_key().unwrap();
      assert!(key.starts_with("post_board/"));
      assert!(storage.get(key).await.is_some());
      assert_eq!(detail.image_url, Some(format!("http://media.test/{key}")));
      assert_eq!(detail.author_name, "alice");
      assert_eq!(detail.comments.len(), 2);
      assert_eq!(
         detail.comments[1].comment.parent_id(),
         Some(parent.comment.id())
      );
   }

   #[tokio::test]
   async fn test_存在しない投稿はnot_found() {
      let Setup { sut, .. } = setup();

      let err = sut.get_post(PostId::from(404)).await.unwrap_err();

      assert_eq!(error_of(&err), (404, 1301, "Post not found".to_string()));
   }

   #[tokio::test]
   async fn test_作成時の検証() {
      let Setup { sut, users, .. } = setup();
      let alice = add_user(&users, "alice").await;

      let invalid = sut
         .create_post(alice, post_input(&"t".repeat(101), "free"), None)
         .await
         .unwrap_err();
      assert_eq!(
         error_of(&invalid),
         (400, 1001, "Form validation failed".to_string())
      );

      let text_file = UploadedFile {
         file_name:    "notes.txt".to_string(),
         content_type: Some("text/plain".to_string()),
         body:         Bytes::from_static(b"text"),
      };
      let not_image = sut
         .create_post(alice, post_input("ok", "free"), Some(text_file))
         .await
         .unwrap_err();
      assert_eq!(error_of(&not_image).2, INVALID_IMAGE_MESSAGE);
   }

   #[tokio::test]
   async fn test_他人の投稿は編集も削除もできない() {
      let Setup { sut, users, .. } = setup();
      let alice = add_user(&users, "alice").await;
      let bob = add_user(&users, "bob").await;
      let post = sut
         .create_post(alice, post_input("mine", "free"), None)
         .await
         .unwrap();

      let edit = sut
         .edit_post(bob, post.id(), post_input("hijack", "free"))
         .await
         .unwrap_err();
      let delete = sut.delete_post(bob, post.id()).await.unwrap_err();

      let expected = (403, 1102, "Permission denied.".to_string());
      assert_eq!(error_of(&edit), expected);
      assert_eq!(error_of(&delete), expected);
   }

   #[tokio::test]
   async fn test_投稿者は編集と削除ができる() {
      let Setup { sut, users, .. } = setup();
      let alice = add_user(&users, "alice").await;
      let post = sut
         .create_post(alice, post_input("before", "free"), None)
         .await
         .unwrap();
      sut.create_comment(alice, post.id(), comment_input("c", None))
         .await
         .unwrap();

      let edited = sut
         .edit_post(alice, post.id(), post_input("after", "buy"))
         .await
         .unwrap();
      assert_eq!(edited.title().as_str(), "after");

      sut.delete_post(alice, post.id()).await.unwrap();
      assert!(sut.get_post(post.id()).await.is_err());
      assert!(sut.my_commented_posts(alice).await.unwrap().is_empty());
   }

   #[tokio::test]
   async fn test_コメント作成の検証() {
      let Setup { sut, users, .. } = setup();
      let alice = add_user(&users, "alice").await;
      let post_a = sut
         .create_post(alice, post_input("a", "free"), None)
         .await
         .unwrap();
      let post_b = sut
         .create_post(alice, post_input("b", "free"), None)
         .await
         .unwrap();
      let on_b = sut
         .create_comment(alice, post_b.id(), comment_input("on b", None))
         .await
         .unwrap();

      let missing_post = sut
         .create_comment(alice, PostId::from(999), comment_input("x", None))
         .await
         .unwrap_err();
      assert_eq!(
         error_of(&missing_post),
         (404, 1301, "Post related to the comment not found".to_string())
      );

      let foreign_parent = sut
         .create_comment(
            alice,
            post_a.id(),
            comment_input("x", Some(on_b.comment.id())),
         )
         .await
         .unwrap_err();
      assert_eq!(
         error_of(&foreign_parent).2,
         "Parent comment does not belong to this post"
      );

      let empty = sut
         .create_comment(alice, post_a.id(), CommentInput::default())
         .await
         .unwrap_err();
      assert_eq!(error_of(&empty).2, "Form validation failed");
   }

   #[tokio::test]
   async fn test_他人のコメントは見つからない扱い() {
      let Setup { sut, users, .. } = setup();
      let alice = add_user(&users, "alice").await;
      let bob = add_user(&users, "bob").await;
      let post = sut
         .create_post(alice, post_input("a", "free"), None)
         .await
         .unwrap();
      let comment = sut
         .create_comment(alice, post.id(), comment_input("mine", None))
         .await
         .unwrap();
      let id = comment.comment.id();

      let edit = sut
         .edit_comment(bob, id, Some("x".to_string()))
         .await
         .unwrap_err();
      let delete = sut.delete_comment(bob, id).await.unwrap_err();

      let expected = (404, 1301, "Comment not found".to_string());
      assert_eq!(error_of(&edit), expected);
      assert_eq!(error_of(&delete), expected);

      let edited = sut
         .edit_comment(alice, id, Some("edited".to_string()))
         .await
         .unwrap();
      assert_eq!(edited.content().as_str(), "edited");
      sut.delete_comment(alice, id).await.unwrap();
   }

   #[tokio::test]
   async fn test_自分の投稿とコメントした投稿() {
      let Setup { sut, users, .. } = setup();
      let alice = add_user(&users, "alice").await;
      let bob = add_user(&users, "bob").await;
      let alice_post = sut
         .create_post(alice, post_input("alice", "free"), None)
         .await
         .unwrap();
      sut.create_post(bob, post_input("bob", "free"), None)
         .await
         .unwrap();
      sut.create_comment(bob, alice_post.id(), comment_input("1", None))
         .await
         .unwrap();
      sut.create_comment(bob, alice_post.id(), comment_input("2", None))
         .await
         .unwrap();

      let mine = sut.my_posts(alice).await.unwrap();
      let commented = sut.my_commented_posts(bob).await.unwrap();

      assert_eq!(mine.len(), 1);
      assert_eq!(mine[0].1, "alice");
      assert_eq!(commented.len(), 1);
      assert_eq!(commented[0].0.id(), alice_post.id());
      assert_eq!(commented[0].1, "alice");
   }

   #[tokio::test]
   async fn test_削除済みユーザーの投稿はunknown表示() {
      let Setup { sut, users, .. } = setup();
      let alice = add_user(&users, "alice").await;
      sut.create_post(alice, post_input("orphan", "free"), None)
         .await
         .unwrap();
      users.delete(alice).await.unwrap();

      let items = sut.list_posts(None).await.unwrap();

      assert_eq!(items[0].author_name, "unknown");
   }
}
