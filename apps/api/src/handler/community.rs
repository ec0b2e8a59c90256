//! # 掲示板ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /community/` - 投稿一覧（`?post_type=` で絞り込み）
//! - `POST /community/post/create/` - 投稿作成（multipart、要ログイン）
//! - `GET /community/post/{post_id}/` - 投稿詳細
//! - `POST /community/post/{post_id}/edit/` - 投稿編集（要ログイン）
//! - `POST /community/post/{post_id}/delete/` - 投稿削除（要ログイン）
//! - `GET /community/post/{post_id}/comments/` - コメント一覧
//! - `POST /community/post/{post_id}/comments/` - コメント作成（要ログイン）
//! - `POST /community/post/{post_id}/comment/create/` - 同上（返信もこちらから送られる）
//! - `POST /community/comment/{comment_id}/edit/` - コメント編集（要ログイン）
//! - `POST /community/comment/{comment_id}/delete/` - コメント削除（要ログイン）
//! - `GET /community/myposts/` - 自分の投稿（要ログイン）
//! - `GET /community/mycommentedposts/` - 自分がコメントした投稿（要ログイン）
//!
//! 応答のキー名（`user__username` など）は既存のフロントエンドに合わせている。

use std::sync::Arc;

use axum::{
   Json,
   extract::{FromRef, State},
   http::StatusCode,
   response::IntoResponse,
};
use farmmate_domain::community::{CommentId, Post, PostId};
use serde::{Deserialize, Serialize};

use super::iso8601;
use crate::{
   error::ApiError,
   extract::{AppJson, AppMultipart, AppPath, AppQuery},
   session::{Authenticated, SessionGate},
   usecase::{CommentInput, CommentView, CommunityUseCaseImpl, PostInput, PostListItem},
};

/// 掲示板 API の共有状態
pub struct CommunityState {
   pub usecase: CommunityUseCaseImpl,
   pub gate:    SessionGate,
}

impl FromRef<Arc<CommunityState>> for SessionGate {
   fn from_ref(state: &Arc<CommunityState>) -> Self {
      state.gate.clone()
   }
}

// --- リクエスト/レスポンス型 ---

/// 投稿一覧クエリ
#[derive(Debug, Deserialize)]
pub struct PostListQuery {
   pub post_type: Option<String>,
}

/// 投稿編集リクエスト
#[derive(Debug, Deserialize)]
pub struct PostRequest {
   pub title:     Option<String>,
   pub content:   Option<String>,
   pub post_type: Option<String>,
}

/// コメント作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
   pub content:   Option<String>,
   pub parent_id: Option<i64>,
}

/// コメント編集リクエスト
#[derive(Debug, Deserialize)]
pub struct CommentEditRequest {
   pub content: Option<String>,
}

/// 投稿一覧の 1 行
#[derive(Debug, Serialize)]
pub struct PostListItemDto {
   pub id:            i64,
   pub title:         String,
   pub content:       String,
   #[serde(rename = "user__username")]
   pub user_username: String,
   pub creation_date: String,
   pub comment_count: usize,
}

impl From<PostListItem> for PostListItemDto {
   fn from(item: PostListItem) -> Self {
      let post = item.summary.post;
      Self {
         id:            post.id().as_i64(),
         title:         post.title().as_str().to_string(),
         content:       post.content().as_str().to_string(),
         user_username: item.author_name,
         creation_date: iso8601(post.creation_date()),
         comment_count: item.summary.comment_count,
      }
   }
}

/// 自分の投稿一覧の 1 行
#[derive(Debug, Serialize)]
pub struct MyPostDto {
   pub id:            i64,
   pub title:         String,
   pub content:       String,
   #[serde(rename = "user__username")]
   pub user_username: String,
   pub creation_date: String,
}

impl MyPostDto {
   fn new(post: &Post, author_name: String) -> Self {
      Self {
         id:            post.id().as_i64(),
         title:         post.title().as_str().to_string(),
         content:       post.content().as_str().to_string(),
         user_username: author_name,
         creation_date: iso8601(post.creation_date()),
      }
   }
}

/// 投稿詳細内のコメント
#[derive(Debug, Serialize)]
pub struct CommentDto {
   pub id:            i64,
   pub content:       String,
   #[serde(rename = "user__username")]
   pub user_username: String,
   pub user_id:       i64,
   pub created_at:    String,
   pub parent_id:     Option<i64>,
}

impl From<CommentView> for CommentDto {
   fn from(view: CommentView) -> Self {
      let comment = view.comment;
      Self {
         id:            comment.id().as_i64(),
         content:       comment.content().as_str().to_string(),
         user_username: view.author_name,
         user_id:       comment.author_id().as_i64(),
         created_at:    iso8601(comment.created_at()),
         parent_id:     comment.parent_id().map(|id| id.as_i64()),
      }
   }
}

/// 投稿詳細
///
/// `user_id` には投稿者のユーザー名が入る。
#[derive(Debug, Serialize)]
pub struct PostDetailDto {
   pub id:            i64,
   pub title:         String,
   pub content:       String,
   pub post_type:     String,
   pub user_id:       String,
   pub creation_date: String,
   pub image:         Option<String>,
   pub comments:      Vec<CommentDto>,
}

/// 投稿作成レスポンス
#[derive(Debug, Serialize)]
pub struct PostCreatedResponse {
   pub id:     i64,
   pub status: &'static str,
}

/// 成功のみを表すレスポンス
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
   pub status: &'static str,
}

/// コメント編集レスポンス
#[derive(Debug, Serialize)]
pub struct CommentEditedDto {
   pub id:         i64,
   pub content:    String,
   pub user_id:    i64,
   pub created_at: String,
}

// --- ハンドラ ---

/// GET /community/
///
/// 投稿一覧を新しい順でコメント数付きで取得する。
#[tracing::instrument(skip_all)]
pub async fn list_posts(
   State(state): State<Arc<CommunityState>>,
   AppQuery(query): AppQuery<PostListQuery>,
) -> Result<impl IntoResponse, ApiError> {
   let items = state.usecase.list_posts(query.post_type).await?;

   let items: Vec<PostListItemDto> = items.into_iter().map(PostListItemDto::from).collect();
   Ok(Json(items))
}

/// GET /community/post/{post_id}/
#[tracing::instrument(skip_all, fields(%post_id))]
pub async fn get_post(
   State(state): State<Arc<CommunityState>>,
   AppPath(post_id): AppPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
   let detail = state.usecase.get_post(PostId::from(post_id)).await?;

   let post = detail.post;
   Ok(Json(PostDetailDto {
      id:            post.id().as_i64(),
      title:         post.title().as_str().to_string(),
      content:       post.content().as_str().to_string(),
      post_type:     post.post_type().as_str().to_string(),
      user_id:       detail.author_name,
      creation_date: iso8601(post.creation_date()),
      image:         detail.image_url,
      comments:      detail.comments.into_iter().map(CommentDto::from).collect(),
   }))
}

/// GET /community/post/{post_id}/comments/
///
/// 投稿のコメントを作成順で返す。返信も同じ配列に `parent_id` 付きで入る。
#[tracing::instrument(skip_all, fields(%post_id))]
pub async fn list_comments(
   State(state): State<Arc<CommunityState>>,
   AppPath(post_id): AppPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
   let detail = state.usecase.get_post(PostId::from(post_id)).await?;

   let comments: Vec<CommentDto> = detail.comments.into_iter().map(CommentDto::from).collect();
   Ok(Json(comments))
}

/// POST /community/post/create/
///
/// multipart の `title` / `content` / `post_type` と任意の `image` から投稿を作成する。
///
/// ## レスポンス
///
/// - `201 Created`: `{"id": ..., "status": "success"}`
/// - `400 Bad Request`: 入力不正、画像以外のファイル
/// - `401 Unauthorized`: 未ログイン
#[tracing::instrument(skip_all)]
pub async fn create_post(
   State(state): State<Arc<CommunityState>>,
   Authenticated(session): Authenticated,
   multipart: AppMultipart,
) -> Result<impl IntoResponse, ApiError> {
   let mut form = multipart.read().await?;
   let image = form.take_file("image");
   let input = PostInput {
      title:     form.text("title").map(str::to_string),
      content:   form.text("content").map(str::to_string),
      post_type: form.text("post_type").map(str::to_string),
   };

   let post = state
      .usecase
      .create_post(session.user_id(), input, image)
      .await?;

   Ok((
      StatusCode::CREATED,
      Json(PostCreatedResponse {
         id:     post.id().as_i64(),
         status: "success",
      }),
   ))
}

/// POST /community/post/{post_id}/edit/
#[tracing::instrument(skip_all, fields(%post_id))]
pub async fn edit_post(
   State(state): State<Arc<CommunityState>>,
   Authenticated(session): Authenticated,
   AppPath(post_id): AppPath<i64>,
   AppJson(req): AppJson<PostRequest>,
) -> Result<impl IntoResponse, ApiError> {
   state
      .usecase
      .edit_post(
         session.user_id(),
         PostId::from(post_id),
         PostInput {
            title:     req.title,
            content:   req.content,
            post_type: req.post_type,
         },
      )
      .await?;

   Ok(Json(SuccessResponse { status: "success" }))
}

/// POST /community/post/{post_id}/delete/
#[tracing::instrument(skip_all, fields(%post_id))]
pub async fn delete_post(
   State(state): State<Arc<CommunityState>>,
   Authenticated(session): Authenticated,
   AppPath(post_id): AppPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
   state
      .usecase
      .delete_post(session.user_id(), PostId::from(post_id))
      .await?;

   Ok(StatusCode::NO_CONTENT)
}

/// POST /community/post/{post_id}/comments/
/// POST /community/post/{post_id}/comment/create/
///
/// `parent_id` を指定すると返信になる。
#[tracing::instrument(skip_all, fields(%post_id))]
pub async fn create_comment(
   State(state): State<Arc<CommunityState>>,
   Authenticated(session): Authenticated,
   AppPath(post_id): AppPath<i64>,
   AppJson(req): AppJson<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
   let view = state
      .usecase
      .create_comment(
         session.user_id(),
         PostId::from(post_id),
         CommentInput {
            content:   req.content,
            parent_id: req.parent_id.map(CommentId::from),
         },
      )
      .await?;

   Ok((StatusCode::CREATED, Json(CommentDto::from(view))))
}

/// POST /community/comment/{comment_id}/edit/
#[tracing::instrument(skip_all, fields(%comment_id))]
pub async fn edit_comment(
   State(state): State<Arc<CommunityState>>,
   Authenticated(session): Authenticated,
   AppPath(comment_id): AppPath<i64>,
   AppJson(req): AppJson<CommentEditRequest>,
) -> Result<impl IntoResponse, ApiError> {
   let comment = state
      .usecase
      .edit_comment(session.user_id(), CommentId::from(comment_id), req.content)
      .await?;

   Ok(Json(CommentEditedDto {
      id:         comment.id().as_i64(),
      content:    comment.content().as_str().to_string(),
      user_id:    comment.author_id().as_i64(),
      created_at: iso8601(comment.created_at()),
   }))
}

/// POST /community/comment/{comment_id}/delete/
#[tracing::instrument(skip_all, fields(%comment_id))]
pub async fn delete_comment(
   State(state): State<Arc<CommunityState>>,
   Authenticated(session): Authenticated,
   AppPath(comment_id): AppPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
   state
      .usecase
      .delete_comment(session.user_id(), CommentId::from(comment_id))
      .await?;

   Ok(StatusCode::NO_CONTENT)
}

/// GET /community/myposts/
#[tracing::instrument(skip_all)]
pub async fn my_posts(
   State(state): State<Arc<CommunityState>>,
   Authenticated(session): Authenticated,
) -> Result<impl IntoResponse, ApiError> {
   let posts = state.usecase.my_posts(session.user_id()).await?;
   Ok(Json(to_my_post_dtos(posts)))
}

/// GET /community/mycommentedposts/
#[tracing::instrument(skip_all)]
pub async fn my_commented_posts(
   State(state): State<Arc<CommunityState>>,
   Authenticated(session): Authenticated,
) -> Result<impl IntoResponse, ApiError> {
   let posts = state.usecase.my_commented_posts(session.user_id()).await?;
   Ok(Json(to_my_post_dtos(posts)))
}

fn to_my_post_dtos(posts: Vec<(Post, String)>) -> Vec<MyPostDto> {
   posts
      .into_iter()
      .map(|(post, author_name)| MyPostDto::new(&post, author_name))
      .collect()
}

