//! 掲示板 API の統合テスト

mod helpers;

use axum::http::StatusCode;
use helpers::{MultipartBody, TestApp, error_body};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn post_form(title: &str, post_type: &str) -> MultipartBody {
   MultipartBody::new()
      .text("title", title)
      .text("content", "본문")
      .text("post_type", post_type)
}

async fn create_post(app: &TestApp, cookie: &str, title: &str, post_type: &str) -> i64 {
   let response = app
      .post_multipart("/community/post/create/", post_form(title, post_type), Some(cookie))
      .await;
   assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
   response.body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_投稿を作成して一覧と詳細に出る() {
   let app = TestApp::new();
   let cookie = app.signup("farmer").await;

   let response = app
      .post_multipart(
         "/community/post/create/",
         post_form("첫 글", "free").file("image", "leaf.png", "image/png", b"png"),
         Some(&cookie),
      )
      .await;
   assert_eq!(response.status, StatusCode::CREATED);
   assert_eq!(response.body["status"], json!("success"));
   let post_id = response.body["id"].as_i64().unwrap();

   let list = app.get("/community/", None).await;
   assert_eq!(list.status, StatusCode::OK);
   assert_eq!(list.body[0]["title"], json!("첫 글"));
   assert_eq!(list.body[0]["user__username"], json!("farmer"));
   assert_eq!(list.body[0]["comment_count"], json!(0));

   let detail = app
      .get(&format!("/community/post/{post_id}/"), None)
      .await;
   assert_eq!(detail.status, StatusCode::OK);
   assert_eq!(detail.body["user_id"], json!("farmer"));
   assert_eq!(detail.body["post_type"], json!("free"));
   let image = detail.body["image"].as_str().unwrap();
   assert!(image.starts_with("http://media.test/post_board/"), "{image}");
   assert_eq!(detail.body["comments"], json!([]));
}

#[tokio::test]
async fn test_投稿一覧は新しい順で種別で絞り込める() {
   let app = TestApp::new();
   let cookie = app.signup("farmer").await;
   create_post(&app, &cookie, "first", "free").await;
   create_post(&app, &cookie, "second", "question").await;

   let all = app.get("/community/", None).await;
   let questions = app.get("/community/?post_type=question", None).await;

   let titles: Vec<&Value> = all
      .body
      .as_array()
      .unwrap()
      .iter()
      .map(|p| &p["title"])
      .collect();
   assert_eq!(titles, vec![&json!("second"), &json!("first")]);
   assert_eq!(questions.body.as_array().unwrap().len(), 1);
   assert_eq!(questions.body[0]["title"], json!("second"));
}

#[tokio::test]
async fn test_画像以外の添付は400() {
   let app = TestApp::new();
   let cookie = app.signup("farmer").await;

   let response = app
      .post_multipart(
         "/community/post/create/",
         post_form("title", "free").file("image", "notes.txt", "text/plain", b"text"),
         Some(&cookie),
      )
      .await;

   assert_eq!(
      response.body,
      error_body("Invalid file type, expected an image.", 1001, 400)
   );
}

#[tokio::test]
async fn test_題名のない投稿はフォーム検証エラー() {
   let app = TestApp::new();
   let cookie = app.signup("farmer").await;

   let response = app
      .post_multipart(
         "/community/post/create/",
         MultipartBody::new().text("content", "본문").text("post_type", "free"),
         Some(&cookie),
      )
      .await;

   assert_eq!(response.body, error_body("Form validation failed", 1001, 400));
}

#[tokio::test]
async fn test_存在しない投稿は404() {
   let app = TestApp::new();

   let response = app.get("/community/post/999/", None).await;

   assert_eq!(response.body, error_body("Post not found", 1301, 404));
}

#[tokio::test]
async fn test_他人の投稿は編集も削除もできない() {
   let app = TestApp::new();
   let owner = app.signup("owner").await;
   let other = app.signup("other").await;
   let post_id = create_post(&app, &owner, "title", "free").await;

   let edit = app
      .post_json(
         &format!("/community/post/{post_id}/edit/"),
         json!({"title": "hijacked", "content": "x", "post_type": "free"}),
         Some(&other),
      )
      .await;
   let delete = app
      .post_json(
         &format!("/community/post/{post_id}/delete/"),
         json!({}),
         Some(&other),
      )
      .await;

   for response in [edit, delete] {
      assert_eq!(response.status, StatusCode::FORBIDDEN);
      assert_eq!(response.body, error_body("Permission denied.", 1102, 403));
   }
}

#[tokio::test]
async fn test_投稿の編集と削除() {
   let app = TestApp::new();
   let cookie = app.signup("farmer").await;
   let post_id = create_post(&app, &cookie, "title", "free").await;

   let edit = app
      .post_json(
         &format!("/community/post/{post_id}/edit/"),
         json!({"title": "edited", "content": "new body", "post_type": "tip"}),
         Some(&cookie),
      )
      .await;
   assert_eq!(edit.body, json!({"status": "success"}));
   let detail = app
      .get(&format!("/community/post/{post_id}/"), None)
      .await;
   assert_eq!(detail.body["title"], json!("edited"));

   let delete = app
      .post_json(
         &format!("/community/post/{post_id}/delete/"),
         json!({}),
         Some(&cookie),
      )
      .await;
   assert_eq!(delete.status, StatusCode::NO_CONTENT);
   let gone = app
      .get(&format!("/community/post/{post_id}/"), None)
      .await;
   assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_コメントと返信() {
   let app = TestApp::new();
   let cookie = app.signup("farmer").await;
   let post_id = create_post(&app, &cookie, "title", "free").await;

   let comment = app
      .post_json(
         &format!("/community/post/{post_id}/comment/create/"),
         json!({"content": "좋은 글"}),
         Some(&cookie),
      )
      .await;
   assert_eq!(comment.status, StatusCode::CREATED);
   assert_eq!(comment.body["user__username"], json!("farmer"));
   assert_eq!(comment.body["parent_id"], Value::Null);
   let comment_id = comment.body["id"].as_i64().unwrap();

   let reply = app
      .post_json(
         &format!("/community/post/{post_id}/comment/create/"),
         json!({"content": "감사합니다", "parent_id": comment_id}),
         Some(&cookie),
      )
      .await;
   assert_eq!(reply.body["parent_id"], json!(comment_id));

   let detail = app
      .get(&format!("/community/post/{post_id}/"), None)
      .await;
   assert_eq!(detail.body["comments"].as_array().unwrap().len(), 2);
   let comments = app
      .get(&format!("/community/post/{post_id}/comments/"), None)
      .await;
   assert_eq!(comments.status, StatusCode::OK);
   assert_eq!(comments.body, detail.body["comments"]);
   let list = app.get("/community/", None).await;
   assert_eq!(list.body[0]["comment_count"], json!(2));
}

#[tokio::test]
async fn test_コメントの失敗() {
   let app = TestApp::new();
   let cookie = app.signup("farmer").await;
   let post_a = create_post(&app, &cookie, "a", "free").await;
   let post_b = create_post(&app, &cookie, "b", "free").await;
   let on_a = app
      .post_json(
         &format!("/community/post/{post_a}/comment/create/"),
         json!({"content": "on a"}),
         Some(&cookie),
      )
      .await;
   let on_a_id = on_a.body["id"].as_i64().unwrap();

   let missing_post = app
      .post_json(
         "/community/post/999/comment/create/",
         json!({"content": "hello"}),
         Some(&cookie),
      )
      .await;
   let foreign_parent = app
      .post_json(
         &format!("/community/post/{post_b}/comments/"),
         json!({"content": "reply", "parent_id": on_a_id}),
         Some(&cookie),
      )
      .await;

   assert_eq!(
      missing_post.body,
      error_body("Post related to the comment not found", 1301, 404)
   );
   assert_eq!(
      foreign_parent.body,
      error_body("Parent comment does not belong to this post", 1001, 400)
   );
}

#[tokio::test]
async fn test_コメントの編集と削除は本人のみ() {
   let app = TestApp::new();
   let owner = app.signup("owner").await;
   let other = app.signup("other").await;
   let post_id = create_post(&app, &owner, "title", "free").await;
   let comment = app
      .post_json(
         &format!("/community/post/{post_id}/comment/create/"),
         json!({"content": "original"}),
         Some(&owner),
      )
      .await;
   let comment_id = comment.body["id"].as_i64().unwrap();

   let foreign = app
      .post_json(
         &format!("/community/comment/{comment_id}/edit/"),
         json!({"content": "hijacked"}),
         Some(&other),
      )
      .await;
   assert_eq!(foreign.body, error_body("Comment not found", 1301, 404));

   let edited = app
      .post_json(
         &format!("/community/comment/{comment_id}/edit/"),
         json!({"content": "edited"}),
         Some(&owner),
      )
      .await;
   assert_eq!(edited.status, StatusCode::OK);
   assert_eq!(edited.body["content"], json!("edited"));
   assert_eq!(edited.body["id"], json!(comment_id));

   let deleted = app
      .post_json(
         &format!("/community/comment/{comment_id}/delete/"),
         json!({}),
         Some(&owner),
      )
      .await;
   assert_eq!(deleted.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_自分の投稿とコメントした投稿() {
   let app = TestApp::new();
   let farmer = app.signup("farmer").await;
   let other = app.signup("other").await;
   create_post(&app, &farmer, "mine", "free").await;
   let others_post = create_post(&app, &other, "theirs", "free").await;
   app.post_json(
      &format!("/community/post/{others_post}/comment/create/"),
      json!({"content": "nice"}),
      Some(&farmer),
   )
   .await;

   let mine = app.get("/community/myposts/", Some(&farmer)).await;
   let commented = app
      .get("/community/mycommentedposts/", Some(&farmer))
      .await;

   assert_eq!(mine.body.as_array().unwrap().len(), 1);
   assert_eq!(mine.body[0]["title"], json!("mine"));
   assert_eq!(commented.body.as_array().unwrap().len(), 1);
   assert_eq!(commented.body[0]["title"], json!("theirs"));
   assert_eq!(commented.body[0]["user__username"], json!("other"));
}

#[tokio::test]
async fn test_投稿の作成は要ログイン() {
   let app = TestApp::new();

   let response = app
      .post_multipart("/community/post/create/", post_form("title", "free"), None)
      .await;

   assert_eq!(response.body, error_body("Authentication failed", 1201, 401));
}

#[tokio::test]
async fn test_投稿作成のパスはgetを受け付けない() {
   let app = TestApp::new();

   let response = app.get("/community/post/create/", None).await;

   assert_eq!(response.body, error_body("Invalid request method", 1002, 405));
}
