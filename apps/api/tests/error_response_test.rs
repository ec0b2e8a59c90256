//! エラー応答形式の統合テスト
//!
//! ハンドラ外で起きる失敗（ルート不一致・メソッド不一致・本文不正・panic）と
//! 未設定の外部サービスが、すべて同じ JSON 形式で返ることを確認する。

mod helpers;

use std::sync::Arc;

use axum::{
   Router,
   body::Body,
   http::{Request, StatusCode},
   routing::get,
};
use farmmate_api::{error::handle_panic, test_utils::test_dependencies};
use farmmate_infra::Unconfigured;
use helpers::{MultipartBody, TestApp, error_body};
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;

#[tokio::test]
async fn test_存在しないルートは404() {
   let app = TestApp::new();

   let response = app.get("/no/such/route/", None).await;

   assert_eq!(response.status, StatusCode::NOT_FOUND);
   assert_eq!(
      response.body,
      error_body("Attempting to access a non-existent resource", 1301, 404)
   );
}

#[tokio::test]
async fn test_許可されていないメソッドは405() {
   let app = TestApp::new();

   let response = app.get("/login/login/", None).await;

   assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
   assert_eq!(response.body, error_body("Invalid request method", 1002, 405));
}

#[tokio::test]
async fn test_不正なjsonは400() {
   let app = TestApp::new();

   let response = app
      .post_raw("/login/login/", "application/json", "{not json", None)
      .await;

   assert_eq!(response.status, StatusCode::BAD_REQUEST);
   assert_eq!(response.body, error_body("Invalid JSON format", 1001, 400));
}

#[tokio::test]
async fn test_multipartでない本文は400() {
   let app = TestApp::new();
   let cookie = app.signup("farmer").await;

   let response = app
      .post_raw("/detect/upload/", "text/plain", "plain", Some(&cookie))
      .await;

   assert_eq!(response.status, StatusCode::BAD_REQUEST);
   assert_eq!(response.body, error_body("Wrong request transmission", 1002, 400));
}

#[tokio::test]
async fn test_未ログインは本文の検証より先に401() {
   let app = TestApp::new();

   let response = app
      .post_raw("/selfchatbot/chatbot/", "application/json", "{not json", None)
      .await;

   assert_eq!(response.status, StatusCode::UNAUTHORIZED);
   assert_eq!(response.body, error_body("Authentication failed", 1201, 401));
}

#[tokio::test]
async fn test_数値でないパスパラメータは404() {
   let app = TestApp::new();

   let response = app.get("/community/post/abc/", None).await;

   assert_eq!(response.status, StatusCode::NOT_FOUND);
   assert_eq!(response.body["code"], json!(1301));
}

#[tokio::test]
async fn test_ハンドラのpanicはフォールバック応答になる() {
   async fn explode() -> &'static str {
      panic!("boom");
   }
   let router = Router::new()
      .route("/explode", get(explode))
      .layer(CatchPanicLayer::custom(handle_panic));

   let response = router
      .oneshot(Request::get("/explode").body(Body::empty()).unwrap())
      .await
      .unwrap();

   assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
   let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
   let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
   assert_eq!(body, error_body("Unexpected error occurred", 2000, 500));
}

#[tokio::test]
async fn test_未設定の外部サービスはフォールバック応答になる() {
   let mut deps = test_dependencies();
   deps.pest_classifier = Arc::new(Unconfigured);
   deps.chat_service = Arc::new(Unconfigured);
   let app = TestApp::with_dependencies(deps);
   let cookie = app.signup("farmer").await;

   let upload = app
      .post_multipart(
         "/detect/upload/",
         MultipartBody::new().file("image", "leaf.png", "image/png", b"png"),
         Some(&cookie),
      )
      .await;
   let chat = app
      .post_json(
         "/selfchatbot/chatbot/",
         json!({"question": "물은 언제?", "session_id": "s-1"}),
         Some(&cookie),
      )
      .await;

   for response in [upload, chat] {
      assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
      assert_eq!(response.body, error_body("Unexpected error occurred", 2000, 500));
   }
}

#[tokio::test]
async fn test_ヘルスチェック() {
   let app = TestApp::new();

   let response = app.get("/health", None).await;

   assert_eq!(response.status, StatusCode::OK);
   assert_eq!(
      response.body,
      json!({"status": "healthy", "version": env!("CARGO_PKG_VERSION")})
   );
}

#[tokio::test]
async fn test_応答にリクエストidが付く() {
   let app = TestApp::new();

   let response = app.get("/health", None).await;

   assert!(response.headers.contains_key("x-request-id"));
}
