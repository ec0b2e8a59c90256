//! 統合テスト用のヘルパー
//!
//! `build_router` で組み立てたルーター全体に `oneshot` でリクエストを送る。

#![allow(dead_code)]

use axum::{
   Router,
   body::{Body, to_bytes},
   http::{
      HeaderMap,
      Method,
      Request,
      StatusCode,
      header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
   },
};
use farmmate_api::{
   app_builder::{AppDependencies, build_router},
   config::ApiConfig,
   test_utils::test_dependencies,
};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const BOUNDARY: &str = "farmmate-test-boundary";

/// 統合テストの対象アプリケーション
#[derive(Clone)]
pub struct TestApp {
   router: Router,
}

/// 受け取った応答
#[derive(Debug)]
pub struct TestResponse {
   pub status:  StatusCode,
   pub headers: HeaderMap,
   pub body:    Value,
}

impl TestResponse {
   /// `Set-Cookie` からセッション Cookie（`name=value`）を取り出す
   pub fn session_cookie(&self) -> Option<String> {
      self.headers
         .get_all(SET_COOKIE)
         .iter()
         .filter_map(|v| v.to_str().ok())
         .filter_map(|v| v.split(';').next())
         .find(|pair| pair.starts_with("sessionid=") && pair.len() > "sessionid=".len())
         .map(str::to_string)
   }
}

impl TestApp {
   pub fn new() -> Self {
      Self::with_dependencies(test_dependencies())
   }

   pub fn with_dependencies(deps: AppDependencies) -> Self {
      let config = ApiConfig::from_lookup(|_| None).unwrap();
      Self {
         router: build_router(&config, deps),
      }
   }

   pub async fn send(&self, request: Request<Body>) -> TestResponse {
      let response = self.router.clone().oneshot(request).await.unwrap();

      let status = response.status();
      let headers = response.headers().clone();
      let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
      let body = if bytes.is_empty() {
         Value::Null
      } else {
         serde_json::from_slice(&bytes).unwrap()
      };

      TestResponse {
         status,
         headers,
         body,
      }
   }

   pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
      self.send(request(Method::GET, uri, cookie).body(Body::empty()).unwrap())
         .await
   }

   pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
      self.send(request(Method::DELETE, uri, cookie).body(Body::empty()).unwrap())
         .await
   }

   pub async fn post_json(&self, uri: &str, body: Value, cookie: Option<&str>) -> TestResponse {
      self.post_raw(uri, "application/json", body.to_string(), cookie)
         .await
   }

   pub async fn post_raw(
      &self,
      uri: &str,
      content_type: &str,
      body: impl Into<Body>,
      cookie: Option<&str>,
   ) -> TestResponse {
      self.send(
         request(Method::POST, uri, cookie)
            .header(CONTENT_TYPE, content_type)
            .body(body.into())
            .unwrap(),
      )
      .await
   }

   pub async fn post_multipart(
      &self,
      uri: &str,
      form: MultipartBody,
      cookie: Option<&str>,
   ) -> TestResponse {
      self.post_raw(
         uri,
         &format!("multipart/form-data; boundary={BOUNDARY}"),
         form.finish(),
         cookie,
      )
      .await
   }

   /// 会員登録し、セッション Cookie を返す
   pub async fn signup(&self, username: &str) -> String {
      let response = self
         .post_json(
            "/login/signup/",
            json!({
               "username": username,
               "email": format!("{username}@example.com"),
               "password": "password123",
            }),
            None,
         )
         .await;
      assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
      response.session_cookie().unwrap()
   }
}

fn request(method: Method, uri: &str, cookie: Option<&str>) -> axum::http::request::Builder {
   let builder = Request::builder().method(method).uri(uri);
   match cookie {
      Some(cookie) => builder.header(COOKIE, cookie),
      None => builder,
   }
}

/// multipart/form-data 本文の組み立て
#[derive(Debug, Default)]
pub struct MultipartBody {
   bytes: Vec<u8>,
}

impl MultipartBody {
   pub fn new() -> Self {
      Self::default()
   }

   pub fn text(mut self, name: &str, value: &str) -> Self {
      self.bytes.extend_from_slice(
         format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
         )
         .as_bytes(),
      );
      self
   }

   pub fn file(mut self, name: &str, file_name: &str, content_type: &str, body: &[u8]) -> Self {
      self.bytes.extend_from_slice(
         format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
         )
         .as_bytes(),
      );
      self.bytes.extend_from_slice(body);
      self.bytes.extend_from_slice(b"\r\n");
      self
   }

   fn finish(mut self) -> Vec<u8> {
      self.bytes
         .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
      self.bytes
   }
}

/// エラー応答の本文
pub fn error_body(message: &str, code: u32, status_code: u16) -> Value {
   json!({
      "status": "error",
      "message": message,
      "code": code,
      "status_code": status_code,
   })
}
