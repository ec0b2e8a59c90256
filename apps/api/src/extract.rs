//! # リクエスト抽出
//!
//! axum 標準の抽出子をラップし、リジェクションを [`ApiError`] に変換する。
//! これにより、ハンドラに届く前の失敗も共通のエラーレスポンスになる。
//!
//! | 抽出子 | 失敗時 |
//! |--------|--------|
//! | [`AppJson`] | Validation "Invalid JSON format" |
//! | [`AppPath`] | NotFound（既定メッセージ） |
//! | [`AppQuery`] | BadRequest（既定メッセージ） |
//! | [`AppMultipart`] | BadRequest（既定メッセージ） |

use std::collections::HashMap;

use axum::{
   extract::{FromRequest, FromRequestParts, Multipart, Path, Query, Request},
   http::request::Parts,
};
use bytes::Bytes;
use farmmate_domain::StructuredError;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON 本文の解析に失敗したときのメッセージ
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON format";

/// JSON 本文
///
/// Content-Type は問わず、本文を JSON として解析する。
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
   T: DeserializeOwned,
   S: Send + Sync,
{
   type Rejection = ApiError;

   async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
      let bytes = Bytes::from_request(req, state).await.map_err(|e| {
         tracing::debug!("リクエスト本文を読み取れません: {e}");
         ApiError::from(StructuredError::bad_request())
      })?;

      serde_json::from_slice(&bytes).map(Self).map_err(|e| {
         tracing::debug!("JSON の解析に失敗: {e}");
         StructuredError::validation()
            .with_message(INVALID_JSON_MESSAGE)
            .into()
      })
   }
}

/// パスパラメータ
///
/// 型が合わない場合はルートに一致しなかったものとして扱う。
#[derive(Debug, Clone, Copy)]
pub struct AppPath<T>(pub T);

impl<S, T> FromRequestParts<S> for AppPath<T>
where
   T: DeserializeOwned + Send,
   S: Send + Sync,
{
   type Rejection = ApiError;

   async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
      match Path::<T>::from_request_parts(parts, state).await {
         Ok(Path(value)) => Ok(Self(value)),
         Err(e) => {
            tracing::debug!("パスパラメータが不正: {e}");
            Err(StructuredError::not_found().into())
         }
      }
   }
}

/// クエリパラメータ
#[derive(Debug, Clone, Copy, Default)]
pub struct AppQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for AppQuery<T>
where
   T: DeserializeOwned,
   S: Send + Sync,
{
   type Rejection = ApiError;

   async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
      match Query::<T>::from_request_parts(parts, state).await {
         Ok(Query(value)) => Ok(Self(value)),
         Err(e) => {
            tracing::debug!("クエリパラメータが不正: {e}");
            Err(StructuredError::bad_request().into())
         }
      }
   }
}

/// アップロードされたファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
   pub file_name:    String,
   pub content_type: Option<String>,
   pub body:         Bytes,
}

impl UploadedFile {
   /// Content-Type が `image/*` か
   pub fn is_image(&self) -> bool {
      self.content_type
         .as_deref()
         .is_some_and(|ct| ct.starts_with("image/"))
   }
}

/// 読み取り済みの multipart フォーム
#[derive(Debug, Default)]
pub struct MultipartForm {
   fields: HashMap<String, String>,
   files:  HashMap<String, UploadedFile>,
}

impl MultipartForm {
   /// テキストフィールドを取得する
   pub fn text(&self, name: &str) -> Option<&str> {
      self.fields.get(name).map(String::as_str)
   }

   /// ファイルを取り出す（空のファイルは未送信として扱う）
   pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
      self.files.remove(name).filter(|f| !f.body.is_empty())
   }
}

/// multipart 本文
#[derive(Debug)]
pub struct AppMultipart(pub Multipart);

impl<S> FromRequest<S> for AppMultipart
where
   S: Send + Sync,
{
   type Rejection = ApiError;

   async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
      match Multipart::from_request(req, state).await {
         Ok(multipart) => Ok(Self(multipart)),
         Err(e) => {
            tracing::debug!("multipart 本文ではありません: {e}");
            Err(StructuredError::bad_request().into())
         }
      }
   }
}

impl AppMultipart {
   /// すべてのパートを読み取る
   ///
   /// ファイル名を持つパートはファイル、それ以外はテキストフィールドとする。
   pub async fn read(mut self) -> Result<MultipartForm, ApiError> {
      let mut form = MultipartForm::default();

      while let Some(field) = self.0.next_field().await? {
         let Some(name) = field.name().map(str::to_string) else {
            continue;
         };

         match field.file_name().map(str::to_string) {
            Some(file_name) => {
               let content_type = field.content_type().map(str::to_string);
               let body = field.bytes().await?;
               form.files.insert(
                  name,
                  UploadedFile {
                     file_name,
                     content_type,
                     body,
                  },
               );
            }
            None => {
               let value = field.text().await?;
               form.fields.insert(name, value);
            }
         }
      }

      Ok(form)
   }
}
