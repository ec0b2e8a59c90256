//! # セッション Cookie と認証ゲート
//!
//! Cookie のセッション ID からログイン中のユーザーを引く。
//! 有効なセッションがない場合は [`ApiError::PermissionDenied`] を返し、
//! 401 / 1201 "Authentication failed" に変換される。
//!
//! ログイン必須のハンドラは [`Authenticated`] 抽出子を本文の抽出子より前に置く。
//! これにより、未ログインのリクエストは本文の検証より先に拒否される。

use std::sync::Arc;

use axum::{
   extract::{FromRef, FromRequestParts},
   http::request::Parts,
};
use axum_extra::extract::{
   CookieJar,
   cookie::{Cookie, SameSite},
};
use farmmate_infra::{SessionData, SessionManager, session::SESSION_TTL_SECONDS};

use crate::error::ApiError;

/// セッションマネージャと Cookie 名の組
#[derive(Clone)]
pub struct SessionGate {
   manager:     Arc<dyn SessionManager>,
   cookie_name: String,
}

impl SessionGate {
   pub fn new(manager: Arc<dyn SessionManager>, cookie_name: impl Into<String>) -> Self {
      Self {
         manager,
         cookie_name: cookie_name.into(),
      }
   }

   pub fn manager(&self) -> &dyn SessionManager {
      self.manager.as_ref()
   }

   fn session_id<'a>(&self, jar: &'a CookieJar) -> Option<&'a str> {
      jar.get(&self.cookie_name)
         .map(Cookie::value)
         .filter(|v| !v.is_empty())
   }

   /// ログイン中ならセッションを返す
   pub async fn current(&self, jar: &CookieJar) -> Result<Option<SessionData>, ApiError> {
      match self.session_id(jar) {
         Some(session_id) => Ok(self.manager.get(session_id).await?),
         None => Ok(None),
      }
   }

   /// セッション認証を行う
   pub async fn authenticate(&self, jar: &CookieJar) -> Result<SessionData, ApiError> {
      self.current(jar).await?.ok_or(ApiError::PermissionDenied)
   }

   /// セッションを作成し、Cookie を設定した jar を返す
   pub async fn open(&self, jar: CookieJar, data: &SessionData) -> Result<CookieJar, ApiError> {
      let session_id = self.manager.create(data).await?;
      Ok(jar.add(self.session_cookie(session_id)))
   }

   /// セッションを削除し、Cookie を消去した jar を返す
   pub async fn close(&self, jar: CookieJar) -> Result<CookieJar, ApiError> {
      if let Some(session_id) = self.session_id(&jar) {
         self.manager.delete(session_id).await?;
      }
      Ok(jar.add(self.clear_cookie()))
   }

   fn session_cookie(&self, session_id: String) -> Cookie<'static> {
      Cookie::build((self.cookie_name.clone(), session_id))
         .path("/")
         .max_age(time::Duration::seconds(SESSION_TTL_SECONDS))
         .http_only(true)
         .same_site(SameSite::Lax)
         .build()
   }

   fn clear_cookie(&self) -> Cookie<'static> {
      Cookie::build((self.cookie_name.clone(), ""))
         .path("/")
         .max_age(time::Duration::seconds(0))
         .http_only(true)
         .same_site(SameSite::Lax)
         .build()
   }
}

/// ログイン中のセッション
///
/// State から [`SessionGate`] を取り出せるハンドラで使える。
#[derive(Debug, Clone)]
pub struct Authenticated(pub SessionData);

impl<S> FromRequestParts<S> for Authenticated
where
   SessionGate: FromRef<S>,
   S: Send + Sync,
{
   type Rejection = ApiError;

   async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
      let gate = SessionGate::from_ref(state);
      let jar = CookieJar::from_headers(&parts.headers);
      gate.authenticate(&jar).await.map(Self)
   }
}
