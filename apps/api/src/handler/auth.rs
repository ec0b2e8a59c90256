//! # 会員・認証ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /login/signup/` - 会員登録（登録後そのままログイン）
//! - `GET /login/check_username/` - ユーザー名の使用状況
//! - `POST /login/login/` - ログイン
//! - `POST /login/logout/` - ログアウト
//! - `GET /login/auth_check/` - ログイン状態の確認
//! - `POST /login/change_password/` - パスワード変更（要ログイン）
//! - `POST /login/change_username/` - ユーザー名変更（要ログイン）
//! - `POST /login/delete_account/` - 退会（要ログイン）

use std::sync::Arc;

use axum::{
   Json,
   extract::{FromRef, State},
   response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use farmmate_infra::SessionData;
use serde::{Deserialize, Serialize};

use super::StatusMessage;
use crate::{
   error::ApiError,
   extract::{AppJson, AppQuery},
   session::{Authenticated, SessionGate},
   usecase::{AuthUseCaseImpl, ChangePasswordInput, SignupInput},
};

/// 会員・認証 API の共有状態
pub struct AuthState {
   pub usecase: AuthUseCaseImpl,
   pub gate:    SessionGate,
}

impl FromRef<Arc<AuthState>> for SessionGate {
   fn from_ref(state: &Arc<AuthState>) -> Self {
      state.gate.clone()
   }
}

// --- リクエスト/レスポンス型 ---

/// 会員登録リクエスト
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
   pub username: Option<String>,
   pub email:    Option<String>,
   pub password: Option<String>,
}

/// ユーザー名確認クエリ
#[derive(Debug, Deserialize)]
pub struct CheckUsernameQuery {
   pub username: Option<String>,
}

/// ユーザー名確認レスポンス
#[derive(Debug, Serialize)]
pub struct CheckUsernameResponse {
   pub is_taken: bool,
}

/// ログインリクエスト
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
   pub email:    Option<String>,
   pub password: Option<String>,
}

/// ログインレスポンス
#[derive(Debug, Serialize)]
pub struct LoginResponse {
   pub status:           &'static str,
   pub message:          &'static str,
   pub username:         String,
   pub user_id:          i64,
   pub is_authenticated: bool,
}

/// ログイン状態レスポンス
#[derive(Debug, Serialize)]
pub struct AuthCheckResponse {
   pub is_authenticated: bool,
   pub username:         String,
}

/// パスワード変更リクエスト
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
   pub old_password:  Option<String>,
   pub new_password1: Option<String>,
   pub new_password2: Option<String>,
}

/// ユーザー名変更リクエスト
#[derive(Debug, Deserialize)]
pub struct ChangeUsernameRequest {
   pub new_username: Option<String>,
}

/// 退会リクエスト
#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
   pub password: Option<String>,
}

// --- ハンドラ ---

/// POST /login/signup/
///
/// 会員登録し、セッション Cookie を発行する。
#[tracing::instrument(skip_all)]
pub async fn signup(
   State(state): State<Arc<AuthState>>,
   jar: CookieJar,
   AppJson(req): AppJson<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
   let user = state
      .usecase
      .signup(SignupInput {
         username: req.username,
         email:    req.email,
         password: req.password,
      })
      .await?;

   let jar = state.gate.open(jar, &SessionData::new(user.id())).await?;
   tracing::info!(user_id = %user.id(), "会員登録しました");

   Ok((
      jar,
      Json(StatusMessage::success("User registered and logged in.")),
   ))
}

/// GET /login/check_username/?username=
#[tracing::instrument(skip_all)]
pub async fn check_username(
   State(state): State<Arc<AuthState>>,
   AppQuery(query): AppQuery<CheckUsernameQuery>,
) -> Result<impl IntoResponse, ApiError> {
   let is_taken = state.usecase.check_username(query.username).await?;
   Ok(Json(CheckUsernameResponse { is_taken }))
}

/// POST /login/login/
///
/// メールアドレスとパスワードで認証し、セッション Cookie を発行する。
///
/// ## レスポンス
///
/// - `200 OK`: ログイン成功
/// - `400 Bad Request`: メールアドレスまたはパスワードの欠落
/// - `401 Unauthorized`: 未登録のメールアドレス、パスワード不一致
#[tracing::instrument(skip_all)]
pub async fn login(
   State(state): State<Arc<AuthState>>,
   jar: CookieJar,
   AppJson(req): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
   let user = state.usecase.login(req.email, req.password).await?;

   let jar = state.gate.open(jar, &SessionData::new(user.id())).await?;
   tracing::info!(user_id = %user.id(), "ログインしました");

   Ok((
      jar,
      Json(LoginResponse {
         status:           "success",
         message:          "User authenticated and logged in.",
         username:         user.username().as_str().to_string(),
         user_id:          user.id().as_i64(),
         is_authenticated: true,
      }),
   ))
}

/// POST /login/logout/
///
/// セッションがあれば削除し、Cookie を消去する。未ログインでも成功する。
#[tracing::instrument(skip_all)]
pub async fn logout(
   State(state): State<Arc<AuthState>>,
   jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
   let jar = state.gate.close(jar).await?;
   Ok((
      jar,
      Json(StatusMessage::success("User logged out successfully")),
   ))
}

/// GET /login/auth_check/
#[tracing::instrument(skip_all)]
pub async fn auth_check(
   State(state): State<Arc<AuthState>>,
   jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
   let user = match state.gate.current(&jar).await? {
      Some(session) => state.usecase.current_user(session.user_id()).await?,
      None => None,
   };

   Ok(Json(AuthCheckResponse {
      is_authenticated: user.is_some(),
      username:         user
         .map(|u| u.username().as_str().to_string())
         .unwrap_or_default(),
   }))
}

/// POST /login/change_password/
///
/// 成功するとユーザーの全セッションが無効になり、Cookie も消去する。
#[tracing::instrument(skip_all)]
pub async fn change_password(
   State(state): State<Arc<AuthState>>,
   Authenticated(session): Authenticated,
   jar: CookieJar,
   AppJson(req): AppJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
   state
      .usecase
      .change_password(
         session.user_id(),
         ChangePasswordInput {
            old_password:  req.old_password,
            new_password1: req.new_password1,
            new_password2: req.new_password2,
         },
      )
      .await?;

   let jar = state.gate.close(jar).await?;
   Ok((
      jar,
      Json(StatusMessage::success("Password changed successfully")),
   ))
}

/// POST /login/change_username/
#[tracing::instrument(skip_all)]
pub async fn change_username(
   State(state): State<Arc<AuthState>>,
   Authenticated(session): Authenticated,
   AppJson(req): AppJson<ChangeUsernameRequest>,
) -> Result<impl IntoResponse, ApiError> {
   state
      .usecase
      .change_username(session.user_id(), req.new_username)
      .await?;

   Ok(Json(StatusMessage::success("Username changed successfully")))
}

/// POST /login/delete_account/
///
/// パスワードを確認して退会し、Cookie を消去する。
#[tracing::instrument(skip_all)]
pub async fn delete_account(
   State(state): State<Arc<AuthState>>,
   Authenticated(session): Authenticated,
   jar: CookieJar,
   AppJson(req): AppJson<DeleteAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
   state
      .usecase
      .delete_account(session.user_id(), req.password)
      .await?;

   let jar = state.gate.close(jar).await?;
   Ok((
      jar,
      Json(StatusMessage::success("Account deleted successfully")),
   ))
}
