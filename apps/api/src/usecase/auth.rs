//! 会員登録・ログイン・アカウント管理ユースケース

use std::sync::Arc;

use farmmate_domain::{
   StructuredError,
   user::{Email, NewUser, User, UserId, Username},
};
use farmmate_infra::{PasswordHasher, SessionManager, repository::UserRepository};

use super::{form_invalid, non_empty, validation_error};
use crate::error::ApiError;

/// 会員登録の入力
#[derive(Debug, Default)]
pub struct SignupInput {
   pub username: Option<String>,
   pub email:    Option<String>,
   pub password: Option<String>,
}

/// パスワード変更の入力
#[derive(Debug, Default)]
pub struct ChangePasswordInput {
   pub old_password:  Option<String>,
   pub new_password1: Option<String>,
   pub new_password2: Option<String>,
}

/// 会員・認証ユースケース
pub struct AuthUseCaseImpl {
   user_repository: Arc<dyn UserRepository>,
   password_hasher: Arc<dyn PasswordHasher>,
   session_manager: Arc<dyn SessionManager>,
}

impl AuthUseCaseImpl {
   pub fn new(
      user_repository: Arc<dyn UserRepository>,
      password_hasher: Arc<dyn PasswordHasher>,
      session_manager: Arc<dyn SessionManager>,
   ) -> Self {
      Self {
         user_repository,
         password_hasher,
         session_manager,
      }
   }

   /// 会員登録する
   ///
   /// 1. 入力の検証（欠落・形式不正は "Form validation failed"）
   /// 2. パスワードのハッシュ化
   /// 3. 登録（ユーザー名・メールの重複は DuplicateResource）
   ///
   /// セッションの開始はハンドラが行う。
   pub async fn signup(&self, input: SignupInput) -> Result<User, ApiError> {
      let (Some(username), Some(email), Some(password)) = (
         non_empty(input.username),
         non_empty(input.email),
         non_empty(input.password),
      ) else {
         return Err(form_invalid(
            StructuredError::validation().with_message("username, email and password are required"),
         ));
      };

      let username = Username::new(username).map_err(form_invalid)?;
      let email = Email::new(email).map_err(form_invalid)?;
      let password_hash = self.password_hasher.hash(&password)?;

      self.user_repository
         .insert(NewUser {
            username,
            email,
            password_hash,
         })
         .await
         .map_err(|e| {
            if let Some((entity, key)) = e.as_conflict() {
               tracing::debug!(entity, key, "会員登録の重複");
               return ApiError::from(
                  StructuredError::duplicate_resource()
                     .with_message("A user with similar details already exists."),
               );
            }
            ApiError::from(e)
         })
   }

   /// ユーザー名が使用済みかを確認する
   pub async fn check_username(&self, username: Option<String>) -> Result<bool, ApiError> {
      let username =
         username.ok_or_else(|| validation_error("Username parameter is missing"))?;

      Ok(self.user_repository.exists_by_username(&username).await?)
   }

   /// メールアドレスとパスワードで認証する
   pub async fn login(
      &self,
      email: Option<String>,
      password: Option<String>,
   ) -> Result<User, ApiError> {
      let (Some(email), Some(password)) = (non_empty(email), non_empty(password)) else {
         return Err(validation_error("Email and password are required"));
      };

      let not_registered =
         || ApiError::from(StructuredError::unauthorized().with_message("Email is not registered."));

      let email = Email::new(email).map_err(|_| not_registered())?;
      let user = self
         .user_repository
         .find_by_email(&email)
         .await?
         .ok_or_else(not_registered)?;

      if !self.password_hasher.verify(&password, user.password_hash())? {
         return Err(StructuredError::unauthorized()
            .with_message("Password does not match.")
            .into());
      }

      Ok(user)
   }

   /// セッションのユーザーを取得する（削除済みなら `None`）
   pub async fn current_user(&self, user_id: UserId) -> Result<Option<User>, ApiError> {
      Ok(self.user_repository.find_by_id(user_id).await?)
   }

   /// パスワードを変更する
   ///
   /// 判定順:
   /// 1. 現在のパスワードの照合
   /// 2. 新旧パスワードが同一でないこと
   /// 3. 確認入力との一致
   ///
   /// 成功時はユーザーの全セッションを無効にする。
   pub async fn change_password(
      &self,
      user_id: UserId,
      input: ChangePasswordInput,
   ) -> Result<(), ApiError> {
      let user = self.load_user(user_id).await?;
      let old_password = input.old_password.unwrap_or_default();
      let new_password1 = input.new_password1.unwrap_or_default();
      let new_password2 = input.new_password2.unwrap_or_default();

      if !self.password_hasher.verify(&old_password, user.password_hash())? {
         return Err(validation_error("Current password does not match."));
      }
      if new_password1 == old_password {
         return Err(validation_error(
            "New password must differ from the current password.",
         ));
      }
      if new_password1 != new_password2 {
         return Err(validation_error("New password confirmation does not match."));
      }
      if new_password1.trim().is_empty() {
         return Err(form_invalid(
            StructuredError::validation().with_message("new_password1 is required"),
         ));
      }

      let password_hash = self.password_hasher.hash(&new_password1)?;
      self.user_repository
         .update(&user.with_password_hash(password_hash))
         .await?;
      self.session_manager.delete_all_for_user(user_id).await?;

      tracing::info!(%user_id, "パスワードを変更しました");
      Ok(())
   }

   /// ユーザー名を変更する
   pub async fn change_username(
      &self,
      user_id: UserId,
      new_username: Option<String>,
   ) -> Result<User, ApiError> {
      let new_username =
         non_empty(new_username).ok_or_else(|| validation_error("New username is required"))?;
      let user = self.load_user(user_id).await?;

      let in_use = || {
         ApiError::from(
            StructuredError::duplicate_resource().with_message("Username is already in use."),
         )
      };

      let username = Username::new(new_username).map_err(form_invalid)?;
      if self.user_repository.exists_by_username(username.as_str()).await? {
         return Err(in_use());
      }

      let renamed = user.with_username(username);
      self.user_repository.update(&renamed).await.map_err(|e| {
         if e.as_conflict().is_some() {
            return in_use();
         }
         ApiError::from(e)
      })?;

      Ok(renamed)
   }

   /// アカウントを削除する
   ///
   /// パスワードを照合したうえでユーザーと全セッションを削除する。
   pub async fn delete_account(
      &self,
      user_id: UserId,
      password: Option<String>,
   ) -> Result<(), ApiError> {
      let password =
         non_empty(password).ok_or_else(|| validation_error("Password is required."))?;
      let user = self.load_user(user_id).await?;

      if !self.password_hasher.verify(&password, user.password_hash())? {
         return Err(validation_error("Password does not match."));
      }

      self.user_repository.delete(user_id).await?;
      self.session_manager.delete_all_for_user(user_id).await?;

      tracing::info!(%user_id, "アカウントを削除しました");
      Ok(())
   }

   /// セッションのユーザーを読み込む
   ///
   /// セッションが残っていてもユーザーが削除済みなら認証失敗とする。
   async fn load_user(&self, user_id: UserId) -> Result<User, ApiError> {
      self.user_repository
         .find_by_id(user_id)
         .await?
         .ok_or(ApiError::PermissionDenied)
   }
}
