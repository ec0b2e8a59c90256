//! # UserRepository
//!
//! ユーザー情報の永続化を担当するリポジトリ。
//!
//! ユーザー名とメールアドレスはそれぞれ一意。重複した場合は
//! [`InfraErrorKind::Conflict`](crate::error::InfraErrorKind::Conflict) を返す。

use async_trait::async_trait;
use chrono::Utc;
use farmmate_domain::user::{Email, NewUser, User, UserId};
use tokio::sync::RwLock;

use super::Table;
use crate::error::InfraError;

/// ユーザーリポジトリトレイト
#[async_trait]
pub trait UserRepository: Send + Sync {
   /// ユーザーを登録する
   ///
   /// # 戻り値
   ///
   /// - `Ok(user)`: 採番済みのユーザー
   /// - `Err(_)`: ユーザー名またはメールアドレスが既に使われている
   async fn insert(&self, input: NewUser) -> Result<User, InfraError>;

   /// ID でユーザーを検索
   async fn find_by_id(&self, id: UserId) -> Result<Option<User>, InfraError>;

   /// メールアドレスでユーザーを検索
   async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError>;

   /// 複数の ID でユーザーを一括検索
   ///
   /// 存在しない ID は無視し、見つかったユーザーのみ返す。
   async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, InfraError>;

   /// ユーザー名が使われているか
   ///
   /// 検証前の入力でも問い合わせられるよう文字列で受け取る。
   async fn exists_by_username(&self, username: &str) -> Result<bool, InfraError>;

   /// ユーザー名・パスワードハッシュを更新する
   async fn update(&self, user: &User) -> Result<(), InfraError>;

   /// ユーザーを削除する
   async fn delete(&self, id: UserId) -> Result<(), InfraError>;
}

/// インメモリ実装の UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
   table: RwLock<Table<User>>,
}

impl InMemoryUserRepository {
   pub fn new() -> Self {
      Self::default()
   }
}

fn username_taken(table: &Table<User>, username: &str, except: Option<UserId>) -> bool {
   table
      .values()
      .any(|u| u.username().as_str() == username && Some(u.id()) != except)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
   async fn insert(&self, input: NewUser) -> Result<User, InfraError> {
      let mut table = self.table.write().await;

      if username_taken(&table, input.username.as_str(), None) {
         return Err(InfraError::conflict(
            "User",
            format!("username={}", input.username),
         ));
      }
      if table.values().any(|u| u.email() == &input.email) {
         return Err(InfraError::conflict(
            "User",
            format!("email={}", input.email.as_str()),
         ));
      }

      let id = table.next_id();
      let user = User::new(UserId::from(id), input, Utc::now());
      table.insert(id, user.clone());
      Ok(user)
   }

   async fn find_by_id(&self, id: UserId) -> Result<Option<User>, InfraError> {
      Ok(self.table.read().await.get(id.as_i64()).cloned())
   }

   async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError> {
      Ok(self
         .table
         .read()
         .await
         .values()
         .find(|u| u.email() == email)
         .cloned())
   }

   async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, InfraError> {
      if ids.is_empty() {
         return Ok(Vec::new());
      }

      let table = self.table.read().await;
      Ok(table
         .values()
         .filter(|u| ids.contains(&u.id()))
         .cloned()
         .collect())
   }

   async fn exists_by_username(&self, username: &str) -> Result<bool, InfraError> {
      Ok(username_taken(&*self.table.read().await, username, None))
   }

   async fn update(&self, user: &User) -> Result<(), InfraError> {
      let mut table = self.table.write().await;

      if table.get(user.id().as_i64()).is_none() {
         return Err(InfraError::unexpected(format!(
            "更新対象のユーザーが存在しません: {}",
            user.id()
         )));
      }
      if username_taken(&table, user.username().as_str(), Some(user.id())) {
         return Err(InfraError::conflict(
            "User",
            format!("username={}", user.username()),
         ));
      }

      table.insert(user.id().as_i64(), user.clone());
      Ok(())
   }

   async fn delete(&self, id: UserId) -> Result<(), InfraError> {
      self.table.write().await.remove(id.as_i64());
      Ok(())
   }
}
