//! # ユーザー
//!
//! コミュニティ投稿・診断履歴・チャット履歴の所有者となるユーザーを表現する。

use chrono::{DateTime, Utc};

use crate::StructuredError;

define_serial_id! {
   /// ユーザー ID
   pub struct UserId;
}

define_validated_string! {
   /// ユーザー名（最大 150 文字）
   pub struct Username {
      label: "username",
      max_length: 150,
   }
}

/// メールアドレス
///
/// 最大 254 文字で、`@` の前後が空でないことを検証する。
/// 比較のため小文字に正規化して保持する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
   pub fn new(value: impl Into<String>) -> Result<Self, StructuredError> {
      let value = value.into().trim().to_lowercase();

      let valid = value.chars().count() <= 254
         && matches!(value.split_once('@'), Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@'));

      if !valid {
         return Err(StructuredError::validation().with_message("email is invalid"));
      }

      Ok(Self(value))
   }

   pub fn as_str(&self) -> &str {
      &self.0
   }
}

/// パスワードハッシュ（PHC 文字列）
///
/// Debug 出力はマスクする。
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
   pub fn new(phc: impl Into<String>) -> Self {
      Self(phc.into())
   }

   pub fn as_str(&self) -> &str {
      &self.0
   }
}

impl std::fmt::Debug for PasswordHash {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_tuple("PasswordHash").field(&"[REDACTED]").finish()
   }
}

/// 新規登録時の入力
#[derive(Debug, Clone)]
pub struct NewUser {
   pub username:      Username,
   pub email:         Email,
   pub password_hash: PasswordHash,
}

/// ユーザーエンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
   id:            UserId,
   username:      Username,
   email:         Email,
   password_hash: PasswordHash,
   created_at:    DateTime<Utc>,
}

impl User {
   /// 採番済みの ID で新規ユーザーを組み立てる
   pub fn new(id: UserId, input: NewUser, created_at: DateTime<Utc>) -> Self {
      Self {
         id,
         username: input.username,
         email: input.email,
         password_hash: input.password_hash,
         created_at,
      }
   }

   pub fn id(&self) -> UserId {
      self.id
   }

   pub fn username(&self) -> &Username {
      &self.username
   }

   pub fn email(&self) -> &Email {
      &self.email
   }

   pub fn password_hash(&self) -> &PasswordHash {
      &self.password_hash
   }

   pub fn created_at(&self) -> DateTime<Utc> {
      self.created_at
   }

   /// ユーザー名を変更した新しいインスタンスを返す
   #[must_use]
   pub fn with_username(self, username: Username) -> Self {
      Self { username, ..self }
   }

   /// パスワードハッシュを差し替えた新しいインスタンスを返す
   #[must_use]
   pub fn with_password_hash(self, password_hash: PasswordHash) -> Self {
      Self {
         password_hash,
         ..self
      }
   }
}
