//! # パスワードハッシュ
//!
//! Argon2id によるパスワードのハッシュ化と検証を提供する。
//! ハッシュは PHC 文字列形式で保存し、検証時のパラメータはハッシュ自身から読む。

use argon2::{
   Argon2,
   PasswordHasher as _,
   PasswordVerifier as _,
   password_hash::{PasswordHash as Argon2PasswordHash, SaltString, rand_core::OsRng},
};
use farmmate_domain::user::PasswordHash;

use crate::InfraError;

/// パスワードのハッシュ化・検証を担当するトレイト
pub trait PasswordHasher: Send + Sync {
   /// パスワードをハッシュ化する
   fn hash(&self, password: &str) -> Result<PasswordHash, InfraError>;

   /// パスワードを検証する
   ///
   /// # Errors
   ///
   /// - 不正なハッシュ形式の場合
   fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, InfraError>;
}

/// Argon2id によるパスワードハッシュの実装
///
/// 新規ハッシュは argon2 クレートの既定パラメータ（Argon2id v19）で生成する。
#[derive(Default)]
pub struct Argon2PasswordHasher {
   argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
   pub fn new() -> Self {
      Self::default()
   }
}

impl PasswordHasher for Argon2PasswordHasher {
   fn hash(&self, password: &str) -> Result<PasswordHash, InfraError> {
      let salt = SaltString::generate(&mut OsRng);
      let hash = self
         .argon2
         .hash_password(password.as_bytes(), &salt)
         .map_err(|e| InfraError::password_hash(format!("ハッシュ化に失敗: {e}")))?;

      Ok(PasswordHash::new(hash.to_string()))
   }

   fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, InfraError> {
      let parsed = Argon2PasswordHash::new(hash.as_str())
         .map_err(|e| InfraError::password_hash(format!("不正なハッシュ形式: {e}")))?;

      Ok(self
         .argon2
         .verify_password(password.as_bytes(), &parsed)
         .is_ok())
   }
}

#[cfg(test)]
mod tests {
   use rstest::rstest;

   use super::*;

   // password123 を m=65536,t=1,p=1 でハッシュ化したもの
   const TEST_HASH: &str = "$argon2id$v=19$m=65536,t=1,p=1$olntqw+EoVpwH4B1vUAI0A$5yCA1izLODgz8nQOInDGwbuQB/AS0sIQDwpmIilve5M";

   #[rstest]
   #[case("password123", true)]
   #[case("wrongpassword", false)]
   fn test_既存のハッシュで検証できる(#[case] password: &str, #[case] expected: bool) {
      let hasher = Argon2PasswordHasher::new();
      let hash = PasswordHash::new(TEST_HASH);

      assert_eq!(hasher.verify(password, &hash).unwrap(), expected);
   }

   #[test]
   fn test_ハッシュ化したパスワードを検証できる() {
      let hasher = Argon2PasswordHasher::new();

      let hash = hasher.hash("s3cret-pass").unwrap();

      assert!(hash.as_str().starts_with("$argon2id$"));
      assert!(hasher.verify("s3cret-pass", &hash).unwrap());
      assert!(!hasher.verify("other", &hash).unwrap());
   }

   #[test]
   fn test_同じパスワードでもソルトが異なる() {
      let hasher = Argon2PasswordHasher::new();

      let a = hasher.hash("same").unwrap();
      let b = hasher.hash("same").unwrap();

      assert_ne!(a.as_str(), b.as_str());
   }

   #[test]
   fn test_不正なハッシュ形式はエラー() {
      let hasher = Argon2PasswordHasher::new();
      let invalid = PasswordHash::new("not-a-valid-hash");

      assert!(hasher.verify("password123", &invalid).is_err());
   }
}
