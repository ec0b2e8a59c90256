/// 連番（i64）ベースの ID 型を定義する宣言型マクロ
///
/// 以下のボイラープレートを一括生成する:
/// - Newtype 構造体（`i64` をラップ）
/// - `derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, Serialize, Deserialize, Display, From)`
/// - `as_i64()`: 内部値の取得
///
/// ID の採番はリポジトリの責務とし、ドメイン層では採番しない。
///
/// # 使用例
///
/// ```rust
/// use farmmate_domain::community::PostId;
///
/// let id = PostId::from(42);
/// assert_eq!(id.as_i64(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
macro_rules! define_serial_id {
   (
      $(#[$meta:meta])*
      $vis:vis struct $Name:ident;
   ) => {
      $(#[$meta])*
      #[derive(
         Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
         serde::Serialize, serde::Deserialize,
         derive_more::Display, derive_more::From,
      )]
      #[display("{_0}")]
      #[serde(transparent)]
      $vis struct $Name(i64);

      impl $Name {
         /// 内部の連番を取得する
         pub fn as_i64(&self) -> i64 {
            self.0
         }
      }
   };
}

/// バリデーション付き String Newtype を定義する宣言型マクロ
///
/// - `new()`: trim + 空チェック + 最大長チェック
/// - `as_str()` / `into_string()`
///
/// 検証失敗は `Validation` 種別の [`StructuredError`](crate::StructuredError) になる。
/// `Deserialize` は derive しない（検証を迂回させないため、入力は必ず `new()` を通す）。
macro_rules! define_validated_string {
   (
      $(#[$meta:meta])*
      $vis:vis struct $Name:ident {
         label: $label:expr,
         max_length: $max_length:expr $(,)?
      }
   ) => {
      $(#[$meta])*
      #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
      #[serde(transparent)]
      $vis struct $Name(String);

      impl $Name {
         pub fn new(value: impl Into<String>) -> Result<Self, $crate::StructuredError> {
            let value = value.into().trim().to_string();

            if value.is_empty() {
               return Err($crate::StructuredError::validation()
                  .with_message(format!("{} is required", $label)));
            }

            if value.chars().count() > $max_length {
               return Err($crate::StructuredError::validation().with_message(format!(
                  "{} must be at most {} characters",
                  $label, $max_length
               )));
            }

            Ok(Self(value))
         }

         /// 文字列参照を取得する
         pub fn as_str(&self) -> &str {
            &self.0
         }

         /// 所有権を持つ文字列に変換する
         pub fn into_string(self) -> String {
            self.0
         }
      }

      impl std::fmt::Display for $Name {
         fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
         }
      }
   };
}
