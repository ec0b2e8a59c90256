//! # オブジェクトストレージ
//!
//! アップロードされた画像を保存し、公開 URL を返す。
//!
//! キーは `{prefix}/{uuid}_{ファイル名}` 形式。同名のファイルを上書きしない。

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::InfraError;

/// 掲示板画像のプレフィックス
pub const POST_IMAGE_PREFIX: &str = "post_board";

/// 害虫診断画像のプレフィックス
pub const PEST_IMAGE_PREFIX: &str = "pest_detection";

/// 保存済みオブジェクト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
   pub content_type: String,
   pub body:         Bytes,
}

/// オブジェクトストレージトレイト
#[async_trait]
pub trait ObjectStorage: Send + Sync {
   /// オブジェクトを保存し、キーを返す
   async fn put(
      &self,
      prefix: &str,
      file_name: &str,
      content_type: &str,
      body: Bytes,
   ) -> Result<String, InfraError>;

   /// キーから公開 URL を組み立てる
   fn url(&self, key: &str) -> String;
}

/// キーを生成する
///
/// パス区切りを含むファイル名は最後の要素だけを使う。
fn object_key(prefix: &str, file_name: &str) -> String {
   let base = file_name
      .rsplit(['/', '\\'])
      .next()
      .filter(|s| !s.is_empty())
      .unwrap_or("upload");
   format!("{prefix}/{}_{base}", Uuid::new_v4().simple())
}

/// インメモリのオブジェクトストレージ
#[derive(Debug)]
pub struct InMemoryObjectStorage {
   base_url: String,
   objects:  RwLock<HashMap<String, StoredObject>>,
}

impl InMemoryObjectStorage {
   /// `base_url` は URL の先頭に付ける（末尾の `/` は除去する）
   pub fn new(base_url: impl Into<String>) -> Self {
      Self {
         base_url: base_url.into().trim_end_matches('/').to_string(),
         objects:  RwLock::new(HashMap::new()),
      }
   }

   /// 保存済みオブジェクトを取得する
   pub async fn get(&self, key: &str) -> Option<StoredObject> {
      self.objects.read().await.get(key).cloned()
   }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
   async fn put(
      &self,
      prefix: &str,
      file_name: &str,
      content_type: &str,
      body: Bytes,
   ) -> Result<String, InfraError> {
      let key = object_key(prefix, file_name);
      tracing::debug!(%key, size = body.len(), "オブジェクトを保存");

      self.objects.write().await.insert(
         key.clone(),
         StoredObject {
            content_type: content_type.to_string(),
            body,
         },
      );
      Ok(key)
   }

   fn url(&self, key: &str) -> String {
      format!("{}/{key}", self.base_url)
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;

   #[tokio::test]
   async fn test_保存したオブジェクトを取得できる() {
      let storage = InMemoryObjectStorage::new("https://cdn.example.com/");

      let key = storage
         .put(POST_IMAGE_PREFIX, "leaf.png", "image/png", Bytes::from_static(b"png"))
         .await
         .unwrap();

      assert!(key.starts_with("post_board/"));
      assert!(key.ends_with("_leaf.png"));
      assert_eq!(storage.url(&key), format!("https://cdn.example.com/{key}"));

      let stored = storage.get(&key).await.unwrap();
      assert_eq!(stored.content_type, "image/png");
      assert_eq!(stored.body, Bytes::from_static(b"png"));
   }

   #[tokio::test]
   async fn test_同名ファイルでもキーは重複しない() {
      let storage = InMemoryObjectStorage::new("http://localhost");

      let a = storage
         .put(PEST_IMAGE_PREFIX, "a.jpg", "image/jpeg", Bytes::new())
         .await
         .unwrap();
      let b = storage
         .put(PEST_IMAGE_PREFIX, "a.jpg", "image/jpeg", Bytes::new())
         .await
         .unwrap();

      assert_ne!(a, b);
   }

   #[test]
   fn test_ファイル名のパスは除去される() {
      let key = object_key(PEST_IMAGE_PREFIX, "../../etc/passwd");
      assert!(key.starts_with("pest_detection/"));
      assert!(key.ends_with("_passwd"));
      assert!(!key.contains(".."));

      assert!(object_key(POST_IMAGE_PREFIX, "").ends_with("_upload"));
   }
}
