//! # リポジトリ
//!
//! ドメインエンティティの永続化操作をトレイトとして定義し、
//! インメモリ実装を提供する。
//!
//! ユースケース層はトレイト経由でのみリポジトリに触れるため、
//! 永続化先を差し替えてもユースケースは変わらない。

pub mod chat_log_repository;
pub mod comment_repository;
pub mod detection_repository;
pub mod pest_repository;
pub mod post_repository;
pub mod user_repository;

use std::collections::BTreeMap;

pub use chat_log_repository::{ChatLogRepository, InMemoryChatLogRepository};
pub use comment_repository::{CommentRepository, InMemoryCommentRepository};
pub use detection_repository::{DetectionRepository, InMemoryDetectionRepository};
pub use pest_repository::{InMemoryPestRepository, PestRepository};
pub use post_repository::{InMemoryPostRepository, PostRepository};
pub use user_repository::{InMemoryUserRepository, UserRepository};

/// インメモリ実装の共通テーブル
///
/// 連番 ID は 1 から採番し、削除しても再利用しない。
#[derive(Debug)]
pub(crate) struct Table<T> {
   last_id: i64,
   rows:    BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
   fn default() -> Self {
      Self {
         last_id: 0,
         rows:    BTreeMap::new(),
      }
   }
}

impl<T> Table<T> {
   /// 次の ID を採番する
   pub(crate) fn next_id(&mut self) -> i64 {
      self.last_id += 1;
      self.last_id
   }

   pub(crate) fn insert(&mut self, id: i64, row: T) {
      self.rows.insert(id, row);
   }

   pub(crate) fn get(&self, id: i64) -> Option<&T> {
      self.rows.get(&id)
   }

   pub(crate) fn remove(&mut self, id: i64) -> Option<T> {
      self.rows.remove(&id)
   }

   /// ID の昇順（= 作成順）で走査する
   pub(crate) fn values(&self) -> impl DoubleEndedIterator<Item = &T> {
      self.rows.values()
   }

   pub(crate) fn retain(&mut self, mut f: impl FnMut(&T) -> bool) {
      self.rows.retain(|_, row| f(row));
   }
}
