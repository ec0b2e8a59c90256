//! # PestRepository
//!
//! 害虫マスタの参照。マスタは起動時に投入し、実行中は変更しない。

use std::collections::HashMap;

use async_trait::async_trait;
use farmmate_domain::pest::{Pest, PestId};

use crate::error::InfraError;

/// 害虫マスタリポジトリトレイト
#[async_trait]
pub trait PestRepository: Send + Sync {
   /// ID で害虫を検索
   async fn find_by_id(&self, id: PestId) -> Result<Option<Pest>, InfraError>;
}

/// インメモリ実装の PestRepository
#[derive(Debug, Default)]
pub struct InMemoryPestRepository {
   pests: HashMap<PestId, Pest>,
}

impl InMemoryPestRepository {
   pub fn new(pests: impl IntoIterator<Item = Pest>) -> Self {
      Self {
         pests: pests.into_iter().map(|p| (p.id, p)).collect(),
      }
   }
}

#[async_trait]
impl PestRepository for InMemoryPestRepository {
   async fn find_by_id(&self, id: PestId) -> Result<Option<Pest>, InfraError> {
      Ok(self.pests.get(&id).cloned())
   }
}
