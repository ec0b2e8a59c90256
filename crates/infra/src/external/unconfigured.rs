//! 未設定の外部サービス
//!
//! 実クライアントが注入されていない外部サービスの代わりに使う。
//! 呼び出しは警告ログを出して Unavailable エラーを返す。

use async_trait::async_trait;
use farmmate_domain::{
   chat::ChatExchange,
   pest::Classification,
   soil::{FertilizerQuery, FertilizerRecommendation, SoilExamRecord},
};

use super::{ChatService, FertilizerSource, Geocoder, PestClassifier, SoilExamSource};
use crate::InfraError;

/// 未設定の外部サービス（すべての呼び出しが失敗する）
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

fn unavailable(service: &'static str) -> InfraError {
   tracing::warn!(service, "Unconfigured: 外部サービスが設定されていません");
   InfraError::unavailable(format!("{service} is not configured"))
}

#[async_trait]
impl PestClassifier for Unconfigured {
   async fn classify(&self, _image: &[u8]) -> Result<Classification, InfraError> {
      Err(unavailable("pest classifier"))
   }
}

#[async_trait]
impl ChatService for Unconfigured {
   async fn answer(
      &self,
      _question: &str,
      _history: &[ChatExchange],
   ) -> Result<String, InfraError> {
      Err(unavailable("chat service"))
   }
}

#[async_trait]
impl Geocoder for Unconfigured {
   async fn legal_dong_code(&self, _address: &str) -> Result<Option<String>, InfraError> {
      Err(unavailable("geocoder"))
   }
}

#[async_trait]
impl SoilExamSource for Unconfigured {
   async fn fetch(&self, _legal_dong_code: &str) -> Result<Vec<SoilExamRecord>, InfraError> {
      Err(unavailable("soil exam source"))
   }
}

#[async_trait]
impl FertilizerSource for Unconfigured {
   async fn recommend(
      &self,
      _query: &FertilizerQuery,
   ) -> Result<Vec<FertilizerRecommendation>, InfraError> {
      Err(unavailable("fertilizer source"))
   }
}
