//! # 外部サービス
//!
//! 画像分類・農業相談チャット・住所ジオコーディング・土壌検査/施肥処方の
//! 公開データ API を、ユースケースから見たトレイトとして定義する。
//!
//! 実クライアントはこのクレートの外で実装して注入する。
//! 何も注入しない場合は [`Unconfigured`] を使い、呼び出しは
//! [`InfraErrorKind::Unavailable`](crate::error::InfraErrorKind::Unavailable) になる。

pub mod unconfigured;

use async_trait::async_trait;
use farmmate_domain::{
   chat::ChatExchange,
   pest::Classification,
   soil::{FertilizerQuery, FertilizerRecommendation, SoilExamRecord},
};
pub use unconfigured::Unconfigured;

use crate::InfraError;

/// 害虫画像分類器
#[async_trait]
pub trait PestClassifier: Send + Sync {
   /// 画像を分類し、害虫 ID と確信度を返す
   async fn classify(&self, image: &[u8]) -> Result<Classification, InfraError>;
}

/// 農業相談チャットの回答生成
#[async_trait]
pub trait ChatService: Send + Sync {
   /// 同じセッションの過去のやり取りを文脈として回答を生成する
   async fn answer(&self, question: &str, history: &[ChatExchange]) -> Result<String, InfraError>;
}

/// 住所から法定洞コード（BJD コード）を引くジオコーダ
#[async_trait]
pub trait Geocoder: Send + Sync {
   /// 該当する住所がない場合は `None`
   async fn legal_dong_code(&self, address: &str) -> Result<Option<String>, InfraError>;
}

/// 土壌検査結果の公開データ API
#[async_trait]
pub trait SoilExamSource: Send + Sync {
   async fn fetch(&self, legal_dong_code: &str) -> Result<Vec<SoilExamRecord>, InfraError>;
}

/// 施肥処方の公開データ API
#[async_trait]
pub trait FertilizerSource: Send + Sync {
   async fn recommend(
      &self,
      query: &FertilizerQuery,
   ) -> Result<Vec<FertilizerRecommendation>, InfraError>;
}
