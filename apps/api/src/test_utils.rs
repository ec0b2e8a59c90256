//! テスト用の外部サービススタブと依存関係ビルダー
//!
//! 単体テストと `tests/` の統合テストの両方から使う。
//! リポジトリ・セッション・ストレージはインフラ層のインメモリ実装をそのまま使い、
//! 外部サービスだけをここのスタブに差し替える。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use farmmate_domain::{
   chat::ChatExchange,
   clock::ManualClock,
   pest::{Classification, Pest, PestId},
   soil::{FertilizerQuery, FertilizerRecommendation, SoilExamRecord},
};
use farmmate_infra::{
   Argon2PasswordHasher,
   ChatService,
   FertilizerSource,
   Geocoder,
   InMemoryCropCatalog,
   InMemoryObjectStorage,
   InMemorySessionManager,
   InfraError,
   PestClassifier,
   SoilExamSource,
   repository::{
      InMemoryChatLogRepository,
      InMemoryCommentRepository,
      InMemoryDetectionRepository,
      InMemoryPestRepository,
      InMemoryPostRepository,
      InMemoryUserRepository,
   },
};
use tokio::sync::Mutex;

use crate::app_builder::AppDependencies;

/// テストで使う固定時刻（2024-05-01 09:30:00 UTC）
pub fn fixed_now() -> DateTime<Utc> {
   Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
      .single()
      .unwrap_or_default()
}

/// 害虫マスタのサンプル（id 1, 2 と既定の 13）
pub fn sample_pests() -> Vec<Pest> {
   [
      (1, "담배가루이", "고온 건조한 시설 재배지"),
      (2, "점박이응애", "건조한 환경"),
      (13, "정상", "-"),
   ]
   .into_iter()
   .map(|(id, name, environment)| Pest {
      id:                     PestId::from(id),
      name:                   name.to_string(),
      occurrence_environment: environment.to_string(),
      symptom_description:    format!("{name} の症状"),
      prevention_methods:     format!("{name} の防除"),
      pesticide_name:         format!("{name} 用薬剤"),
   })
   .collect()
}

/// 常に同じ結果を返す分類器
#[derive(Debug, Clone, Copy)]
pub struct StubPestClassifier {
   result: Classification,
}

impl StubPestClassifier {
   pub fn new(pest_id: i64, confidence: f64) -> Self {
      Self {
         result: Classification {
            pest_id: PestId::from(pest_id),
            confidence,
         },
      }
   }
}

#[async_trait]
impl PestClassifier for StubPestClassifier {
   async fn classify(&self, _image: &[u8]) -> Result<Classification, InfraError> {
      Ok(self.result)
   }
}

/// 質問をそのまま織り込んだ回答を返すチャットサービス
///
/// 最後に渡された履歴を記録する。
#[derive(Debug, Default)]
pub struct StubChatService {
   last_history: Mutex<Vec<ChatExchange>>,
}

impl StubChatService {
   pub fn new() -> Self {
      Self::default()
   }

   pub async fn last_history(&self) -> Vec<ChatExchange> {
      self.last_history.lock().await.clone()
   }
}

#[async_trait]
impl ChatService for StubChatService {
   async fn answer(&self, question: &str, history: &[ChatExchange]) -> Result<String, InfraError> {
      *self.last_history.lock().await = history.to_vec();
      Ok(format!("answer to {question}"))
   }
}

/// 住所 → 法定洞コードの固定表
#[derive(Debug, Default)]
pub struct StubGeocoder {
   codes: HashMap<String, String>,
}

impl StubGeocoder {
   pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
      Self {
         codes: entries
            .into_iter()
            .map(|(address, code)| (address.to_string(), code.to_string()))
            .collect(),
      }
   }
}

#[async_trait]
impl Geocoder for StubGeocoder {
   async fn legal_dong_code(&self, address: &str) -> Result<Option<String>, InfraError> {
      Ok(self.codes.get(address).cloned())
   }
}

/// 法定洞コード → 土壌検査 1 件（`ACID` のみ）の固定表
#[derive(Debug, Default)]
pub struct StubSoilExamSource {
   acid_by_code: HashMap<String, String>,
}

impl StubSoilExamSource {
   pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
      Self {
         acid_by_code: entries
            .into_iter()
            .map(|(code, acid)| (code.to_string(), acid.to_string()))
            .collect(),
      }
   }
}

#[async_trait]
impl SoilExamSource for StubSoilExamSource {
   async fn fetch(&self, legal_dong_code: &str) -> Result<Vec<SoilExamRecord>, InfraError> {
      Ok(self
         .acid_by_code
         .get(legal_dong_code)
         .map(|acid| {
            SoilExamRecord::from([
               ("BJD_Code".to_string(), legal_dong_code.to_string()),
               ("ACID".to_string(), acid.clone()),
            ])
         })
         .into_iter()
         .collect())
   }
}

/// 作物コード `04101` にだけ処方を返す施肥処方 API
///
/// 最後の照会条件を記録する。
#[derive(Debug, Default)]
pub struct StubFertilizerSource {
   last_query: Mutex<Option<FertilizerQuery>>,
}

impl StubFertilizerSource {
   pub const KNOWN_CROP_CODE: &'static str = "04101";

   pub fn new() -> Self {
      Self::default()
   }

   pub async fn last_query(&self) -> Option<FertilizerQuery> {
      self.last_query.lock().await.clone()
   }
}

#[async_trait]
impl FertilizerSource for StubFertilizerSource {
   async fn recommend(
      &self,
      query: &FertilizerQuery,
   ) -> Result<Vec<FertilizerRecommendation>, InfraError> {
      *self.last_query.lock().await = Some(query.clone());

      if query.crop_code.as_str() != Self::KNOWN_CROP_CODE {
         return Ok(Vec::new());
      }
      Ok(vec![FertilizerRecommendation {
         crop_code: Some(query.crop_code.as_str().to_string()),
         crop_name: Some("고추".to_string()),
         pre_fert_n: Some("19.0".to_string()),
         ..Default::default()
      }])
   }
}

/// インメモリ実装とスタブで組み立てた依存関係
///
/// 作物コード表は `고추 = 4101` と `벼 = 1` の 2 件。
pub fn test_dependencies() -> AppDependencies {
   AppDependencies {
      users:             Arc::new(InMemoryUserRepository::new()),
      posts:             Arc::new(InMemoryPostRepository::new()),
      comments:          Arc::new(InMemoryCommentRepository::new()),
      pests:             Arc::new(InMemoryPestRepository::new(sample_pests())),
      detections:        Arc::new(InMemoryDetectionRepository::new()),
      chat_logs:         Arc::new(InMemoryChatLogRepository::new()),
      sessions:          Arc::new(InMemorySessionManager::default()),
      password_hasher:   Arc::new(Argon2PasswordHasher::new()),
      object_storage:    Arc::new(InMemoryObjectStorage::new("http://media.test")),
      pest_classifier:   Arc::new(StubPestClassifier::new(1, 0.87)),
      chat_service:      Arc::new(StubChatService::new()),
      geocoder:          Arc::new(StubGeocoder::new([("서울시 강남구", "1168010100")])),
      soil_exam_source:  Arc::new(StubSoilExamSource::new([("1168010100", "6.1")])),
      fertilizer_source: Arc::new(StubFertilizerSource::new()),
      crop_catalog:      Arc::new(InMemoryCropCatalog::new([("고추", "4101"), ("벼", "1")])),
      clock:             Arc::new(ManualClock::new(fixed_now())),
   }
}
