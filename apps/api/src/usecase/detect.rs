//! 害虫画像診断ユースケース
//!
//! 画像を分類器にかけ、結果の害虫情報と画像を診断履歴として保存する。

use std::{collections::HashMap, sync::Arc};

use anyhow::anyhow;
use farmmate_domain::{
   StructuredError,
   clock::Clock,
   pest::{Classification, DEFAULT_PEST_ID, DetectionId, NewDetection, Pest, PestDetection, PestId},
   user::UserId,
};
use farmmate_infra::{
   ObjectStorage,
   PestClassifier,
   repository::{DetectionRepository, PestRepository},
   storage::PEST_IMAGE_PREFIX,
};

use super::{community::INVALID_IMAGE_MESSAGE, validation_error};
use crate::{error::ApiError, extract::UploadedFile};

const SESSION_NOT_FOUND: &str = "Detection session not found";

/// 診断履歴と害虫情報
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionRecord {
   pub detection: PestDetection,
   pub pest:      Pest,
   pub image_url: String,
}

/// 害虫診断ユースケース
pub struct DetectUseCaseImpl {
   pest_classifier:      Arc<dyn PestClassifier>,
   pest_repository:      Arc<dyn PestRepository>,
   detection_repository: Arc<dyn DetectionRepository>,
   object_storage:       Arc<dyn ObjectStorage>,
   clock:                Arc<dyn Clock>,
}

impl DetectUseCaseImpl {
   pub fn new(
      pest_classifier: Arc<dyn PestClassifier>,
      pest_repository: Arc<dyn PestRepository>,
      detection_repository: Arc<dyn DetectionRepository>,
      object_storage: Arc<dyn ObjectStorage>,
      clock: Arc<dyn Clock>,
   ) -> Self {
      Self {
         pest_classifier,
         pest_repository,
         detection_repository,
         object_storage,
         clock,
      }
   }

   /// 画像から害虫を診断する
   ///
   /// 1. 画像の有無と種別の確認
   /// 2. 分類器で害虫 ID と確信度を得る
   /// 3. 該当する害虫が未登録なら既定の害虫・確信度 0 に切り替える
   /// 4. 画像を保存し、診断履歴を登録する
   pub async fn detect(
      &self,
      user_id: UserId,
      image: Option<UploadedFile>,
   ) -> Result<DetectionRecord, ApiError> {
      let image = image.ok_or_else(|| {
         ApiError::from(StructuredError::missing_part().with_message("No image uploaded."))
      })?;
      if !image.is_image() {
         return Err(validation_error(INVALID_IMAGE_MESSAGE));
      }

      let classification = self.pest_classifier.classify(&image.body).await?;
      let (pest, classification) = match self
         .pest_repository
         .find_by_id(classification.pest_id)
         .await?
      {
         Some(pest) => (pest, classification),
         None => {
            tracing::warn!(
               pest_id = %classification.pest_id,
               "分類結果の害虫が未登録のため既定の害虫に切り替えます"
            );
            let fallback = Classification::unrecognized();
            (self.load_pest(fallback.pest_id).await?, fallback)
         }
      };

      let image_key = self
         .object_storage
         .put(
            PEST_IMAGE_PREFIX,
            &image.file_name,
            image.content_type.as_deref().unwrap_or_default(),
            image.body,
         )
         .await?;

      let detection = self
         .detection_repository
         .insert(NewDetection {
            user_id,
            pest_id: pest.id,
            image_key,
            detection_date: self.clock.now(),
            confidence: classification.confidence,
         })
         .await?;

      tracing::info!(
         detection_id = %detection.id(),
         pest_id = %pest.id,
         confidence = classification.confidence,
         "害虫診断を記録しました"
      );
      Ok(self.record(detection, pest))
   }

   /// 診断履歴を新しい順で取得する
   pub async fn list_sessions(&self, user_id: UserId) -> Result<Vec<DetectionRecord>, ApiError> {
      let detections = self.detection_repository.list_by_user(user_id).await?;

      let mut pests: HashMap<PestId, Pest> = HashMap::new();
      let mut records = Vec::with_capacity(detections.len());
      for detection in detections {
         let pest = match pests.get(&detection.pest_id()) {
            Some(pest) => pest.clone(),
            None => {
               let pest = self.load_pest(detection.pest_id()).await?;
               pests.insert(pest.id, pest.clone());
               pest
            }
         };
         records.push(self.record(detection, pest));
      }
      Ok(records)
   }

   /// 自分の診断履歴を 1 件取得する
   pub async fn get_session(
      &self,
      user_id: UserId,
      detection_id: DetectionId,
   ) -> Result<DetectionRecord, ApiError> {
      let detection = self.find_own(user_id, detection_id).await?;
      let pest = self.load_pest(detection.pest_id()).await?;
      Ok(self.record(detection, pest))
   }

   /// 自分の診断履歴を削除する
   pub async fn delete_session(
      &self,
      user_id: UserId,
      detection_id: DetectionId,
   ) -> Result<(), ApiError> {
      self.find_own(user_id, detection_id).await?;
      self.detection_repository.delete(detection_id).await?;
      Ok(())
   }

   async fn find_own(
      &self,
      user_id: UserId,
      detection_id: DetectionId,
   ) -> Result<PestDetection, ApiError> {
      self.detection_repository
         .find_for_user(detection_id, user_id)
         .await?
         .ok_or_else(|| {
            StructuredError::not_found()
               .with_message(SESSION_NOT_FOUND)
               .into()
         })
   }

   /// 登録済みであるべき害虫を読み込む
   ///
   /// 既定の害虫（id 13）が未登録の場合も含め、欠落はデータ不整合として扱う。
   async fn load_pest(&self, pest_id: PestId) -> Result<Pest, ApiError> {
      self.pest_repository
         .find_by_id(pest_id)
         .await?
         .ok_or_else(|| {
            let default_note = if pest_id == DEFAULT_PEST_ID {
               "（既定の害虫）"
            } else {
               ""
            };
            ApiError::from(anyhow!("害虫マスタに id={pest_id}{default_note} がありません"))
         })
   }

   fn record(&self, detection: PestDetection, pest: Pest) -> DetectionRecord {
      let image_url = self.object_storage.url(detection.image_key());
      DetectionRecord {
         detection,
         pest,
         image_url,
      }
   }
}
