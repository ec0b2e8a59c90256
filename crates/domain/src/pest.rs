//! # 害虫診断
//!
//! 画像分類の結果（[`Classification`]）と、その診断履歴（[`PestDetection`]）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::UserId;

define_serial_id! {
   /// 害虫 ID（分類器のクラス番号と一致する）
   pub struct PestId;
}

define_serial_id! {
   /// 診断履歴 ID
   pub struct DetectionId;
}

/// 分類器の結果が害虫マスタに存在しない場合に使う害虫
pub const DEFAULT_PEST_ID: PestId = PestId(13);

/// 害虫マスタ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pest {
   pub id:                     PestId,
   pub name:                   String,
   pub occurrence_environment: String,
   pub symptom_description:    String,
   pub prevention_methods:     String,
   pub pesticide_name:         String,
}

/// 画像分類の結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
   pub pest_id:    PestId,
   /// 確信度（0.0〜1.0）
   pub confidence: f64,
}

impl Classification {
   /// 害虫マスタに該当がない場合の結果
   ///
   /// 既定の害虫に差し替え、確信度は 0 とする。
   pub fn unrecognized() -> Self {
      Self {
         pest_id:    DEFAULT_PEST_ID,
         confidence: 0.0,
      }
   }
}

/// 診断履歴の作成内容
#[derive(Debug, Clone, PartialEq)]
pub struct NewDetection {
   pub user_id:        UserId,
   pub pest_id:        PestId,
   pub image_key:      String,
   pub detection_date: DateTime<Utc>,
   pub confidence:     f64,
}

/// 診断履歴
#[derive(Debug, Clone, PartialEq)]
pub struct PestDetection {
   id:             DetectionId,
   user_id:        UserId,
   pest_id:        PestId,
   image_key:      String,
   detection_date: DateTime<Utc>,
   confidence:     f64,
}

impl PestDetection {
   pub fn new(id: DetectionId, input: NewDetection) -> Self {
      Self {
         id,
         user_id: input.user_id,
         pest_id: input.pest_id,
         image_key: input.image_key,
         detection_date: input.detection_date,
         confidence: input.confidence,
      }
   }

   pub fn id(&self) -> DetectionId {
      self.id
   }

   pub fn user_id(&self) -> UserId {
      self.user_id
   }

   pub fn pest_id(&self) -> PestId {
      self.pest_id
   }

   pub fn image_key(&self) -> &str {
      &self.image_key
   }

   pub fn detection_date(&self) -> DateTime<Utc> {
      self.detection_date
   }

   pub fn confidence(&self) -> f64 {
      self.confidence
   }
}
