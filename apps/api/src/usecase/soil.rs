//! 土壌検査・施肥処方ユースケース

use std::sync::Arc;

use farmmate_domain::{
   StructuredError,
   soil::{FertilizerQuery, FertilizerRecommendation, SoilExamRecord},
};
use farmmate_infra::{CropCatalog, FertilizerSource, Geocoder, SoilExamSource};
use serde_json::Value;

use super::{non_empty, validation_error};
use crate::error::ApiError;

/// 土壌検査結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoilExamResult {
   pub crop_name: String,
   pub address:   String,
   pub soil_data: Vec<SoilExamRecord>,
}

/// 土壌・施肥ユースケース
pub struct SoilUseCaseImpl {
   crop_catalog:      Arc<dyn CropCatalog>,
   geocoder:          Arc<dyn Geocoder>,
   soil_exam_source:  Arc<dyn SoilExamSource>,
   fertilizer_source: Arc<dyn FertilizerSource>,
}

impl SoilUseCaseImpl {
   pub fn new(
      crop_catalog: Arc<dyn CropCatalog>,
      geocoder: Arc<dyn Geocoder>,
      soil_exam_source: Arc<dyn SoilExamSource>,
      fertilizer_source: Arc<dyn FertilizerSource>,
   ) -> Self {
      Self {
         crop_catalog,
         geocoder,
         soil_exam_source,
         fertilizer_source,
      }
   }

   /// 作物コード表の作物名一覧
   pub fn crop_names(&self) -> Vec<String> {
      self.crop_catalog.crop_names()
   }

   /// 住所の土壌検査結果を取得する
   ///
   /// 住所を法定洞コードに変換し、そのコードの検査データを引く。
   pub async fn soil_exam(
      &self,
      crop_name: Option<String>,
      address: Option<String>,
   ) -> Result<SoilExamResult, ApiError> {
      let (Some(crop_name), Some(address)) = (non_empty(crop_name), non_empty(address)) else {
         return Err(validation_error("Address and crop name are required"));
      };

      let code = self
         .geocoder
         .legal_dong_code(&address)
         .await?
         .ok_or_else(|| not_found("No valid address information found."))?;

      let soil_data = self.soil_exam_source.fetch(&code).await?;
      if soil_data.is_empty() {
         return Err(not_found("No data available for this BJD Code."));
      }

      Ok(SoilExamResult {
         crop_name,
         address,
         soil_data,
      })
   }

   /// 作物名と土壌測定値から施肥処方を取得する
   ///
   /// `crop_code` には作物名を受け取り、コード表で 5 桁の作物コードに変換する。
   /// 測定値は数値・数値文字列のどちらも受け付け、範囲外は丸め、不正値は最小値とする。
   pub async fn fertilizer(&self, body: &Value) -> Result<Vec<FertilizerRecommendation>, ApiError> {
      let crop_name = match body.get("crop_code") {
         None | Some(Value::Null) => return Err(missing_crop_code()),
         Some(Value::String(name)) if name.is_empty() => return Err(missing_crop_code()),
         Some(Value::String(name)) => Some(name.as_str()),
         Some(_) => None,
      };

      let crop_code = crop_name
         .and_then(|name| self.crop_catalog.code_for(name))
         .ok_or_else(|| validation_error("Invalid crop name provided"))?;

      let query = FertilizerQuery::new(crop_code, |key| body.get(key));
      tracing::debug!(crop_code = query.crop_code.as_str(), "施肥処方を照会");

      let items = self.fertilizer_source.recommend(&query).await?;
      if items.is_empty() {
         return Err(not_found("No items found in response"));
      }
      Ok(items)
   }
}

fn not_found(message: &str) -> ApiError {
   StructuredError::not_found().with_message(message).into()
}

fn missing_crop_code() -> ApiError {
   StructuredError::missing_part()
      .with_message("Missing crop code")
      .into()
}
