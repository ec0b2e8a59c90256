//! # 土壌ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /soil/get-crop-names/` - 作物名一覧
//! - `POST /soil/soil_exam/` - 住所の土壌検査結果（要ログイン）
//! - `POST /soil/get-soil-fertilizer-info/` - 施肥処方

use std::sync::Arc;

use axum::{
   Json,
   extract::{FromRef, State},
   response::IntoResponse,
};
use farmmate_domain::soil::{FertilizerRecommendation, SoilExamRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
   error::ApiError,
   extract::AppJson,
   session::{Authenticated, SessionGate},
   usecase::SoilUseCaseImpl,
};

/// 土壌 API の共有状態
pub struct SoilState {
   pub usecase: SoilUseCaseImpl,
   pub gate:    SessionGate,
}

impl FromRef<Arc<SoilState>> for SessionGate {
   fn from_ref(state: &Arc<SoilState>) -> Self {
      state.gate.clone()
   }
}

#[derive(Debug, Serialize)]
pub struct CropNamesResponse {
   pub crop_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SoilExamRequest {
   pub crop_name: Option<String>,
   pub address:   Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SoilExamResponse {
   pub crop_name: String,
   pub address:   String,
   pub soil_data: Vec<SoilExamRecord>,
}

#[derive(Debug, Serialize)]
pub struct FertilizerResponse {
   pub data: Vec<FertilizerRecommendation>,
}

/// GET /soil/get-crop-names/
#[tracing::instrument(skip_all)]
pub async fn crop_names(State(state): State<Arc<SoilState>>) -> impl IntoResponse {
   Json(CropNamesResponse {
      crop_names: state.usecase.crop_names(),
   })
}

/// POST /soil/soil_exam/
#[tracing::instrument(skip_all)]
pub async fn soil_exam(
   State(state): State<Arc<SoilState>>,
   Authenticated(_session): Authenticated,
   AppJson(req): AppJson<SoilExamRequest>,
) -> Result<impl IntoResponse, ApiError> {
   let result = state
      .usecase
      .soil_exam(req.crop_name, req.address)
      .await?;

   Ok(Json(SoilExamResponse {
      crop_name: result.crop_name,
      address:   result.address,
      soil_data: result.soil_data,
   }))
}

/// POST /soil/get-soil-fertilizer-info/
///
/// 本文は `crop_code`（作物名）と各土壌測定値を持つ任意の JSON オブジェクト。
#[tracing::instrument(skip_all)]
pub async fn soil_fertilizer_info(
   State(state): State<Arc<SoilState>>,
   AppJson(body): AppJson<Value>,
) -> Result<impl IntoResponse, ApiError> {
   let data = state.usecase.fertilizer(&body).await?;
   Ok(Json(FertilizerResponse { data }))
}
