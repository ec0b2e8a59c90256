//! # 害虫診断ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /detect/upload/` - 画像をアップロードして診断（multipart `image`）
//! - `GET /detect/list_detection_sessions/` - 診断履歴一覧
//! - `GET /detect/detection_session_details/{session_id}/` - 診断履歴の詳細
//! - `DELETE /detect/delete_detection_session/{session_id}/` - 診断履歴の削除
//!
//! いずれも要ログイン。

use std::sync::Arc;

use axum::{
   Json,
   extract::{FromRef, State},
   response::IntoResponse,
};
use farmmate_domain::pest::DetectionId;
use serde::Serialize;

use crate::{
   error::ApiError,
   extract::{AppMultipart, AppPath},
   session::{Authenticated, SessionGate},
   usecase::{DetectUseCaseImpl, DetectionRecord},
};

const LIST_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DETAIL_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// 害虫診断 API の共有状態
pub struct DetectState {
   pub usecase: DetectUseCaseImpl,
   pub gate:    SessionGate,
}

impl FromRef<Arc<DetectState>> for SessionGate {
   fn from_ref(state: &Arc<DetectState>) -> Self {
      state.gate.clone()
   }
}

/// 診断結果
#[derive(Debug, Serialize)]
pub struct DetectionResultDto {
   pub pest_name:              String,
   pub occurrence_environment: String,
   pub symptom_description:    String,
   pub prevention_methods:     String,
   pub pesticide_name:         String,
   pub confidence:             f64,
   pub image_url:              String,
}

/// 診断履歴一覧の 1 行
#[derive(Debug, Serialize)]
pub struct DetectionSessionDto {
   pub session_id:     i64,
   pub pest_name:      String,
   pub detection_date: String,
   pub confidence:     f64,
}

/// 診断履歴の詳細
#[derive(Debug, Serialize)]
pub struct DetectionDetailDto {
   pub pest_name:              String,
   pub occurrence_environment: String,
   pub symptom_description:    String,
   pub prevention_methods:     String,
   pub pesticide_name:         String,
   pub confidence:             f64,
   pub detection_date:         String,
   pub image_url:              String,
}

/// 削除結果（`{"success": ...}`）
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
   pub success: &'static str,
}

/// POST /detect/upload/
///
/// ## レスポンス
///
/// - `200 OK`: 診断結果と保存した画像の URL
/// - `400 Bad Request`: 画像なし、画像以外のファイル
/// - `401 Unauthorized`: 未ログイン
#[tracing::instrument(skip_all)]
pub async fn upload_image_for_detection(
   State(state): State<Arc<DetectState>>,
   Authenticated(session): Authenticated,
   multipart: AppMultipart,
) -> Result<impl IntoResponse, ApiError> {
   let mut form = multipart.read().await?;
   let record = state
      .usecase
      .detect(session.user_id(), form.take_file("image"))
      .await?;

   let DetectionRecord {
      detection,
      pest,
      image_url,
   } = record;
   Ok(Json(DetectionResultDto {
      pest_name: pest.name,
      occurrence_environment: pest.occurrence_environment,
      symptom_description: pest.symptom_description,
      prevention_methods: pest.prevention_methods,
      pesticide_name: pest.pesticide_name,
      confidence: detection.confidence(),
      image_url,
   }))
}

/// GET /detect/list_detection_sessions/
#[tracing::instrument(skip_all)]
pub async fn list_detection_sessions(
   State(state): State<Arc<DetectState>>,
   Authenticated(session): Authenticated,
) -> Result<impl IntoResponse, ApiError> {
   let records = state.usecase.list_sessions(session.user_id()).await?;

   let sessions: Vec<DetectionSessionDto> = records
      .into_iter()
      .map(|record| DetectionSessionDto {
         session_id:     record.detection.id().as_i64(),
         pest_name:      record.pest.name,
         detection_date: record
            .detection
            .detection_date()
            .format(LIST_DATE_FORMAT)
            .to_string(),
         confidence:     record.detection.confidence(),
      })
      .collect();
   Ok(Json(sessions))
}

/// GET /detect/detection_session_details/{session_id}/
#[tracing::instrument(skip_all, fields(%session_id))]
pub async fn detection_session_details(
   State(state): State<Arc<DetectState>>,
   Authenticated(session): Authenticated,
   AppPath(session_id): AppPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
   let DetectionRecord {
      detection,
      pest,
      image_url,
   } = state
      .usecase
      .get_session(session.user_id(), DetectionId::from(session_id))
      .await?;

   Ok(Json(DetectionDetailDto {
      pest_name: pest.name,
      occurrence_environment: pest.occurrence_environment,
      symptom_description: pest.symptom_description,
      prevention_methods: pest.prevention_methods,
      pesticide_name: pest.pesticide_name,
      confidence: detection.confidence(),
      detection_date: detection
         .detection_date()
         .format(DETAIL_DATE_FORMAT)
         .to_string(),
      image_url,
   }))
}

/// DELETE /detect/delete_detection_session/{session_id}/
#[tracing::instrument(skip_all, fields(%session_id))]
pub async fn delete_detection_session(
   State(state): State<Arc<DetectState>>,
   Authenticated(session): Authenticated,
   AppPath(session_id): AppPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
   state
      .usecase
      .delete_session(session.user_id(), DetectionId::from(session_id))
      .await?;

   Ok(Json(DeletedResponse {
      success: "Detection session deleted successfully",
   }))
}
