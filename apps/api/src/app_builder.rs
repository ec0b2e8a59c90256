//! # アプリケーション構築
//!
//! 依存関係（リポジトリ・セッション・外部サービス）を受け取り、
//! ユースケース → State → Router の順に組み立てる。
//! `main.rs` は依存関係の生成とサーバー起動に集中する。

use std::sync::Arc;

use axum::{
   Router,
   routing::{delete, get, post},
};
use farmmate_domain::{ErrorKind, clock::Clock};
use farmmate_infra::{
   ChatService,
   CropCatalog,
   FertilizerSource,
   Geocoder,
   ObjectStorage,
   PasswordHasher,
   PestClassifier,
   SessionManager,
   SoilExamSource,
   repository::{
      ChatLogRepository,
      CommentRepository,
      DetectionRepository,
      PestRepository,
      PostRepository,
      UserRepository,
   },
};
use tower_http::{
   catch_panic::CatchPanicLayer,
   request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
   trace::TraceLayer,
};

use crate::{
   config::ApiConfig,
   error::{ApiError, handle_panic},
   handler::{
      AuthState,
      ChatbotState,
      CommunityState,
      DetectState,
      SoilState,
      ask,
      auth_check,
      change_password,
      change_username,
      chat_history,
      chat_sessions,
      check_username,
      clear_chat_logs,
      create_comment,
      create_post,
      crop_names,
      delete_account,
      delete_chat_session,
      delete_comment,
      delete_detection_session,
      delete_post,
      detection_session_details,
      edit_comment,
      edit_post,
      get_post,
      health_check,
      list_comments,
      list_detection_sessions,
      list_posts,
      login,
      logout,
      my_commented_posts,
      my_posts,
      signup,
      soil_exam,
      soil_fertilizer_info,
      upload_image_for_detection,
   },
   session::SessionGate,
   usecase::{
      AuthUseCaseImpl,
      ChatbotUseCaseImpl,
      CommunityUseCaseImpl,
      DetectUseCaseImpl,
      SoilUseCaseImpl,
   },
};

/// ルーターに注入する依存関係
///
/// 具象型はここで `Arc<dyn Trait>` に coerce する。
pub struct AppDependencies {
   pub users:             Arc<dyn UserRepository>,
   pub posts:             Arc<dyn PostRepository>,
   pub comments:          Arc<dyn CommentRepository>,
   pub pests:             Arc<dyn PestRepository>,
   pub detections:        Arc<dyn DetectionRepository>,
   pub chat_logs:         Arc<dyn ChatLogRepository>,
   pub sessions:          Arc<dyn SessionManager>,
   pub password_hasher:   Arc<dyn PasswordHasher>,
   pub object_storage:    Arc<dyn ObjectStorage>,
   pub pest_classifier:   Arc<dyn PestClassifier>,
   pub chat_service:      Arc<dyn ChatService>,
   pub geocoder:          Arc<dyn Geocoder>,
   pub soil_exam_source:  Arc<dyn SoilExamSource>,
   pub fertilizer_source: Arc<dyn FertilizerSource>,
   pub crop_catalog:      Arc<dyn CropCatalog>,
   pub clock:             Arc<dyn Clock>,
}

/// ユースケースと State を組み立て、ルーターを構築する
pub fn build_router(config: &ApiConfig, deps: AppDependencies) -> Router {
   let gate = SessionGate::new(deps.sessions.clone(), config.session_cookie_name.clone());

   let auth_state = Arc::new(AuthState {
      usecase: AuthUseCaseImpl::new(
         deps.users.clone(),
         deps.password_hasher,
         deps.sessions,
      ),
      gate:    gate.clone(),
   });

   let community_state = Arc::new(CommunityState {
      usecase: CommunityUseCaseImpl::new(
         deps.posts,
         deps.comments,
         deps.users,
         deps.object_storage.clone(),
      ),
      gate:    gate.clone(),
   });

   let detect_state = Arc::new(DetectState {
      usecase: DetectUseCaseImpl::new(
         deps.pest_classifier,
         deps.pests,
         deps.detections,
         deps.object_storage,
         deps.clock.clone(),
      ),
      gate:    gate.clone(),
   });

   let chatbot_state = Arc::new(ChatbotState {
      usecase: ChatbotUseCaseImpl::new(deps.chat_service, deps.chat_logs, deps.clock),
      gate:    gate.clone(),
   });

   let soil_state = Arc::new(SoilState {
      usecase: SoilUseCaseImpl::new(
         deps.crop_catalog,
         deps.geocoder,
         deps.soil_exam_source,
         deps.fertilizer_source,
      ),
      gate,
   });

   // ルーター構築
   // パスは既存クライアントに合わせて末尾スラッシュ付き
   Router::new()
      .route("/health", get(health_check))
      // 会員・認証 API
      .route("/login/signup/", post(signup))
      .route("/login/check_username/", get(check_username))
      .route("/login/login/", post(login))
      .route("/login/logout/", post(logout))
      .route("/login/auth_check/", get(auth_check))
      .route("/login/change_password/", post(change_password))
      .route("/login/change_username/", post(change_username))
      .route("/login/delete_account/", post(delete_account))
      .with_state(auth_state)
      // 掲示板 API
      .route("/community/", get(list_posts))
      .route("/community/post/create/", post(create_post))
      .route("/community/post/{post_id}/", get(get_post))
      .route("/community/post/{post_id}/edit/", post(edit_post))
      .route("/community/post/{post_id}/delete/", post(delete_post))
      .route(
         "/community/post/{post_id}/comments/",
         get(list_comments).post(create_comment),
      )
      .route(
         "/community/post/{post_id}/comment/create/",
         post(create_comment),
      )
      .route(
         "/community/comment/{comment_id}/edit/",
         post(edit_comment),
      )
      .route(
         "/community/comment/{comment_id}/delete/",
         post(delete_comment),
      )
      .route("/community/myposts/", get(my_posts))
      .route("/community/mycommentedposts/", get(my_commented_posts))
      .with_state(community_state)
      // 害虫診断 API
      .route("/detect/upload/", post(upload_image_for_detection))
      .route(
         "/detect/list_detection_sessions/",
         get(list_detection_sessions),
      )
      .route(
         "/detect/detection_session_details/{session_id}/",
         get(detection_session_details),
      )
      .route(
         "/detect/delete_detection_session/{session_id}/",
         delete(delete_detection_session),
      )
      .with_state(detect_state)
      // 農業相談チャット API
      .route("/selfchatbot/chatbot/", post(ask))
      .route("/selfchatbot/clear_logs/", post(clear_chat_logs))
      .route("/selfchatbot/chat_sessions/", get(chat_sessions))
      .route(
         "/selfchatbot/chat_history/{session_id}/",
         get(chat_history),
      )
      .route(
         "/selfchatbot/delete_session/{session_id}/",
         delete(delete_chat_session),
      )
      .with_state(chatbot_state)
      // 土壌 API
      .route("/soil/get-crop-names/", get(crop_names))
      .route("/soil/soil_exam/", post(soil_exam))
      .route(
         "/soil/get-soil-fertilizer-info/",
         post(soil_fertilizer_info),
      )
      .with_state(soil_state)
      // ルート外の失敗も同じエラー形式で返す
      .method_not_allowed_fallback(method_not_allowed)
      .fallback(route_not_found)
      // レイヤー順序: 下に書いたものが外側
      // 1. SetRequestIdLayer（最外）: リクエスト ID を採番（クライアント提供値があればそれを使う）
      // 2. TraceLayer: リクエスト単位のスパンとログ
      // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
      // 4. CatchPanicLayer（最内）: ハンドラの panic をフォールバック応答に変換
      .layer(CatchPanicLayer::custom(handle_panic))
      .layer(PropagateRequestIdLayer::x_request_id())
      .layer(TraceLayer::new_for_http())
      .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// 一致するルートがない
async fn route_not_found() -> ApiError {
   ErrorKind::NotFound.into()
}

/// ルートは一致したがメソッドが許可されていない
async fn method_not_allowed() -> ApiError {
   ErrorKind::InvalidRequest.into()
}
