//! # FarmMate API サーバー
//!
//! 会員・掲示板・害虫診断・農業相談チャット・土壌情報の API を提供する。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `API_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `API_PORT` | No | ポート番号（デフォルト: `8000`） |
//! | `SESSION_COOKIE_NAME` | No | セッション Cookie 名（デフォルト: `sessionid`） |
//! | `MEDIA_BASE_URL` | No | 画像 URL の先頭 |
//! | `CROP_CODE_CSV` | No | 作物コード表 CSV のパス |
//! | `LOG_FORMAT` | No | `json` または `pretty` |
//! | `RUST_LOG` | No | ログフィルタ（デフォルト: `info,farmmate=debug`） |
//!
//! 永続化と外部サービスはインメモリ実装と未設定スタブで起動する。
//! 未設定の外部サービスを使う API は 500 のフォールバック応答を返す。
//!
//! ## 起動方法
//!
//! ```bash
//! cargo run -p farmmate-api
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use farmmate_api::{
   app_builder::{AppDependencies, build_router},
   config::ApiConfig,
};
use farmmate_domain::clock::SystemClock;
use farmmate_infra::{
   Argon2PasswordHasher,
   CropCatalog,
   InMemoryCropCatalog,
   InMemoryObjectStorage,
   InMemorySessionManager,
   Unconfigured,
   repository::{
      InMemoryChatLogRepository,
      InMemoryCommentRepository,
      InMemoryDetectionRepository,
      InMemoryPestRepository,
      InMemoryPostRepository,
      InMemoryUserRepository,
   },
};
use farmmate_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// API サーバーのエントリーポイント
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. 設定の読み込み
/// 4. 依存関係の生成とルーターの構築
/// 5. HTTP サーバーの起動
#[tokio::main]
async fn main() -> anyhow::Result<()> {
   // .env ファイルを読み込む（存在する場合）
   dotenvy::dotenv().ok();

   let tracing_config = TracingConfig::from_env("farmmate-api");
   let _app_span = init_tracing(&tracing_config).entered();

   let config = ApiConfig::from_env().context("設定の読み込みに失敗しました")?;
   tracing::info!("API サーバーを起動します: {}:{}", config.host, config.port);

   let crop_catalog: Arc<dyn CropCatalog> = match &config.crop_code_csv {
      Some(path) => Arc::new(
         InMemoryCropCatalog::from_path(path)
            .with_context(|| format!("作物コード表の読み込みに失敗しました: {}", path.display()))?,
      ),
      None => Arc::new(InMemoryCropCatalog::default()),
   };

   let deps = AppDependencies {
      users: Arc::new(InMemoryUserRepository::new()),
      posts: Arc::new(InMemoryPostRepository::new()),
      comments: Arc::new(InMemoryCommentRepository::new()),
      pests: Arc::new(InMemoryPestRepository::new(Vec::new())),
      detections: Arc::new(InMemoryDetectionRepository::new()),
      chat_logs: Arc::new(InMemoryChatLogRepository::new()),
      sessions: Arc::new(InMemorySessionManager::default()),
      password_hasher: Arc::new(Argon2PasswordHasher::new()),
      object_storage: Arc::new(InMemoryObjectStorage::new(config.media_base_url.clone())),
      pest_classifier: Arc::new(Unconfigured),
      chat_service: Arc::new(Unconfigured),
      geocoder: Arc::new(Unconfigured),
      soil_exam_source: Arc::new(Unconfigured),
      fertilizer_source: Arc::new(Unconfigured),
      crop_catalog,
      clock: Arc::new(SystemClock),
   };

   let app = build_router(&config, deps);

   let addr: SocketAddr = format!("{}:{}", config.host, config.port)
      .parse()
      .context("アドレスのパースに失敗しました")?;

   let listener = TcpListener::bind(addr).await?;
   tracing::info!("API サーバーが起動しました: {}", addr);

   axum::serve(listener, app).await?;

   Ok(())
}
