//! # FarmMate インフラ層
//!
//! 永続化・セッション・オブジェクトストレージ・外部サービスを
//! トレイトとして定義し、その実装を提供する。
//!
//! ## 依存関係
//!
//! ```text
//! api → infra → domain
//! ```
//!
//! ユースケースはトレイトオブジェクト（`Arc<dyn Trait>`）で依存先を受け取る。
//! このクレートの実装はインメモリ版と、外部サービス未設定時の [`Unconfigured`] のみ。
//!
//! ## モジュール構成
//!
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリトレイトとインメモリ実装
//! - [`session`] - セッション管理
//! - [`password`] - Argon2id パスワードハッシュ
//! - [`storage`] - 画像のオブジェクトストレージ
//! - [`external`] - 画像分類・チャット・ジオコーダ・公開データ API
//! - [`crop_catalog`] - 作物コード表

pub mod crop_catalog;
pub mod error;
pub mod external;
pub mod password;
pub mod repository;
pub mod session;
pub mod storage;

pub use crop_catalog::{CropCatalog, InMemoryCropCatalog};
pub use error::{InfraError, InfraErrorKind};
pub use external::{
   ChatService,
   FertilizerSource,
   Geocoder,
   PestClassifier,
   SoilExamSource,
   Unconfigured,
};
pub use password::{Argon2PasswordHasher, PasswordHasher};
pub use session::{InMemorySessionManager, SessionData, SessionManager};
pub use storage::{InMemoryObjectStorage, ObjectStorage};
