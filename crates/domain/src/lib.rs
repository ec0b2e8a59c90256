//! # FarmMate ドメイン層
//!
//! 農業コミュニティサービスのドメインモデルと、リクエスト処理中の失敗を表す
//! 構造化エラーを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! api → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、外部サービス）には一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`error`] - エラー種別と構造化エラー
//! - [`clock`] - 時刻プロバイダ
//! - [`user`] - ユーザー
//! - [`community`] - 投稿・コメント
//! - [`pest`] - 害虫診断
//! - [`chat`] - 農業相談チャット
//! - [`soil`] - 土壌検査・施肥処方

#[macro_use]
mod macros;

pub mod chat;
pub mod clock;
pub mod community;
pub mod error;
pub mod pest;
pub mod soil;
pub mod user;

pub use error::{ErrorKind, StructuredError};
