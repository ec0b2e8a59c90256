//! # FarmMate API ライブラリ
//!
//! 失敗を HTTP 応答に変換する層と、各機能のユースケース・ハンドラを公開する。
//!
//! ## モジュール構成
//!
//! - `app_builder`: 依存関係の注入とルーター構築
//! - `config`: 環境変数からの設定読み込み
//! - `error`: `ApiError` と HTTP 応答への変換
//! - `extract`: 失敗をエラー形式で返す extractor
//! - `handler`: HTTP ハンドラ
//! - `session`: Cookie セッションによる認証ゲート
//! - `usecase`: ユースケース

pub mod app_builder;
pub mod config;
pub mod error;
pub mod extract;
pub mod handler;
pub mod session;
pub mod usecase;

// テストユーティリティ（内部実装、ドキュメントからは隠す）
#[doc(hidden)]
pub mod test_utils;
