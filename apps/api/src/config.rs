//! # API サーバー設定
//!
//! 環境変数から設定を読み込む。
//!
//! | 変数名 | 既定値 | 説明 |
//! |--------|--------|------|
//! | `API_HOST` | `0.0.0.0` | バインドアドレス |
//! | `API_PORT` | `8000` | ポート番号 |
//! | `SESSION_COOKIE_NAME` | `sessionid` | セッション Cookie 名 |
//! | `MEDIA_BASE_URL` | `http://localhost:8000/media` | 画像 URL の先頭 |
//! | `CROP_CODE_CSV` | なし | 作物コード表（`crop_name,crop_code`）のパス |

use std::{env, path::PathBuf};

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SESSION_COOKIE_NAME: &str = "sessionid";
const DEFAULT_MEDIA_BASE_URL: &str = "http://localhost:8000/media";

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
   #[error("API_PORT は有効なポート番号である必要があります: {0:?}")]
   InvalidPort(String),
}

/// API サーバーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
   pub host:                String,
   pub port:                u16,
   pub session_cookie_name: String,
   pub media_base_url:      String,
   pub crop_code_csv:       Option<PathBuf>,
}

impl ApiConfig {
   /// 環境変数から設定を読み込む
   pub fn from_env() -> Result<Self, ConfigError> {
      Self::from_lookup(|key| env::var(key).ok())
   }

   /// キーから値を引く関数で設定を組み立てる
   ///
   /// 空文字列は未設定として扱う。
   pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
      let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

      let port = match get("API_PORT") {
         Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort(raw))?,
         None => DEFAULT_PORT,
      };

      Ok(Self {
         host: get("API_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
         port,
         session_cookie_name: get("SESSION_COOKIE_NAME")
            .unwrap_or_else(|| DEFAULT_SESSION_COOKIE_NAME.to_string()),
         media_base_url: get("MEDIA_BASE_URL")
            .unwrap_or_else(|| DEFAULT_MEDIA_BASE_URL.to_string()),
         crop_code_csv: get("CROP_CODE_CSV").map(PathBuf::from),
      })
   }
}

#[cfg(test)]
mod tests {
   use std::collections::HashMap;

   use pretty_assertions::assert_eq;

   use super::*;

   fn config_from(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
      let vars: HashMap<String, String> = pairs
         .iter()
         .map(|(k, v)| (k.to_string(), v.to_string()))
         .collect();
      ApiConfig::from_lookup(|key| vars.get(key).cloned())
   }

   #[test]
   fn test_未設定なら既定値() {
      let config = config_from(&[]).unwrap();

      assert_eq!(
         config,
         ApiConfig {
            host:                "0.0.0.0".to_string(),
            port:                8000,
            session_cookie_name: "sessionid".to_string(),
            media_base_url:      "http://localhost:8000/media".to_string(),
            crop_code_csv:       None,
         }
      );
   }

   #[test]
   fn test_環境変数の値を使う() {
      let config = config_from(&[
         ("API_HOST", "127.0.0.1"),
         ("API_PORT", "9000"),
         ("SESSION_COOKIE_NAME", "farm_session"),
         ("CROP_CODE_CSV", "soil/crop_code.csv"),
      ])
      .unwrap();

      assert_eq!(config.host, "127.0.0.1");
      assert_eq!(config.port, 9000);
      assert_eq!(config.session_cookie_name, "farm_session");
      assert_eq!(config.crop_code_csv, Some(PathBuf::from("soil/crop_code.csv")));
   }

   #[test]
   fn test_不正なポートはエラー() {
      assert_eq!(
         config_from(&[("API_PORT", "eighty")]),
         Err(ConfigError::InvalidPort("eighty".to_string()))
      );
      assert!(config_from(&[("API_PORT", "70000")]).is_err());
   }

   #[test]
   fn test_空文字列は未設定扱い() {
      let config = config_from(&[("API_HOST", ""), ("API_PORT", " ")]).unwrap();

      assert_eq!(config.host, "0.0.0.0");
      assert_eq!(config.port, 8000);
   }
}
