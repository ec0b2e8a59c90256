//! # ログ出力の初期化
//!
//! `LOG_FORMAT`（出力形式）と `RUST_LOG`（フィルタ）を読み、
//! プロセス全体の subscriber を一度だけ組み立てる。
//!
//! `init_tracing` はサービス名を持つ `app` スパンを返す。呼び出し側がこれを
//! `entered()` しておくと、以降のログ行に `service` が付く。

/// 未指定時のフィルタ
const DEFAULT_DIRECTIVES: &str = "info,farmmate=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
   /// 1 行 1 JSON（本番向け）
   Json,
   #[default]
   Pretty,
}

impl LogFormat {
   /// 大文字小文字を区別せずに解釈する。知らない値は `None`
   pub fn parse(value: &str) -> Option<Self> {
      match value.trim().to_ascii_lowercase().as_str() {
         "json" => Some(Self::Json),
         "pretty" => Some(Self::Pretty),
         _ => None,
      }
   }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
   service_name:    String,
   log_format:      LogFormat,
   directives:      Option<String>,
   /// 初期化後に警告する
   rejected_format: Option<String>,
}

impl TracingConfig {
   pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
      Self {
         service_name: service_name.into(),
         log_format,
         directives: None,
         rejected_format: None,
      }
   }

   /// プロセスの環境変数から読み取る
   pub fn from_env(service_name: impl Into<String>) -> Self {
      Self::from_lookup(service_name, |key| std::env::var(key).ok())
   }

   /// 任意の参照関数から読み取る
   ///
   /// 空の `RUST_LOG` は未指定として扱う。
   pub fn from_lookup(
      service_name: impl Into<String>,
      lookup: impl Fn(&str) -> Option<String>,
   ) -> Self {
      let raw_format = lookup("LOG_FORMAT");
      let log_format = raw_format.as_deref().and_then(LogFormat::parse);
      let rejected_format = raw_format.filter(|_| log_format.is_none());

      Self {
         service_name: service_name.into(),
         log_format: log_format.unwrap_or_default(),
         directives: lookup("RUST_LOG").filter(|value| !value.trim().is_empty()),
         rejected_format,
      }
   }

   pub fn service_name(&self) -> &str {
      &self.service_name
   }

   pub fn log_format(&self) -> LogFormat {
      self.log_format
   }

   /// 解釈できずに捨てた `LOG_FORMAT` の値
   pub fn rejected_format(&self) -> Option<&str> {
      self.rejected_format.as_deref()
   }

   /// `EnvFilter` に渡すディレクティブ
   pub fn filter_directives(&self) -> &str {
      self.directives.as_deref().unwrap_or(DEFAULT_DIRECTIVES)
   }
}

/// subscriber を登録し、サービスのルートスパンを返す
///
/// `ErrorLayer` を登録するため、infra 層のエラーが捕捉する `SpanTrace` は
/// 呼び出し経路を含む。`RUST_LOG` が不正なら既定のフィルタで起動する。
#[cfg(feature = "observability")]
pub fn init_tracing(config: &TracingConfig) -> tracing::Span {
   use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

   let (env_filter, bad_filter) = match EnvFilter::try_new(config.filter_directives()) {
      Ok(filter) => (filter, None),
      Err(err) => (EnvFilter::new(DEFAULT_DIRECTIVES), Some(err)),
   };

   let fmt_layer = match config.log_format {
      LogFormat::Json => tracing_subscriber::fmt::layer()
         .json()
         .flatten_event(true)
         .with_current_span(true)
         .with_span_list(false)
         .boxed(),
      LogFormat::Pretty => tracing_subscriber::fmt::layer().with_target(false).boxed(),
   };

   tracing_subscriber::registry()
      .with(env_filter)
      .with(fmt_layer)
      .with(tracing_error::ErrorLayer::default())
      .init();

   if let Some(value) = config.rejected_format() {
      tracing::warn!(value = %value, "LOG_FORMAT を解釈できないため pretty で出力します");
   }
   if let Some(err) = bad_filter {
      tracing::warn!(error = %err, "RUST_LOG を解釈できないため既定のフィルタを使います");
   }

   tracing::info_span!("app", service = %config.service_name)
}
