//! # Observability 基盤
//!
//! Todo Service のログ出力を組み立てる。
//!
//! - `LOG_FORMAT` で JSON / Pretty を切り替える
//! - `RUST_LOG` でフィルタを上書きする（未設定時は [`DEFAULT_FILTER`]）
//! - サービス名はルートスパン [`service_span`] の `service` フィールドとして出力する
//!
//! JSON 形式ではスパン一覧を出力するため、リクエスト処理中のログにも
//! ルートスパン経由で `service` が含まれる。

use std::str::FromStr;

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_FILTER: &str = "info,todo_service=debug,todo_infra=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 イベント 1 行の JSON（本番環境向け）
    Json,
    /// 人間が読みやすい形式（開発環境向け）
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    /// 大文字小文字と前後の空白は区別しない
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("unknown LOG_FORMAT={other:?}")),
        }
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// ルートスパンの `service` フィールドに入る
    pub service_name: String,
    pub log_format:   LogFormat,
    /// `EnvFilter` のディレクティブ
    pub filter:       String,
}

impl TracingConfig {
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
            filter: DEFAULT_FILTER.to_string(),
        }
    }

    /// `LOG_FORMAT` と `RUST_LOG` から設定を作る
    ///
    /// 不正な `LOG_FORMAT` は Pretty にフォールバックする。
    /// subscriber 登録前なので警告は stderr に出す。
    pub fn from_env(service_name: impl Into<String>) -> Self {
        let log_format = match std::env::var("LOG_FORMAT") {
            Ok(val) => val.parse().unwrap_or_else(|e: String| {
                eprintln!("WARNING: {e}, falling back to pretty");
                LogFormat::Pretty
            }),
            Err(_) => LogFormat::default(),
        };

        let mut config = Self::new(service_name, log_format);
        if let Ok(filter) = std::env::var("RUST_LOG") {
            config.filter = filter;
        }
        config
    }
}

/// subscriber を組み立てる（グローバル登録はしない）
///
/// 構成は `EnvFilter` → fmt レイヤー（`writer` へ出力）→ `ErrorLayer`。
/// `ErrorLayer` により `tracing_error::SpanTrace::capture()` がスパン経路を取得できる。
/// 不正なフィルタ指定は [`DEFAULT_FILTER`] で置き換える。
#[cfg(feature = "observability")]
pub fn build_subscriber<W>(
    config: &TracingConfig,
    writer: W,
) -> Box<dyn tracing::Subscriber + Send + Sync>
where
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt};

    let env_filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|e| {
        eprintln!(
            "WARNING: invalid filter {:?} ({e}), falling back to {DEFAULT_FILTER:?}",
            config.filter
        );
        EnvFilter::new(DEFAULT_FILTER)
    });

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_target(true)
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().with_writer(writer).boxed(),
    };

    Box::new(
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(tracing_error::ErrorLayer::default()),
    )
}

/// サービス全体を囲むルートスパン
///
/// 起動処理とサーバーはこのスパンの中で動かす。
#[cfg(feature = "observability")]
pub fn service_span(config: &TracingConfig) -> tracing::Span {
    tracing::info_span!("service", service = %config.service_name)
}

/// stdout 向けの subscriber をグローバルに登録し、ルートスパンを返す
#[cfg(feature = "observability")]
pub fn init_tracing(
    config: &TracingConfig,
) -> Result<tracing::Span, tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::util::SubscriberInitExt;

    build_subscriber(config, std::io::stdout).try_init()?;

    tracing::debug!(
        log_format = ?config.log_format,
        filter = %config.filter,
        "トレーシングを初期化しました"
    );
    Ok(service_span(config))
}
