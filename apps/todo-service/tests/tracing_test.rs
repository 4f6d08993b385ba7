//! ログ出力構成のテスト
//!
//! `build_subscriber` で組み立てた subscriber をスレッドローカルに登録し、
//! JSON 出力をバッファに取り込んで検証する。
//!
//! 実行方法:
//! ```bash
//! cargo test -p todo-service --test tracing_test
//! ```

use std::{
    io,
    sync::{Arc, Mutex},
};

use axum::{body::Body, http::Request};
use pretty_assertions::assert_eq;
use serde_json::Value;
use todo_infra::db;
use todo_service::app_builder::build_app;
use todo_shared::observability::{LogFormat, TracingConfig, build_subscriber, service_span};
use tower::ServiceExt;

// =============================================================================
// ヘルパー
// =============================================================================

/// 書き込まれたログを溜めるバッファ
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    /// 1 行 1 イベントの JSON として読み出す
    fn events(&self) -> Vec<Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn find(&self, message: &str) -> Value {
        self.events()
            .into_iter()
            .find(|e| e["message"] == message)
            .unwrap_or_else(|| panic!("{message:?} が出力されていない"))
    }
}

fn json_config(filter: &str) -> TracingConfig {
    let mut config = TracingConfig::new("todo-service", LogFormat::Json);
    config.filter = filter.to_string();
    config
}

fn capture(config: &TracingConfig) -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = build_subscriber(config, move || writer.clone());
    (logs, tracing::subscriber::set_default(subscriber))
}

// =============================================================================
// テストケース
// =============================================================================

#[test]
fn test_ルートスパン内のイベントにserviceフィールドが付く() {
    let config = json_config("info");
    let (logs, _guard) = capture(&config);

    service_span(&config).in_scope(|| tracing::info!(todo_count = 3, "起動しました"));

    let event = logs.find("起動しました");
    assert_eq!(event["span"]["name"], "service");
    assert_eq!(event["span"]["service"], "todo-service");
    assert_eq!(event["todo_count"], 3);
    assert_eq!(event["level"], "INFO");
}

#[test]
fn test_フィルタより低いレベルのイベントは出力されない() {
    let (logs, _guard) = capture(&json_config("warn"));

    tracing::info!("出力されない");
    tracing::warn!("出力される");

    let messages: Vec<Value> = logs.events().into_iter().map(|e| e["message"].clone()).collect();
    assert_eq!(messages, vec![Value::from("出力される")]);
}

#[test]
fn test_不正なフィルタはデフォルトフィルタで置き換えられる() {
    let (logs, _guard) = capture(&json_config("info,todo_service=loud"));

    tracing::debug!("フィルタ外");
    tracing::info!("フィルタ内");

    let messages: Vec<Value> = logs.events().into_iter().map(|e| e["message"].clone()).collect();
    assert_eq!(messages, vec![Value::from("フィルタ内")]);
}

#[test]
fn test_error_layerによりspan_traceがスパン経路を取得できる() {
    let config = json_config("info");
    let (_logs, _guard) = capture(&config);

    let trace = service_span(&config).in_scope(|| {
        tracing::info_span!("repository_call").in_scope(tracing_error::SpanTrace::capture)
    });

    let rendered = trace.to_string();
    assert!(rendered.contains("repository_call"), "{rendered}");
    assert!(rendered.contains("service"), "{rendered}");
}

#[tokio::test]
async fn test_リクエストのログはルートスパン配下に出力される() {
    let config = json_config("info,tower_http=debug");
    let (logs, _guard) = capture(&config);

    let pool = db::create_memory_pool().await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    let app = service_span(&config).in_scope(|| build_app(pool));

    let request = Request::builder()
        .uri("/api/v1/todo")
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap();

    let event = logs.find("started processing request");
    assert_eq!(event["span"]["name"], "request");
    assert_eq!(event["span"]["uri"], "/api/v1/todo");
    assert_eq!(event["spans"][0]["name"], "service");
    assert_eq!(event["spans"][0]["service"], "todo-service");
}
