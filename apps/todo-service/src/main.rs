//! # Todo Service サーバー
//!
//! 単一テーブルの To-do リストを JSON で公開する HTTP サーバー。
//!
//! ## 構成
//!
//! ```text
//! ┌──────────────┐  HTTP/JSON  ┌──────────────┐   sqlx    ┌──────────────┐
//! │   Browser    │────────────▶│ Todo Service │──────────▶│ SQLite file  │
//! └──────────────┘             └──────────────┘           └──────────────┘
//! ```
//!
//! CORS は全オリジンを許可する。
//!
//! 起動時に SQLite ファイルが無ければ作成し、`todo` テーブルをマイグレーションで作成する。
//!
//! ## 環境変数
//!
//! | 変数名 | デフォルト | 説明 |
//! |--------|------------|------|
//! | `TODO_HOST` | `127.0.0.1` | バインドアドレス |
//! | `TODO_PORT` | `8000` | ポート番号 |
//! | `DATABASE_URL` | `sqlite://todo.db` | SQLite 接続 URL |
//! | `LOG_FORMAT` | `pretty` | ログ形式（`json` / `pretty`） |
//! | `RUST_LOG` | `info,todo_service=debug,todo_infra=debug` | ログフィルタ |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境
//! cargo run -p todo-service
//!
//! # 本番環境
//! TODO_HOST=0.0.0.0 LOG_FORMAT=json cargo run -p todo-service --release
//! ```

use anyhow::Context as _;
use todo_infra::{
    db,
    repository::{SqliteTodoRepository, TodoRepository},
};
use todo_service::{app_builder::build_app, config::TodoConfig};
use todo_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;
use tracing::Instrument as _;

/// Todo Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    let service_span = init_tracing(&TracingConfig::from_env("todo-service"))
        .context("トレーシングの初期化に失敗しました")?;

    // 以降のログはすべて service フィールドを持つルートスパン配下に出る
    run().instrument(service_span).await
}

async fn run() -> anyhow::Result<()> {
    // 設定読み込み
    let config = TodoConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Todo Service サーバーを起動します: {}",
        config.bind_address()
    );

    // データベース接続プールを作成
    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    tracing::info!(database_url = %config.database_url, "データベースに接続しました");

    db::run_migrations(&pool)
        .await
        .context("マイグレーションに失敗しました")?;
    let todo_count = SqliteTodoRepository::new(pool.clone()).count().await?;
    tracing::info!(todo_count, "マイグレーションを適用しました");

    let app = build_app(pool.clone());

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("{} へのバインドに失敗しました", config.bind_address()))?;
    tracing::info!("Todo Service サーバーが起動しました: {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Todo Service サーバーを停止しました");
    Ok(())
}

/// Ctrl+C を待つ
///
/// シグナルハンドラを登録できない場合は停止せずに待ち続ける。
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("シャットダウンシグナルを受信しました"),
        Err(e) => {
            tracing::error!(error = %e, "シャットダウンシグナルの待機に失敗しました");
            std::future::pending::<()>().await;
        }
    }
}
