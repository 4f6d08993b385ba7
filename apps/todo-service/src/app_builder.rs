//! # Todo Service アプリケーション構築
//!
//! DI（リポジトリ・State）の初期化とルーター構築を担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::Request,
    routing::get,
};
use sqlx::SqlitePool;
use todo_infra::{
    SqliteTransactionManager,
    TransactionManager,
    repository::{SqliteTodoRepository, TodoRepository},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handler::{
        ReadinessState,
        TodoState,
        create_todo,
        delete_todo,
        get_todo,
        health_check,
        list_todos,
        readiness_check,
        toggle_todo,
        update_todo,
    },
    usecase::TodoUseCaseImpl,
};

/// SQLite プールから依存を組み立ててルーターを返す
///
/// プールは呼び出し側でマイグレーション済みであること。
pub fn build_app(pool: SqlitePool) -> Router {
    let todo_repository: Arc<dyn TodoRepository> =
        Arc::new(SqliteTodoRepository::new(pool.clone()));
    let tx_manager: Arc<dyn TransactionManager> =
        Arc::new(SqliteTransactionManager::new(pool.clone()));

    let todo_state = Arc::new(TodoState {
        usecase: TodoUseCaseImpl::new(todo_repository, tx_manager),
    });
    let readiness_state = Arc::new(ReadinessState { pool });

    build_router(todo_state, readiness_state)
}

/// ルーター定義
///
/// CORS は全オリジン・全メソッド・全ヘッダーを許可する（オリジンはミラーし、
/// 資格情報付きリクエストも通す）。
///
/// 呼び出し時のカレントスパン（通常はサービスのルートスパン）を
/// 各リクエストスパンの親にする。
pub fn build_router(todo_state: Arc<TodoState>, readiness_state: Arc<ReadinessState>) -> Router {
    // 接続ごとのタスクにはスパンが引き継がれないため、ここで捕まえておく
    let parent = tracing::Span::current();
    let make_span = move |request: &Request<Body>| {
        tracing::info_span!(
            parent: &parent,
            "request",
            method = %request.method(),
            uri = %request.uri()
        )
    };

    Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .route("/api/v1/todo", get(list_todos).post(create_todo))
        .route(
            "/api/v1/todo/{id}",
            get(get_todo)
                .put(update_todo)
                .patch(toggle_todo)
                .delete(delete_todo),
        )
        .with_state(todo_state)
        // 外側から: TraceLayer → CorsLayer（プリフライトもトレースされる）
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(CorsLayer::very_permissive()),
        )
}
