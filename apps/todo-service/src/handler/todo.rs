//! # To-do ハンドラ
//!
//! To-do 項目の CRUD API を提供する。
//!
//! ## エンドポイント
//!
//! - `GET /api/v1/todo` - 一覧（`?limit=&offset=` 指定時のみページング）
//! - `POST /api/v1/todo` - 作成
//! - `GET /api/v1/todo/{id}` - 1 件取得
//! - `PUT /api/v1/todo/{id}` - 更新（`title` / `is_active` の部分更新）
//! - `PATCH /api/v1/todo/{id}` - `is_active` の反転
//! - `DELETE /api/v1/todo/{id}` - 削除
//!
//! レスポンスはラッパーなしの JSON（配列またはオブジェクト）を返す。

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path,
        Query,
        State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use todo_domain::{
    page::{MAX_PAGE_LIMIT, Page},
    todo::{TodoId, TodoItem},
};

use crate::{
    error::CoreError,
    usecase::{TodoUseCaseImpl, UpdateTodoInput},
};

/// To-do API の共有状態
pub struct TodoState {
    pub usecase: TodoUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// 一覧取得のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit:  Option<u32>,
    pub offset: Option<u32>,
}

impl ListQuery {
    /// ページ指定に変換する
    ///
    /// どちらも未指定なら `None`（全件）。`offset` のみ指定時は
    /// `limit` に [`MAX_PAGE_LIMIT`] を使う。
    fn into_page(self) -> Result<Option<Page>, CoreError> {
        if self.limit.is_none() && self.offset.is_none() {
            return Ok(None);
        }
        Page::new(
            self.limit.unwrap_or(MAX_PAGE_LIMIT),
            self.offset.unwrap_or(0),
        )
        .map(Some)
        .map_err(|e| CoreError::BadRequest(e.to_string()))
    }
}

/// To-do 作成リクエスト
///
/// 未知のフィールド（`is_active` を含む）は無視する。
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
}

/// To-do 更新リクエスト
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    pub title:     Option<String>,
    pub is_active: Option<bool>,
}

/// To-do DTO
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TodoDto {
    pub id:        i64,
    pub title:     String,
    pub is_active: bool,
}

impl From<&TodoItem> for TodoDto {
    fn from(item: &TodoItem) -> Self {
        Self {
            id:        item.id().as_i64(),
            title:     item.title().as_str().to_string(),
            is_active: item.is_active(),
        }
    }
}

/// 削除レスポンス
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DeleteResponse {
    pub status: String,
}

impl DeleteResponse {
    fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

// --- ハンドラ ---

/// GET /api/v1/todo
///
/// To-do 一覧を id 昇順で取得する。
///
/// ## レスポンス
///
/// - `200 OK`: To-do の配列（0 件なら `[]`）
/// - `400 Bad Request`: 不正なページ指定
#[tracing::instrument(skip_all)]
pub async fn list_todos(
    State(state): State<Arc<TodoState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, CoreError> {
    let Query(query) = query?;
    let page = query.into_page()?;

    let items = state.usecase.list_todos(page).await?;

    let dtos: Vec<TodoDto> = items.iter().map(TodoDto::from).collect();
    Ok((StatusCode::OK, Json(dtos)))
}

/// POST /api/v1/todo
///
/// To-do を作成する。`is_active` は常に `true` で作成される。
///
/// ## レスポンス
///
/// - `201 Created`: 作成された To-do
/// - `400 Bad Request`: JSON として不正
/// - `422 Unprocessable Entity`: `title` の欠落・型不一致・空文字列
#[tracing::instrument(skip_all)]
pub async fn create_todo(
    State(state): State<Arc<TodoState>>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<impl IntoResponse, CoreError> {
    let Json(req) = payload?;

    let item = state.usecase.create_todo(req.title).await?;

    Ok((StatusCode::CREATED, Json(TodoDto::from(&item))))
}

/// GET /api/v1/todo/{id}
///
/// ## レスポンス
///
/// - `200 OK`: To-do
/// - `404 Not Found`: 存在しない
#[tracing::instrument(skip_all)]
pub async fn get_todo(
    State(state): State<Arc<TodoState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, CoreError> {
    let Path(id) = id?;

    let item = state.usecase.get_todo(TodoId::from_i64(id)).await?;

    Ok((StatusCode::OK, Json(TodoDto::from(&item))))
}

/// PUT /api/v1/todo/{id}
///
/// 指定されたフィールドのみ更新する。
///
/// ## レスポンス
///
/// - `200 OK`: 更新後の To-do
/// - `404 Not Found`: 存在しない
/// - `422 Unprocessable Entity`: 型不一致・空タイトル
#[tracing::instrument(skip_all)]
pub async fn update_todo(
    State(state): State<Arc<TodoState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<impl IntoResponse, CoreError> {
    let Path(id) = id?;
    let Json(req) = payload?;

    let input = UpdateTodoInput {
        title:     req.title,
        is_active: req.is_active,
    };
    let item = state
        .usecase
        .update_todo(TodoId::from_i64(id), input)
        .await?;

    Ok((StatusCode::OK, Json(TodoDto::from(&item))))
}

/// PATCH /api/v1/todo/{id}
///
/// `is_active` を反転する。ボディは不要。
///
/// ## レスポンス
///
/// - `200 OK`: 反転後の To-do
/// - `404 Not Found`: 存在しない
#[tracing::instrument(skip_all)]
pub async fn toggle_todo(
    State(state): State<Arc<TodoState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, CoreError> {
    let Path(id) = id?;

    let item = state.usecase.toggle_todo(TodoId::from_i64(id)).await?;

    Ok((StatusCode::OK, Json(TodoDto::from(&item))))
}

/// DELETE /api/v1/todo/{id}
///
/// ## レスポンス
///
/// - `200 OK`: `{"status": "success"}`
/// - `404 Not Found`: 存在しない
#[tracing::instrument(skip_all)]
pub async fn delete_todo(
    State(state): State<Arc<TodoState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, CoreError> {
    let Path(id) = id?;

    state.usecase.delete_todo(TodoId::from_i64(id)).await?;

    Ok((StatusCode::OK, Json(DeleteResponse::success())))
}
