//! # TodoRepository
//!
//! To-do 項目の永続化を担当するリポジトリ。
//!
//! `sqlx::query!` 系マクロはビルド時に DB 接続を必要とするため、
//! 実行時バインドの `sqlx::query_as` と [`TodoRow`] で行をマッピングする。

use async_trait::async_trait;
use sqlx::SqlitePool;
use todo_domain::{
    page::Page,
    todo::{NewTodoItem, TodoId, TodoItem, TodoTitle},
};

use crate::{db::TxContext, error::InfraError};

const ENTITY: &str = "TodoItem";

/// To-do リポジトリトレイト
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// To-do 項目を挿入順（id 昇順）で取得する
    ///
    /// `page` が `None` の場合はテーブル全体を返す。
    async fn find_all(&self, page: Option<Page>) -> Result<Vec<TodoItem>, InfraError>;

    /// ID で To-do 項目を検索する
    async fn find_by_id(&self, id: TodoId) -> Result<Option<TodoItem>, InfraError>;

    /// To-do 項目を挿入し、採番された ID を含む項目を返す
    async fn insert(
        &self,
        tx: &mut TxContext,
        new_item: &NewTodoItem,
    ) -> Result<TodoItem, InfraError>;

    /// `title` と `is_active` を書き込む
    ///
    /// 対象行が存在しない場合は [`InfraErrorKind::NotFound`](crate::InfraErrorKind::NotFound)。
    async fn update(&self, tx: &mut TxContext, item: &TodoItem) -> Result<(), InfraError>;

    /// To-do 項目を物理削除する
    ///
    /// 対象行が存在しない場合は [`InfraErrorKind::NotFound`](crate::InfraErrorKind::NotFound)。
    async fn delete(&self, tx: &mut TxContext, id: TodoId) -> Result<(), InfraError>;

    /// 件数を取得する
    async fn count(&self) -> Result<i64, InfraError>;
}

/// `todo` テーブルの行
#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id:        i64,
    title:     String,
    is_active: bool,
}

impl TryFrom<TodoRow> for TodoItem {
    type Error = InfraError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        // NOT NULL 制約はあるが空文字列は DB では防げないため、変換時に検証する
        let title = TodoTitle::new(row.title).map_err(|e| {
            InfraError::unexpected(format!("不正な title が格納されています (id={}): {e}", row.id))
        })?;
        Ok(TodoItem::from_db(
            TodoId::from_i64(row.id),
            title,
            row.is_active,
        ))
    }
}

/// SQLite 実装の TodoRepository
#[derive(Debug, Clone)]
pub struct SqliteTodoRepository {
    pool: SqlitePool,
}

impl SqliteTodoRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(?page))]
    async fn find_all(&self, page: Option<Page>) -> Result<Vec<TodoItem>, InfraError> {
        let rows: Vec<TodoRow> = match page {
            Some(page) => {
                sqlx::query_as(
                    r#"
                    SELECT id, title, is_active
                    FROM todo
                    ORDER BY id ASC
                    LIMIT ?1 OFFSET ?2
                    "#,
                )
                .bind(i64::from(page.limit()))
                .bind(i64::from(page.offset()))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT id, title, is_active
                    FROM todo
                    ORDER BY id ASC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(TodoItem::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: TodoId) -> Result<Option<TodoItem>, InfraError> {
        let row: Option<TodoRow> = sqlx::query_as(
            r#"
            SELECT id, title, is_active
            FROM todo
            WHERE id = ?1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TodoItem::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn insert(
        &self,
        tx: &mut TxContext,
        new_item: &NewTodoItem,
    ) -> Result<TodoItem, InfraError> {
        let row: TodoRow = sqlx::query_as(
            r#"
            INSERT INTO todo (title, is_active)
            VALUES (?1, ?2)
            RETURNING id, title, is_active
            "#,
        )
        .bind(new_item.title.as_str())
        .bind(new_item.is_active())
        .fetch_one(tx.conn())
        .await?;

        TodoItem::try_from(row)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %item.id()))]
    async fn update(&self, tx: &mut TxContext, item: &TodoItem) -> Result<(), InfraError> {
        let result = sqlx::query(
            r#"
            UPDATE todo
            SET title = ?2, is_active = ?3
            WHERE id = ?1
            "#,
        )
        .bind(item.id().as_i64())
        .bind(item.title().as_str())
        .bind(item.is_active())
        .execute(tx.conn())
        .await?;

        if result.rows_affected() == 0 {
            return Err(InfraError::not_found(ENTITY, item.id().to_string()));
        }

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn delete(&self, tx: &mut TxContext, id: TodoId) -> Result<(), InfraError> {
        let result = sqlx::query(
            r#"
            DELETE FROM todo
            WHERE id = ?1
            "#,
        )
        .bind(id.as_i64())
        .execute(tx.conn())
        .await?;

        if result.rows_affected() == 0 {
            return Err(InfraError::not_found(ENTITY, id.to_string()));
        }

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn count(&self) -> Result<i64, InfraError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todo")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
