//! # Todo インフラ層
//!
//! SQLite への接続と To-do 項目の永続化を担当する。
//!
//! ## 責務
//!
//! - **データベース接続**: SQLite 接続プール管理とマイグレーション
//! - **トランザクション**: リクエスト単位の [`TxContext`](db::TxContext)
//! - **リポジトリ実装**: [`TodoRepository`](repository::TodoRepository) の SQLite 実装
//!
//! ## 依存関係
//!
//! ```text
//! todo-service → infra → domain
//! ```
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use todo_infra::{db, repository::SqliteTodoRepository};
//!
//! let pool = db::create_pool("sqlite://todo.db").await?;
//! db::run_migrations(&pool).await?;
//! let repository = SqliteTodoRepository::new(pool.clone());
//! ```

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod repository;

pub use db::{SqliteTransactionManager, TransactionManager, TxContext};
pub use error::{InfraError, InfraErrorKind};
