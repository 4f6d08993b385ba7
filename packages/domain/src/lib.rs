//! # Todo ドメイン層
//!
//! To-do 項目を表すドメインモデルを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! todo-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、HTTP）に一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`todo`] - To-do 項目エンティティと値オブジェクト
//! - [`page`] - 一覧取得のページ指定
//!
//! ## 使用例
//!
//! ```rust
//! use todo_domain::todo::{TodoId, TodoItem, TodoTitle};
//!
//! let item = TodoItem::from_db(TodoId::from_i64(1), TodoTitle::new("Buy milk")?, true);
//! assert!(!item.toggled().is_active());
//! # Ok::<(), todo_domain::DomainError>(())
//! ```

pub mod error;
pub mod page;
pub mod todo;

pub use error::DomainError;
