//! # リポジトリ実装
//!
//! ## 設計方針
//!
//! - **トレイトで抽象化**: ユースケース層は `Arc<dyn TodoRepository>` に依存し、
//!   テストではインメモリ実装に差し替える
//! - **書き込みは TxContext 必須**: 読み取りはプール、書き込みはトランザクション経由

pub mod todo_repository;

pub use todo_repository::{SqliteTodoRepository, TodoRepository};
