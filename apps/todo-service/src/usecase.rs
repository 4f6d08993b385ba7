//! # ユースケース層
//!
//! Todo Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリと TransactionManager を `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約
//! - **1 リクエスト 1 書き込み**: 書き込みごとにトランザクションを開始し、即コミットする

pub mod todo;

pub use todo::{TodoUseCaseImpl, UpdateTodoInput};
