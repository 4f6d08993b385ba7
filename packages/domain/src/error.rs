//! # ドメイン層エラー定義
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 422 Unprocessable Entity | 入力値の検証失敗 |
//! | `NotFound` | 404 Not Found | エンティティが存在しない |
//!
//! ステータスへの変換は API 層（todo-service）の責務。

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 例: タイトルが空、ページサイズが範囲外
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// エンティティが見つからない
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        /// エンティティの種類（"TodoItem" など）
        entity_type: &'static str,
        /// 検索に使用した識別子
        id:          String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_foundのメッセージにエンティティ種別とidを含む() {
        let err = DomainError::NotFound {
            entity_type: "TodoItem",
            id:          "42".to_string(),
        };

        assert_eq!(err.to_string(), "TodoItem が見つかりません: 42");
    }
}
