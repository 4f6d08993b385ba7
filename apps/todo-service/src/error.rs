//! # Todo Service エラー定義
//!
//! Todo Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! axum のエクストラクタが返す rejection もここで [`CoreError`] に変換し、
//! すべての失敗を同じ Problem Details 形式で返す。

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use todo_domain::DomainError;
use todo_infra::InfraError;
use todo_shared::ErrorResponse;

/// 項目が存在しない場合の detail
pub const ITEM_NOT_FOUND: &str = "Item not found";

/// Todo Service で発生するエラー
#[derive(Debug, Error)]
pub enum CoreError {
    /// リソースが見つからない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 不正なリクエスト（JSON 構文エラー、不正なパス・クエリ）
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// バリデーションエラー（フィールド欠落、型不一致、空タイトル）
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(#[source] InfraError),
}

impl From<InfraError> for CoreError {
    fn from(err: InfraError) -> Self {
        // 存在確認後に別リクエストが削除した場合も 404 として扱う
        if err.is_not_found() {
            return CoreError::NotFound(ITEM_NOT_FOUND.to_string());
        }
        CoreError::Database(err)
    }
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => CoreError::Validation(msg),
            DomainError::NotFound { .. } => CoreError::NotFound(ITEM_NOT_FOUND.to_string()),
        }
    }
}

impl From<JsonRejection> for CoreError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => CoreError::Validation(e.body_text()),
            other => CoreError::BadRequest(other.body_text()),
        }
    }
}

impl From<PathRejection> for CoreError {
    fn from(rejection: PathRejection) -> Self {
        CoreError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for CoreError {
    fn from(rejection: QueryRejection) -> Self {
        CoreError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let body = match self {
            CoreError::NotFound(msg) => ErrorResponse::not_found(msg),
            CoreError::BadRequest(msg) => ErrorResponse::bad_request(msg),
            CoreError::Validation(msg) => ErrorResponse::validation_error(msg),
            CoreError::Database(e) => {
                tracing::error!(
                    error = %e,
                    span_trace = %e.span_trace(),
                    "データベースエラー"
                );
                ErrorResponse::internal_error()
            }
        };

        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    async fn into_parts(err: CoreError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[rstest]
    #[case(CoreError::NotFound(ITEM_NOT_FOUND.to_string()), StatusCode::NOT_FOUND)]
    #[case(CoreError::BadRequest("bad".to_string()), StatusCode::BAD_REQUEST)]
    #[case(CoreError::Validation("invalid".to_string()), StatusCode::UNPROCESSABLE_ENTITY)]
    #[tokio::test]
    async fn test_エラー種別ごとのステータスコード(
        #[case] err: CoreError,
        #[case] expected: StatusCode,
    ) {
        let (status, body) = into_parts(err).await;

        assert_eq!(status, expected);
        assert_eq!(body.status, expected.as_u16());
    }

    #[tokio::test]
    async fn test_not_foundのdetailはitem_not_found() {
        let (_, body) = into_parts(CoreError::NotFound(ITEM_NOT_FOUND.to_string())).await;

        assert_eq!(body.detail, "Item not found");
        assert_eq!(body.title, "Not Found");
    }

    #[tokio::test]
    async fn test_データベースエラーは内部情報を返さない() {
        let err = CoreError::Database(InfraError::unexpected("secret connection string"));

        let (status, body) = into_parts(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, ErrorResponse::internal_error());
    }

    #[test]
    fn test_対象行なしのinfra_errorはnot_foundに変換される() {
        let not_found: CoreError = InfraError::not_found("TodoItem", "3").into();
        let database: CoreError = InfraError::unexpected("boom").into();

        assert!(matches!(not_found, CoreError::NotFound(msg) if msg == ITEM_NOT_FOUND));
        assert!(matches!(database, CoreError::Database(_)));
    }

    #[test]
    fn test_domain_errorの変換() {
        let validation: CoreError = DomainError::Validation("title は必須です".to_string()).into();
        let not_found: CoreError = DomainError::NotFound {
            entity_type: "TodoItem",
            id:          "1".to_string(),
        }
        .into();

        assert!(matches!(validation, CoreError::Validation(msg) if msg == "title は必須です"));
        assert!(matches!(not_found, CoreError::NotFound(msg) if msg == ITEM_NOT_FOUND));
    }
}
