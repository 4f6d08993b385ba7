//! # ページ指定
//!
//! 一覧取得のオフセット型ページ指定。
//!
//! 一覧 API はページ指定なしで全件を返す（既存クライアントとの互換）。
//! `limit` を指定した場合のみ `LIMIT / OFFSET` で窓を切り出す。

use crate::DomainError;

/// 1 ページあたりの最大件数
pub const MAX_PAGE_LIMIT: u32 = 100;

/// 一覧取得のページ指定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    limit:  u32,
    offset: u32,
}

impl Page {
    /// ページ指定を作成する
    ///
    /// `limit` は 1 以上 [`MAX_PAGE_LIMIT`] 以下。
    pub fn new(limit: u32, offset: u32) -> Result<Self, DomainError> {
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(DomainError::Validation(format!(
                "limit は 1 以上 {MAX_PAGE_LIMIT} 以下である必要があります"
            )));
        }
        Ok(Self { limit, offset })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }
}
