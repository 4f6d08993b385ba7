//! # To-do 項目
//!
//! 単一テーブル `todo` に保存される To-do 項目のドメインモデル。
//!
//! ## ライフサイクル
//!
//! ```text
//! create ──▶ [is_active = true] ◀──toggle / update──▶ [is_active = false]
//!                    │                                        │
//!                    └──────────────── delete ────────────────┘ (物理削除)
//! ```
//!
//! - `id` はストアが採番し、以後変わらない。削除後も再利用されない
//! - `title` は常に空でない
//! - 削除は物理削除のみ（論理削除・監査ログなし）

use derive_more::Display;

use crate::DomainError;

// =========================================================================
// TodoId
// =========================================================================

/// To-do 項目の一意識別子
///
/// SQLite の `INTEGER PRIMARY KEY AUTOINCREMENT` が採番する。
/// アプリケーション側で生成することはない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("{_0}")]
pub struct TodoId(i64);

impl TodoId {
    pub fn from_i64(value: i64) -> Self {
        Self(value)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

// =========================================================================
// TodoTitle
// =========================================================================

/// To-do のタイトル（値オブジェクト）
///
/// # 不変条件
///
/// - 空文字列ではない（空白のみの文字列は有効なタイトル）
///
/// 値は受け取ったまま保持する（trim しない）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoTitle(String);

impl TodoTitle {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.is_empty() {
            return Err(DomainError::Validation("title は必須です".to_string()));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 所有権を持つ文字列に変換する
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for TodoTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =========================================================================
// TodoItem
// =========================================================================

/// To-do 項目エンティティ
///
/// フィールドは非公開。状態変更は `toggled` / `apply` で新しい値を返す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    id:        TodoId,
    title:     TodoTitle,
    is_active: bool,
}

impl TodoItem {
    /// データベースの行から復元する
    pub fn from_db(id: TodoId, title: TodoTitle, is_active: bool) -> Self {
        Self {
            id,
            title,
            is_active,
        }
    }

    pub fn id(&self) -> TodoId {
        self.id
    }

    pub fn title(&self) -> &TodoTitle {
        &self.title
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// `is_active` を反転した項目を返す
    ///
    /// 2 回適用すると元の状態に戻る。
    pub fn toggled(self) -> Self {
        Self {
            is_active: !self.is_active,
            ..self
        }
    }

    /// 指定されたフィールドのみを上書きした項目を返す
    ///
    /// `id` は変更されない。
    pub fn apply(self, changes: TodoChanges) -> Self {
        Self {
            id:        self.id,
            title:     changes.title.unwrap_or(self.title),
            is_active: changes.is_active.unwrap_or(self.is_active),
        }
    }
}

/// 新規作成する To-do 項目
///
/// `id` はストアが採番し、`is_active` は常に `true` で作成される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodoItem {
    pub title: TodoTitle,
}

impl NewTodoItem {
    pub fn new(title: TodoTitle) -> Self {
        Self { title }
    }

    /// 作成時の `is_active` 初期値
    pub fn is_active(&self) -> bool {
        true
    }
}

/// To-do 項目の更新内容
///
/// `None` のフィールドは変更しない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub title:     Option<TodoTitle>,
    pub is_active: Option<bool>,
}

impl TodoChanges {
    /// 何も変更しないかどうか
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.is_active.is_none()
    }
}
