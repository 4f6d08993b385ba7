//! # テスト用モックリポジトリ
//!
//! ユースケース・ハンドラテストで使用するインメモリ実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! todo-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use todo_domain::{
    page::Page,
    todo::{NewTodoItem, TodoId, TodoItem},
};

use crate::{
    db::{TransactionManager, TxContext},
    error::InfraError,
    repository::TodoRepository,
};

// ===== MockTodoRepository =====

#[derive(Default)]
struct MockTodoStore {
    items:   Vec<TodoItem>,
    last_id: i64,
}

/// インメモリの TodoRepository
///
/// SQLite の AUTOINCREMENT と同様に、削除済みの ID は再利用しない。
#[derive(Clone, Default)]
pub struct MockTodoRepository {
    store: Arc<Mutex<MockTodoStore>>,
}

impl MockTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存の項目を直接追加する（採番カウンタも進める）
    pub fn add_item(&self, item: TodoItem) {
        let mut store = self.store.lock().unwrap();
        store.last_id = store.last_id.max(item.id().as_i64());
        store.items.push(item);
    }

    /// 現在保持している項目のスナップショット
    pub fn items(&self) -> Vec<TodoItem> {
        self.store.lock().unwrap().items.clone()
    }
}

#[async_trait]
impl TodoRepository for MockTodoRepository {
    async fn find_all(&self, page: Option<Page>) -> Result<Vec<TodoItem>, InfraError> {
        let mut items = self.store.lock().unwrap().items.clone();
        items.sort_by_key(TodoItem::id);

        Ok(match page {
            Some(page) => items
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.limit() as usize)
                .collect(),
            None => items,
        })
    }

    async fn find_by_id(&self, id: TodoId) -> Result<Option<TodoItem>, InfraError> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .items
            .iter()
            .find(|i| i.id() == id)
            .cloned())
    }

    async fn insert(
        &self,
        _tx: &mut TxContext,
        new_item: &NewTodoItem,
    ) -> Result<TodoItem, InfraError> {
        let mut store = self.store.lock().unwrap();
        store.last_id += 1;
        let item = TodoItem::from_db(
            TodoId::from_i64(store.last_id),
            new_item.title.clone(),
            new_item.is_active(),
        );
        store.items.push(item.clone());
        Ok(item)
    }

    async fn update(&self, _tx: &mut TxContext, item: &TodoItem) -> Result<(), InfraError> {
        let mut store = self.store.lock().unwrap();
        match store.items.iter_mut().find(|i| i.id() == item.id()) {
            Some(existing) => {
                *existing = item.clone();
                Ok(())
            }
            None => Err(InfraError::not_found("TodoItem", item.id().to_string())),
        }
    }

    async fn delete(&self, _tx: &mut TxContext, id: TodoId) -> Result<(), InfraError> {
        let mut store = self.store.lock().unwrap();
        let before = store.items.len();
        store.items.retain(|i| i.id() != id);
        if store.items.len() == before {
            return Err(InfraError::not_found("TodoItem", id.to_string()));
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64, InfraError> {
        Ok(self.store.lock().unwrap().items.len() as i64)
    }
}

// ===== MockTransactionManager =====

/// 実トランザクションを張らない TransactionManager
pub struct MockTransactionManager;

#[async_trait]
impl TransactionManager for MockTransactionManager {
    async fn begin(&self) -> Result<TxContext, InfraError> {
        Ok(TxContext::mock())
    }
}
