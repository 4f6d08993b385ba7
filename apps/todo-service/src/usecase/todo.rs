//! To-do 管理ユースケース

use std::sync::Arc;

use todo_domain::{
    DomainError,
    page::Page,
    todo::{NewTodoItem, TodoChanges, TodoId, TodoItem, TodoTitle},
};
use todo_infra::{TransactionManager, repository::TodoRepository};

use crate::error::CoreError;

/// To-do 更新の入力
///
/// `None` のフィールドは変更しない。
#[derive(Debug, Default)]
pub struct UpdateTodoInput {
    pub title:     Option<String>,
    pub is_active: Option<bool>,
}

/// To-do 管理ユースケース
pub struct TodoUseCaseImpl {
    todo_repository: Arc<dyn TodoRepository>,
    tx_manager:      Arc<dyn TransactionManager>,
}

impl TodoUseCaseImpl {
    pub fn new(
        todo_repository: Arc<dyn TodoRepository>,
        tx_manager: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            todo_repository,
            tx_manager,
        }
    }

    /// To-do 一覧を取得する（id 昇順）
    pub async fn list_todos(&self, page: Option<Page>) -> Result<Vec<TodoItem>, CoreError> {
        let items = self.todo_repository.find_all(page).await?;
        Ok(items)
    }

    /// To-do を作成する
    ///
    /// 1. TodoTitle バリデーション
    /// 2. トランザクション内で挿入（`is_active = true`）
    /// 3. コミット後、採番された ID を含む項目を返す
    pub async fn create_todo(&self, title: String) -> Result<TodoItem, CoreError> {
        let new_item = NewTodoItem::new(TodoTitle::new(title)?);

        let mut tx = self.tx_manager.begin().await?;
        let item = self.todo_repository.insert(&mut tx, &new_item).await?;
        tx.commit().await?;

        tracing::info!(todo_id = %item.id(), "To-do を作成しました");
        Ok(item)
    }

    /// To-do を 1 件取得する
    pub async fn get_todo(&self, id: TodoId) -> Result<TodoItem, CoreError> {
        self.find_existing(id).await
    }

    /// To-do を更新する
    ///
    /// 指定されたフィールドのみ上書きする。何も指定されていない場合は
    /// 書き込みを行わず現在の項目を返す。
    pub async fn update_todo(
        &self,
        id: TodoId,
        input: UpdateTodoInput,
    ) -> Result<TodoItem, CoreError> {
        let changes = TodoChanges {
            title:     input.title.map(TodoTitle::new).transpose()?,
            is_active: input.is_active,
        };

        let current = self.find_existing(id).await?;
        if changes.is_empty() {
            return Ok(current);
        }

        let updated = current.apply(changes);
        self.save(&updated).await?;
        Ok(updated)
    }

    /// `is_active` を反転する
    pub async fn toggle_todo(&self, id: TodoId) -> Result<TodoItem, CoreError> {
        let toggled = self.find_existing(id).await?.toggled();
        self.save(&toggled).await?;
        Ok(toggled)
    }

    /// To-do を削除する
    pub async fn delete_todo(&self, id: TodoId) -> Result<(), CoreError> {
        self.find_existing(id).await?;

        let mut tx = self.tx_manager.begin().await?;
        self.todo_repository.delete(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(todo_id = %id, "To-do を削除しました");
        Ok(())
    }

    // 読み取りはトランザクション開始前に行う。
    // インメモリ SQLite は接続 1 本のため、TxContext 保持中にプールを使うと待ちになる。
    async fn find_existing(&self, id: TodoId) -> Result<TodoItem, CoreError> {
        self.todo_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound {
                    entity_type: "TodoItem",
                    id:          id.to_string(),
                }
                .into()
            })
    }

    async fn save(&self, item: &TodoItem) -> Result<(), CoreError> {
        let mut tx = self.tx_manager.begin().await?;
        self.todo_repository.update(&mut tx, item).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use todo_infra::{
        InfraError,
        TxContext,
        mock::{MockTodoRepository, MockTransactionManager},
    };

    use super::*;

    /// 存在確認には成功するが、書き込み時には行が消えているリポジトリ
    ///
    /// 存在確認と書き込みの間に別リクエストが削除した状況を再現する。
    struct VanishingTodoRepository {
        item: TodoItem,
    }

    #[async_trait]
    impl TodoRepository for VanishingTodoRepository {
        async fn find_all(&self, _page: Option<Page>) -> Result<Vec<TodoItem>, InfraError> {
            Ok(vec![self.item.clone()])
        }

        async fn find_by_id(&self, _id: TodoId) -> Result<Option<TodoItem>, InfraError> {
            Ok(Some(self.item.clone()))
        }

        async fn insert(
            &self,
            _tx: &mut TxContext,
            _new_item: &NewTodoItem,
        ) -> Result<TodoItem, InfraError> {
            Err(InfraError::unexpected("not used"))
        }

        async fn update(&self, _tx: &mut TxContext, item: &TodoItem) -> Result<(), InfraError> {
            Err(InfraError::not_found("TodoItem", item.id().to_string()))
        }

        async fn delete(&self, _tx: &mut TxContext, id: TodoId) -> Result<(), InfraError> {
            Err(InfraError::not_found("TodoItem", id.to_string()))
        }

        async fn count(&self) -> Result<i64, InfraError> {
            Ok(0)
        }
    }

    fn setup() -> (TodoUseCaseImpl, MockTodoRepository) {
        let repo = MockTodoRepository::new();
        let sut = TodoUseCaseImpl::new(Arc::new(repo.clone()), Arc::new(MockTransactionManager));
        (sut, repo)
    }

    fn seeded_item(id: i64, title: &str, is_active: bool) -> TodoItem {
        TodoItem::from_db(TodoId::from_i64(id), TodoTitle::new(title).unwrap(), is_active)
    }

    #[tokio::test]
    async fn test_create_todo_is_active_trueで作成される() {
        let (sut, repo) = setup();

        let item = sut.create_todo("Buy milk".to_string()).await.unwrap();

        assert_eq!(item.title().as_str(), "Buy milk");
        assert!(item.is_active());
        assert_eq!(repo.items(), vec![item]);
    }

    #[tokio::test]
    async fn test_create_todo_空タイトルはバリデーションエラーで保存されない() {
        let (sut, repo) = setup();

        let result = sut.create_todo(String::new()).await;

        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert!(repo.items().is_empty());
    }

    #[tokio::test]
    async fn test_create_todo_空白のみのタイトルは受け入れられる() {
        let (sut, repo) = setup();

        let item = sut.create_todo("   ".to_string()).await.unwrap();

        assert_eq!(item.title().as_str(), "   ");
        assert_eq!(repo.items(), vec![item]);
    }

    #[tokio::test]
    async fn test_list_todos_ページ指定なしで全件を返す() {
        let (sut, repo) = setup();
        repo.add_item(seeded_item(1, "a", true));
        repo.add_item(seeded_item(2, "b", false));

        let items = sut.list_todos(None).await.unwrap();

        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_get_todo_存在しないidはnot_found() {
        let (sut, _repo) = setup();

        let result = sut.get_todo(TodoId::from_i64(404)).await;

        assert!(matches!(result, Err(CoreError::NotFound(msg)) if msg == "Item not found"));
    }

    #[tokio::test]
    async fn test_update_todo_指定フィールドのみ上書きする() {
        let (sut, repo) = setup();
        repo.add_item(seeded_item(1, "before", true));

        let updated = sut
            .update_todo(
                TodoId::from_i64(1),
                UpdateTodoInput {
                    title:     Some("after".to_string()),
                    is_active: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated, seeded_item(1, "after", true));
        assert_eq!(repo.items(), vec![updated]);
    }

    #[tokio::test]
    async fn test_update_todo_空タイトルは拒否され元の値が残る() {
        let (sut, repo) = setup();
        repo.add_item(seeded_item(1, "keep", true));

        let result = sut
            .update_todo(
                TodoId::from_i64(1),
                UpdateTodoInput {
                    title:     Some(String::new()),
                    is_active: Some(false),
                },
            )
            .await;

        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert_eq!(repo.items(), vec![seeded_item(1, "keep", true)]);
    }

    #[tokio::test]
    async fn test_update_todo_存在しないidはnot_found() {
        let (sut, _repo) = setup();

        let result = sut
            .update_todo(TodoId::from_i64(9), UpdateTodoInput::default())
            .await;

        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_todo_2回で元に戻る() {
        let (sut, repo) = setup();
        repo.add_item(seeded_item(1, "toggle", true));

        let first = sut.toggle_todo(TodoId::from_i64(1)).await.unwrap();
        let second = sut.toggle_todo(TodoId::from_i64(1)).await.unwrap();

        assert!(!first.is_active());
        assert_eq!(second, seeded_item(1, "toggle", true));
    }

    #[tokio::test]
    async fn test_書き込み時に行が消えていればnot_found() {
        let sut = TodoUseCaseImpl::new(
            Arc::new(VanishingTodoRepository {
                item: seeded_item(5, "vanishing", true),
            }),
            Arc::new(MockTransactionManager),
        );
        let id = TodoId::from_i64(5);

        let toggle = sut.toggle_todo(id).await;
        let update = sut
            .update_todo(
                id,
                UpdateTodoInput {
                    title:     Some("x".to_string()),
                    is_active: None,
                },
            )
            .await;
        let delete = sut.delete_todo(id).await;

        for result in [toggle.map(|_| ()), update.map(|_| ()), delete] {
            assert!(matches!(result, Err(CoreError::NotFound(msg)) if msg == "Item not found"));
        }
    }

    #[tokio::test]
    async fn test_delete_todo_削除後はnot_found() {
        let (sut, repo) = setup();
        repo.add_item(seeded_item(1, "remove", true));

        sut.delete_todo(TodoId::from_i64(1)).await.unwrap();

        assert!(repo.items().is_empty());
        assert!(matches!(
            sut.delete_todo(TodoId::from_i64(1)).await,
            Err(CoreError::NotFound(_))
        ));
    }
}
