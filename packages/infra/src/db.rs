//! # SQLite データベース接続管理
//!
//! 接続プールの作成、マイグレーション、リクエスト単位のトランザクションを提供する。
//!
//! ## 設計方針
//!
//! - **プールは明示的に注入**: 起動時に一度だけ作成し、`Arc` 経由でハンドラに渡す。
//!   プロセス全体のグローバル状態は持たない
//! - **スキーマは起動時に作成**: `migrations/` の SQL を埋め込み、未適用のものだけ実行する
//! - **リクエストスコープの書き込み**: 書き込みは [`TxContext`] 経由でのみ行い、
//!   コミットまたはドロップ時に接続をプールへ返却する
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use todo_infra::db;
//!
//! let pool = db::create_pool("sqlite://todo.db").await?;
//! db::run_migrations(&pool).await?;
//! ```

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use sqlx::{
    Sqlite,
    SqliteConnection,
    SqlitePool,
    Transaction,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::error::InfraError;

/// 接続取得・疎通確認のタイムアウト
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite 接続プールを作成する
///
/// # 引数
///
/// * `database_url` - SQLite 接続 URL（例: `sqlite://todo.db`）。
///   ファイルが存在しない場合は作成する。
///
/// # 設定値
///
/// - `max_connections(5)`: SQLite は書き込みが直列化されるため少数で十分
/// - `acquire_timeout(5秒)`: 接続取得のタイムアウト
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await
}

/// インメモリ SQLite の接続プールを作成する
///
/// インメモリ DB は接続ごとに別物になるため、接続を 1 本に固定し、
/// アイドル切断と寿命による切断を無効化する（切断すると DB が消える）。
///
/// 単一接続のため、[`TxContext`] を保持したままプールからクエリすると
/// 接続待ちになる点に注意。
pub async fn create_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await
}

/// データベースマイグレーションを実行する
///
/// `sqlx::migrate!()` マクロで埋め込まれたマイグレーションファイルを
/// 順番に適用する。適用済みのマイグレーションはスキップされる。
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), InfraError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// データベースへの疎通を確認する（タイムアウト: 5 秒）
///
/// Readiness Check から使用する。
#[tracing::instrument(skip_all, level = "debug")]
pub async fn check_connection(pool: &SqlitePool) -> Result<(), InfraError> {
    match tokio::time::timeout(ACQUIRE_TIMEOUT, sqlx::query("SELECT 1").execute(pool)).await {
        Ok(result) => {
            result?;
            Ok(())
        }
        Err(_) => Err(InfraError::unexpected("データベースの疎通確認がタイムアウトしました")),
    }
}

// =============================================================================
// TxContext
// =============================================================================

/// トランザクションコンテキスト
///
/// 書き込みリポジトリメソッドの必須引数。
/// トランザクションなしの書き込みはコンパイルエラーになる。
///
/// # ライフサイクル
///
/// 1. `TransactionManager::begin()` で作成（プールから接続を 1 本借りる）
/// 2. 書き込みメソッドに `&mut TxContext` として渡す
/// 3. `commit()` でコミット、またはドロップでロールバック
///
/// どちらの場合も接続はプールに返却される。
pub struct TxContext(TxContextInner);

enum TxContextInner {
    Sqlite(Transaction<'static, Sqlite>),
    #[cfg(any(test, feature = "test-utils"))]
    Mock,
}

impl TxContext {
    /// SQLite トランザクションを開始する
    pub(crate) async fn begin_sqlite(pool: &SqlitePool) -> Result<Self, InfraError> {
        Ok(Self(TxContextInner::Sqlite(pool.begin().await?)))
    }

    /// テスト用のモック TxContext を作成する
    ///
    /// `conn()` を呼ぶと panic するが、Mock リポジトリは `conn()` を使用しない。
    #[cfg(any(test, feature = "test-utils"))]
    pub fn mock() -> Self {
        Self(TxContextInner::Mock)
    }

    /// トランザクションをコミットする
    ///
    /// 呼ばずにドロップすると、sqlx が自動的にロールバックする。
    pub async fn commit(self) -> Result<(), InfraError> {
        match self.0 {
            TxContextInner::Sqlite(tx) => {
                tx.commit().await?;
                Ok(())
            }
            #[cfg(any(test, feature = "test-utils"))]
            TxContextInner::Mock => Ok(()),
        }
    }

    /// トランザクション内の DB コネクションを取得する
    pub(crate) fn conn(&mut self) -> &mut SqliteConnection {
        match &mut self.0 {
            TxContextInner::Sqlite(tx) => tx,
            #[cfg(any(test, feature = "test-utils"))]
            TxContextInner::Mock => {
                panic!("BUG: conn() called on Mock TxContext. Mock repos should not call conn().")
            }
        }
    }
}

// =============================================================================
// TransactionManager
// =============================================================================

/// トランザクション管理 trait
///
/// ユースケース層はプールに直接依存せず、この trait 経由で
/// トランザクションを開始する。
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// トランザクションを開始し、TxContext を返す
    async fn begin(&self) -> Result<TxContext, InfraError>;
}

/// SQLite 用 TransactionManager 実装
pub struct SqliteTransactionManager {
    pool: SqlitePool,
}

impl SqliteTransactionManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for SqliteTransactionManager {
    async fn begin(&self) -> Result<TxContext, InfraError> {
        TxContext::begin_sqlite(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_tx_contextはsendを実装している() {
        assert_send::<TxContext>();
    }

    #[test]
    fn test_transaction_manager_traitはsendとsyncを実装している() {
        assert_send_sync::<SqliteTransactionManager>();
        assert_send_sync::<Box<dyn TransactionManager>>();
    }

    #[tokio::test]
    async fn test_インメモリプールにマイグレーションを適用できる() {
        let pool = create_memory_pool().await.unwrap();

        run_migrations(&pool).await.unwrap();
        // 2 回目は適用済みとしてスキップされる
        run_migrations(&pool).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todo")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_check_connectionは疎通できればokを返す() {
        let pool = create_memory_pool().await.unwrap();

        assert!(check_connection(&pool).await.is_ok());
    }

    #[tokio::test]
    async fn test_コミットせずにドロップするとロールバックされる() {
        let pool = create_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let manager = SqliteTransactionManager::new(pool.clone());

        {
            let mut tx = manager.begin().await.unwrap();
            sqlx::query("INSERT INTO todo (title) VALUES ('rolled back')")
                .execute(tx.conn())
                .await
                .unwrap();
        }

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todo")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
