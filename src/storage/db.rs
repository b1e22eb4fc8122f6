use std::path::Path;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::core::error::AppResult;
use crate::storage::migrations::run_migrations;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Сколько соединение ждёт заблокированную базу, прежде чем вернуть ошибку
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Создает пул соединений с базой данных
///
/// Каждое соединение работает в режиме WAL с `synchronous = FULL`: коммит
/// возвращается только после fsync, поэтому записанный `put` переживает
/// падение ОС или питания. Параллельные писатели ждут блокировку SQLite
/// (busy timeout), а не падают. Миграции применяются до возврата пула.
///
/// # Example
///
/// ```no_run
/// use jobs_bot::storage::create_pool;
///
/// let pool = create_pool("jobs-bot.sqlite".as_ref())?;
/// # Ok::<(), jobs_bot::core::error::AppError>(())
/// ```
pub fn create_pool(database_path: &Path) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        Ok(())
    });
    let pool = Pool::builder().max_size(10).build(manager)?;

    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;

    log::info!("Database opened at {}", database_path.display());
    Ok(pool)
}

/// Получает соединение из пула
///
/// Соединение возвращается в пул при drop.
pub fn get_connection(pool: &DbPool) -> AppResult<DbConnection> {
    Ok(pool.get()?)
}

/// Runs a synchronous storage call on the blocking thread pool.
pub async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_runs_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_pool(&dir.path().join("test.sqlite")).unwrap();
        let conn = get_connection(&pool).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM pending_reviews", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_connections_use_wal() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_pool(&dir.path().join("test.sqlite")).unwrap();
        let conn = get_connection(&pool).unwrap();

        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_connections_use_full_sync() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_pool(&dir.path().join("test.sqlite")).unwrap();

        // Every pooled connection, not just the first one
        let first = get_connection(&pool).unwrap();
        let second = get_connection(&pool).unwrap();
        for conn in [&first, &second] {
            let level: i64 = conn
                .query_row("PRAGMA synchronous", [], |row| row.get(0))
                .unwrap();
            assert_eq!(level, 2, "expected synchronous = FULL");
        }
    }
}
