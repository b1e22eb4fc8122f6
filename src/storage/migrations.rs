use std::sync::{Mutex, OnceLock};

use rusqlite::Connection;

use crate::core::error::AppResult;

mod embedded {
    use refinery::embed_migrations;

    embed_migrations!("./migrations");
}

static MIGRATION_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Применяет недостающие миграции схемы.
///
/// Внутри процесса выполняется под мьютексом; каждую миграцию refinery
/// оборачивает в свою транзакцию, а от других процессов спасает busy timeout.
pub fn run_migrations(conn: &mut Connection) -> AppResult<()> {
    let mutex = MIGRATION_LOCK.get_or_init(|| Mutex::new(()));
    // Миграции идемпотентны, отравленный мьютекс можно использовать дальше
    let _guard = match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Migration lock was poisoned, recovering...");
            poisoned.into_inner()
        }
    };

    let report = embedded::migrations::runner().run(conn)?;
    for migration in report.applied_migrations() {
        log::info!("Applied migration {}", migration);
    }
    Ok(())
}
