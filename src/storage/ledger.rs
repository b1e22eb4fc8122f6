//! Реестр отзывов, ожидающих оплаты
//!
//! Персистентное отображение payload счета (токен) в отзыв, который ждет
//! оплаты. `take` удаляет и возвращает строку одним запросом внутри
//! `IMMEDIATE`-транзакции: из параллельных дублей подтверждения строку
//! получит не больше одного.

use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use crate::core::error::AppResult;
use crate::core::review::PendingReview;
use crate::storage::db::{get_connection, DbPool};

#[derive(Clone)]
pub struct PendingLedger {
    pool: Arc<DbPool>,
}

fn row_to_pending(row: &Row<'_>) -> rusqlite::Result<PendingReview> {
    Ok(PendingReview {
        token: row.get(0)?,
        author_user_id: row.get(1)?,
        target_user_id: row.get(2)?,
        text: row.get(3)?,
    })
}

/// Удаляет запись по `token` и возвращает ее, на соединении или в транзакции вызывающего.
pub(crate) fn take_pending(conn: &Connection, token: &str) -> rusqlite::Result<Option<PendingReview>> {
    conn.query_row(
        "DELETE FROM pending_reviews WHERE token = ?1
         RETURNING token, author_user_id, target_user_id, text",
        params![token],
        row_to_pending,
    )
    .optional()
}

impl PendingLedger {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Вставляет запись или перезаписывает существующую с тем же токеном.
    pub fn put(&self, review: &PendingReview) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        conn.execute(
            "INSERT INTO pending_reviews (token, author_user_id, target_user_id, text)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (token) DO UPDATE SET
                 author_user_id = excluded.author_user_id,
                 target_user_id = excluded.target_user_id,
                 text = excluded.text,
                 created_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![
                review.token,
                review.author_user_id,
                review.target_user_id,
                review.text
            ],
        )?;
        log::debug!(
            "Pending review stored: token={} author={} target={}",
            review.token,
            review.author_user_id,
            review.target_user_id
        );
        Ok(())
    }

    /// Удаляет и возвращает запись. `None` для неизвестных или уже использованных токенов.
    pub fn take(&self, token: &str) -> AppResult<Option<PendingReview>> {
        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let taken = take_pending(&tx, token)?;
        tx.commit()?;
        Ok(taken)
    }

    /// Читает запись, не потребляя ее.
    pub fn peek(&self, token: &str) -> AppResult<Option<PendingReview>> {
        let conn = get_connection(&self.pool)?;
        let review = conn
            .query_row(
                "SELECT token, author_user_id, target_user_id, text
                 FROM pending_reviews WHERE token = ?1",
                params![token],
                row_to_pending,
            )
            .optional()?;
        Ok(review)
    }

    /// Все ожидающие записи, от старых к новым.
    pub fn list(&self) -> AppResult<Vec<PendingReview>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT token, author_user_id, target_user_id, text
             FROM pending_reviews ORDER BY created_at, token",
        )?;
        let rows = stmt.query_map([], row_to_pending)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn len(&self) -> AppResult<usize> {
        let conn = get_connection(&self.pool)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM pending_reviews", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn is_empty(&self) -> AppResult<bool> {
        Ok(self.len()? == 0)
    }
}
