//! Published review store: one append-only sequence per target user.

use std::sync::Arc;

use rusqlite::{params, Connection, TransactionBehavior};

use crate::core::error::AppResult;
use crate::core::review::{PendingReview, PublishedReview};
use crate::storage::db::{get_connection, DbPool};
use crate::storage::ledger::take_pending;

#[derive(Clone)]
pub struct ReviewStore {
    pool: Arc<DbPool>,
}

fn insert_review(conn: &Connection, target_user_id: i64, review: &PublishedReview) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO reviews (target_user_id, author_user_id, author_username, text, date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            target_user_id,
            review.author_user_id,
            review.author_username,
            review.text,
            review.date
        ],
    )?;
    Ok(())
}

impl ReviewStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Appends `review` to the end of `target_user_id`'s sequence.
    pub fn append(&self, target_user_id: i64, review: &PublishedReview) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        insert_review(&conn, target_user_id, review)?;
        Ok(())
    }

    /// Consumes the pending entry for `token` and publishes it in one transaction.
    ///
    /// Returns `None` without writing anything when the token is unknown or was
    /// already consumed. The published copy is built by `publish` from the row
    /// that was actually deleted, not from the caller's earlier read.
    pub fn settle_pending<F>(&self, token: &str, publish: F) -> AppResult<Option<(PendingReview, PublishedReview)>>
    where
        F: FnOnce(&PendingReview) -> PublishedReview,
    {
        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(pending) = take_pending(&tx, token)? else {
            tx.rollback()?;
            return Ok(None);
        };
        let published = publish(&pending);
        insert_review(&tx, pending.target_user_id, &published)?;
        tx.commit()?;

        Ok(Some((pending, published)))
    }

    /// Reviews about `target_user_id`, oldest first.
    pub fn list_for(&self, target_user_id: i64) -> AppResult<Vec<PublishedReview>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT text, author_user_id, author_username, date
             FROM reviews WHERE target_user_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![target_user_id], |row| {
            Ok(PublishedReview {
                text: row.get(0)?,
                author_user_id: row.get(1)?,
                author_username: row.get(2)?,
                date: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
