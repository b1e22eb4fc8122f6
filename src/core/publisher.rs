//! Публикация отзывов
//!
//! Находит отображаемое имя автора и добавляет отзыв в ленту адресата.
//! Имя косметическое: при ошибке поиска отзыв публикуется с пустым именем.
//! Поиск выполняется до открытия транзакции хранилища.

use std::sync::Arc;

use crate::core::error::AppResult;
use crate::core::review::{now_rfc3339, PendingReview, PublishedReview};
use crate::core::traits::UserDirectory;
use crate::storage::db::run_blocking;
use crate::storage::ReviewStore;

#[derive(Clone)]
pub struct ReviewPublisher {
    store: ReviewStore,
    directory: Arc<dyn UserDirectory>,
}

impl ReviewPublisher {
    pub fn new(store: ReviewStore, directory: Arc<dyn UserDirectory>) -> Self {
        Self { store, directory }
    }

    /// Username пользователя `user_id` или пустая строка, если его не удалось получить.
    pub async fn display_name(&self, user_id: i64) -> String {
        match self.directory.username(user_id).await {
            Ok(Some(username)) => username,
            Ok(None) => String::new(),
            Err(e) => {
                log::warn!("Failed to resolve username for user {}: {}", user_id, e);
                String::new()
            }
        }
    }

    /// Appends a review from `author_user_id` to `target_user_id`'s sequence.
    pub async fn publish(&self, target_user_id: i64, author_user_id: i64, text: &str) -> AppResult<PublishedReview> {
        let review = PublishedReview {
            text: text.to_string(),
            author_user_id,
            author_username: self.display_name(author_user_id).await,
            date: now_rfc3339(),
        };

        let store = self.store.clone();
        let review = run_blocking(move || store.append(target_user_id, &review).map(|()| review)).await?;

        log::info!(
            "Review published: author={} target={}",
            author_user_id,
            target_user_id
        );
        Ok(review)
    }

    /// Publishes a paid pending review, consuming its ledger entry in the same
    /// transaction.
    ///
    /// `Ok(None)` means another confirmation consumed the token first.
    pub async fn publish_pending(&self, pending: &PendingReview) -> AppResult<Option<PublishedReview>> {
        let author_username = self.display_name(pending.author_user_id).await;

        let store = self.store.clone();
        let token = pending.token.clone();
        let settled = run_blocking(move || store.settle_pending(&token, |p| p.publish_as(author_username))).await?;

        Ok(settled.map(|(taken, review)| {
            log::info!(
                "Review published: token={} author={} target={}",
                taken.token,
                taken.author_user_id,
                taken.target_user_id
            );
            review
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use crate::storage::{create_pool, PendingLedger};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    struct NamedDirectory(&'static str);

    #[async_trait]
    impl UserDirectory for NamedDirectory {
        async fn username(&self, _user_id: i64) -> AppResult<Option<String>> {
            Ok(Some(self.0.to_string()))
        }
    }

    struct BrokenDirectory;

    #[async_trait]
    impl UserDirectory for BrokenDirectory {
        async fn username(&self, _user_id: i64) -> AppResult<Option<String>> {
            Err(AppError::Collaborator("chat not found".to_string()))
        }
    }

    fn setup(directory: Arc<dyn UserDirectory>) -> (tempfile::TempDir, PendingLedger, ReviewStore, ReviewPublisher) {
        let dir = tempfile::tempdir().unwrap();
        let pool = Arc::new(create_pool(&dir.path().join("publisher.sqlite")).unwrap());
        let store = ReviewStore::new(Arc::clone(&pool));
        let publisher = ReviewPublisher::new(store.clone(), directory);
        (dir, PendingLedger::new(pool), store, publisher)
    }

    #[tokio::test]
    async fn test_publish_appends_with_username() {
        let (_dir, _ledger, store, publisher) = setup(Arc::new(NamedDirectory("alice")));

        publisher.publish(42, 7, "first").await.unwrap();
        let second = publisher.publish(42, 8, "second").await.unwrap();

        let reviews = store.list_for(42).unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].text, "first");
        assert_eq!(reviews[1], second);
        assert_eq!(second.author_username, "alice");
    }

    #[tokio::test]
    async fn test_directory_failure_does_not_block_publish() {
        let (_dir, _ledger, store, publisher) = setup(Arc::new(BrokenDirectory));

        let review = publisher.publish(42, 7, "still saved").await.unwrap();

        assert_eq!(review.author_username, "");
        assert_eq!(store.list_for(42).unwrap(), vec![review]);
    }

    #[tokio::test]
    async fn test_publish_pending_consumes_ledger_entry() {
        let (_dir, ledger, store, publisher) = setup(Arc::new(BrokenDirectory));
        let pending = PendingReview::new(7, 42, "paid");
        ledger.put(&pending).unwrap();

        let first = publisher.publish_pending(&pending).await.unwrap();
        let second = publisher.publish_pending(&pending).await.unwrap();

        assert_eq!(first.map(|r| r.text), Some("paid".to_string()));
        assert_eq!(second, None);
        assert!(ledger.is_empty().unwrap());
        assert_eq!(store.list_for(42).unwrap().len(), 1);
    }
}
