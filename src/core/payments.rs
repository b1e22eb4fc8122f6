//! Paid review flow
//!
//! `request_invoice` parks the review in the pending ledger and returns a
//! one-Star invoice link; `confirm_payment` runs when Telegram reports the
//! payment and publishes the review exactly once per token.

use std::sync::Arc;

use crate::core::error::{AppError, AppResult};
use crate::core::publisher::ReviewPublisher;
use crate::core::review::{PendingReview, PublishedReview};
use crate::core::traits::{InvoiceIssuer, InvoiceRequest, UserDirectory};
use crate::storage::db::{run_blocking, DbPool};
use crate::storage::{PendingLedger, ReviewStore};

/// Issued invoice for a pending review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceTicket {
    pub token: String,
    pub invoice_link: String,
}

#[derive(Clone)]
pub struct ReviewService {
    ledger: PendingLedger,
    store: ReviewStore,
    publisher: ReviewPublisher,
    issuer: Arc<dyn InvoiceIssuer>,
}

impl ReviewService {
    pub fn new(pool: Arc<DbPool>, issuer: Arc<dyn InvoiceIssuer>, directory: Arc<dyn UserDirectory>) -> Self {
        let store = ReviewStore::new(Arc::clone(&pool));
        Self {
            ledger: PendingLedger::new(pool),
            publisher: ReviewPublisher::new(store.clone(), directory),
            store,
            issuer,
        }
    }

    pub fn ledger(&self) -> &PendingLedger {
        &self.ledger
    }

    pub fn publisher(&self) -> &ReviewPublisher {
        &self.publisher
    }

    /// Stores a pending review and asks the platform for its invoice link.
    ///
    /// When the link can't be created the pending entry is removed again and
    /// the issuer's error is returned.
    pub async fn request_invoice(&self, author_user_id: i64, target_user_id: i64, text: &str) -> AppResult<InvoiceTicket> {
        if text.trim().is_empty() {
            return Err(AppError::Validation("review text is empty".to_string()));
        }

        let pending = PendingReview::new(author_user_id, target_user_id, text);
        let token = pending.token.clone();

        let ledger = self.ledger.clone();
        run_blocking(move || ledger.put(&pending)).await?;

        let invoice = InvoiceRequest::review_submission(&token);
        match self.issuer.create_invoice_link(&invoice).await {
            Ok(invoice_link) => {
                log::info!(
                    "Invoice created: token={} author={} target={}",
                    token,
                    author_user_id,
                    target_user_id
                );
                Ok(InvoiceTicket { token, invoice_link })
            }
            Err(e) => {
                log::error!("Failed to create invoice link for token {}: {}", token, e);
                let ledger = self.ledger.clone();
                let discard = token.clone();
                if let Err(cleanup) = run_blocking(move || ledger.take(&discard)).await {
                    log::warn!("Failed to discard pending review {}: {}", token, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Handles a payment confirmation carrying `token` as invoice payload.
    ///
    /// Unknown and already-consumed tokens are a no-op (`Ok(None)`); Telegram
    /// may deliver the same confirmation more than once.
    pub async fn confirm_payment(&self, token: &str) -> AppResult<Option<PublishedReview>> {
        let ledger = self.ledger.clone();
        let lookup = token.to_string();
        let Some(pending) = run_blocking(move || ledger.peek(&lookup)).await? else {
            log::info!("Payment for unknown or consumed token {} ignored", token);
            return Ok(None);
        };

        let published = self.publisher.publish_pending(&pending).await?;
        if published.is_none() {
            log::info!("Payment for token {} was already processed", token);
        }
        Ok(published)
    }

    /// Whether a checkout for `token` should be approved.
    pub async fn is_payable(&self, token: &str) -> AppResult<bool> {
        let ledger = self.ledger.clone();
        let token = token.to_string();
        Ok(run_blocking(move || ledger.peek(&token)).await?.is_some())
    }

    pub async fn reviews_for(&self, target_user_id: i64) -> AppResult<Vec<PublishedReview>> {
        let store = self.store.clone();
        run_blocking(move || store.list_for(target_user_id)).await
    }

    pub async fn pending_reviews(&self) -> AppResult<Vec<PendingReview>> {
        let ledger = self.ledger.clone();
        run_blocking(move || ledger.list()).await
    }
}
