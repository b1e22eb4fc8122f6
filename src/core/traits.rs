//! Seams to the messaging platform.
//!
//! The review flow talks to Telegram only through these traits, so the core
//! has no teloxide dependency and tests can swap in fakes. The teloxide
//! implementations live in `crate::telegram::gateway`.

use async_trait::async_trait;

use crate::core::config::{REVIEW_PRICE_STARS, STARS_CURRENCY};
use crate::core::error::AppResult;

/// One priced line of an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLine {
    pub label: String,
    /// Amount in the smallest unit of `currency` (whole Stars for XTR)
    pub amount: u32,
}

/// Everything the platform needs to issue a payable link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRequest {
    pub title: String,
    pub description: String,
    /// Opaque payload echoed back in the payment confirmation
    pub payload: String,
    pub currency: String,
    pub prices: Vec<InvoiceLine>,
}

impl InvoiceRequest {
    /// The one-Star invoice for publishing the review behind `token`.
    pub fn review_submission(token: &str) -> Self {
        Self {
            title: "Submit a Review".to_string(),
            description: format!(
                "Pay {} Telegram Star to submit a review",
                REVIEW_PRICE_STARS
            ),
            payload: token.to_string(),
            currency: STARS_CURRENCY.to_string(),
            prices: vec![InvoiceLine {
                label: "Review Submission".to_string(),
                amount: REVIEW_PRICE_STARS,
            }],
        }
    }
}

/// Creates payable invoice links.
#[async_trait]
pub trait InvoiceIssuer: Send + Sync {
    /// Returns the URL the user opens to pay.
    async fn create_invoice_link(&self, invoice: &InvoiceRequest) -> AppResult<String>;
}

/// Resolves Telegram users to display names.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `Ok(None)` when the user exists but has no username.
    async fn username(&self, user_id: i64) -> AppResult<Option<String>>;
}
