//! Review domain types shared by the ledger, the publisher and the web layer.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A review that was requested but not paid for yet.
///
/// Lives in the pending ledger, keyed by `token`, until the matching payment
/// confirmation consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingReview {
    /// Invoice payload that ties the payment back to this review
    pub token: String,
    pub author_user_id: i64,
    pub target_user_id: i64,
    pub text: String,
}

/// A paid review, visible on the target user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedReview {
    pub text: String,
    pub author_user_id: i64,
    /// Telegram username of the author, empty when it could not be resolved
    pub author_username: String,
    /// RFC 3339 UTC timestamp of publication
    pub date: String,
}

impl PendingReview {
    /// Creates a pending review with a fresh token for `author_user_id`.
    pub fn new(author_user_id: i64, target_user_id: i64, text: impl Into<String>) -> Self {
        Self {
            token: new_review_token(author_user_id),
            author_user_id,
            target_user_id,
            text: text.into(),
        }
    }

    /// Turns the pending entry into its published form.
    pub fn publish_as(&self, author_username: impl Into<String>) -> PublishedReview {
        PublishedReview {
            text: self.text.clone(),
            author_user_id: self.author_user_id,
            author_username: author_username.into(),
            date: now_rfc3339(),
        }
    }
}

/// Generates an invoice payload unique per (author, timestamp).
///
/// Format: `{author_user_id}_{unix_nanos}`. Telegram caps payloads at 128
/// bytes; this stays well under 45.
pub fn new_review_token(author_user_id: i64) -> String {
    let now = Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1_000));
    format!("{}_{}", author_user_id, nanos)
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
