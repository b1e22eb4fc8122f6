//! Payment handler tests using teloxide_tests
//!
//! The production schema runs against `MockBot` with a temp SQLite database,
//! so no request reaches the real Bot API.
//! Run with: cargo test --test handlers_test

mod common;

use std::sync::Arc;

use common::TestEnvironment;
use jobs_bot::telegram::handlers::{ALREADY_PUBLISHED_TEXT, NOT_PAYABLE_TEXT, PUBLISHED_TEXT};
use jobs_bot::telegram::{schema, HandlerDeps};
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;
use teloxide::types::SuccessfulPayment;
use teloxide_tests::{MockBot, MockMessageSuccessfulPayment, MockPreCheckoutQuery};

const AUTHOR: i64 = 1001;
const TARGET: i64 = 42;

/// Stars payment for `token`, shaped like the Bot API object
fn stars_payment(token: &str) -> MockMessageSuccessfulPayment {
    let payment: SuccessfulPayment = serde_json::from_value(json!({
        "currency": "XTR",
        "total_amount": 1,
        "invoice_payload": token,
        "telegram_payment_charge_id": "stxTestCharge",
        "provider_payment_charge_id": ""
    }))
    .expect("Bot API payment JSON should deserialize");

    MockMessageSuccessfulPayment::new().successful_payment(payment)
}

async fn pending_token(env: &TestEnvironment, text: &str) -> String {
    env.service
        .request_invoice(AUTHOR, TARGET, text)
        .await
        .expect("Failed to request invoice")
        .token
}

#[tokio::test]
#[serial]
async fn test_successful_payment_publishes_review() {
    let env = TestEnvironment::new();
    let token = pending_token(&env, "Delivered on time").await;

    let deps = HandlerDeps::new(Arc::clone(&env.service), None);
    let mut bot = MockBot::new(stars_payment(&token), schema(deps));
    bot.dispatch().await;

    let responses = bot.get_responses();
    assert_eq!(responses.sent_messages.len(), 1);
    assert_eq!(responses.sent_messages[0].text(), Some(PUBLISHED_TEXT));

    let reviews = env.service.reviews_for(TARGET).await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].text, "Delivered on time");
    assert_eq!(reviews[0].author_user_id, AUTHOR);
    assert!(!env.service.is_payable(&token).await.unwrap());
}

#[tokio::test]
#[serial]
async fn test_redelivered_payment_publishes_once() {
    let env = TestEnvironment::new();
    let token = pending_token(&env, "Clear requirements").await;

    let deps = HandlerDeps::new(Arc::clone(&env.service), None);
    let mut bot = MockBot::new(vec![stars_payment(&token), stars_payment(&token)], schema(deps));
    bot.dispatch().await;

    let responses = bot.get_responses();
    let texts: Vec<Option<&str>> = responses.sent_messages.iter().map(|m| m.text()).collect();
    assert_eq!(texts, vec![Some(PUBLISHED_TEXT), Some(ALREADY_PUBLISHED_TEXT)]);

    assert_eq!(env.service.reviews_for(TARGET).await.unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn test_pre_checkout_approves_pending_token() {
    let env = TestEnvironment::new();
    let token = pending_token(&env, "Fast payout").await;

    let deps = HandlerDeps::new(Arc::clone(&env.service), None);
    let mut bot = MockBot::new(MockPreCheckoutQuery::new().invoice_payload(token.clone()), schema(deps));
    bot.dispatch().await;

    let responses = bot.get_responses();
    assert_eq!(responses.answered_pre_checkout_queries.len(), 1);
    assert!(responses.answered_pre_checkout_queries[0].ok);
    assert_eq!(responses.answered_pre_checkout_queries[0].error_message, None);

    // Approval does not consume the entry
    assert!(env.service.is_payable(&token).await.unwrap());
}

#[tokio::test]
#[serial]
async fn test_pre_checkout_rejects_consumed_token() {
    let env = TestEnvironment::new();
    let token = pending_token(&env, "Paid already").await;
    assert!(env.service.confirm_payment(&token).await.unwrap().is_some());

    let deps = HandlerDeps::new(Arc::clone(&env.service), None);
    let mut bot = MockBot::new(MockPreCheckoutQuery::new().invoice_payload(token), schema(deps));
    bot.dispatch().await;

    let responses = bot.get_responses();
    assert_eq!(responses.answered_pre_checkout_queries.len(), 1);
    let answer = &responses.answered_pre_checkout_queries[0];
    assert!(!answer.ok);
    assert_eq!(answer.error_message.as_deref(), Some(NOT_PAYABLE_TEXT));

    // No second review from the rejected attempt
    assert_eq!(env.service.reviews_for(TARGET).await.unwrap().len(), 1);
}
