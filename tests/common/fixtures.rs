//! Test environment with a throwaway database and fake Telegram collaborators

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use jobs_bot::core::error::{AppError, AppResult};
use jobs_bot::core::traits::{InvoiceIssuer, InvoiceRequest, UserDirectory};
use jobs_bot::storage::create_pool;
use jobs_bot::telegram::{create_webapp_router, WebAppAuthenticator, WebAppState};
use jobs_bot::ReviewService;
use secrecy::SecretString;
use tempfile::TempDir;

pub const TEST_BOT_TOKEN: &str = "123456789:AAE-test-token-for-signing";

/// Invoice issuer that records requests and returns predictable links
#[derive(Default)]
pub struct FakeIssuer {
    pub fail_with: Option<String>,
    pub invoices: Mutex<Vec<InvoiceRequest>>,
}

impl FakeIssuer {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn issued(&self) -> Vec<InvoiceRequest> {
        self.invoices.lock().unwrap().clone()
    }
}

#[async_trait]
impl InvoiceIssuer for FakeIssuer {
    async fn create_invoice_link(&self, invoice: &InvoiceRequest) -> AppResult<String> {
        self.invoices.lock().unwrap().push(invoice.clone());
        match &self.fail_with {
            Some(message) => Err(AppError::Collaborator(message.clone())),
            None => Ok(format!("https://t.me/$test-invoice-{}", invoice.payload)),
        }
    }
}

/// User directory backed by a map; unknown ids fail like a Bot API error
#[derive(Default)]
pub struct FakeDirectory {
    pub usernames: HashMap<i64, String>,
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn username(&self, user_id: i64) -> AppResult<Option<String>> {
        self.usernames
            .get(&user_id)
            .cloned()
            .map(Some)
            .ok_or_else(|| AppError::Collaborator(format!("Bad Request: chat {} not found", user_id)))
    }
}

pub struct TestEnvironment {
    _dir: TempDir,
    pub service: Arc<ReviewService>,
    pub issuer: Arc<FakeIssuer>,
    pub router: Router,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self::with_issuer(FakeIssuer::default())
    }

    pub fn with_issuer(issuer: FakeIssuer) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let pool = Arc::new(create_pool(&dir.path().join("jobs.sqlite")).expect("Failed to create pool"));

        let issuer = Arc::new(issuer);
        let directory = Arc::new(FakeDirectory {
            usernames: HashMap::from([(1001, "alice".to_string())]),
        });
        let service = Arc::new(ReviewService::new(pool, issuer.clone(), directory));

        let state = WebAppState {
            service: Arc::clone(&service),
            authenticator: Arc::new(WebAppAuthenticator::new(
                SecretString::from(TEST_BOT_TOKEN.to_string()),
                Some(Duration::from_secs(3600)),
            )),
        };
        let router = create_webapp_router(state, &["http://localhost:5173".to_string()]);

        Self {
            _dir: dir,
            service,
            issuer,
            router,
        }
    }
}
