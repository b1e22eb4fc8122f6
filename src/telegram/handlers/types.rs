//! Handler types and dependencies

use std::sync::Arc;

use url::Url;

use crate::core::ReviewService;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub service: Arc<ReviewService>,
    /// Mini App opened from the /start button, if configured
    pub webapp_url: Option<Url>,
}

impl HandlerDeps {
    pub fn new(service: Arc<ReviewService>, webapp_url: Option<Url>) -> Self {
        Self { service, webapp_url }
    }
}
