//! Core domain: configuration, errors, logging and the paid review flow

pub mod config;
pub mod error;
pub mod logging;
pub mod payments;
pub mod publisher;
pub mod review;
pub mod traits;

// Re-exports for convenience
pub use config::Config;
pub use error::{AppError, AppResult};
pub use logging::init_logger;
pub use payments::{InvoiceTicket, ReviewService};
pub use publisher::ReviewPublisher;
pub use review::{PendingReview, PublishedReview};
