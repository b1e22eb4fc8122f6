//! Jobs bot - backend of a Telegram Mini App job marketplace
//!
//! Mini App users leave reviews for each other. Publishing a review costs one
//! Telegram Star: the review waits in a durable pending ledger until Telegram
//! confirms the payment, then it is appended to the target user's reviews.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging and the paid review flow
//! - `storage`: SQLite pool, migrations, pending ledger and review store
//! - `telegram`: bot handlers, Bot API gateway and the Mini App HTTP API

pub mod cli;
pub mod core;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult, Config, ReviewService};
pub use crate::storage::{create_pool, get_connection, DbConnection, DbPool};
