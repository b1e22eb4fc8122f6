//! Database, pending ledger and published review storage

pub mod db;
pub mod ledger;
pub mod migrations;
pub mod reviews;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use ledger::PendingLedger;
pub use reviews::ReviewStore;
