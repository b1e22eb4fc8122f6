//! Common test utilities
//!
//! This module is shared across all integration tests

pub mod fixtures;
pub mod helpers;

#[allow(unused_imports)]
pub use fixtures::{FakeDirectory, FakeIssuer, TestEnvironment, TEST_BOT_TOKEN};
#[allow(unused_imports)]
pub use helpers::{get, post_invoice, send, signed_init_data, signed_init_data_at};
