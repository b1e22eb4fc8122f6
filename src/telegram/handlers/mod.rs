//! Конфигурация дерева обработчиков бота
//!
//! Схема диспетчера строится из обычных зависимостей, поэтому
//! `tests/handlers_test.rs` гоняет через `MockBot` то же дерево, что и прод.

mod commands;
mod schema;
mod types;

pub use schema::{schema, ALREADY_PUBLISHED_TEXT, NOT_PAYABLE_TEXT, PUBLISHED_TEXT, TRY_AGAIN_TEXT};
pub use types::{HandlerDeps, HandlerError};
