//! Telegram bot integration, Bot API gateway and Mini App API

pub mod bot;
pub mod gateway;
pub mod handlers;
pub mod webapp;
pub mod webapp_auth;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use gateway::TelegramGateway;
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use webapp::{create_webapp_router, run_webapp_server, WebAppState};
pub use webapp_auth::WebAppAuthenticator;
