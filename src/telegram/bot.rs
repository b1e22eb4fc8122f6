//! Bot initialization and command definitions

use anyhow::Context;
use reqwest::ClientBuilder;
use secrecy::{ExposeSecret, SecretString};
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;

use crate::core::config::BotConfig;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "open the job board")]
    Start,
    #[command(description = "how paid reviews work")]
    Help,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Invalid API URL or HTTP client construction failure
pub fn create_bot(token: &SecretString, config: &BotConfig) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new()
        .timeout(config.request_timeout())
        .build()
        .context("Failed to build Bot API HTTP client")?;
    let bot = Bot::with_client(token.expose_secret(), client);

    let bot = match config.api_url.as_deref() {
        Some(api_url) => {
            log::info!("Using custom Bot API URL: {}", api_url);
            let url = url::Url::parse(api_url).with_context(|| format!("Invalid bot.api_url: {}", api_url))?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands: Vec<BotCommand> = Command::bot_commands();
    bot.set_my_commands(commands).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_parse() {
        assert_eq!(Command::parse("/start", "jobs_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/help", "jobs_bot").unwrap(), Command::Help);
        assert!(Command::parse("/pay", "jobs_bot").is_err());
    }

    #[test]
    fn test_command_descriptions() {
        let descriptions = Command::descriptions().to_string();
        assert!(descriptions.contains("Available commands:"));
        assert!(descriptions.contains("/start"));
        assert!(descriptions.contains("/help"));
    }

    #[test]
    fn test_invalid_api_url_is_rejected() {
        let config = BotConfig {
            api_url: Some("not a url".to_string()),
            request_timeout_secs: 5,
            webapp_url: None,
        };
        assert!(create_bot(&SecretString::from("123:abc".to_string()), &config).is_err());
    }
}
