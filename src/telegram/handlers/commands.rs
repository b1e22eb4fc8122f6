//! Command handler implementations (/start, /help)

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, Message, WebAppInfo};

use super::types::{HandlerDeps, HandlerError};

pub(super) const START_TEXT: &str = "Welcome to the job board!\n\n\
Open the Mini App to browse jobs and people. You can leave a review for anyone \
you have worked with; publishing a review costs 1 Telegram Star.";

pub(super) const HELP_TEXT: &str = "How reviews work:\n\n\
1. Write a review in the Mini App.\n\
2. Pay the 1 Star invoice.\n\
3. The review appears on the person's profile as soon as the payment goes through.\n\n\
Each payment publishes exactly one review.";

/// Handle /start command
pub(super) async fn handle_start_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let mut request = bot.send_message(msg.chat.id, START_TEXT);

    if let Some(url) = &deps.webapp_url {
        let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::web_app(
            "Open job board",
            WebAppInfo { url: url.clone() },
        )]]);
        request = request.reply_markup(keyboard);
    }

    request.await?;
    Ok(())
}

/// Handle /help command
pub(super) async fn handle_help_command(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    bot.send_message(msg.chat.id, HELP_TEXT).await?;
    Ok(())
}
