//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{Message, PreCheckoutQuery};

use super::commands::{handle_help_command, handle_start_command};
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::Command;

pub const PUBLISHED_TEXT: &str = "Payment received, your review has been published. Thank you!";
pub const ALREADY_PUBLISHED_TEXT: &str = "Payment received. This review was already published.";
pub const NOT_PAYABLE_TEXT: &str = "This review request has expired or was already paid. Please submit it again.";
pub const TRY_AGAIN_TEXT: &str = "Something went wrong, please try again in a minute.";

/// Creates the main dispatcher schema for the Telegram bot.
///
/// # Arguments
/// * `deps` - Handler dependencies (review service, Mini App URL)
///
/// # Returns
/// The complete handler tree for the bot
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_payment = deps.clone();
    let deps_commands = deps.clone();
    let deps_precheckout = deps;

    dptree::entry()
        // Successful payment handler must be first
        .branch(successful_payment_handler(deps_payment))
        .branch(command_handler(deps_commands))
        .branch(pre_checkout_handler(deps_precheckout))
}

/// Handler for successful Telegram payments
///
/// The invoice payload is the pending review token. Confirmations are
/// idempotent, so a redelivered update publishes nothing new.
fn successful_payment_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.successful_payment().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let Some(payment) = msg.successful_payment() else {
                    return Ok(());
                };
                let token = payment.invoice_payload.clone();

                log::info!(
                    "Received successful_payment: chat={} token={} amount={}",
                    msg.chat.id,
                    token,
                    payment.total_amount
                );

                let reply = match deps.service.confirm_payment(&token).await {
                    Ok(Some(_)) => PUBLISHED_TEXT.to_string(),
                    Ok(None) => ALREADY_PUBLISHED_TEXT.to_string(),
                    Err(e) => {
                        // The pending entry survives a failed settlement; `jobs-bot settle` retries it
                        log::error!("Failed to publish paid review {}: {}", token, e);
                        format!(
                            "Payment received, but the review could not be published yet. \
                             Please contact support with this code: {}",
                            token
                        )
                    }
                };

                bot.send_message(msg.chat.id, reply).await?;
                Ok(())
            }
        })
}

/// Handler for /start and /help
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

                match cmd {
                    Command::Start => handle_start_command(&bot, &msg, &deps).await?,
                    Command::Help => handle_help_command(&bot, &msg).await?,
                }
                Ok(())
            }
        },
    ))
}

/// Handler for pre-checkout queries
///
/// Telegram asks before charging; only tokens still in the ledger are approved.
fn pre_checkout_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_pre_checkout_query().endpoint(move |bot: Bot, query: PreCheckoutQuery| {
        let deps = deps.clone();
        async move {
            let query_id = query.id;
            let payload = query.invoice_payload;

            log::info!(
                "Received pre_checkout_query: id={}, payload={}, from={}",
                query_id,
                payload,
                query.from.id
            );

            let rejection = match deps.service.is_payable(&payload).await {
                Ok(true) => None,
                Ok(false) => Some(NOT_PAYABLE_TEXT),
                Err(e) => {
                    log::error!("Failed to check pending review {}: {}", payload, e);
                    Some(TRY_AGAIN_TEXT)
                }
            };

            let answer = match rejection {
                None => bot.answer_pre_checkout_query(query_id, true).await,
                Some(message) => {
                    bot.answer_pre_checkout_query(query_id, false)
                        .error_message(message)
                        .await
                }
            };

            match answer {
                Ok(_) if rejection.is_none() => log::info!("Pre-checkout query approved for payload: {}", payload),
                Ok(_) => log::info!("Pre-checkout query rejected for payload: {}", payload),
                Err(e) => log::error!("Failed to answer pre_checkout_query: {:?}", e),
            }
            Ok(())
        }
    })
}
