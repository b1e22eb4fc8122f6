//! Bot API implementations of the invoice issuer and user directory.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::LabeledPrice;

use crate::core::error::{AppError, AppResult};
use crate::core::traits::{InvoiceIssuer, InvoiceRequest, UserDirectory};

#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl InvoiceIssuer for TelegramGateway {
    async fn create_invoice_link(&self, invoice: &InvoiceRequest) -> AppResult<String> {
        let prices: Vec<LabeledPrice> = invoice
            .prices
            .iter()
            .map(|line| LabeledPrice::new(line.label.clone(), line.amount))
            .collect();

        let link = self
            .bot
            .create_invoice_link(
                invoice.title.clone(),
                invoice.description.clone(),
                invoice.payload.clone(),
                invoice.currency.clone(),
                prices,
            )
            .await?;

        Ok(link)
    }
}

#[async_trait]
impl UserDirectory for TelegramGateway {
    async fn username(&self, user_id: i64) -> AppResult<Option<String>> {
        let id = u64::try_from(user_id).map_err(|_| AppError::Validation(format!("invalid user id {}", user_id)))?;

        // A user's private chat has the same id as the user
        let member = self.bot.get_chat_member(ChatId(user_id), UserId(id)).await?;
        Ok(member.user.username)
    }
}
