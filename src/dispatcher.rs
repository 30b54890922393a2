//! Turns inbound chat events into replies.

use crate::cache::SnapshotCache;
use crate::command::{Command, Entity, split_args};
use crate::convert::{Conversion, Rejected, convert};
use crate::core::error::RateError;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, error, instrument};

pub const DEFAULT_REPLY: &str = "Try /help command.";
pub const FAILED_TO_CONVERT: &str = "Failed to convert.";

pub fn help_text(bot_username: &str) -> String {
    format!(
        "List of available commands:\n\
         /help - usage info\n\
         /convert - convert currency using [FROM TO AMOUNT] format (i.e. /convert USD EUR 100)\n\
         \n\
         Inline query mode is available:\n\
         Try writing: @{bot_username} usd uah 250\n"
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub text: String,
    pub entities: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineQuery {
    pub id: String,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Message(IncomingMessage),
    InlineQuery(InlineQuery),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineArticle {
    pub id: String,
    pub title: String,
    pub message_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineAnswer {
    pub inline_query_id: String,
    pub results: Vec<InlineArticle>,
    /// Seconds the platform may cache the answer; always 0 so every keystroke is
    /// answered with current rates.
    pub cache_time: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Message(OutgoingMessage),
    InlineAnswer(InlineAnswer),
}

fn single_article(query: &InlineQuery, text: String) -> InlineAnswer {
    InlineAnswer {
        inline_query_id: query.id.clone(),
        results: vec![InlineArticle {
            id: query.id.clone(),
            title: text.clone(),
            message_text: text,
        }],
        cache_time: 0,
    }
}

impl Outbound {
    /// Reply used when handling an event failed outright.
    pub fn fallback(event: &InboundEvent) -> Self {
        match event {
            InboundEvent::Message(message) => Outbound::Message(OutgoingMessage {
                chat_id: message.chat_id,
                text: FAILED_TO_CONVERT.to_string(),
            }),
            InboundEvent::InlineQuery(query) => {
                Outbound::InlineAnswer(single_article(query, FAILED_TO_CONVERT.to_string()))
            }
        }
    }
}

pub struct CommandDispatcher {
    cache: Arc<SnapshotCache>,
    bot_username: String,
}

impl CommandDispatcher {
    pub fn new(cache: Arc<SnapshotCache>, bot_username: &str) -> Self {
        Self {
            cache,
            bot_username: bot_username.to_string(),
        }
    }

    /// Handles `event` in its own task. Whatever happens inside, the caller gets
    /// a reply to send.
    pub async fn respond(self: &Arc<Self>, event: InboundEvent) -> Outbound {
        let this = Arc::clone(self);
        let task_event = event.clone();
        match tokio::spawn(async move { this.process(task_event).await }).await {
            Ok(outbound) => outbound,
            Err(e) => {
                error!(error = %e, "Event handler aborted");
                Outbound::fallback(&event)
            }
        }
    }

    pub async fn process(&self, event: InboundEvent) -> Outbound {
        match event {
            InboundEvent::Message(message) => {
                Outbound::Message(self.reply_to_message(&message).await)
            }
            InboundEvent::InlineQuery(query) => {
                Outbound::InlineAnswer(self.answer_inline_query(&query).await)
            }
        }
    }

    #[instrument(skip_all, fields(chat_id = message.chat_id))]
    pub async fn reply_to_message(&self, message: &IncomingMessage) -> OutgoingMessage {
        let today = self.cache.today();
        let text = match Command::parse(&message.text, &message.entities, &self.bot_username) {
            Some(command) => match command.name.as_str() {
                "/help" => help_text(&self.bot_username),
                "/convert" => match self.try_convert(today, &command.args).await {
                    Ok(Ok(conversion)) => conversion.to_string(),
                    Ok(Err(rejected)) => {
                        debug!(?rejected, "Conversion rejected");
                        DEFAULT_REPLY.to_string()
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to obtain rates");
                        FAILED_TO_CONVERT.to_string()
                    }
                },
                other => {
                    debug!(command = %other, "Unknown command");
                    DEFAULT_REPLY.to_string()
                }
            },
            None => DEFAULT_REPLY.to_string(),
        };

        OutgoingMessage {
            chat_id: message.chat_id,
            text,
        }
    }

    #[instrument(skip_all, fields(query_id = %query.id))]
    pub async fn answer_inline_query(&self, query: &InlineQuery) -> InlineAnswer {
        let today = self.cache.today();
        let text = match self.try_convert(today, &split_args(&query.query)).await {
            Ok(Ok(conversion)) => conversion.to_string(),
            Ok(Err(rejected)) => {
                debug!(?rejected, "Conversion rejected");
                FAILED_TO_CONVERT.to_string()
            }
            Err(e) => {
                error!(error = %e, "Failed to obtain rates");
                FAILED_TO_CONVERT.to_string()
            }
        };
        single_article(query, text)
    }

    /// Arguments are read as `FROM TO AMOUNT`; extra tokens are ignored.
    async fn try_convert(
        &self,
        today: NaiveDate,
        args: &[String],
    ) -> Result<Result<Conversion, Rejected>, RateError> {
        let snapshot = self.cache.refresh_if_stale(today).await?;
        let arg = |i: usize| args.get(i).map(String::as_str);
        Ok(convert(&snapshot, arg(0), arg(1), arg(2)))
    }
}
