//! Telegram transport: feeds teloxide updates to the [`CommandDispatcher`] and sends
//! its replies back through the Bot API.

use crate::command::{Entity, EntityKind};
use crate::dispatcher::{
    CommandDispatcher, InboundEvent, IncomingMessage, InlineAnswer, InlineQuery as CoreInlineQuery,
    Outbound,
};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{
    InlineQueryResult, InlineQueryResultArticle, InputMessageContent, InputMessageContentText,
    MessageEntityKind,
};
use tracing::{error, info};

/// Converts a teloxide message into the dispatcher's shape. Entity offsets come
/// out as byte positions into the text.
pub fn to_incoming(msg: &Message) -> IncomingMessage {
    let entities = msg
        .parse_entities()
        .unwrap_or_default()
        .iter()
        .map(|entity| Entity {
            kind: match entity.kind() {
                MessageEntityKind::BotCommand => EntityKind::BotCommand,
                _ => EntityKind::Other,
            },
            offset: entity.start(),
            length: entity.end() - entity.start(),
        })
        .collect();

    IncomingMessage {
        chat_id: msg.chat.id.0,
        text: msg.text().unwrap_or_default().to_string(),
        entities,
    }
}

fn to_results(answer: &InlineAnswer) -> Vec<InlineQueryResult> {
    answer
        .results
        .iter()
        .map(|article| {
            InlineQueryResult::Article(InlineQueryResultArticle::new(
                article.id.clone(),
                article.title.clone(),
                InputMessageContent::Text(InputMessageContentText::new(
                    article.message_text.clone(),
                )),
            ))
        })
        .collect()
}

async fn on_message(
    bot: Bot,
    msg: Message,
    dispatcher: Arc<CommandDispatcher>,
) -> ResponseResult<()> {
    info!(
        chat_id = msg.chat.id.0,
        message_content = %msg.text().unwrap_or_default(),
        "Received message"
    );

    let event = InboundEvent::Message(to_incoming(&msg));
    if let Outbound::Message(reply) = dispatcher.respond(event).await {
        if let Err(e) = bot.send_message(ChatId(reply.chat_id), reply.text).await {
            error!(chat_id = reply.chat_id, error = %e, "Failed to send reply");
        }
    }
    Ok(())
}

async fn on_inline_query(
    bot: Bot,
    query: InlineQuery,
    dispatcher: Arc<CommandDispatcher>,
) -> ResponseResult<()> {
    info!(query = %query.query, "Received inline query");

    let event = InboundEvent::InlineQuery(CoreInlineQuery {
        id: query.id.to_string(),
        query: query.query.clone(),
    });
    if let Outbound::InlineAnswer(answer) = dispatcher.respond(event).await {
        if let Err(e) = bot
            .answer_inline_query(query.id.clone(), to_results(&answer))
            .cache_time(answer.cache_time)
            .await
        {
            error!(error = %e, "Failed to answer inline query");
        }
    }
    Ok(())
}

/// Long-polls Telegram until interrupted with Ctrl-C.
pub async fn run_bot(token: &str, dispatcher: Arc<CommandDispatcher>) {
    let bot = Bot::new(token);

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_inline_query().endpoint(on_inline_query));

    info!("Telegram dispatcher starting");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatcher])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
    info!("Telegram dispatcher stopped");
}
