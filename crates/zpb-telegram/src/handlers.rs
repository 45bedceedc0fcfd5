//! Telegram update handlers.
//!
//! Thin adapters: each maps the teloxide update onto the core types and
//! forwards to the action router. Router failures are logged here; the
//! dispatch loop itself must survive any single bad update.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use tracing::error;

use zpb_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    messaging::types,
};

use crate::router::AppState;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        // Media and service messages carry no meaning for this bot.
        return Ok(());
    };

    let chat_id = ChatId(msg.chat.id.0);
    let user_id = UserId(user.id.0 as i64);

    let result = match parse_command(text) {
        Some(name) => {
            state
                .router
                .handle_command(types::Command {
                    chat_id,
                    user_id,
                    name: name.to_string(),
                })
                .await
        }
        None => {
            state
                .router
                .handle_text(types::TextMessage {
                    chat_id,
                    user_id,
                    message: MessageRef {
                        chat_id,
                        message_id: MessageId(msg.id.0),
                    },
                    text: text.to_string(),
                })
                .await
        }
    };

    if let Err(e) = result {
        error!("message handler failed: {e}");
    }
    Ok(())
}

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(message) = q.message.as_ref() else {
        // Inline-mode callbacks carry no message; nothing to act on.
        let _ = state.messenger.answer_callback_query(&q.id, None).await;
        return Ok(());
    };

    let chat_id = ChatId(message.chat.id.0);
    let cb = types::CallbackQuery {
        chat_id,
        user_id: UserId(q.from.id.0 as i64),
        callback_id: q.id.clone(),
        data: q.data.clone().unwrap_or_default(),
        message: Some(MessageRef {
            chat_id,
            message_id: MessageId(message.id.0),
        }),
    };

    if let Err(e) = state.router.handle_callback(cb).await {
        error!("callback handler failed: {e}");
    }
    Ok(())
}

/// `/name` or `/name@botname`, first word only.
fn parse_command(text: &str) -> Option<&str> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    if name.is_empty() {
        return None;
    }
    Some(name.split('@').next().unwrap_or(name))
}
