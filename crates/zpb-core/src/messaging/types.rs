use crate::domain::{ChatId, MessageRef, UserId};

/// Incoming `/command` message (only `/start` is meaningful today).
#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub name: String,
}

/// Incoming free-text message.
#[derive(Clone, Debug)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub message: MessageRef,
    pub text: String,
}

/// Incoming inline-keyboard callback.
#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub callback_id: String,
    pub data: String,
    /// The message carrying the keyboard, when the transport still has it.
    pub message: Option<MessageRef>,
}

/// Inline keyboard rendered one button per row.
#[derive(Clone, Debug)]
pub struct InlineKeyboard {
    pub buttons: Vec<InlineButton>,
}

#[derive(Clone, Debug)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineKeyboard {
    pub fn new(buttons: Vec<InlineButton>) -> Self {
        Self { buttons }
    }
}

impl InlineButton {
    pub fn new(label: &str, callback_data: &str) -> Self {
        Self {
            label: label.to_string(),
            callback_data: callback_data.to_string(),
        }
    }
}
