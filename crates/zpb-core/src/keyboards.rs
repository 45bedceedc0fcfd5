//! The bot's three inline keyboards.

use crate::{
    callbacks,
    messaging::types::{InlineButton, InlineKeyboard},
};

pub fn main_menu() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        InlineButton::new("Check balance", callbacks::BALANCE),
        InlineButton::new("Recent payments", callbacks::PAYMENTS_LAST),
        InlineButton::new("Find payment", callbacks::CHECK_PAYMENT),
        InlineButton::new("Withdraw", callbacks::WITHDRAW),
    ])
}

pub fn cancel() -> InlineKeyboard {
    InlineKeyboard::new(vec![InlineButton::new("Cancel", callbacks::CANCEL)])
}

pub fn hide() -> InlineKeyboard {
    InlineKeyboard::new(vec![InlineButton::new("Hide", callbacks::DELETE_MESSAGE)])
}
