/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
///
/// For direct chats this is numerically equal to the user id, which is what
/// lets deposit fan-out address enrolled operators by their user id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Bearer token identifying a merchant account on the remote payments API.
///
/// Loaded once at startup and immutable for the process lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiToken(pub String);
