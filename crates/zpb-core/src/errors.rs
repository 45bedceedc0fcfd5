/// Core error type for the bot.
///
/// Adapter crates should map their specific errors into this type so the bot
/// core can handle failures consistently (user-facing message vs logged).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The chat identity has no enrolled API token.
    #[error("no API token enrolled for this identity")]
    NotAuthorized,

    /// Network-level failure (DNS, TLS, timeout). Carries no HTTP status.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx response from the merchant API.
    #[error("merchant API error {status}: {payload}")]
    RemoteApi {
        status: u16,
        payload: serde_json::Value,
    },

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
