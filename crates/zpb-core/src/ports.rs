use std::time::Duration;

use async_trait::async_trait;

use crate::{domain::ApiToken, Result};

/// Port for the remote merchant-payments API.
///
/// Success is any 2xx response with the decoded JSON body (or the raw text
/// body as a JSON string when the body is not valid JSON). Everything else
/// is `Error::RemoteApi { status, payload }`; network-level failures are
/// `Error::Transport`. Implementations never retry: a failed call is
/// reported exactly once, and a re-press of a button is the retry.
#[async_trait]
pub trait MerchantApi: Send + Sync {
    async fn get(
        &self,
        path: &str,
        token: &ApiToken,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<serde_json::Value>;

    async fn post(
        &self,
        path: &str,
        token: &ApiToken,
        body: Option<serde_json::Value>,
        timeout: Duration,
    ) -> Result<serde_json::Value>;
}
