//! Deposit notification fan-out.

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    directory::CredentialDirectory,
    domain::ChatId,
    formatting,
    messaging::port::MessagingPort,
};

/// Webhook discriminator for deposit notifications.
pub const DEPOSIT_KIND: &str = "new_deposit";

/// A deposit push from the payments API. Not stored; fanned out and dropped.
#[derive(Clone, Debug, Deserialize)]
pub struct DepositEvent {
    pub address: String,
    /// Kept as a raw JSON value: the remote sends arbitrary-precision
    /// decimals and we only ever render it.
    pub amount: serde_json::Value,
    pub new_status: String,
    pub merchant_api_token: String,
}

/// Send one notification per enrolled identity.
///
/// Deliveries are isolated: a failure for one recipient is logged and the
/// rest are still attempted. An unenrolled token is a configuration gap,
/// not an error.
pub async fn notify_deposit(
    directory: &CredentialDirectory,
    messenger: &dyn MessagingPort,
    event: &DepositEvent,
) {
    let recipients = directory.identities_for(&event.merchant_api_token);
    if recipients.is_empty() {
        warn!("merchant API token not enrolled; dropping deposit notification");
        return;
    }

    let text = formatting::deposit_notification(event);
    for user in recipients {
        // Direct chats share the user's numeric id.
        let chat_id = ChatId(user.0);
        if let Err(e) = messenger.send_html(chat_id, &text).await {
            warn!("failed to deliver deposit notification to chat {}: {e}", user.0);
        }
    }
    info!("deposit notifications sent to {} recipient(s)", recipients.len());
}
