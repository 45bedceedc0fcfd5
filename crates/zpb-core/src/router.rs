//! The dispatch layer: for each inbound chat event, resolves authorization,
//! consults/updates conversation state, and runs the matching action.
//!
//! Remote and validation errors are translated to user messages here and
//! never propagate to the dispatch loop; the only errors a caller sees are
//! messenger failures, which the adapter logs.

use std::{sync::Arc, time::Duration};

use serde_json::json;
use tracing::debug;

use crate::{
    callbacks::Action,
    directory::CredentialDirectory,
    domain::{ApiToken, ChatId, UserId},
    errors::Error,
    formatting, keyboards,
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, Command, TextMessage},
    },
    ports::MerchantApi,
    state::{ConversationState, ConversationStore},
    tron, Result,
};

/// The account-summary lookup is the interactive hot path; keep it snappy.
const INFO_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ActionRouter {
    api: Arc<dyn MerchantApi>,
    directory: Arc<CredentialDirectory>,
    states: Arc<ConversationStore>,
    messenger: Arc<dyn MessagingPort>,
    timeout: Duration,
}

impl ActionRouter {
    pub fn new(
        api: Arc<dyn MerchantApi>,
        directory: Arc<CredentialDirectory>,
        states: Arc<ConversationStore>,
        messenger: Arc<dyn MessagingPort>,
        timeout: Duration,
    ) -> Self {
        Self {
            api,
            directory,
            states,
            messenger,
            timeout,
        }
    }

    // ============== Entry points ==============

    pub async fn handle_command(&self, cmd: Command) -> Result<()> {
        if cmd.name != "start" {
            debug!("ignoring unknown command /{}", cmd.name);
            return Ok(());
        }

        let Ok(token) = self.authorize(cmd.user_id) else {
            self.messenger
                .send_html(cmd.chat_id, formatting::NOT_AUTHORIZED)
                .await?;
            return Ok(());
        };

        self.send_summary(cmd.chat_id, &token).await
    }

    pub async fn handle_callback(&self, cb: CallbackQuery) -> Result<()> {
        match Action::parse(&cb.data) {
            Action::Balance => {
                let Some(token) = self.guard(&cb).await else {
                    return Ok(());
                };
                self.refresh_summary(&cb, &token).await
            }
            Action::PaymentsLast => {
                let Some(token) = self.guard(&cb).await else {
                    return Ok(());
                };
                self.show_recent_payments(&cb, &token).await
            }
            Action::CheckPayment => {
                let Some(_token) = self.guard(&cb).await else {
                    return Ok(());
                };
                self.prompt(&cb, ConversationState::AwaitingPaymentQuery).await
            }
            Action::Withdraw => {
                let Some(_token) = self.guard(&cb).await else {
                    return Ok(());
                };
                self.prompt(&cb, ConversationState::AwaitingWithdrawAddress)
                    .await
            }
            Action::Cancel => {
                let Some(token) = self.guard(&cb).await else {
                    return Ok(());
                };
                self.cancel(&cb, &token).await
            }
            // Hiding a message needs no credential and touches no state.
            Action::DeleteMessage => self.hide_message(&cb).await,
            Action::Other(name, _) => {
                debug!("ignoring unknown callback action {name:?}");
                self.messenger
                    .answer_callback_query(&cb.callback_id, None)
                    .await
            }
        }
    }

    pub async fn handle_text(&self, msg: TextMessage) -> Result<()> {
        match self.states.get(msg.chat_id).await {
            // Unrelated chatter outside an input flow is ignored.
            ConversationState::Idle => Ok(()),
            ConversationState::AwaitingPaymentQuery => {
                let Some(token) = self.guard_text(&msg).await else {
                    return Ok(());
                };
                self.lookup_payment(&msg, &token).await
            }
            ConversationState::AwaitingWithdrawAddress => {
                let Some(token) = self.guard_text(&msg).await else {
                    return Ok(());
                };
                self.submit_withdrawal(&msg, &token).await
            }
        }
    }

    // ============== Authorization guards ==============

    fn authorize(&self, user_id: UserId) -> Result<ApiToken> {
        self.directory
            .token_for(user_id)
            .cloned()
            .ok_or(Error::NotAuthorized)
    }

    /// Resolve the caller's credential or report and bail. State is left
    /// untouched either way.
    async fn guard(&self, cb: &CallbackQuery) -> Option<ApiToken> {
        match self.authorize(cb.user_id) {
            Ok(token) => Some(token),
            Err(_) => {
                let _ = self
                    .messenger
                    .answer_callback_query(&cb.callback_id, None)
                    .await;
                let _ = self
                    .messenger
                    .send_html(cb.chat_id, formatting::NOT_AUTHORIZED)
                    .await;
                None
            }
        }
    }

    async fn guard_text(&self, msg: &TextMessage) -> Option<ApiToken> {
        match self.authorize(msg.user_id) {
            Ok(token) => Some(token),
            Err(_) => {
                let _ = self
                    .messenger
                    .send_html(msg.chat_id, formatting::NOT_AUTHORIZED)
                    .await;
                None
            }
        }
    }

    // ============== Idle actions ==============

    async fn fetch_summary(&self, token: &ApiToken) -> Result<String> {
        let info = self
            .api
            .get("merchant/info", token, &[], INFO_TIMEOUT)
            .await?;
        Ok(formatting::merchant_summary(&info))
    }

    /// Send the account summary with the main menu, degrading to an error
    /// line (still with the menu) so the operator is never stranded.
    async fn send_summary(&self, chat_id: ChatId, token: &ApiToken) -> Result<()> {
        let text = match self.fetch_summary(token).await {
            Ok(text) => text,
            Err(err) => summary_error_text(&err).to_string(),
        };
        self.messenger
            .send_inline_keyboard(chat_id, &text, keyboards::main_menu())
            .await?;
        Ok(())
    }

    async fn refresh_summary(&self, cb: &CallbackQuery, token: &ApiToken) -> Result<()> {
        match self.fetch_summary(token).await {
            Ok(text) => {
                if let Some(msg) = cb.message {
                    // Telegram rejects edits that change nothing; harmless.
                    let _ = self
                        .messenger
                        .edit_inline_keyboard(msg, &text, keyboards::main_menu())
                        .await;
                }
                self.messenger
                    .answer_callback_query(&cb.callback_id, Some(formatting::REFRESHED))
                    .await
            }
            Err(err) => {
                self.messenger
                    .answer_callback_query(&cb.callback_id, Some(summary_error_text(&err)))
                    .await
            }
        }
    }

    async fn show_recent_payments(&self, cb: &CallbackQuery, token: &ApiToken) -> Result<()> {
        let _ = self
            .messenger
            .answer_callback_query(&cb.callback_id, None)
            .await;

        let payload = match self
            .api
            .get(
                "payments/history",
                token,
                &[("limit", "10"), ("with_closed", "false")],
                self.timeout,
            )
            .await
        {
            Ok(payload) => payload,
            Err(Error::RemoteApi { status, payload }) if status < 500 => {
                self.messenger
                    .send_html(cb.chat_id, &formatting::request_failed(status, &payload))
                    .await?;
                return Ok(());
            }
            Err(_) => {
                self.messenger
                    .send_html(cb.chat_id, formatting::SERVICE_UNAVAILABLE)
                    .await?;
                return Ok(());
            }
        };

        let Some(text) = formatting::payments_list(&payload) else {
            self.messenger
                .send_html(cb.chat_id, formatting::NO_PAYMENTS_FOUND)
                .await?;
            return Ok(());
        };

        self.messenger
            .send_inline_keyboard(cb.chat_id, &text, keyboards::cancel())
            .await?;
        if let Some(msg) = cb.message {
            let _ = self.messenger.delete_message(msg).await;
        }
        Ok(())
    }

    /// Enter an `Awaiting*` state and replace the menu with the prompt.
    async fn prompt(&self, cb: &CallbackQuery, state: ConversationState) -> Result<()> {
        let _ = self
            .messenger
            .answer_callback_query(&cb.callback_id, None)
            .await;

        let text = match state {
            ConversationState::AwaitingPaymentQuery => formatting::PAYMENT_QUERY_PROMPT,
            ConversationState::AwaitingWithdrawAddress => formatting::WITHDRAW_PROMPT,
            ConversationState::Idle => return Ok(()),
        };
        self.states.set(cb.chat_id, state).await;

        self.messenger
            .send_inline_keyboard(cb.chat_id, text, keyboards::cancel())
            .await?;
        if let Some(msg) = cb.message {
            let _ = self.messenger.delete_message(msg).await;
        }
        Ok(())
    }

    async fn cancel(&self, cb: &CallbackQuery, token: &ApiToken) -> Result<()> {
        self.states.clear(cb.chat_id).await;
        let _ = self
            .messenger
            .answer_callback_query(&cb.callback_id, None)
            .await;

        self.send_summary(cb.chat_id, token).await?;
        if let Some(msg) = cb.message {
            let _ = self.messenger.delete_message(msg).await;
        }
        Ok(())
    }

    async fn hide_message(&self, cb: &CallbackQuery) -> Result<()> {
        let _ = self
            .messenger
            .answer_callback_query(&cb.callback_id, None)
            .await;
        if let Some(msg) = cb.message {
            let _ = self.messenger.delete_message(msg).await;
        }
        Ok(())
    }

    // ============== Awaiting-state inputs ==============

    async fn lookup_payment(&self, msg: &TextMessage, token: &ApiToken) -> Result<()> {
        // Payment ids and addresses should not linger in the chat.
        let _ = self.messenger.delete_message(msg.message).await;

        let query = msg.text.trim();
        if query.is_empty() {
            // Still awaiting a usable query.
            self.messenger
                .send_inline_keyboard(
                    msg.chat_id,
                    formatting::PAYMENT_QUERY_EMPTY,
                    keyboards::hide(),
                )
                .await?;
            return Ok(());
        }

        let path = format!("payments/{query}");
        let reply = match self.api.get(&path, token, &[], self.timeout).await {
            Ok(payload) => formatting::payment_details(&payload),
            Err(Error::RemoteApi { status: 404, .. }) => formatting::payment_not_found(query),
            Err(_) => formatting::SERVICE_UNAVAILABLE.to_string(),
        };

        // The lookup is terminal regardless of outcome.
        self.states.clear(msg.chat_id).await;
        self.messenger
            .send_inline_keyboard(msg.chat_id, &reply, keyboards::hide())
            .await?;
        Ok(())
    }

    async fn submit_withdrawal(&self, msg: &TextMessage, token: &ApiToken) -> Result<()> {
        let to_address = msg.text.trim();
        if !tron::is_tron_address(to_address) {
            // A malformed address never reaches the API; keep awaiting.
            self.messenger
                .send_inline_keyboard(
                    msg.chat_id,
                    formatting::WITHDRAW_BAD_ADDRESS,
                    keyboards::cancel(),
                )
                .await?;
            return Ok(());
        }

        let outcome = self
            .api
            .post(
                "merchant/balance/withdraw",
                token,
                Some(json!({ "to_address": to_address })),
                self.timeout,
            )
            .await;

        // Terminal from here on, whatever the remote said.
        self.states.clear(msg.chat_id).await;

        match outcome {
            Ok(payload) => {
                self.messenger
                    .send_inline_keyboard(
                        msg.chat_id,
                        &formatting::withdraw_reply(&payload, to_address),
                        keyboards::hide(),
                    )
                    .await?;
                let _ = self.messenger.delete_message(msg.message).await;
            }
            Err(Error::RemoteApi { status, payload }) if status < 500 => {
                self.messenger
                    .send_inline_keyboard(
                        msg.chat_id,
                        &formatting::request_failed(status, &payload),
                        keyboards::cancel(),
                    )
                    .await?;
            }
            Err(_) => {
                self.messenger
                    .send_inline_keyboard(
                        msg.chat_id,
                        formatting::SERVICE_UNAVAILABLE,
                        keyboards::cancel(),
                    )
                    .await?;
            }
        }
        Ok(())
    }
}

/// Summary fetches degrade to a short line: 5xx and transport failures read
/// as "unavailable", anything else as a plain request failure.
fn summary_error_text(err: &Error) -> &'static str {
    match err {
        Error::RemoteApi { status, .. } if *status < 500 => "The request failed. Please try again.",
        _ => formatting::SERVICE_UNAVAILABLE,
    }
}
