//! Webhook ingress (axum).
//!
//! Authenticates push notifications from the payments API and hands deposit
//! events to the core fan-out. Hostile or malformed input gets a 4xx
//! response, never a crash; response bodies are constant and leak nothing.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use tracing::{info, warn};

use zpb_core::{
    config::Config,
    directory::CredentialDirectory,
    messaging::port::MessagingPort,
    notify::{self, DepositEvent},
};

const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Clone)]
pub struct WebhookState {
    secret: Arc<String>,
    directory: Arc<CredentialDirectory>,
    messenger: Arc<dyn MessagingPort>,
}

impl WebhookState {
    pub fn new(
        secret: String,
        directory: Arc<CredentialDirectory>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            secret: Arc::new(secret),
            directory,
            messenger,
        }
    }
}

pub fn app(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", post(handle_payment_webhook))
        .with_state(state)
}

pub async fn serve(
    cfg: Arc<Config>,
    directory: Arc<CredentialDirectory>,
    messenger: Arc<dyn MessagingPort>,
) -> anyhow::Result<()> {
    let state = WebhookState::new(cfg.webhook_api_key.clone(), directory, messenger);
    let addr = format!("{}:{}", cfg.webhook_host, cfg.webhook_port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("webhook ingress listening on {addr}");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn handle_payment_webhook(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let Ok(data) = serde_json::from_slice::<serde_json::Value>(&body) else {
        return (StatusCode::BAD_REQUEST, "Error");
    };

    if !secret_matches(&headers, &state.secret) {
        return (StatusCode::FORBIDDEN, "Unauthorized");
    }

    info!("new webhook");

    if data.get("message").and_then(serde_json::Value::as_str) == Some(notify::DEPOSIT_KIND) {
        let event: DepositEvent = match serde_json::from_value(data) {
            Ok(event) => event,
            Err(e) => {
                warn!("malformed deposit event: {e}");
                return (StatusCode::BAD_REQUEST, "Error");
            }
        };
        notify::notify_deposit(&state.directory, state.messenger.as_ref(), &event).await;
    }
    // Unrecognized event kinds are accepted and ignored.

    (StatusCode::OK, "Success")
}

fn secret_matches(headers: &HeaderMap, secret: &str) -> bool {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == secret)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use zpb_core::{
        domain::{ChatId, MessageId, MessageRef},
        messaging::types::InlineKeyboard,
        Error, Result,
    };

    const SECRET: &str = "hook-secret";

    #[derive(Default)]
    struct MockMessenger {
        sent: Mutex<Vec<(i64, String)>>,
        attempts: AtomicI32,
        fail_chats: Vec<i64>,
        next_id: AtomicI32,
    }

    impl MockMessenger {
        fn sent_chats(&self) -> Vec<i64> {
            self.sent.lock().unwrap().iter().map(|(id, _)| *id).collect()
        }
    }

    #[async_trait]
    impl MessagingPort for MockMessenger {
        async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail_chats.contains(&chat_id.0) {
                return Err(Error::External("blocked by recipient".to_string()));
            }
            self.sent.lock().unwrap().push((chat_id.0, html.to_string()));
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            })
        }

        async fn send_inline_keyboard(
            &self,
            chat_id: ChatId,
            html: &str,
            _keyboard: InlineKeyboard,
        ) -> Result<MessageRef> {
            self.send_html(chat_id, html).await
        }

        async fn edit_inline_keyboard(
            &self,
            _msg: MessageRef,
            _html: &str,
            _keyboard: InlineKeyboard,
        ) -> Result<()> {
            Ok(())
        }

        async fn delete_message(&self, _msg: MessageRef) -> Result<()> {
            Ok(())
        }

        async fn answer_callback_query(&self, _id: &str, _text: Option<&str>) -> Result<()> {
            Ok(())
        }
    }

    fn state_with(messenger: Arc<MockMessenger>) -> WebhookState {
        let table: HashMap<String, Vec<serde_json::Value>> =
            serde_json::from_value(json!({"tok-a": [10, 20]})).unwrap();
        WebhookState::new(
            SECRET.to_string(),
            Arc::new(CredentialDirectory::from_table(table)),
            messenger,
        )
    }

    fn deposit_body() -> Bytes {
        Bytes::from(
            json!({
                "message": "new_deposit",
                "address": "Taddr",
                "amount": "3.5",
                "new_status": "paid",
                "merchant_api_token": "tok-a",
            })
            .to_string(),
        )
    }

    fn headers_with_secret(secret: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, secret.parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn missing_secret_is_forbidden_without_fan_out() {
        let messenger = Arc::new(MockMessenger::default());
        let state = state_with(messenger.clone());

        let (status, body) =
            handle_payment_webhook(State(state), HeaderMap::new(), deposit_body()).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, "Unauthorized");
        assert_eq!(messenger.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn wrong_secret_is_forbidden() {
        let messenger = Arc::new(MockMessenger::default());
        let state = state_with(messenger.clone());

        let (status, _) = handle_payment_webhook(
            State(state),
            headers_with_secret("nope"),
            deposit_body(),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(messenger.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_body_is_a_bad_request() {
        let messenger = Arc::new(MockMessenger::default());
        let state = state_with(messenger.clone());

        let (status, body) = handle_payment_webhook(
            State(state),
            headers_with_secret(SECRET),
            Bytes::from_static(b"not json"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Error");
    }

    #[tokio::test]
    async fn deposit_missing_fields_is_a_bad_request() {
        let messenger = Arc::new(MockMessenger::default());
        let state = state_with(messenger.clone());

        let (status, _) = handle_payment_webhook(
            State(state),
            headers_with_secret(SECRET),
            Bytes::from(json!({"message": "new_deposit"}).to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(messenger.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn other_event_kinds_are_accepted_and_ignored() {
        let messenger = Arc::new(MockMessenger::default());
        let state = state_with(messenger.clone());

        let (status, body) = handle_payment_webhook(
            State(state),
            headers_with_secret(SECRET),
            Bytes::from(json!({"message": "rate_update"}).to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Success");
        assert_eq!(messenger.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn deposit_fans_out_to_all_enrolled_identities() {
        let messenger = Arc::new(MockMessenger::default());
        let state = state_with(messenger.clone());

        let (status, _) = handle_payment_webhook(
            State(state),
            headers_with_secret(SECRET),
            deposit_body(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(messenger.sent_chats(), vec![10, 20]);
    }

    #[tokio::test]
    async fn one_failed_delivery_does_not_block_the_rest() {
        let messenger = Arc::new(MockMessenger {
            fail_chats: vec![10],
            ..MockMessenger::default()
        });
        let state = state_with(messenger.clone());

        let (status, _) = handle_payment_webhook(
            State(state),
            headers_with_secret(SECRET),
            deposit_body(),
        )
        .await;

        // Both deliveries were attempted; only the healthy one landed.
        assert_eq!(status, StatusCode::OK);
        assert_eq!(messenger.attempts.load(Ordering::SeqCst), 2);
        assert_eq!(messenger.sent_chats(), vec![20]);
    }

    #[tokio::test]
    async fn unenrolled_token_is_accepted_with_no_fan_out() {
        let messenger = Arc::new(MockMessenger::default());
        let state = state_with(messenger.clone());

        let body = Bytes::from(
            json!({
                "message": "new_deposit",
                "address": "Taddr",
                "amount": 1,
                "new_status": "paid",
                "merchant_api_token": "tok-unknown",
            })
            .to_string(),
        );

        let (status, _) =
            handle_payment_webhook(State(state), headers_with_secret(SECRET), body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(messenger.attempts.load(Ordering::SeqCst), 0);
    }
}
