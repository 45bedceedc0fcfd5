use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::ChatId;

/// Per-chat step within a multi-message input flow.
///
/// Unknown chats are implicitly `Idle`; nothing is persisted, so a process
/// restart silently resets every conversation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingWithdrawAddress,
    AwaitingPaymentQuery,
}

/// In-memory conversation state, keyed by chat id.
///
/// Guarded by an async mutex: a human operator serializes their own updates,
/// but duplicate or out-of-order delivery must not corrupt the map.
#[derive(Default)]
pub struct ConversationStore {
    inner: Mutex<HashMap<ChatId, ConversationState>>,
}

impl ConversationStore {
    pub async fn get(&self, chat_id: ChatId) -> ConversationState {
        self.inner
            .lock()
            .await
            .get(&chat_id)
            .copied()
            .unwrap_or_default()
    }

    pub async fn set(&self, chat_id: ChatId, state: ConversationState) {
        self.inner.lock().await.insert(chat_id, state);
    }

    pub async fn clear(&self, chat_id: ChatId) {
        self.inner.lock().await.remove(&chat_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_chat_is_idle() {
        let store = ConversationStore::default();
        assert_eq!(store.get(ChatId(1)).await, ConversationState::Idle);
    }

    #[tokio::test]
    async fn set_get_clear() {
        let store = ConversationStore::default();
        let chat = ChatId(7);

        store
            .set(chat, ConversationState::AwaitingWithdrawAddress)
            .await;
        assert_eq!(
            store.get(chat).await,
            ConversationState::AwaitingWithdrawAddress
        );
        // Other chats are unaffected.
        assert_eq!(store.get(ChatId(8)).await, ConversationState::Idle);

        store.clear(chat).await;
        assert_eq!(store.get(chat).await, ConversationState::Idle);
    }
}
