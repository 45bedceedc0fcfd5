use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tracing::{error, info};

use zpb_core::{
    config::Config, directory::CredentialDirectory, messaging::port::MessagingPort,
    ports::MerchantApi, router::ActionRouter, state::ConversationStore,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ActionRouter>,
    pub messenger: Arc<dyn MessagingPort>,
}

pub async fn run_polling(
    cfg: Arc<Config>,
    api: Arc<dyn MerchantApi>,
    directory: Arc<CredentialDirectory>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    // Basic startup info.
    if let Ok(me) = bot.get_me().await {
        info!("bot started: @{}", me.username());
    }
    info!("enrolled merchants: {}", directory.merchant_count());

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let states = Arc::new(ConversationStore::default());
    let router = Arc::new(ActionRouter::new(
        api,
        directory.clone(),
        states,
        messenger.clone(),
        cfg.api_timeout,
    ));

    // The webhook ingress runs alongside polling; a dead ingress leaves the
    // interactive bot alive, so the failure is logged, not propagated.
    {
        let cfg = cfg.clone();
        let messenger = messenger.clone();
        tokio::spawn(async move {
            if let Err(e) = zpb_webhook::serve(cfg, directory, messenger).await {
                error!("webhook ingress failed: {e}");
            }
        });
    }

    let state = Arc::new(AppState { router, messenger });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
