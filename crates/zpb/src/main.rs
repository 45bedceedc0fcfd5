use std::sync::Arc;

use zpb_core::{
    client::MerchantClient, config::Config, directory::CredentialDirectory, ports::MerchantApi,
};

#[tokio::main]
async fn main() -> Result<(), zpb_core::Error> {
    let cfg = Arc::new(Config::load()?);
    zpb_core::logging::init("zpb", &cfg.log_level)?;

    let directory = Arc::new(CredentialDirectory::load(&cfg.api_tokens_file)?);
    if directory.is_empty() {
        tracing::warn!("credential table is empty; every operator will be rejected");
    }

    let api: Arc<dyn MerchantApi> =
        Arc::new(MerchantClient::new(&cfg.api_base_url, cfg.skip_verify)?);

    zpb_telegram::router::run_polling(cfg, api, directory)
        .await
        .map_err(|e| zpb_core::Error::External(format!("bot failed: {e}")))?;

    Ok(())
}
