use crate::Result;

/// Initialize logging/tracing for the bot.
///
/// Default: the configured level for our crates, warn for the chatty
/// transport stacks. Can be overridden with `RUST_LOG`.
pub fn init(service_name: &str, level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},zpb_core={level},{service_name}={level},teloxide=warn,hyper=warn,reqwest=warn"
        ))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .init();

    Ok(())
}
