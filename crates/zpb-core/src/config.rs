use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

/// Typed configuration for the bot process.
///
/// Everything comes from the environment (with `.env` support); the
/// credential table itself is loaded separately by `CredentialDirectory`.
#[derive(Clone, Debug)]
pub struct Config {
    // Chat transport
    pub bot_token: String,

    // Logging
    pub log_level: String,

    // Credential table
    pub api_tokens_file: PathBuf,

    // Merchant API
    pub api_base_url: String,
    pub api_timeout: Duration,
    /// When set, outbound TLS skips certificate-chain verification.
    /// Weak mode for private/self-signed deployments.
    pub skip_verify: bool,

    // Webhook ingress
    pub webhook_host: String,
    pub webhook_port: u16,
    pub webhook_api_key: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let bot_token = env_str("BOT_TOKEN").unwrap_or_default();
        if bot_token.trim().is_empty() {
            return Err(Error::Config(
                "BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let webhook_api_key = env_str("WEBHOOK_API_KEY").and_then(non_empty).ok_or_else(|| {
            Error::Config("WEBHOOK_API_KEY environment variable is required".to_string())
        })?;

        let log_level = env_str("LOG_LEVEL")
            .and_then(non_empty)
            .unwrap_or_else(|| "info".to_string())
            .to_lowercase();

        let api_tokens_file = env_path("API_TOKENS_FILE")
            .unwrap_or_else(|| PathBuf::from("api_tokens.json"));

        let api_base_url = env_str("MERCHANT_API_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| "http://127.0.0.1:8000/zenithion/api/v1/".to_string());
        let api_timeout = Duration::from_secs(env_u64("API_TIMEOUT_SECS").unwrap_or(10));
        let skip_verify = env_bool("SKIP_VERIFY").unwrap_or(false);

        let webhook_host = env_str("WEBHOOK_HOST")
            .and_then(non_empty)
            .unwrap_or_else(|| "0.0.0.0".to_string());
        let webhook_port = env_u16("WEBHOOK_PORT").unwrap_or(8080);

        Ok(Self {
            bot_token,
            log_level,
            api_tokens_file,
            api_base_url,
            api_timeout,
            skip_verify,
            webhook_host,
            webhook_port,
            webhook_api_key,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u16(key: &str) -> Option<u16> {
    env_str(key).and_then(|s| s.trim().parse::<u16>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
