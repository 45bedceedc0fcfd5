//! Reqwest implementation of the merchant API port.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{info, warn};

use crate::{domain::ApiToken, errors::Error, ports::MerchantApi, Result};

const API_KEY_HEADER: &str = "X-API-Key";

pub struct MerchantClient {
    http: reqwest::Client,
    base_url: String,
}

impl MerchantClient {
    /// `skip_verify` disables certificate-chain verification for private or
    /// self-signed deployments. Weak mode, reproduced deliberately.
    pub fn new(base_url: &str, skip_verify: bool) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(skip_verify)
            .build()
            .map_err(|e| Error::Config(format!("http client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        token: &ApiToken,
        query: &[(&str, &str)],
        body: Option<Value>,
        timeout: Duration,
    ) -> Result<Value> {
        let url = join_url(&self.base_url, path);
        let started = Instant::now();

        let mut req = self
            .http
            .request(method.clone(), &url)
            .header(API_KEY_HEADER, &token.0)
            .timeout(timeout);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(b) = &body {
            req = req.json(b);
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                let elapsed = started.elapsed().as_millis();
                warn!("{method} {url} failed ({elapsed} ms): {e}");
                return Err(Error::Transport(e.to_string()));
            }
        };

        let status = resp.status().as_u16();
        let text = match resp.text().await {
            Ok(text) => text,
            Err(e) => {
                let elapsed = started.elapsed().as_millis();
                warn!("{method} {url} body read failed ({elapsed} ms): {e}");
                return Err(Error::Transport(e.to_string()));
            }
        };
        let elapsed = started.elapsed().as_millis();

        match classify(status, &text) {
            Ok(payload) => {
                info!("{method} {url} -> {status} ({elapsed} ms)");
                Ok(payload)
            }
            Err(err) => {
                warn!("{method} {url} -> {status} ({elapsed} ms), payload={text:?}");
                Err(err)
            }
        }
    }
}

#[async_trait]
impl MerchantApi for MerchantClient {
    async fn get(
        &self,
        path: &str,
        token: &ApiToken,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<Value> {
        self.request(Method::GET, path, token, query, None, timeout)
            .await
    }

    async fn post(
        &self,
        path: &str,
        token: &ApiToken,
        body: Option<Value>,
        timeout: Duration,
    ) -> Result<Value> {
        self.request(Method::POST, path, token, &[], body, timeout)
            .await
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// 200–299 is success; anything else carries its status and payload. A body
/// that is not valid JSON degrades to a JSON string, never an error.
fn classify(status: u16, body: &str) -> Result<Value> {
    let payload =
        serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()));

    if (200..=299).contains(&status) {
        return Ok(payload);
    }
    Err(Error::RemoteApi { status, payload })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_and_path() {
        assert_eq!(
            join_url("http://api.local/v1/", "/merchant/info"),
            "http://api.local/v1/merchant/info"
        );
        assert_eq!(
            join_url("http://api.local/v1", "merchant/info"),
            "http://api.local/v1/merchant/info"
        );
    }

    #[test]
    fn classifies_2xx_as_success() {
        let v = classify(201, r#"{"ok": true}"#).unwrap();
        assert_eq!(v["ok"], true);
        assert!(classify(200, "{}").is_ok());
        assert!(classify(299, "{}").is_ok());
    }

    #[test]
    fn classifies_other_statuses_as_remote_errors() {
        match classify(404, r#"{"detail": "missing"}"#) {
            Err(Error::RemoteApi { status, payload }) => {
                assert_eq!(status, 404);
                assert_eq!(payload["detail"], "missing");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            classify(503, ""),
            Err(Error::RemoteApi { status: 503, .. })
        ));
    }

    #[test]
    fn non_json_body_degrades_to_text() {
        let v = classify(200, "plain text").unwrap();
        assert_eq!(v, Value::String("plain text".to_string()));

        match classify(502, "<html>bad gateway</html>") {
            Err(Error::RemoteApi { payload, .. }) => {
                assert_eq!(payload, Value::String("<html>bad gateway</html>".to_string()));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
