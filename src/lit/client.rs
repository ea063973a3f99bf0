//! Signing Network Node Client
//!
//! Thin HTTP client for the decentralized signing nodes. The bridge treats
//! node responses as opaque JSON: threshold cryptography, share combination,
//! and consensus all happen on the nodes. This client only handshakes,
//! tracks readiness, and fans requests out to the connected nodes.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::LitNetwork;
use crate::types::{LitClient, SessionSigs};

/// Fraction of bootstrap nodes that must answer before the client
/// reports ready: two thirds, rounded up.
fn ready_threshold(node_count: usize) -> usize {
    (node_count * 2).div_ceil(3)
}

/// HTTP implementation of [`LitClient`] against the bootstrap node set
/// of a [`LitNetwork`].
pub struct HttpLitClient {
    urls: Vec<String>,
    http: Client,
    ready: AtomicBool,
    /// Nodes that completed the handshake, set by `connect`.
    connected: RwLock<Vec<String>>,
    /// Most recent blockhash reported by any node.
    blockhash: RwLock<Option<String>>,
}

impl HttpLitClient {
    pub fn new(network: LitNetwork) -> Self {
        Self::with_urls(network.bootstrap_urls())
    }

    /// Build a client against an explicit node URL list.
    pub fn with_urls(urls: Vec<String>) -> Self {
        Self {
            urls,
            http: Client::new(),
            ready: AtomicBool::new(false),
            connected: RwLock::new(Vec::new()),
            blockhash: RwLock::new(None),
        }
    }

    /// Handshake with a single node. Returns the response body.
    async fn handshake(&self, url: &str) -> Result<Value> {
        let resp = self
            .http
            .post(format!("{url}/web/handshake"))
            .json(&serde_json::json!({ "clientPublicKey": "test" }))
            .send()
            .await
            .with_context(|| format!("Handshake request failed: {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("Handshake rejected by {}: {}: {}", url, status.as_u16(), text);
        }

        resp.json()
            .await
            .with_context(|| format!("Handshake response from {url} was not JSON"))
    }

    /// POST `body` to `path` on every connected node, requiring a
    /// threshold of successes. Returns the first successful body.
    async fn broadcast(&self, path: &str, body: &Value) -> Result<Value> {
        let nodes = self.connected.read().await.clone();
        if nodes.is_empty() {
            bail!("Not connected to the signing network");
        }

        let needed = ready_threshold(nodes.len());
        let mut first_ok: Option<Value> = None;
        let mut ok_count = 0usize;
        let mut last_error = String::from("no nodes reachable");

        for url in &nodes {
            let resp = self.http.post(format!("{url}{path}")).json(body).send().await;

            let resp = match resp {
                Ok(r) => r,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = resp.status();
            if !status.is_success() {
                let text = resp.text().await.unwrap_or_default();
                last_error = format!("{}: {}", status.as_u16(), text);
                continue;
            }

            match resp.json::<Value>().await {
                Ok(json) => {
                    ok_count += 1;
                    if first_ok.is_none() {
                        first_ok = Some(json);
                    }
                }
                Err(e) => last_error = e.to_string(),
            }
        }

        if ok_count < needed {
            bail!(
                "Signing network error: {} of {} nodes answered {} ({})",
                ok_count,
                nodes.len(),
                path,
                last_error
            );
        }

        // first_ok is always Some here since needed >= 1
        Ok(first_ok.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl LitClient for HttpLitClient {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    async fn connect(&self) -> Result<()> {
        let mut connected = Vec::new();
        let mut blockhash: Option<String> = None;

        for url in &self.urls {
            match self.handshake(url).await {
                Ok(body) => {
                    if let Some(hash) = body.get("latestBlockhash").and_then(|v| v.as_str()) {
                        blockhash = Some(hash.to_string());
                    }
                    connected.push(url.clone());
                }
                Err(e) => {
                    tracing::warn!(node = %url, error = %e, "Node handshake failed");
                }
            }
        }

        let needed = ready_threshold(self.urls.len());
        if connected.len() < needed {
            bail!(
                "Only {} of {} nodes reachable, need {}",
                connected.len(),
                self.urls.len(),
                needed
            );
        }

        tracing::info!(
            connected = connected.len(),
            total = self.urls.len(),
            "Connected to the signing network"
        );

        *self.connected.write().await = connected;
        *self.blockhash.write().await = blockhash;
        self.ready.store(true, Ordering::Release);
        Ok(())
    }

    async fn latest_blockhash(&self) -> Result<String> {
        // Refresh from the first answering node; fall back to the cached
        // value from the last successful handshake.
        let nodes = self.connected.read().await.clone();
        for url in &nodes {
            if let Ok(body) = self.handshake(url).await {
                if let Some(hash) = body.get("latestBlockhash").and_then(|v| v.as_str()) {
                    let hash = hash.to_string();
                    *self.blockhash.write().await = Some(hash.clone());
                    return Ok(hash);
                }
            }
        }

        match self.blockhash.read().await.clone() {
            Some(hash) => Ok(hash),
            None => bail!("No blockhash available: not connected to the signing network"),
        }
    }

    async fn execute_js(
        &self,
        session: &SessionSigs,
        code: &str,
        js_params: Value,
    ) -> Result<Value> {
        // Nodes expect the script base64-encoded.
        let encoded = base64::engine::general_purpose::STANDARD.encode(code);
        let body = serde_json::json!({
            "sessionSigs": session,
            "code": encoded,
            "jsParams": js_params,
        });
        self.broadcast("/web/execute/v2", &body).await
    }

    async fn pkp_sign(
        &self,
        session: &SessionSigs,
        pubkey: &str,
        to_sign: &[u8],
    ) -> Result<Value> {
        let body = serde_json::json!({
            "sessionSigs": session,
            "pubkey": pubkey,
            "toSign": to_sign,
        });
        self.broadcast("/web/pkp/sign/v2", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_threshold_is_two_thirds() {
        assert_eq!(ready_threshold(3), 2);
        assert_eq!(ready_threshold(6), 4);
        assert_eq!(ready_threshold(10), 7);
        assert_eq!(ready_threshold(1), 1);
    }

    #[test]
    fn test_client_starts_not_ready() {
        let client = HttpLitClient::with_urls(vec!["http://127.0.0.1:1".to_string()]);
        assert!(!client.is_ready());
    }

    #[tokio::test]
    async fn test_connect_fails_when_no_nodes_reachable() {
        // Nothing listens on these ports; connect must fail and leave
        // the client not ready.
        let client = HttpLitClient::with_urls(vec![
            "http://127.0.0.1:9".to_string(),
            "http://127.0.0.1:9".to_string(),
        ]);
        assert!(client.connect().await.is_err());
        assert!(!client.is_ready());
    }

    #[tokio::test]
    async fn test_connect_flips_ready_with_mock_nodes() {
        use axum::routing::post;
        use axum::{Json, Router};

        let node = Router::new().route(
            "/web/handshake",
            post(|| async {
                Json(serde_json::json!({
                    "serverPublicKey": "00",
                    "latestBlockhash": "0xabc123",
                }))
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, node).await.unwrap();
        });

        let client = HttpLitClient::with_urls(vec![format!("http://{addr}")]);
        assert!(!client.is_ready());
        client.connect().await.unwrap();
        assert!(client.is_ready());
        assert_eq!(client.latest_blockhash().await.unwrap(), "0xabc123");
    }
}
