//! HTTPS transport for the upstream exchange.
//!
//! Each call opens one connection to one endpoint address, pinned via the
//! client's DNS override so TLS still sees the configured hostname. Retry
//! across addresses is the provider's job; the transport never retries.

use super::encoder::EncodedRequest;
use async_trait::async_trait;
use doh_relay_domain::{RelayError, UpstreamConfig};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::debug;

const DNS_JSON_CONTENT_TYPE: &str = "application/dns-json";

#[async_trait]
pub trait DohTransport: Send + Sync {
    /// Perform the GET against one endpoint address, returning the raw body.
    async fn send(&self, request: &EncodedRequest, addr: IpAddr) -> Result<Vec<u8>, RelayError>;
}

/// reqwest-backed transport (rustls).
pub struct HttpsTransport {
    timeout: Duration,
    verify_tls: bool,
    proxy: Option<String>,
}

impl HttpsTransport {
    pub fn new(config: &UpstreamConfig) -> Result<Self, RelayError> {
        // Surface a bad proxy URL at startup, not on the first query.
        if let Some(proxy) = &config.proxy {
            reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| RelayError::Config(format!("invalid proxy URL '{}': {}", proxy, e)))?;
        }

        Ok(Self {
            timeout: Duration::from_millis(config.attempt_timeout_ms),
            verify_tls: config.verify_tls,
            proxy: config.proxy.clone(),
        })
    }

    fn build_client(&self, request: &EncodedRequest, addr: IpAddr) -> Result<reqwest::Client, RelayError> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(self.timeout)
            .resolve(&request.hostname, SocketAddr::new(addr, request.port));

        if !self.verify_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(proxy) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| RelayError::Config(format!("invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        builder.build().map_err(|e| RelayError::TransportFailure {
            endpoint: addr.to_string(),
            reason: format!("failed to build HTTP client: {}", e),
        })
    }
}

#[async_trait]
impl DohTransport for HttpsTransport {
    async fn send(&self, request: &EncodedRequest, addr: IpAddr) -> Result<Vec<u8>, RelayError> {
        let endpoint = format!("{} ({})", request.hostname, addr);

        debug!(url = %request.url, addr = %addr, "sending DoH query");

        let client = self.build_client(request, addr)?;

        let response = tokio::time::timeout(
            self.timeout,
            client
                .get(request.url.clone())
                .header(reqwest::header::ACCEPT, DNS_JSON_CONTENT_TYPE)
                .send(),
        )
        .await
        .map_err(|_| RelayError::TransportTimeout {
            endpoint: endpoint.clone(),
        })?
        .map_err(|e| {
            if e.is_timeout() {
                RelayError::TransportTimeout {
                    endpoint: endpoint.clone(),
                }
            } else {
                RelayError::TransportFailure {
                    endpoint: endpoint.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::TransportFailure {
                endpoint,
                reason: format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            });
        }

        let body = tokio::time::timeout(self.timeout, response.bytes())
            .await
            .map_err(|_| RelayError::TransportTimeout {
                endpoint: endpoint.clone(),
            })?
            .map_err(|e| RelayError::TransportFailure {
                endpoint,
                reason: format!("failed to read body: {}", e),
            })?;

        debug!(addr = %addr, response_len = body.len(), "DoH response received");

        Ok(body.to_vec())
    }
}
