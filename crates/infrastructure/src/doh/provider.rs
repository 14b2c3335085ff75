//! Orchestration of one query: endpoint addresses → encode → send → decode.

use super::encoder;
use super::endpoint::EndpointResolver;
use super::transport::{DohTransport, HttpsTransport};
use async_trait::async_trait;
use doh_relay_application::{DohProvider, UpstreamAnswer};
use doh_relay_domain::{InboundQuery, RelayError, UpstreamConfig};
use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct DohClient {
    base_url: Url,
    hostname: String,
    port: u16,
    endpoints: EndpointResolver,
    transport: Arc<dyn DohTransport>,
    config: Arc<UpstreamConfig>,
}

impl DohClient {
    /// Parses and validates the endpoint URL template. This is the engine's
    /// only startup-time failure; everything later is per-query.
    pub fn new(config: Arc<UpstreamConfig>) -> Result<Self, RelayError> {
        let transport = Arc::new(HttpsTransport::new(&config)?);
        Self::with_transport(config, transport)
    }

    /// Same as [`DohClient::new`] but with a caller-supplied transport.
    pub fn with_transport(
        config: Arc<UpstreamConfig>,
        transport: Arc<dyn DohTransport>,
    ) -> Result<Self, RelayError> {
        let invalid = |reason: &str| RelayError::InvalidEndpointUrl {
            url: config.endpoint.clone(),
            reason: reason.to_string(),
        };

        let base_url = Url::parse(&config.endpoint)
            .map_err(|e| invalid(&e.to_string()))?;

        if base_url.scheme() != "https" && base_url.scheme() != "http" {
            return Err(invalid("scheme must be https or http"));
        }

        let hostname = base_url
            .host_str()
            .ok_or_else(|| invalid("missing host"))?
            .to_string();

        let port = base_url
            .port_or_known_default()
            .ok_or_else(|| invalid("missing port"))?;

        let endpoints = EndpointResolver::new(&hostname, port, &config)?;

        Ok(Self {
            base_url,
            hostname,
            port,
            endpoints,
            transport,
            config,
        })
    }
}

#[async_trait]
impl DohProvider for DohClient {
    async fn resolve(&self, query: &InboundQuery) -> Result<UpstreamAnswer, RelayError> {
        let addrs = self.endpoints.resolve().await?;
        let encoded = encoder::encode(&self.base_url, &self.hostname, self.port, query, &self.config);

        let mut last_error = RelayError::AllEndpointsUnreachable;

        for (position, addr) in addrs.iter().enumerate() {
            match self.transport.send(&encoded, *addr).await {
                Ok(body) => {
                    debug!(addr = %addr, position, "endpoint responded");
                    // A structurally received answer is never retried
                    // elsewhere; a decode failure is the upstream's word.
                    return super::decoder::decode(&body, query);
                }
                Err(e) => {
                    warn!(addr = %addr, position, error = %e, "endpoint attempt failed");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
