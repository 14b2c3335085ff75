//! Resolution and caching of the DoH endpoint's own network address.
//!
//! The cache is copy-on-refresh: readers grab the current `Arc` without
//! locking, a refresh builds a fresh set and swaps it in whole. The refresh
//! mutex guards only the bootstrap lookup; it is never held across the
//! upstream HTTPS exchange.

use crate::lookup;
use arc_swap::ArcSwapOption;
use doh_relay_domain::{RelayError, UpstreamConfig};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct EndpointResolver {
    hostname: String,
    port: u16,
    static_addrs: Option<Arc<Vec<IpAddr>>>,
    dns_servers: Vec<SocketAddr>,
    timeout: Duration,
    cached: ArcSwapOption<Vec<IpAddr>>,
    refresh: Mutex<()>,
}

impl EndpointResolver {
    pub fn new(hostname: &str, port: u16, config: &UpstreamConfig) -> Result<Self, RelayError> {
        let static_addrs = if config.endpoint_ips.is_empty() {
            None
        } else {
            Some(Arc::new(config.endpoint_ips.clone()))
        };

        let dns_servers = config
            .dns_servers
            .iter()
            .map(|s| parse_dns_server(s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            hostname: hostname.to_string(),
            port,
            static_addrs,
            dns_servers,
            timeout: Duration::from_millis(config.bootstrap_timeout_ms),
            cached: ArcSwapOption::const_empty(),
            refresh: Mutex::new(()),
        })
    }

    /// Current endpoint address set; resolves and caches on first use.
    ///
    /// Safe to call from any number of in-flight queries. At most one lookup
    /// runs at a time; late arrivals see the freshly stored set.
    pub async fn resolve(&self) -> Result<Arc<Vec<IpAddr>>, RelayError> {
        if let Some(fixed) = &self.static_addrs {
            return Ok(fixed.clone());
        }

        if let Some(cached) = self.cached.load_full() {
            return Ok(cached);
        }

        let _guard = self.refresh.lock().await;

        // Another caller may have finished the lookup while we waited.
        if let Some(cached) = self.cached.load_full() {
            return Ok(cached);
        }

        let addrs = Arc::new(self.lookup().await?);
        self.cached.store(Some(addrs.clone()));
        info!(hostname = %self.hostname, addresses = addrs.len(), "endpoint resolved");
        Ok(addrs)
    }

    async fn lookup(&self) -> Result<Vec<IpAddr>, RelayError> {
        if self.dns_servers.is_empty() {
            return self.system_lookup().await;
        }

        for server in &self.dns_servers {
            match lookup::query_addresses(*server, &self.hostname, self.timeout).await {
                Ok(addrs) if !addrs.is_empty() => {
                    debug!(server = %server, addresses = addrs.len(), "bootstrap lookup succeeded");
                    return Ok(addrs);
                }
                Ok(_) => {
                    warn!(server = %server, hostname = %self.hostname, "bootstrap lookup returned no addresses");
                }
                Err(e) => {
                    warn!(server = %server, error = %e, "bootstrap lookup failed");
                }
            }
        }

        Err(RelayError::EndpointUnresolvable(self.hostname.clone()))
    }

    async fn system_lookup(&self) -> Result<Vec<IpAddr>, RelayError> {
        let target = format!("{}:{}", self.hostname, self.port);

        let addrs_iter = tokio::time::timeout(self.timeout, tokio::net::lookup_host(&target))
            .await
            .map_err(|_| RelayError::EndpointUnresolvable(format!("{} (timeout)", self.hostname)))?
            .map_err(|e| {
                RelayError::EndpointUnresolvable(format!("{}: {}", self.hostname, e))
            })?;

        let addrs: Vec<IpAddr> = addrs_iter.map(|a| a.ip()).collect();

        if addrs.is_empty() {
            return Err(RelayError::EndpointUnresolvable(self.hostname.clone()));
        }

        Ok(addrs)
    }
}

/// Accepts `ip` or `ip:port`; a bare IP defaults to port 53.
fn parse_dns_server(server: &str) -> Result<SocketAddr, RelayError> {
    if let Ok(addr) = server.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = server.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, 53));
    }
    Err(RelayError::Config(format!(
        "invalid DNS server address '{}'",
        server
    )))
}
