use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Everything the relay needs to talk to the DoH endpoint. Built once at
/// startup and consumed read-only by every query task.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// DoH JSON resolve endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Fixed addresses for the endpoint host. When non-empty, endpoint
    /// hostname resolution is skipped entirely.
    #[serde(default)]
    pub endpoint_ips: Vec<IpAddr>,

    /// DNS servers (`ip` or `ip:port`) used to look up the endpoint hostname.
    /// The system resolver is used when empty.
    #[serde(default)]
    pub dns_servers: Vec<String>,

    /// SOCKS5 (or HTTP) proxy URL for the upstream HTTPS exchange.
    #[serde(default)]
    pub proxy: Option<String>,

    /// Value for the `edns_client_subnet` request parameter.
    #[serde(default)]
    pub edns_client_subnet: Option<String>,

    /// Pad request URLs to fixed-size length buckets.
    #[serde(default = "default_true")]
    pub padding: bool,

    /// Verify the endpoint's TLS certificate.
    #[serde(default = "default_true")]
    pub verify_tls: bool,

    /// Timeout for one HTTPS attempt against one endpoint address.
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,

    /// Overall deadline for answering one inbound query, covering endpoint
    /// resolution and every address retry.
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,

    /// Timeout for one bootstrap lookup of the endpoint hostname.
    #[serde(default = "default_bootstrap_timeout_ms")]
    pub bootstrap_timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            endpoint_ips: vec![],
            dns_servers: vec![],
            proxy: None,
            edns_client_subnet: None,
            padding: true,
            verify_tls: true,
            attempt_timeout_ms: default_attempt_timeout_ms(),
            deadline_ms: default_deadline_ms(),
            bootstrap_timeout_ms: default_bootstrap_timeout_ms(),
        }
    }
}

fn default_endpoint() -> String {
    "https://dns.google/resolve".to_string()
}

fn default_true() -> bool {
    true
}

fn default_attempt_timeout_ms() -> u64 {
    4_000
}

fn default_deadline_ms() -> u64 {
    10_000
}

fn default_bootstrap_timeout_ms() -> u64 {
    3_000
}
