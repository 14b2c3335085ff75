use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::upstream::UpstreamConfig;

/// Main configuration structure for doh-relay
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (bind address, port, transports)
    #[serde(default)]
    pub server: ServerConfig,

    /// DoH upstream configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. doh-relay.toml in current directory
    /// 3. /etc/doh-relay/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("doh-relay.toml").exists() {
            Self::from_file("doh-relay.toml")?
        } else if std::path::Path::new("/etc/doh-relay/config.toml").exists() {
            Self::from_file("/etc/doh-relay/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides)?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) -> Result<(), ConfigError> {
        if let Some(listen) = overrides.listen {
            let (bind, port) = parse_listen(&listen)?;
            self.server.bind_address = bind;
            self.server.port = port;
        }
        // Mirroring the upstream binary: naming either transport flag selects
        // exactly the named ones; naming neither leaves the file config alone.
        if overrides.udp || overrides.tcp {
            self.server.udp = overrides.udp;
            self.server.tcp = overrides.tcp;
        }
        if let Some(endpoint) = overrides.endpoint {
            self.upstream.endpoint = endpoint;
        }
        if !overrides.endpoint_ips.is_empty() {
            self.upstream.endpoint_ips = overrides.endpoint_ips;
        }
        if !overrides.dns_servers.is_empty() {
            self.upstream.dns_servers = overrides.dns_servers;
        }
        if let Some(proxy) = overrides.proxy {
            self.upstream.proxy = Some(proxy);
        }
        if let Some(edns) = overrides.edns_client_subnet {
            self.upstream.edns_client_subnet = Some(edns);
        }
        if overrides.no_pad {
            self.upstream.padding = false;
        }
        if overrides.insecure {
            self.upstream.verify_tls = false;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "Listen port cannot be 0".to_string(),
            ));
        }

        if !self.server.udp && !self.server.tcp {
            return Err(ConfigError::Validation(
                "At least one of the udp/tcp transports must be enabled".to_string(),
            ));
        }

        if self.upstream.endpoint.is_empty() {
            return Err(ConfigError::Validation(
                "No DoH endpoint configured".to_string(),
            ));
        }

        if self.upstream.attempt_timeout_ms == 0 || self.upstream.deadline_ms == 0 {
            return Err(ConfigError::Validation(
                "Timeouts must be non-zero".to_string(),
            ));
        }

        for server in &self.upstream.dns_servers {
            if !is_valid_dns_server(server) {
                return Err(ConfigError::Validation(format!(
                    "Invalid DNS server address '{}'",
                    server
                )));
            }
        }

        Ok(())
    }
}

/// Accepts `ip`, `ip:port`, `[v6]:port`, or `:port` (all-interfaces).
fn parse_listen(listen: &str) -> Result<(String, u16), ConfigError> {
    let err = || ConfigError::Validation(format!("Invalid listen address '{}'", listen));

    if let Some(port_str) = listen.strip_prefix(':') {
        let port = port_str.parse::<u16>().map_err(|_| err())?;
        return Ok(("0.0.0.0".to_string(), port));
    }

    if let Ok(addr) = listen.parse::<std::net::SocketAddr>() {
        return Ok((addr.ip().to_string(), addr.port()));
    }

    Err(err())
}

fn is_valid_dns_server(server: &str) -> bool {
    server.parse::<IpAddr>().is_ok() || server.parse::<std::net::SocketAddr>().is_ok()
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub listen: Option<String>,
    pub endpoint: Option<String>,
    pub endpoint_ips: Vec<IpAddr>,
    pub dns_servers: Vec<String>,
    pub proxy: Option<String>,
    pub edns_client_subnet: Option<String>,
    pub no_pad: bool,
    pub insecure: bool,
    pub udp: bool,
    pub tcp: bool,
    pub log_level: Option<String>,
}
