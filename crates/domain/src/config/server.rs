use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Listener protocols. Both default on; at least one must remain enabled.
    #[serde(default = "default_true")]
    pub udp: bool,

    #[serde(default = "default_true")]
    pub tcp: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            udp: true,
            tcp: true,
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5300
}

fn default_true() -> bool {
    true
}
