//! doh-relay domain layer
pub mod config;
pub mod errors;
pub mod inbound_query;
pub mod record_type;

pub use config::{CliOverrides, Config, ConfigError, LoggingConfig, ServerConfig, UpstreamConfig};
pub use errors::RelayError;
pub use inbound_query::{ClientTransport, EdnsRequest, InboundQuery};
pub use record_type::RecordType;
