use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RelayError {
    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidEndpointUrl { url: String, reason: String },

    #[error("Endpoint hostname could not be resolved: {0}")]
    EndpointUnresolvable(String),

    #[error("Transport failure contacting {endpoint}: {reason}")]
    TransportFailure { endpoint: String, reason: String },

    #[error("Transport timeout contacting {endpoint}")]
    TransportTimeout { endpoint: String },

    #[error("All endpoint addresses are unreachable")]
    AllEndpointsUnreachable,

    #[error("Malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    #[error("Malformed inbound query: {0}")]
    MalformedInboundQuery(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RelayError {
    /// Transport-class errors are retried against the next endpoint address;
    /// everything else is surfaced as-is.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            RelayError::TransportFailure { .. }
                | RelayError::TransportTimeout { .. }
                | RelayError::AllEndpointsUnreachable
        )
    }
}
