use async_trait::async_trait;
use doh_relay_domain::{InboundQuery, RelayError};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::Record;

/// The upstream's answer to one query, already decoded into wire-ready
/// records. The handler combines this with the inbound query's identity to
/// build the response packet.
#[derive(Debug, Clone)]
pub struct UpstreamAnswer {
    pub response_code: ResponseCode,
    pub answers: Vec<Record>,
    /// Records from the AUTHORITY section (e.g. SOA for NODATA).
    pub authorities: Vec<Record>,
    pub truncated: bool,
    pub authentic_data: bool,
}

impl UpstreamAnswer {
    pub fn new(response_code: ResponseCode) -> Self {
        Self {
            response_code,
            answers: vec![],
            authorities: vec![],
            truncated: false,
            authentic_data: false,
        }
    }
}

#[async_trait]
pub trait DohProvider: Send + Sync {
    async fn resolve(&self, query: &InboundQuery) -> Result<UpstreamAnswer, RelayError>;
}
