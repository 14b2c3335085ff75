use super::RecordType;
use std::sync::Arc;

/// Listener protocol the query arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientTransport {
    Udp,
    Tcp,
}

impl ClientTransport {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientTransport::Udp => "udp",
            ClientTransport::Tcp => "tcp",
        }
    }
}

/// EDNS0 parameters the client attached to its query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdnsRequest {
    pub payload_size: u16,
    pub dnssec_ok: bool,
}

/// One inbound DNS question, owned by the handler for the request's lifetime.
///
/// The transaction id and question are the identity the response must echo,
/// whether resolution succeeds or fails.
#[derive(Debug, Clone)]
pub struct InboundQuery {
    pub id: u16,
    pub name: Arc<str>,
    pub record_type: RecordType,
    pub class: u16,
    pub edns: Option<EdnsRequest>,
    pub checking_disabled: bool,
    pub transport: ClientTransport,
}

impl InboundQuery {
    pub fn new(
        id: u16,
        name: impl Into<Arc<str>>,
        record_type: RecordType,
        transport: ClientTransport,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            record_type,
            class: 1, // IN
            edns: None,
            checking_disabled: false,
            transport,
        }
    }

    pub fn with_edns(mut self, edns: EdnsRequest) -> Self {
        self.edns = Some(edns);
        self
    }

    pub fn dnssec_ok(&self) -> bool {
        self.edns.map(|e| e.dnssec_ok).unwrap_or(false)
    }
}
