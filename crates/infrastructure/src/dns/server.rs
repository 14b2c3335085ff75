//! DNS-protocol-facing adapter: receives a message from a listener, drives
//! the provider under a deadline, and always writes a response. Every
//! per-query failure collapses to SERVFAIL with the client's transaction id
//! and question echoed back; no error escapes to the listener.

use crate::dns::record_type_map::RecordTypeMapper;
use doh_relay_application::DohProvider;
use doh_relay_domain::{ClientTransport, EdnsRequest, InboundQuery, RelayError};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::Record;
use hickory_proto::xfer::Protocol;
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct RelayHandler {
    provider: Arc<dyn DohProvider>,
    deadline: Duration,
}

impl RelayHandler {
    pub fn new(provider: Arc<dyn DohProvider>, deadline: Duration) -> Self {
        Self { provider, deadline }
    }

    fn normalize_domain(domain: &str) -> String {
        domain.trim_end_matches('.').to_string()
    }
}

#[async_trait::async_trait]
impl RequestHandler for RelayHandler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        // request_info() rejects anything but exactly one question; those
        // messages never reach the upstream.
        let request_info = match request.request_info() {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "malformed inbound query");
                return send_error_response(request, &mut response_handle, ResponseCode::ServFail)
                    .await;
            }
        };

        let query = &request_info.query;
        let domain = Self::normalize_domain(&query.name().to_utf8());
        let client_ip = request.src().ip();

        let record_type = match RecordTypeMapper::from_hickory(query.query_type()) {
            Some(rt) => rt,
            None => {
                debug!(record_type = ?query.query_type(), "unsupported record type");
                return send_error_response(request, &mut response_handle, ResponseCode::NotImp)
                    .await;
            }
        };

        info!(domain = %domain, record_type = %record_type, client = %client_ip, "DNS query received");

        let transport = match request.protocol() {
            Protocol::Udp => ClientTransport::Udp,
            _ => ClientTransport::Tcp,
        };

        let mut inbound = InboundQuery::new(request.header().id(), domain, record_type, transport);
        inbound.class = u16::from(query.query_class());
        inbound.checking_disabled = request.header().checking_disabled();
        if let Some(edns) = request.edns() {
            inbound = inbound.with_edns(EdnsRequest {
                payload_size: edns.max_payload(),
                dnssec_ok: edns.dnssec_ok(),
            });
        }

        let answer = match tokio::time::timeout(self.deadline, self.provider.resolve(&inbound)).await
        {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => {
                match &e {
                    RelayError::MalformedUpstreamResponse(_) => {
                        // Upstream contract violation, not a network blip.
                        warn!(domain = %inbound.name, error = %e, "upstream answer rejected");
                    }
                    _ => error!(domain = %inbound.name, error = %e, "query resolution failed"),
                }
                return send_error_response(request, &mut response_handle, ResponseCode::ServFail)
                    .await;
            }
            Err(_) => {
                warn!(domain = %inbound.name, deadline_ms = self.deadline.as_millis() as u64, "query deadline expired");
                return send_error_response(request, &mut response_handle, ResponseCode::ServFail)
                    .await;
            }
        };

        debug!(
            domain = %inbound.name,
            answers = answer.answers.len(),
            rcode = ?answer.response_code,
            "sending response"
        );

        let builder = MessageResponseBuilder::from_message_request(request);
        let mut header = *request.header();
        header.set_recursion_available(true);
        header.set_response_code(answer.response_code);
        header.set_authentic_data(answer.authentic_data);
        header.set_truncated(answer.truncated);
        let response = builder.build(
            header,
            answer.answers.iter(),
            answer.authorities.iter(),
            &[] as &[Record],
            &[],
        );

        match response_handle.send_response(response).await {
            Ok(info) => info,
            Err(e) => {
                error!(error = %e, "failed to send response");
                ResponseInfo::from(*request.header())
            }
        }
    }
}

async fn send_error_response<R: ResponseHandler>(
    request: &Request,
    response_handle: &mut R,
    code: ResponseCode,
) -> ResponseInfo {
    debug!(code = ?code, "sending error response");
    let builder = MessageResponseBuilder::from_message_request(request);
    let mut header = *request.header();
    header.set_response_code(code);
    header.set_recursion_available(true);
    let response = builder.build(header, &[], &[], &[], &[]);

    match response_handle.send_response(response).await {
        Ok(info) => info,
        Err(e) => {
            error!(error = %e, "failed to send error response");
            ResponseInfo::from(*request.header())
        }
    }
}
