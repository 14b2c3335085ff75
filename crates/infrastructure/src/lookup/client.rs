use super::message_builder::MessageBuilder;
use super::response_parser;
use doh_relay_domain::RelayError;
use hickory_proto::rr::RecordType;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;

/// Resolve `hostname` against one specific DNS server over UDP.
///
/// Queries A first, then AAAA best-effort; an AAAA failure never masks
/// working IPv4 addresses.
pub async fn query_addresses(
    server: SocketAddr,
    hostname: &str,
    timeout: Duration,
) -> Result<Vec<IpAddr>, RelayError> {
    let mut addresses = exchange(server, hostname, RecordType::A, timeout).await?;

    match exchange(server, hostname, RecordType::AAAA, timeout).await {
        Ok(mut v6) => addresses.append(&mut v6),
        Err(e) => tracing::debug!(server = %server, error = %e, "AAAA lookup failed, keeping A results"),
    }

    Ok(addresses)
}

async fn exchange(
    server: SocketAddr,
    hostname: &str,
    record_type: RecordType,
    timeout: Duration,
) -> Result<Vec<IpAddr>, RelayError> {
    let (id, request_bytes) = MessageBuilder::build_address_query(hostname, record_type)?;

    let bind_addr = if server.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    let socket = UdpSocket::bind(bind_addr).await.map_err(|e| {
        RelayError::EndpointUnresolvable(format!("failed to bind lookup socket: {}", e))
    })?;

    socket.connect(server).await.map_err(|e| {
        RelayError::EndpointUnresolvable(format!("failed to connect to {}: {}", server, e))
    })?;

    socket.send(&request_bytes).await.map_err(|e| {
        RelayError::EndpointUnresolvable(format!("failed to send lookup to {}: {}", server, e))
    })?;

    let mut response_buf = vec![0u8; 4096];

    let len = tokio::time::timeout(timeout, socket.recv(&mut response_buf))
        .await
        .map_err(|_| {
            RelayError::EndpointUnresolvable(format!("lookup against {} timed out", server))
        })?
        .map_err(|e| {
            RelayError::EndpointUnresolvable(format!("failed to receive from {}: {}", server, e))
        })?;

    response_parser::extract_addresses(&response_buf[..len], id)
}
