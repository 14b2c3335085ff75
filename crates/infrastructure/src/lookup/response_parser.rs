use doh_relay_domain::RelayError;
use hickory_proto::op::Message;
use hickory_proto::rr::RData;
use std::net::IpAddr;
use tracing::debug;

/// Extract the A/AAAA addresses from a bootstrap lookup response.
///
/// The response ID must match the query ID; anything else on the socket is
/// not our answer.
pub fn extract_addresses(response_bytes: &[u8], expected_id: u16) -> Result<Vec<IpAddr>, RelayError> {
    let message = Message::from_vec(response_bytes).map_err(|e| {
        RelayError::EndpointUnresolvable(format!("failed to parse lookup response: {}", e))
    })?;

    if message.id() != expected_id {
        return Err(RelayError::EndpointUnresolvable(format!(
            "lookup response ID {} does not match query ID {}",
            message.id(),
            expected_id
        )));
    }

    let mut addresses = Vec::new();
    for record in message.answers() {
        match record.data() {
            RData::A(a) => addresses.push(IpAddr::V4(a.0)),
            RData::AAAA(aaaa) => addresses.push(IpAddr::V6(aaaa.0)),
            _ => {}
        }
    }

    debug!(
        rcode = ?message.response_code(),
        addresses = addresses.len(),
        "lookup response parsed"
    );

    Ok(addresses)
}
