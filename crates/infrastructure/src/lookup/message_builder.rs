//! Builds the bootstrap address query in wire format using `hickory-proto`.

use doh_relay_domain::RelayError;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

/// Builds DNS query messages in wire format
pub struct MessageBuilder;

impl MessageBuilder {
    /// Build an address query for `hostname` and serialize to wire format.
    ///
    /// Standard recursive query: random ID, RD flag set, single question.
    /// Returns the ID alongside the bytes so the caller can match the
    /// response to the request.
    pub fn build_address_query(
        hostname: &str,
        record_type: RecordType,
    ) -> Result<(u16, Vec<u8>), RelayError> {
        let name = Name::from_str(hostname).map_err(|e| {
            RelayError::EndpointUnresolvable(format!("invalid hostname '{}': {}", hostname, e))
        })?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(record_type);
        query.set_query_class(hickory_proto::rr::DNSClass::IN);

        let id = fastrand::u16(..);

        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);

        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);
        message.emit(&mut encoder).map_err(|e| {
            RelayError::EndpointUnresolvable(format!("failed to serialize lookup query: {}", e))
        })?;

        Ok((id, buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_a_query() {
        let (id, bytes) = MessageBuilder::build_address_query("dns.google", RecordType::A).unwrap();

        // DNS header is always 12 bytes, plus question section
        assert!(bytes.len() >= 12, "DNS message too short: {} bytes", bytes.len());

        // ID is in the first 2 bytes (big-endian)
        let wire_id = u16::from_be_bytes([bytes[0], bytes[1]]);
        assert_eq!(wire_id, id, "Wire ID should match returned ID");

        // Byte 2: QR(1) + Opcode(4) + AA(1) + TC(1) + RD(1); RD must be set
        assert_eq!(bytes[2] & 0x01, 0x01, "RD flag should be set");
    }

    #[test]
    fn test_build_aaaa_query() {
        assert!(MessageBuilder::build_address_query("dns.google", RecordType::AAAA).is_ok());
    }
}
