use doh_relay_domain::{ClientTransport, InboundQuery, RecordType, RelayError};
use doh_relay_infrastructure::doh::decoder;
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::RData;
use std::net::Ipv4Addr;

fn query(name: &str, record_type: RecordType) -> InboundQuery {
    InboundQuery::new(0xbeef, name, record_type, ClientTransport::Udp)
}

#[test]
fn test_single_a_record() {
    let body = br#"{
        "Status": 0,
        "TC": false,
        "RD": true,
        "RA": true,
        "AD": false,
        "CD": false,
        "Question": [{"name": "example.com.", "type": 1}],
        "Answer": [{"name": "example.com.", "type": 1, "TTL": 300, "data": "93.184.216.34"}]
    }"#;

    let answer = decoder::decode(body, &query("example.com", RecordType::A)).unwrap();

    assert_eq!(answer.response_code, ResponseCode::NoError);
    assert_eq!(answer.answers.len(), 1);

    let record = &answer.answers[0];
    assert_eq!(record.ttl(), 300);
    match record.data() {
        RData::A(a) => assert_eq!(a.0, Ipv4Addr::new(93, 184, 216, 34)),
        other => panic!("expected A record, got {:?}", other),
    }
}

#[test]
fn test_question_name_mismatch_is_malformed() {
    let body = br#"{
        "Status": 0,
        "Question": [{"name": "evil.example.", "type": 1}],
        "Answer": [{"name": "evil.example.", "type": 1, "TTL": 60, "data": "203.0.113.1"}]
    }"#;

    let result = decoder::decode(body, &query("example.com", RecordType::A));
    assert!(matches!(result, Err(RelayError::MalformedUpstreamResponse(_))));
}

#[test]
fn test_question_match_ignores_case_and_trailing_dot() {
    let body = br#"{
        "Status": 0,
        "Question": [{"name": "EXAMPLE.com."}],
        "Answer": [{"name": "example.com.", "type": 1, "TTL": 60, "data": "203.0.113.1"}]
    }"#;

    assert!(decoder::decode(body, &query("example.com", RecordType::A)).is_ok());
}

#[test]
fn test_question_type_mismatch_is_malformed() {
    let body = br#"{
        "Status": 0,
        "Question": [{"name": "example.com.", "type": 28}],
        "Answer": []
    }"#;

    let result = decoder::decode(body, &query("example.com", RecordType::A));
    assert!(matches!(result, Err(RelayError::MalformedUpstreamResponse(_))));
}

#[test]
fn test_garbled_record_dropped_individually() {
    let body = br#"{
        "Status": 0,
        "Question": [{"name": "example.com.", "type": 1}],
        "Answer": [
            {"name": "example.com.", "type": 1, "TTL": 300, "data": "not-an-address"},
            {"name": "example.com.", "type": 1, "TTL": 300, "data": "93.184.216.34"}
        ]
    }"#;

    let answer = decoder::decode(body, &query("example.com", RecordType::A)).unwrap();
    assert_eq!(answer.answers.len(), 1, "only the parsable record survives");
}

#[test]
fn test_fully_garbled_answer_is_malformed_not_nodata() {
    let body = br#"{
        "Status": 0,
        "Question": [{"name": "example.com.", "type": 1}],
        "Answer": [
            {"name": "example.com.", "type": 1, "TTL": 300, "data": "not-an-address"},
            {"name": "example.com.", "type": 1, "TTL": 300, "data": "also garbage"}
        ]
    }"#;

    let result = decoder::decode(body, &query("example.com", RecordType::A));
    assert!(matches!(result, Err(RelayError::MalformedUpstreamResponse(_))));
}

#[test]
fn test_empty_answer_with_success_is_nodata() {
    let body = br#"{
        "Status": 0,
        "Question": [{"name": "example.com.", "type": 1}],
        "Answer": []
    }"#;

    let answer = decoder::decode(body, &query("example.com", RecordType::A)).unwrap();
    assert_eq!(answer.response_code, ResponseCode::NoError);
    assert!(answer.answers.is_empty());
}

#[test]
fn test_nxdomain_with_authority() {
    let body = br#"{
        "Status": 3,
        "Question": [{"name": "nx.example.com.", "type": 1}],
        "Authority": [{
            "name": "example.com.",
            "type": 6,
            "TTL": 1800,
            "data": "ns1.example.com. hostmaster.example.com. 2024010101 7200 900 1209600 86400"
        }]
    }"#;

    let answer = decoder::decode(body, &query("nx.example.com", RecordType::A)).unwrap();
    assert_eq!(answer.response_code, ResponseCode::NXDomain);
    assert!(answer.answers.is_empty());
    assert_eq!(answer.authorities.len(), 1);
    assert!(matches!(answer.authorities[0].data(), RData::SOA(_)));
}

#[test]
fn test_cname_chain_preserved() {
    let body = br#"{
        "Status": 0,
        "Question": [{"name": "www.example.com.", "type": 1}],
        "Answer": [
            {"name": "www.example.com.", "type": 5, "TTL": 120, "data": "example.com."},
            {"name": "example.com.", "type": 1, "TTL": 300, "data": "93.184.216.34"}
        ]
    }"#;

    let answer = decoder::decode(body, &query("www.example.com", RecordType::A)).unwrap();
    assert_eq!(answer.answers.len(), 2);
    assert!(matches!(answer.answers[0].data(), RData::CNAME(_)));
    assert!(matches!(answer.answers[1].data(), RData::A(_)));
}

#[test]
fn test_flags_propagated() {
    let body = br#"{
        "Status": 0,
        "TC": true,
        "AD": true,
        "Question": [{"name": "example.com.", "type": 16}],
        "Answer": [{"name": "example.com.", "type": 16, "TTL": 60, "data": "\"v=spf1 -all\""}]
    }"#;

    let answer = decoder::decode(body, &query("example.com", RecordType::TXT)).unwrap();
    assert!(answer.truncated);
    assert!(answer.authentic_data);
}

#[test]
fn test_invalid_json_is_malformed() {
    let result = decoder::decode(b"<html>502 Bad Gateway</html>", &query("example.com", RecordType::A));
    assert!(matches!(result, Err(RelayError::MalformedUpstreamResponse(_))));
}

#[test]
fn test_missing_question_is_malformed() {
    let body = br#"{"Status": 0, "Answer": []}"#;
    let result = decoder::decode(body, &query("example.com", RecordType::A));
    assert!(matches!(result, Err(RelayError::MalformedUpstreamResponse(_))));
}
