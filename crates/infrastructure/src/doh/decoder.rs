//! Decoding of the upstream JSON answer into wire-ready DNS records.
//!
//! The upstream is not trusted to be well-formed: the echoed question must
//! match the query, and each record's RDATA is re-parsed by type. A record
//! that fails parsing is dropped on its own; an answer where every record
//! fails is reported as malformed so it never masquerades as NODATA.

use doh_relay_application::UpstreamAnswer;
use doh_relay_domain::{InboundQuery, RelayError};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::rdata;
use hickory_proto::rr::{Name, RData, Record};
use serde::Deserialize;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct JsonBody {
    #[serde(rename = "Status")]
    status: u16,

    #[serde(rename = "TC", default)]
    truncated: bool,

    #[serde(rename = "AD", default)]
    authentic_data: bool,

    #[serde(rename = "Question", default)]
    question: Vec<JsonQuestion>,

    #[serde(rename = "Answer", default)]
    answer: Vec<JsonRecord>,

    #[serde(rename = "Authority", default)]
    authority: Vec<JsonRecord>,

    #[serde(rename = "Comment", default)]
    comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JsonQuestion {
    name: String,

    #[serde(rename = "type", default)]
    record_type: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct JsonRecord {
    name: String,

    #[serde(rename = "type")]
    record_type: u16,

    #[serde(rename = "TTL", default)]
    ttl: u32,

    data: String,
}

/// Decode the upstream body against the query it answers.
pub fn decode(body: &[u8], query: &InboundQuery) -> Result<UpstreamAnswer, RelayError> {
    let parsed: JsonBody = serde_json::from_slice(body)
        .map_err(|e| RelayError::MalformedUpstreamResponse(format!("invalid JSON: {}", e)))?;

    validate_question(&parsed, query)?;

    if let Some(comment) = &parsed.comment {
        debug!(comment = %comment, "upstream comment");
    }

    let response_code = status_to_response_code(parsed.status);

    let answers = convert_records(&parsed.answer);
    if response_code == ResponseCode::NoError && !parsed.answer.is_empty() && answers.is_empty() {
        return Err(RelayError::MalformedUpstreamResponse(format!(
            "none of {} answer records survived parsing",
            parsed.answer.len()
        )));
    }

    Ok(UpstreamAnswer {
        response_code,
        answers,
        authorities: convert_records(&parsed.authority),
        truncated: parsed.truncated,
        authentic_data: parsed.authentic_data,
    })
}

/// The echoed question must name what we asked for; case and the trailing
/// dot are not significant.
fn validate_question(parsed: &JsonBody, query: &InboundQuery) -> Result<(), RelayError> {
    let Some(question) = parsed.question.first() else {
        return Err(RelayError::MalformedUpstreamResponse(
            "response carries no question section".to_string(),
        ));
    };

    if !names_equal(&question.name, &query.name) {
        return Err(RelayError::MalformedUpstreamResponse(format!(
            "echoed question '{}' does not match query '{}'",
            question.name, query.name
        )));
    }

    if let Some(echoed_type) = question.record_type {
        if echoed_type != query.record_type.as_u16() {
            return Err(RelayError::MalformedUpstreamResponse(format!(
                "echoed question type {} does not match query type {}",
                echoed_type,
                query.record_type.as_u16()
            )));
        }
    }

    Ok(())
}

fn names_equal(a: &str, b: &str) -> bool {
    a.trim_end_matches('.').eq_ignore_ascii_case(b.trim_end_matches('.'))
}

fn convert_records(records: &[JsonRecord]) -> Vec<Record> {
    let mut converted = Vec::with_capacity(records.len());

    for record in records {
        let Ok(name) = Name::from_utf8(&record.name) else {
            debug!(name = %record.name, "dropping record with unparsable name");
            continue;
        };

        match parse_rdata(record.record_type, &record.data) {
            Some(data) => converted.push(Record::from_rdata(name, record.ttl, data)),
            None => {
                debug!(
                    name = %record.name,
                    record_type = record.record_type,
                    data = %record.data,
                    "dropping record with unparsable RDATA"
                );
            }
        }
    }

    converted
}

/// Parse one record's presentation-form `data` by numeric type. `None` means
/// the record is dropped; the rest of the answer stands.
fn parse_rdata(record_type: u16, data: &str) -> Option<RData> {
    match record_type {
        1 => data.parse::<Ipv4Addr>().ok().map(|ip| RData::A(rdata::A(ip))),
        28 => data
            .parse::<Ipv6Addr>()
            .ok()
            .map(|ip| RData::AAAA(rdata::AAAA(ip))),
        5 => parse_name(data).map(|n| RData::CNAME(rdata::CNAME(n))),
        2 => parse_name(data).map(|n| RData::NS(rdata::NS(n))),
        12 => parse_name(data).map(|n| RData::PTR(rdata::PTR(n))),
        15 => parse_mx(data),
        16 => Some(RData::TXT(rdata::TXT::new(parse_txt_strings(data)))),
        6 => parse_soa(data),
        33 => parse_srv(data),
        _ => None,
    }
}

fn parse_name(data: &str) -> Option<Name> {
    Name::from_str(data).ok()
}

/// `<preference> <exchange>`
fn parse_mx(data: &str) -> Option<RData> {
    let mut fields = data.split_whitespace();
    let preference = fields.next()?.parse::<u16>().ok()?;
    let exchange = parse_name(fields.next()?)?;
    if fields.next().is_some() {
        return None;
    }
    Some(RData::MX(rdata::MX::new(preference, exchange)))
}

/// `<mname> <rname> <serial> <refresh> <retry> <expire> <minimum>`
fn parse_soa(data: &str) -> Option<RData> {
    let fields: Vec<&str> = data.split_whitespace().collect();
    if fields.len() != 7 {
        return None;
    }

    Some(RData::SOA(rdata::SOA::new(
        parse_name(fields[0])?,
        parse_name(fields[1])?,
        fields[2].parse().ok()?,
        fields[3].parse().ok()?,
        fields[4].parse().ok()?,
        fields[5].parse().ok()?,
        fields[6].parse().ok()?,
    )))
}

/// `<priority> <weight> <port> <target>`
fn parse_srv(data: &str) -> Option<RData> {
    let fields: Vec<&str> = data.split_whitespace().collect();
    if fields.len() != 4 {
        return None;
    }

    Some(RData::SRV(rdata::SRV::new(
        fields[0].parse().ok()?,
        fields[1].parse().ok()?,
        fields[2].parse().ok()?,
        parse_name(fields[3])?,
    )))
}

/// TXT data arrives as one or more quoted character-strings; unquoted data
/// is taken as a single string.
fn parse_txt_strings(data: &str) -> Vec<String> {
    if !data.contains('"') {
        return vec![data.to_string()];
    }

    data.split('"')
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, s)| s.to_string())
        .collect()
}

fn status_to_response_code(status: u16) -> ResponseCode {
    match status {
        0 => ResponseCode::NoError,
        1 => ResponseCode::FormErr,
        2 => ResponseCode::ServFail,
        3 => ResponseCode::NXDomain,
        4 => ResponseCode::NotImp,
        5 => ResponseCode::Refused,
        _ => ResponseCode::ServFail,
    }
}
