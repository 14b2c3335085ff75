//! Translation of an inbound DNS question into the upstream's GET request.
//!
//! Request parameters follow the JSON resolve API: `name`, numeric `type`,
//! `edns_client_subnet`, `do`, `cd`, and an opaque `random_padding` whose
//! only job is to push the URL length up to a fixed-size bucket.

use doh_relay_domain::{InboundQuery, UpstreamConfig};
use reqwest::Url;

/// URL lengths are rounded up to the next multiple of this, so the request
/// length reveals only the bucket, not the name length.
pub const PAD_BUCKET: usize = 128;

const PAD_PARAM_OVERHEAD: usize = "&random_padding=".len();

/// The fully assembled upstream request for one query.
#[derive(Debug, Clone)]
pub struct EncodedRequest {
    pub url: Url,
    /// Hostname presented for TLS SNI and certificate matching; the
    /// connection itself goes to a resolved endpoint address.
    pub hostname: String,
    pub port: u16,
}

/// Build the GET request for `query`. Pure; the only non-determinism is the
/// content (never the length) of the padding value.
pub fn encode(
    base: &Url,
    hostname: &str,
    port: u16,
    query: &InboundQuery,
    config: &UpstreamConfig,
) -> EncodedRequest {
    let mut url = base.clone();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("name", &query.name);
        pairs.append_pair("type", &query.record_type.as_u16().to_string());

        if let Some(subnet) = &config.edns_client_subnet {
            pairs.append_pair("edns_client_subnet", subnet);
        }
        if query.dnssec_ok() {
            pairs.append_pair("do", "1");
        }
        if query.checking_disabled {
            pairs.append_pair("cd", "1");
        }
    }

    if config.padding {
        let padding = padding_for(url.as_str().len());
        url.query_pairs_mut().append_pair("random_padding", &padding);
    }

    EncodedRequest {
        url,
        hostname: hostname.to_string(),
        port,
    }
}

/// Random alphanumeric value sized so the final URL lands exactly on a
/// bucket boundary. Alphanumerics survive URL encoding byte-for-byte, so the
/// measured length is the wire length.
fn padding_for(url_len: usize) -> String {
    let minimum = url_len + PAD_PARAM_OVERHEAD + 1;
    let target = minimum.div_ceil(PAD_BUCKET) * PAD_BUCKET;
    let pad_len = target - url_len - PAD_PARAM_OVERHEAD;

    (0..pad_len).map(|_| fastrand::alphanumeric()).collect()
}
