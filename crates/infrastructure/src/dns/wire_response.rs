use super::wire_query::WireQuery;
use mdns_relay_domain::{ResolutionResult, ResolvedAddress};
use std::net::IpAddr;

const HEADER_LEN: usize = 12;
const MAX_UDP_RESPONSE: usize = 512;
const RCODE_SERVFAIL: u8 = 2;
const RCODE_NXDOMAIN: u8 = 3;

const OPT_RECORD: [u8; 11] = [
    0x00, 0x00, 0x29, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Builds the response datagram for a synthesized result.
///
/// The header echoes the query ID and RD bit and sets QR, AA and RA. The
/// question section is copied byte for byte. An `Answer` becomes one A or AAAA
/// record whose owner is a pointer to the question name. When the client sent
/// EDNS0 a minimal OPT record is appended. If the answer would not fit in the
/// client's payload size (capped at 512) it is left out and TC is set.
pub fn encode_response(query: &WireQuery, result: &ResolutionResult) -> Vec<u8> {
    let (rcode, answer) = match result {
        ResolutionResult::Answer(resolved) => (0, Some(resolved)),
        ResolutionResult::NoData => (0, None),
        ResolutionResult::NxDomain => (RCODE_NXDOMAIN, None),
        ResolutionResult::ServerFailure => (RCODE_SERVFAIL, None),
    };

    let opt_len = if query.has_edns { OPT_RECORD.len() } else { 0 };
    let answer_len = answer.map_or(0, |resolved| answer_record_len(&resolved.address));
    let limit = (query.client_max_size as usize).min(MAX_UDP_RESPONSE) + opt_len;
    let truncated = HEADER_LEN + query.question.len() + answer_len + opt_len > limit;
    let answer = if truncated { None } else { answer };

    let mut buf = Vec::with_capacity(HEADER_LEN + query.question.len() + answer_len + opt_len);

    let mut flags_hi = 0x80 | 0x04;
    if truncated {
        flags_hi |= 0x02;
    }
    if query.recursion_desired {
        flags_hi |= 0x01;
    }

    buf.extend_from_slice(&query.id().to_be_bytes());
    buf.push(flags_hi);
    buf.push(0x80 | rcode);
    buf.extend_from_slice(&[0x00, 0x01]);
    buf.extend_from_slice(&(answer.is_some() as u16).to_be_bytes());
    buf.extend_from_slice(&[0x00, 0x00]);
    buf.extend_from_slice(&(query.has_edns as u16).to_be_bytes());

    buf.extend_from_slice(&query.question);

    if let Some(resolved) = answer {
        push_address_record(&mut buf, resolved);
    }

    if query.has_edns {
        buf.extend_from_slice(&OPT_RECORD);
    }

    buf
}

fn answer_record_len(address: &IpAddr) -> usize {
    match address {
        IpAddr::V4(_) => 16,
        IpAddr::V6(_) => 28,
    }
}

fn push_address_record(buf: &mut Vec<u8>, resolved: &ResolvedAddress) {
    buf.extend_from_slice(&[0xC0, 0x0C]);
    match resolved.address {
        IpAddr::V4(ipv4) => {
            buf.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
            buf.extend_from_slice(&resolved.ttl.to_be_bytes());
            buf.extend_from_slice(&[0x00, 0x04]);
            buf.extend_from_slice(&ipv4.octets());
        }
        IpAddr::V6(ipv6) => {
            buf.extend_from_slice(&[0x00, 0x1C, 0x00, 0x01]);
            buf.extend_from_slice(&resolved.ttl.to_be_bytes());
            buf.extend_from_slice(&[0x00, 0x10]);
            buf.extend_from_slice(&ipv6.octets());
        }
    }
}
