use mdns_relay_domain::{DnsQuery, DomainError, RecordType};
use std::net::SocketAddr;

const HEADER_LEN: usize = 12;
const MAX_NAME_LEN: usize = 253;
const MIN_UDP_PAYLOAD: u16 = 512;
const TYPE_OPT: u16 = 41;

/// A decoded inbound query plus the wire details needed to answer it.
#[derive(Debug, Clone)]
pub struct WireQuery {
    pub query: DnsQuery,
    /// Question section exactly as received (name, type, class).
    pub question: Vec<u8>,
    pub recursion_desired: bool,
    /// True when the client sent an EDNS0 OPT record.
    pub has_edns: bool,
    /// UDP payload size advertised through EDNS0, never below 512.
    pub client_max_size: u16,
}

impl WireQuery {
    pub fn id(&self) -> u16 {
        self.query.id
    }
}

/// Decodes one query datagram.
///
/// Rejected with `MalformedMessage`:
///
/// * Buffer shorter than the 12-byte header
/// * QR bit set or non-zero OPCODE
/// * QDCOUNT other than 1
/// * Compression pointer or extended label type in the QNAME
/// * Name longer than 253 octets or running past the buffer
/// * Truncated QTYPE/QCLASS
///
/// A damaged additional section only disables EDNS handling; the question
/// itself is still served.
pub fn decode_query(buf: &[u8], client: SocketAddr) -> Result<WireQuery, DomainError> {
    if buf.len() < HEADER_LEN {
        return Err(malformed(format!("{} bytes is shorter than a header", buf.len())));
    }

    let id = read_u16(buf, 0);
    let flags = read_u16(buf, 2);
    if flags & 0x8000 != 0 {
        return Err(malformed("QR bit set on an inbound query"));
    }
    if flags & 0x7800 != 0 {
        return Err(malformed(format!("unsupported opcode {}", (flags >> 11) & 0x0F)));
    }

    let qdcount = read_u16(buf, 4);
    if qdcount != 1 {
        return Err(malformed(format!("QDCOUNT is {}, expected 1", qdcount)));
    }
    let ancount = read_u16(buf, 6);
    let nscount = read_u16(buf, 8);
    let arcount = read_u16(buf, 10);

    let (name, mut pos) = read_name(buf, HEADER_LEN)?;

    if pos + 4 > buf.len() {
        return Err(malformed("question truncated before type and class"));
    }
    let qtype = read_u16(buf, pos);
    let qclass = read_u16(buf, pos + 2);
    pos += 4;

    let question = buf[HEADER_LEN..pos].to_vec();

    let mut has_edns = false;
    let mut client_max_size = MIN_UDP_PAYLOAD;
    if ancount == 0 && nscount == 0 && arcount > 0 {
        if let Some(udp_size) = find_opt_payload_size(buf, pos, arcount) {
            has_edns = true;
            client_max_size = udp_size.max(MIN_UDP_PAYLOAD);
        }
    }

    Ok(WireQuery {
        query: DnsQuery::new(id, name, RecordType::from_u16(qtype), qclass, client),
        question,
        recursion_desired: flags & 0x0100 != 0,
        has_edns,
        client_max_size,
    })
}

fn read_name(buf: &[u8], start: usize) -> Result<(String, usize), DomainError> {
    let mut pos = start;
    let mut name = String::with_capacity(64);

    loop {
        let Some(&label_len) = buf.get(pos) else {
            return Err(malformed("name runs past the end of the datagram"));
        };
        let label_len = label_len as usize;
        pos += 1;
        if label_len == 0 {
            break;
        }
        if label_len & 0xC0 != 0 {
            return Err(malformed("compressed or extended label in question"));
        }
        if pos + label_len > buf.len() {
            return Err(malformed("label runs past the end of the datagram"));
        }
        // A dot inside a label would make the joined name ambiguous.
        if buf[pos..pos + label_len].contains(&b'.') {
            return Err(malformed("label contains a literal dot"));
        }
        if !name.is_empty() {
            name.push('.');
        }
        name.push_str(&String::from_utf8_lossy(&buf[pos..pos + label_len]));
        if name.len() > MAX_NAME_LEN {
            return Err(malformed(format!("name exceeds {} octets", MAX_NAME_LEN)));
        }
        pos += label_len;
    }

    Ok((name, pos))
}

/// Walks the additional section looking for an OPT record at the root name.
fn find_opt_payload_size(buf: &[u8], mut pos: usize, arcount: u16) -> Option<u16> {
    for _ in 0..arcount {
        // OPT is always owned by the root name.
        if *buf.get(pos)? != 0 {
            return None;
        }
        pos += 1;
        if pos + 10 > buf.len() {
            return None;
        }
        let rr_type = read_u16(buf, pos);
        let class = read_u16(buf, pos + 2);
        let rdlen = read_u16(buf, pos + 8) as usize;
        if rr_type == TYPE_OPT {
            return Some(class);
        }
        pos += 10 + rdlen;
    }
    None
}

fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([buf[at], buf[at + 1]])
}

fn malformed(reason: impl Into<String>) -> DomainError {
    DomainError::MalformedMessage(reason.into())
}
