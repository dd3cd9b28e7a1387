#![allow(dead_code)]
use hickory_proto::op::Message;
use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
pub enum MdnsBehavior {
    /// Reply with one A record.
    Ipv4(Ipv4Addr, u32),
    /// Reply with one AAAA record only.
    Ipv6Only(Ipv6Addr),
    /// Send a reply with a foreign ID first, then the real A record.
    StrayThenIpv4(Ipv4Addr, u32),
    /// Reply with ID 0, as some responders do.
    ZeroIdIpv4(Ipv4Addr, u32),
    /// One reply carrying an AAAA record ahead of the A record.
    Ipv6ThenIpv4(Ipv6Addr, Ipv4Addr, u32),
}

/// Loopback stand-in for a multicast DNS responder.
///
/// Hosts without a configured behavior are never answered.
pub struct MockMdnsResponder {
    addr: SocketAddr,
    queries: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockMdnsResponder {
    pub async fn start(hosts: Vec<(&str, MdnsBehavior)>) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = socket.local_addr()?;
        let hosts: HashMap<String, MdnsBehavior> = hosts
            .into_iter()
            .map(|(host, behavior)| (format!("{}.", host), behavior))
            .collect();
        let queries = Arc::new(Mutex::new(Vec::new()));
        let log = queries.clone();

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 1500];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        let Ok(message) = Message::from_vec(&buf[..len]) else { continue };
                        let Some(question) = message.queries().first() else { continue };
                        let host = question.name().to_utf8();
                        log.lock().unwrap().push(host.clone());

                        let id = message.id();
                        let question_bytes = &buf[12..len];
                        let replies = match hosts.get(&host) {
                            Some(MdnsBehavior::Ipv4(ip, ttl)) => {
                                vec![build_reply(id, question_bytes, &[(1, &ip.octets())], *ttl)]
                            }
                            Some(MdnsBehavior::Ipv6Only(ip)) => {
                                vec![build_reply(id, question_bytes, &[(28, &ip.octets())], 120)]
                            }
                            Some(MdnsBehavior::StrayThenIpv4(ip, ttl)) => vec![
                                build_reply(id.wrapping_add(1).max(1), question_bytes, &[(1, &[192, 0, 2, 66])], *ttl),
                                build_reply(id, question_bytes, &[(1, &ip.octets())], *ttl),
                            ],
                            Some(MdnsBehavior::ZeroIdIpv4(ip, ttl)) => {
                                vec![build_reply(0, question_bytes, &[(1, &ip.octets())], *ttl)]
                            }
                            Some(MdnsBehavior::Ipv6ThenIpv4(v6, v4, ttl)) => vec![build_reply(
                                id,
                                question_bytes,
                                &[(28, &v6.octets()), (1, &v4.octets())],
                                *ttl,
                            )],
                            None => Vec::new(),
                        };

                        for reply in replies {
                            let _ = socket.send_to(&reply, peer).await;
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Hosts asked for so far, with trailing dots.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Drop for MockMdnsResponder {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Authoritative reply echoing the question, every answer owner compressed to it.
fn build_reply(id: u16, question: &[u8], answers: &[(u16, &[u8])], ttl: u32) -> Vec<u8> {
    let mut reply = Vec::with_capacity(12 + question.len() + answers.len() * 28);
    reply.extend_from_slice(&id.to_be_bytes());
    reply.extend_from_slice(&[0x84, 0x00, 0x00, 0x01]);
    reply.extend_from_slice(&(answers.len() as u16).to_be_bytes());
    reply.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    reply.extend_from_slice(question);
    for (rr_type, rdata) in answers {
        reply.extend_from_slice(&[0xC0, 0x0C]);
        reply.extend_from_slice(&rr_type.to_be_bytes());
        reply.extend_from_slice(&[0x00, 0x01]);
        reply.extend_from_slice(&ttl.to_be_bytes());
        reply.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        reply.extend_from_slice(rdata);
    }
    reply
}
