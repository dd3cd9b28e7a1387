use mdns_relay_infrastructure::dns::DnsServerHandler;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

const RECV_BUFFER_SIZE: usize = 4096;

pub fn bind_udp_socket(socket_addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.set_send_buffer_size(512 * 1024)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;

    let std_socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_socket)?)
}

/// Serves datagrams until the socket fails.
///
/// Every datagram is handled in its own task; at most `max_in_flight` run at
/// once and datagrams arriving above that bound are dropped. Each response is
/// written with a single `send_to`.
pub async fn run_udp_server(
    socket: UdpSocket,
    handler: Arc<DnsServerHandler>,
    max_in_flight: usize,
) -> anyhow::Result<()> {
    let socket = Arc::new(socket);
    let limit = Arc::new(Semaphore::new(max_in_flight));
    let mut recv_buf = [0u8; RECV_BUFFER_SIZE];

    info!(bind_address = %socket.local_addr()?, max_in_flight, "DNS server ready");

    loop {
        let (len, from) = match socket.recv_from(&mut recv_buf).await {
            Ok(received) => received,
            Err(e) if is_transient(&e) => {
                debug!(error = %e, "Transient UDP receive error");
                continue;
            }
            Err(e) => {
                error!(error = %e, "UDP recv error");
                return Err(e.into());
            }
        };

        let Ok(permit) = limit.clone().try_acquire_owned() else {
            warn!(client = %from, "Too many queries in flight, dropping datagram");
            continue;
        };

        let datagram = recv_buf[..len].to_vec();
        let handler = handler.clone();
        let socket = socket.clone();

        tokio::spawn(async move {
            let _permit = permit;
            if let Some(response) = handler.handle_datagram(&datagram, from).await {
                if let Err(e) = socket.send_to(&response, from).await {
                    warn!(client = %from, error = %e, "Failed to send response");
                }
            }
        });
    }
}

/// ICMP errors from earlier sends surface on the next receive on some
/// platforms; they say nothing about the listening socket itself.
fn is_transient(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::Interrupted
    )
}
