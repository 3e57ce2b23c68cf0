//! Internal utilities.

use std::io;
use std::net::SocketAddr;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

pub(crate) mod hex {
    /// Format bytes as hex string (lowercase, no separator).
    pub(crate) fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Lazily formatted dump of a datagram for trace logging.
///
/// Sixteen bytes per line, offset first, uppercase hex separated by spaces
/// with a wider gap after the eighth byte. Nothing is formatted unless the
/// event is actually emitted.
pub(crate) struct HexDump<'a>(pub(crate) &'a [u8]);

impl std::fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, chunk) in self.0.chunks(16).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:04x}:", i * 16)?;
            for (j, b) in chunk.iter().enumerate() {
                if j == 8 {
                    f.write_str(" ")?;
                }
                write!(f, " {:02X}", b)?;
            }
        }
        Ok(())
    }
}

/// Bind the agent's UDP socket through socket2 so options can be set first.
///
/// IPv6 addresses get a dual-stack socket (`IPV6_V6ONLY` off), so `[::]:port`
/// also answers IPv4 managers. `recv_buffer_size` is a hint; the kernel caps
/// it at `net.core.rmem_max` and a refusal is ignored.
pub(crate) async fn bind_udp_socket(
    addr: SocketAddr,
    recv_buffer_size: Option<usize>,
) -> io::Result<UdpSocket> {
    let domain = match addr {
        SocketAddr::V4(_) => Domain::IPV4,
        SocketAddr::V6(_) => Domain::IPV6,
    };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    // quick restarts on the well-known port
    socket.set_reuse_address(true)?;

    if let Some(size) = recv_buffer_size {
        let _ = socket.set_recv_buffer_size(size);
    }

    // tokio requires a non-blocking socket
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;

    UdpSocket::from_std(socket.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex::encode(&[0x00, 0xAB, 0x7f]), "00ab7f");
        assert_eq!(hex::encode(&[]), "");
    }

    #[test]
    fn test_hex_dump_lines() {
        let data: Vec<u8> = (0u8..18).collect();
        let dump = HexDump(&data).to_string();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0000: 00 01 02"));
        assert!(lines[0].contains("07  08"));
        assert_eq!(lines[1], "0010: 10 11");
        assert_eq!(HexDump(&[]).to_string(), "");
    }

    #[tokio::test]
    async fn test_bind_udp_socket_ipv4() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let socket = bind_udp_socket(addr, None).await.unwrap();
        let local = socket.local_addr().unwrap();
        assert!(local.is_ipv4());
        assert_ne!(local.port(), 0);
    }

    #[tokio::test]
    async fn test_bind_udp_socket_ipv6() {
        let addr: SocketAddr = "[::1]:0".parse().unwrap();
        let socket = bind_udp_socket(addr, None).await.unwrap();
        let local = socket.local_addr().unwrap();
        assert!(local.is_ipv6());
        assert_ne!(local.port(), 0);
    }

    #[tokio::test]
    async fn test_bind_udp_socket_with_buffer_size() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let socket = bind_udp_socket(addr, Some(1024 * 1024)).await.unwrap();
        let local = socket.local_addr().unwrap();
        assert!(local.is_ipv4());
        assert_ne!(local.port(), 0);
    }
}
