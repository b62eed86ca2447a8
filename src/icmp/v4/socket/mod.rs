use std::io;
use std::net::SocketAddr;

pub(crate) mod dgram_socket;

/// Largest ICMP message read in one piece. Longer messages are truncated.
pub(crate) const MAX_ICMP_MESSAGE_SIZE: usize = 1024;

pub trait TSocket: Send + Sync {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize>;
    /// Reads one ICMP message (without IP header) into `buf`, truncated to `buf.len()`.
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;
}
