use super::{TSocket, MAX_ICMP_MESSAGE_SIZE};
use pnet_packet::{ipv4::Ipv4Packet, Packet};
use socket2::{Domain, Protocol, SockAddr, Type};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::{io, time::Duration};

// Room for an IPv4 header with options in front of the ICMP message.
const RECV_BUFFER_SIZE: usize = MAX_ICMP_MESSAGE_SIZE + 60;

/// Unprivileged ICMP socket (`SOCK_DGRAM` + `IPPROTO_ICMP`), bound to `0.0.0.0`.
pub struct DgramSocket {
    socket: socket2::Socket,
}

impl DgramSocket {
    pub fn new(read_timeout: Duration) -> Result<Self, io::Error> {
        tracing::trace!("creating DgramSocket");
        let socket = socket2::Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::ICMPV4))?;
        socket.set_read_timeout(Some(read_timeout))?;
        socket.bind(&SockAddr::from(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)))?;
        Ok(DgramSocket { socket })
    }
}

impl TSocket for DgramSocket {
    fn send_to(&self, buf: &[u8], addr: &SockAddr) -> io::Result<usize> {
        self.socket.send_to(buf, addr)
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        let mut recv_buf = [0u8; RECV_BUFFER_SIZE];

        // Socket2 gives a safety guaranty which allows us to do an unsafe cast from `&mut [u8]`
        // to `&mut [std::mem::MaybeUninit<u8>]`.
        // https://docs.rs/socket2/0.4.7/socket2/struct.Socket.html#method.recv
        let (n_bytes_received, socket_addr) = self.socket.recv_from(unsafe {
            &mut *(std::ptr::addr_of_mut!(recv_buf) as *mut [u8] as *mut [std::mem::MaybeUninit<u8>])
        })?;
        let source = socket_addr
            .as_socket()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "received from a non-IP address"))?;

        let icmp_data = strip_ipv4_header(&recv_buf[..n_bytes_received]);
        let n_bytes = icmp_data.len().min(buf.len());
        buf[..n_bytes].copy_from_slice(&icmp_data[..n_bytes]);
        Ok((n_bytes, source))
    }
}

// Linux delivers the bare ICMP message on datagram sockets, BSDs prepend the IPv4 header.
// No ICMP type has 4 in its upper nibble, so a leading 0x4_ byte is an IP version field.
fn strip_ipv4_header(datagram: &[u8]) -> &[u8] {
    match datagram.first() {
        Some(&first) if first >> 4 == 4 => match Ipv4Packet::new(datagram) {
            Some(ipv4_packet) => {
                let header_len = usize::from(ipv4_packet.get_header_length()) * 4;
                datagram.get(header_len..).unwrap_or(&[])
            }
            None => datagram,
        },
        _ => datagram,
    }
}
