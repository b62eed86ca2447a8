use crate::icmp::v4::{DgramSocket, TSocket};
use crate::{Destination, PingResult};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

/// The one socket shared by sender and receiver.
pub struct Session<S> {
    socket: S,
}

impl Session<DgramSocket> {
    /// Failure here is not recoverable: without a socket there is nothing to do.
    pub fn open(read_timeout: Duration) -> PingResult<Self> {
        Ok(Session::with_socket(DgramSocket::new(read_timeout)?))
    }
}

impl<S> Session<S>
where
    S: TSocket,
{
    pub fn with_socket(socket: S) -> Self {
        Session { socket }
    }

    /// Resolves `destination` and writes `bytes` to it.
    pub fn send(&self, bytes: &[u8], destination: &Destination) -> PingResult<usize> {
        let addr = destination.resolve()?;
        let n_bytes_sent = self.socket.send_to(bytes, &SocketAddr::V4(addr).into())?;
        tracing::trace!("sent {n_bytes_sent} bytes to {addr}");
        Ok(n_bytes_sent)
    }

    /// Blocks until a datagram arrives. `Ok(None)` when the read timeout expires first.
    pub fn receive(&self, buffer_size: usize) -> PingResult<Option<(Vec<u8>, SocketAddr)>> {
        let mut buf = vec![0u8; buffer_size];
        match self.socket.recv_from(&mut buf) {
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => Ok(None),
            Err(e) => Err(e.into()),
            Ok((n_bytes_received, source)) => {
                tracing::trace!("received {n_bytes_received} bytes from {source}");
                buf.truncate(n_bytes_received);
                Ok(Some((buf, source)))
            }
        }
    }
}
