use std::net::SocketAddr;

use crate::error::Result;

/// A message-oriented transport: every `send` is one datagram, every `recv`
/// yields at most one datagram.
///
/// No ordering or delivery guarantee is assumed. Callers feed whatever
/// arrives into the receive pipeline, which copes with loss, reordering and
/// chunks that do not line up with frame boundaries.
pub trait DatagramTransport {
    /// Send one datagram to the configured remote.
    fn send(&self, datagram: &[u8]) -> Result<()>;

    /// Receive one datagram into `buf`, returning its length and sender.
    fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)>;

    /// Receive one datagram into `buf`, discarding the sender address.
    fn recv(&self, buf: &mut [u8]) -> Result<usize> {
        self.recv_from(buf).map(|(len, _)| len)
    }
}
