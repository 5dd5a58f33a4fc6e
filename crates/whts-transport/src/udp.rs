use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::DatagramTransport;

/// Largest datagram a UDP socket can deliver.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Socket-level options applied at bind time.
#[derive(Debug, Clone, Default)]
pub struct UdpConfig {
    /// Read timeout for blocking receives. `None` blocks forever.
    pub read_timeout: Option<Duration>,
    /// Write timeout for blocking sends.
    pub write_timeout: Option<Duration>,
}

/// UDP transport bound to a local address, sending to one remote.
///
/// Receives are accepted from any sender; the sender address is reported by
/// [`DatagramTransport::recv_from`] so callers can filter if they need to.
pub struct UdpTransport {
    socket: UdpSocket,
    remote: Option<SocketAddr>,
}

impl UdpTransport {
    /// Bind to a local address with default socket options.
    pub fn bind(local: impl ToSocketAddrs + std::fmt::Display) -> Result<Self> {
        Self::bind_with_config(local, &UdpConfig::default())
    }

    /// Bind to a local address and apply explicit socket options.
    pub fn bind_with_config(
        local: impl ToSocketAddrs + std::fmt::Display,
        config: &UdpConfig,
    ) -> Result<Self> {
        let socket = UdpSocket::bind(&local).map_err(|source| TransportError::Bind {
            addr: local.to_string(),
            source,
        })?;
        socket.set_read_timeout(config.read_timeout)?;
        socket.set_write_timeout(config.write_timeout)?;

        info!(local = %socket.local_addr()?, "bound udp socket");

        Ok(Self {
            socket,
            remote: None,
        })
    }

    /// Set the remote every [`send`](DatagramTransport::send) goes to.
    pub fn with_remote(mut self, remote: SocketAddr) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Resolve `remote` and use it as the send target.
    pub fn with_remote_addr(self, remote: &str) -> Result<Self> {
        let addr = resolve(remote)?;
        Ok(self.with_remote(addr))
    }

    /// The configured remote, if any.
    pub fn remote(&self) -> Option<SocketAddr> {
        self.remote
    }

    /// The bound local address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(Into::into)
    }

    /// Set read timeout on the underlying socket.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.socket.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Send one datagram to an explicit address.
    pub fn send_to(&self, datagram: &[u8], remote: SocketAddr) -> Result<()> {
        let sent = self.socket.send_to(datagram, remote)?;
        if sent != datagram.len() {
            return Err(TransportError::ShortSend {
                remote,
                sent,
                len: datagram.len(),
            });
        }
        debug!(%remote, size = sent, "sent datagram");
        Ok(())
    }
}

impl DatagramTransport for UdpTransport {
    fn send(&self, datagram: &[u8]) -> Result<()> {
        let remote = self.remote.ok_or(TransportError::NoRemote)?;
        self.send_to(datagram, remote)
    }

    fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        let (len, sender) = self.socket.recv_from(buf)?;
        debug!(%sender, size = len, "received datagram");
        Ok((len, sender))
    }
}

impl std::fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransport")
            .field("local", &self.socket.local_addr().ok())
            .field("remote", &self.remote)
            .finish()
    }
}

/// Resolve a `host:port` string to its first socket address.
pub fn resolve(addr: &str) -> Result<SocketAddr> {
    addr.to_socket_addrs()
        .map_err(|err| TransportError::InvalidAddress {
            addr: addr.to_string(),
            reason: err.to_string(),
        })?
        .next()
        .ok_or_else(|| TransportError::InvalidAddress {
            addr: addr.to_string(),
            reason: "no addresses resolved".to_string(),
        })
}
