use std::net::SocketAddr;

/// Errors that can occur in datagram transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind to the specified local address.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    /// The address could not be parsed or resolved.
    #[error("invalid address {addr}: {reason}")]
    InvalidAddress { addr: String, reason: String },

    /// A send was attempted before a remote address was configured.
    #[error("no remote address configured")]
    NoRemote,

    /// The datagram was only partially written.
    #[error("short send to {remote} ({sent} of {len} bytes)")]
    ShortSend {
        remote: SocketAddr,
        sent: usize,
        len: usize,
    },

    /// An I/O error occurred on the socket.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// True when the error is a read/write timeout rather than a hard failure.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            TransportError::Io(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                )
        )
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
