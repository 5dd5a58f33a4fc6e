//! Datagram transport abstraction for WHTS.
//!
//! The protocol core consumes raw byte chunks and produces raw wire buffers; it
//! never touches a socket. This crate is the thin layer that moves those
//! buffers over UDP:
//! - [`DatagramTransport`] is the seam the endpoint layer is generic over
//! - [`UdpTransport`] is the standard implementation
//!
//! This is the lowest layer of the workspace.

pub mod error;
pub mod traits;
pub mod udp;

pub use error::{Result, TransportError};
pub use traits::DatagramTransport;
pub use udp::{resolve, UdpConfig, UdpTransport, MAX_DATAGRAM_SIZE};
