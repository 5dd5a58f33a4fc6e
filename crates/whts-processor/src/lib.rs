//! The WHTS protocol processor.
//!
//! This is the layer applications talk to. Pack typed messages for a channel
//! into MTU-sized wire buffers, feed whatever bytes arrive back in, and pull
//! out decoded packets with their addressing metadata.
//!
//! [`Endpoint`] binds a processor to a [`DatagramTransport`](whts_transport::DatagramTransport)
//! for the common send/receive loop.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod packet;
pub mod processor;

pub use config::ProcessorConfig;
pub use endpoint::Endpoint;
pub use error::{ProcessorError, Result};
pub use packet::{
    BackendToMasterPacket, MasterToBackendPacket, MasterToSlavePacket, Packet,
    SlaveToBackendPacket, SlaveToMasterPacket,
};
pub use processor::ProtocolProcessor;
