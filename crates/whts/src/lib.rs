//! WHTS: a framed, fragmenting protocol for Backend, Master and Slave devices
//! talking over UDP.
//!
//! # Crate Structure
//!
//! - [`transport`]: Datagram transport abstraction (UDP)
//! - [`frame`]: Frame codec, MTU fragmentation and receive-side reassembly
//! - [`message`]: Typed message bodies and the per-channel registry
//! - [`processor`]: Channel packing/parsing and UDP endpoints
//! - [`store`]: Named slave-configuration presets (behind `store` feature)

/// Re-export transport types.
pub mod transport {
    pub use whts_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use whts_frame::*;
}

/// Re-export message types.
pub mod message {
    pub use whts_message::*;
}

/// Re-export processor types.
pub mod processor {
    pub use whts_processor::*;
}

#[cfg(feature = "store")]
pub mod store;

pub use whts_processor::{Endpoint, Packet, ProcessorConfig, ProtocolProcessor};
