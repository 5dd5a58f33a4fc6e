//! Framing, fragmentation and reassembly for the WHTS protocol.
//!
//! Every transfer on the wire is one or more frames:
//! - A 2-byte delimiter (`0xAB 0xCD`) for resynchronization
//! - A packet id naming the channel, a fragment sequence number and a
//!   more-fragments flag
//! - A 2-byte little-endian payload length
//!
//! Frames larger than the MTU are split by [`Fragmenter`]. On the receive side
//! [`FrameReceiver`] accepts arbitrary byte chunks and yields whole frames,
//! recombining fragments through a [`Reassembler`].

pub mod channel;
pub mod codec;
pub mod error;
pub mod fragment;
pub mod reassembly;
pub mod receiver;
#[cfg(feature = "async")]
pub mod udp_codec;

pub use channel::{
    channel_name, PacketId, BACKEND_TO_MASTER, MASTER_TO_BACKEND, MASTER_TO_SLAVE,
    SLAVE_TO_BACKEND, SLAVE_TO_MASTER,
};
pub use codec::{decode_frame, encode_frame, Frame, DELIMITER, HEADER_SIZE, MAX_PAYLOAD};
pub use error::{FrameError, Result};
pub use fragment::{fragment_frame, Fragmenter, DEFAULT_MTU, MAX_FRAGMENTS, MIN_MTU};
pub use reassembly::{FragmentGroup, FragmentKey, GroupState, Reassembler};
pub use receiver::{FrameReceiver, ReceiverConfig, MAX_RECEIVE_BUFFER_SIZE};
#[cfg(feature = "async")]
pub use udp_codec::WhtsCodec;
