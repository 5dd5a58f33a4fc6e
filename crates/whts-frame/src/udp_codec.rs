//! `tokio_util` codec for running the receive pipeline under an async runtime.
//!
//! Pair it with `tokio_util::udp::UdpFramed`: each datagram is fed through a
//! [`FrameReceiver`], and complete (reassembled) frames are yielded one by one.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{encode_frame, Frame};
use crate::error::FrameError;
use crate::receiver::{FrameReceiver, ReceiverConfig};

/// Async adapter around [`FrameReceiver`].
///
/// Decoding consumes the whole input buffer on every call. Encoding writes one
/// frame as-is; split large frames with a [`Fragmenter`](crate::Fragmenter)
/// first and send each piece as its own item.
#[derive(Debug, Default)]
pub struct WhtsCodec {
    receiver: FrameReceiver,
}

impl WhtsCodec {
    /// Create a codec with default receive configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with explicit receive configuration.
    pub fn with_config(config: ReceiverConfig) -> Self {
        Self {
            receiver: FrameReceiver::with_config(config),
        }
    }

    /// The underlying receiver.
    pub fn receiver(&self) -> &FrameReceiver {
        &self.receiver
    }
}

impl Decoder for WhtsCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        if !src.is_empty() {
            let chunk = src.split();
            self.receiver.push(&chunk);
        }
        Ok(self.receiver.next_frame())
    }
}

impl Encoder<Frame> for WhtsCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_frame(&frame, dst)
    }
}
