//! MTU-driven splitting of oversized frames.
//!
//! A frame whose wire size fits the MTU is sent as-is. Anything larger is cut
//! into `MTU - HEADER_SIZE` byte payload chunks, each wrapped in its own header
//! carrying the original packet id, a zero-based sequence number and a
//! more-fragments flag that is cleared only on the last chunk.

use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::codec::{encode_frame, Frame, HEADER_SIZE};
use crate::error::{FrameError, Result};

/// MTU used when none is configured.
pub const DEFAULT_MTU: usize = 100;

/// Smallest MTU that still carries one payload byte per fragment.
pub const MIN_MTU: usize = HEADER_SIZE + 1;

/// The sequence byte addresses at most this many fragments per transfer.
pub const MAX_FRAGMENTS: usize = 256;

/// Splits frames into MTU-bounded wire buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragmenter {
    mtu: usize,
}

impl Default for Fragmenter {
    fn default() -> Self {
        Self { mtu: DEFAULT_MTU }
    }
}

impl Fragmenter {
    /// Create a fragmenter for an explicit MTU.
    pub fn new(mtu: usize) -> Result<Self> {
        validate_mtu(mtu)?;
        Ok(Self { mtu })
    }

    /// Current MTU.
    pub fn mtu(&self) -> usize {
        self.mtu
    }

    /// Change the MTU for subsequent splits.
    pub fn set_mtu(&mut self, mtu: usize) -> Result<()> {
        validate_mtu(mtu)?;
        self.mtu = mtu;
        Ok(())
    }

    /// Payload bytes each fragment can carry.
    pub fn fragment_capacity(&self) -> usize {
        self.mtu - HEADER_SIZE
    }

    /// Serialize `frame` into one or more wire buffers, in send order.
    ///
    /// The frame's own sequence and flag fields are ignored when splitting;
    /// fragments are numbered from zero.
    pub fn split(&self, frame: &Frame) -> Result<Vec<Bytes>> {
        let whole = frame.to_bytes()?;
        if whole.len() <= self.mtu {
            return Ok(vec![whole]);
        }

        let capacity = self.fragment_capacity();
        let payload = &frame.payload;
        let count = payload.len().div_ceil(capacity);
        if count > MAX_FRAGMENTS {
            return Err(FrameError::TooManyFragments {
                fragments: count,
                max: MAX_FRAGMENTS,
            });
        }

        debug!(
            packet_id = frame.packet_id,
            size = whole.len(),
            mtu = self.mtu,
            fragments = count,
            "splitting frame"
        );

        let mut out = Vec::with_capacity(count);
        for (index, chunk) in payload.chunks(capacity).enumerate() {
            let fragment = Frame::fragment(
                frame.packet_id,
                index as u8,
                index + 1 < count,
                payload.slice_ref(chunk),
            );
            let mut dst = BytesMut::with_capacity(fragment.wire_size());
            encode_frame(&fragment, &mut dst)?;
            out.push(dst.freeze());
        }
        Ok(out)
    }
}

/// Split `frame` for the given MTU. See [`Fragmenter::split`].
pub fn fragment_frame(frame: &Frame, mtu: usize) -> Result<Vec<Bytes>> {
    Fragmenter::new(mtu)?.split(frame)
}

fn validate_mtu(mtu: usize) -> Result<()> {
    if mtu < MIN_MTU {
        return Err(FrameError::InvalidMtu { mtu, min: MIN_MTU });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::PacketId;
    use crate::codec::decode_frame;

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn small_frame_is_not_split() {
        let frame = Frame::new(PacketId::MasterToSlave, payload(10));
        let out = fragment_frame(&frame, DEFAULT_MTU).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(decode_frame(&out[0]).unwrap(), frame);
    }

    #[test]
    fn frame_exactly_at_mtu_is_not_split() {
        let frame = Frame::new(PacketId::MasterToSlave, payload(DEFAULT_MTU - HEADER_SIZE));
        let out = fragment_frame(&frame, DEFAULT_MTU).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len(), DEFAULT_MTU);
    }

    #[test]
    fn forty_byte_frame_at_mtu_24_makes_two_fragments() {
        let frame = Frame::new(PacketId::BackendToMaster, payload(33));
        assert_eq!(frame.wire_size(), 40);

        let out = fragment_frame(&frame, 24).unwrap();
        assert_eq!(out.len(), 2);

        let first = decode_frame(&out[0]).unwrap();
        let second = decode_frame(&out[1]).unwrap();
        assert_eq!(first.packet_id, PacketId::BackendToMaster.as_u8());
        assert_eq!(second.packet_id, PacketId::BackendToMaster.as_u8());
        assert_eq!((first.fragments_sequence, first.more_fragments), (0, 1));
        assert_eq!((second.fragments_sequence, second.more_fragments), (1, 0));
        assert_eq!(first.payload.len(), 17);
        assert_eq!(first.payload.len() + second.payload.len(), 33);
        assert!(out.iter().all(|b| b.len() <= 24));
    }

    #[test]
    fn fragment_payloads_concatenate_to_original() {
        let original = payload(24 * 3 + 17);
        let frame = Frame::new(PacketId::SlaveToBackend, original.clone());
        let out = fragment_frame(&frame, 24).unwrap();

        let rebuilt: Vec<u8> = out
            .iter()
            .flat_map(|b| decode_frame(b).unwrap().payload.to_vec())
            .collect();
        assert_eq!(rebuilt, original);
        assert_eq!(out.len(), (24 * 3 + 17usize).div_ceil(17));
    }

    #[test]
    fn too_many_fragments_is_rejected() {
        let frame = Frame::new(0u8, payload(MAX_FRAGMENTS + 1));
        let err = fragment_frame(&frame, MIN_MTU).unwrap_err();
        assert!(matches!(err, FrameError::TooManyFragments { fragments: 257, .. }));
    }

    #[test]
    fn exactly_max_fragments_is_accepted() {
        let frame = Frame::new(0u8, payload(MAX_FRAGMENTS));
        let out = fragment_frame(&frame, MIN_MTU).unwrap();
        assert_eq!(out.len(), MAX_FRAGMENTS);
        let last = decode_frame(out.last().unwrap()).unwrap();
        assert_eq!(last.fragments_sequence, 255);
        assert!(!last.has_more());
    }

    #[test]
    fn mtu_below_header_is_rejected() {
        assert!(matches!(
            Fragmenter::new(HEADER_SIZE),
            Err(FrameError::InvalidMtu { .. })
        ));
        let mut f = Fragmenter::default();
        assert!(f.set_mtu(3).is_err());
        assert_eq!(f.mtu(), DEFAULT_MTU);
        f.set_mtu(64).unwrap();
        assert_eq!(f.fragment_capacity(), 57);
    }
}
