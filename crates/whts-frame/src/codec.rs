use bytes::{BufMut, Bytes, BytesMut};

use crate::channel::PacketId;
use crate::error::{FrameError, Result};

/// Frame header: delimiter (2) + packet id (1) + sequence (1) + more flag (1) + length (2).
pub const HEADER_SIZE: usize = 7;

/// Delimiter bytes every frame and every fragment starts with.
pub const DELIMITER: [u8; 2] = [0xAB, 0xCD];

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// Offset of the little-endian length field within the header.
const LENGTH_OFFSET: usize = 5;

/// One wire unit: a complete message or a single fragment of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw channel id. Kept as a byte so frames on unknown channels can still be framed.
    pub packet_id: u8,
    /// Zero-based index of this fragment within its transfer.
    pub fragments_sequence: u8,
    /// Zero on the last fragment, nonzero when more follow.
    pub more_fragments: u8,
    /// Payload carried by this frame (this fragment only, not the whole transfer).
    pub payload: Bytes,
}

impl Frame {
    /// Create a complete, unfragmented frame.
    pub fn new(packet_id: impl Into<u8>, payload: impl Into<Bytes>) -> Self {
        Self {
            packet_id: packet_id.into(),
            fragments_sequence: 0,
            more_fragments: 0,
            payload: payload.into(),
        }
    }

    /// Create one fragment of a larger transfer.
    pub fn fragment(
        packet_id: impl Into<u8>,
        sequence: u8,
        more: bool,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            packet_id: packet_id.into(),
            fragments_sequence: sequence,
            more_fragments: u8::from(more),
            payload: payload.into(),
        }
    }

    /// The channel this frame belongs to, if the id is known.
    pub fn channel(&self) -> Option<PacketId> {
        PacketId::from_u8(self.packet_id)
    }

    /// True when more fragments of the same transfer follow.
    pub fn has_more(&self) -> bool {
        self.more_fragments != 0
    }

    /// True when this frame is part of a multi-fragment transfer.
    pub fn is_fragment(&self) -> bool {
        self.fragments_sequence > 0 || self.has_more()
    }

    /// Value of the length field for this frame.
    pub fn packet_length(&self) -> usize {
        self.payload.len()
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Serialize into a standalone buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        encode_frame(self, &mut dst)?;
        Ok(dst.freeze())
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────┬──────────┬──────────┬──────────┬──────────┬──────────────┐
/// │ Delimiter  │ PacketId │ Sequence │ MoreFlag │ Length   │ Payload      │
/// │ 0xAB 0xCD  │ (1B)     │ (1B)     │ (1B)     │ (2B LE)  │ (Length B)   │
/// └────────────┴──────────┴──────────┴──────────┴──────────┴──────────────┘
/// ```
///
/// There is no checksum; integrity is left to the transport and the caller.
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) -> Result<()> {
    let len = frame.payload.len();
    if len > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: len,
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(HEADER_SIZE + len);
    dst.put_slice(&DELIMITER);
    dst.put_u8(frame.packet_id);
    dst.put_u8(frame.fragments_sequence);
    dst.put_u8(frame.more_fragments);
    dst.put_u16_le(len as u16);
    dst.put_slice(&frame.payload);
    Ok(())
}

/// Decode one frame from the start of `src`.
///
/// Bytes past the declared length are ignored; `src` itself is never modified.
pub fn decode_frame(src: &[u8]) -> Result<Frame> {
    if src.len() < HEADER_SIZE {
        return Err(FrameError::Truncated {
            needed: HEADER_SIZE,
            available: src.len(),
        });
    }

    if src[..2] != DELIMITER {
        return Err(FrameError::InvalidDelimiter {
            found: [src[0], src[1]],
        });
    }

    let payload_len = usize::from(read_length(src));
    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        return Err(FrameError::Truncated {
            needed: total,
            available: src.len(),
        });
    }

    Ok(Frame {
        packet_id: src[2],
        fragments_sequence: src[3],
        more_fragments: src[4],
        payload: Bytes::copy_from_slice(&src[HEADER_SIZE..total]),
    })
}

/// Read the declared payload length from a buffer holding at least a full header.
pub(crate) fn read_length(header: &[u8]) -> u16 {
    u16::from_le_bytes([header[LENGTH_OFFSET], header[LENGTH_OFFSET + 1]])
}
