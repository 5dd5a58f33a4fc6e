use std::collections::VecDeque;
use std::time::{Duration, Instant};

use bytes::{Buf, BytesMut};
use tracing::{debug, trace, warn};

use crate::codec::{decode_frame, read_length, Frame, DELIMITER, HEADER_SIZE};
use crate::reassembly::Reassembler;

/// Receive buffer bound used when none is configured.
pub const MAX_RECEIVE_BUFFER_SIZE: usize = 8 * 1024;

/// Configuration for a [`FrameReceiver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverConfig {
    /// Upper bound on buffered, not-yet-framed bytes.
    pub max_buffer_size: usize,
    /// Evict partial fragment groups older than this. `None` keeps them forever.
    pub fragment_timeout: Option<Duration>,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            max_buffer_size: MAX_RECEIVE_BUFFER_SIZE,
            fragment_timeout: None,
        }
    }
}

/// Turns arbitrary byte chunks into complete frames.
///
/// Chunks need not line up with frame boundaries. Bytes before a delimiter are
/// discarded, a frame split across chunks waits for the rest, fragments are
/// handed to the [`Reassembler`] and only whole frames reach the output queue.
///
/// The buffer never grows past [`ReceiverConfig::max_buffer_size`]: a chunk
/// that would overflow it clears what was buffered first.
#[derive(Debug)]
pub struct FrameReceiver {
    buf: BytesMut,
    queue: VecDeque<Frame>,
    reassembler: Reassembler,
    config: ReceiverConfig,
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReceiver {
    /// Create a receiver with default configuration.
    pub fn new() -> Self {
        Self::with_config(ReceiverConfig::default())
    }

    /// Create a receiver with explicit configuration.
    pub fn with_config(config: ReceiverConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(config.max_buffer_size),
            queue: VecDeque::new(),
            reassembler: Reassembler::with_timeout(config.fragment_timeout),
            config,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    /// Feed one received chunk.
    pub fn push(&mut self, chunk: &[u8]) {
        self.push_at(chunk, Instant::now());
    }

    /// Feed one received chunk, using `now` as the arrival time for fragment expiry.
    pub fn push_at(&mut self, chunk: &[u8], now: Instant) {
        let cap = self.config.max_buffer_size;
        if self.buf.len() + chunk.len() > cap {
            warn!(
                buffered = self.buf.len(),
                incoming = chunk.len(),
                max = cap,
                "receive buffer overflow, discarding buffered bytes"
            );
            self.buf.clear();
        }
        if chunk.len() > cap {
            self.buf.extend_from_slice(&chunk[chunk.len() - cap..]);
        } else {
            self.buf.extend_from_slice(chunk);
        }

        self.extract(now);
        self.reassembler.evict_expired(now);
    }

    /// Pop the oldest complete frame.
    pub fn next_frame(&mut self) -> Option<Frame> {
        self.queue.pop_front()
    }

    /// Drop buffered bytes, queued frames and partial fragment groups.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.queue.clear();
        self.reassembler.clear();
    }

    /// Bytes waiting for a complete frame.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Complete frames waiting in the output queue.
    pub fn queued_frames(&self) -> usize {
        self.queue.len()
    }

    /// Fragment groups still waiting on fragments.
    pub fn pending_groups(&self) -> usize {
        self.reassembler.pending_groups()
    }

    fn extract(&mut self, now: Instant) {
        let cap = self.config.max_buffer_size;
        let mut pos = 0;

        loop {
            let Some(start) = find_delimiter(&self.buf, pos) else {
                // Keep a trailing first delimiter byte; the second may be in the next chunk.
                let keep_from = match self.buf.last() {
                    Some(&b) if b == DELIMITER[0] => self.buf.len() - 1,
                    _ => self.buf.len(),
                };
                pos = pos.max(keep_from);
                break;
            };

            if start > pos {
                trace!(skipped = start - pos, "discarding bytes before delimiter");
            }
            pos = start;

            if self.buf.len() - start < HEADER_SIZE {
                break;
            }

            let total = HEADER_SIZE + usize::from(read_length(&self.buf[start..]));
            if total > cap {
                warn!(
                    declared = total,
                    max = cap,
                    "frame cannot fit receive buffer, resyncing"
                );
                pos = start + 1;
                continue;
            }

            if self.buf.len() - start < total {
                break;
            }

            match decode_frame(&self.buf[start..start + total]) {
                Ok(frame) if frame.is_fragment() => match self.reassembler.push(frame, now) {
                    Ok(Some(whole)) => self.queue.push_back(whole),
                    Ok(None) => {}
                    Err(err) => warn!(error = %err, "fragment group dropped"),
                },
                Ok(frame) => {
                    debug!(
                        packet_id = frame.packet_id,
                        size = frame.payload.len(),
                        "received frame"
                    );
                    self.queue.push_back(frame);
                }
                Err(err) => warn!(error = %err, "failed to decode frame"),
            }
            pos = start + total;
        }

        self.buf.advance(pos);
    }
}

fn find_delimiter(buf: &[u8], from: usize) -> Option<usize> {
    buf.get(from..)?
        .windows(DELIMITER.len())
        .position(|w| w == DELIMITER)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::channel::PacketId;
    use crate::fragment::fragment_frame;

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 % 256) as u8).collect()
    }

    fn drain(rx: &mut FrameReceiver) -> Vec<Frame> {
        std::iter::from_fn(|| rx.next_frame()).collect()
    }

    #[test]
    fn single_frame_is_delivered() {
        let frame = Frame::new(PacketId::SlaveToMaster, Bytes::from_static(b"hi"));
        let mut rx = FrameReceiver::new();
        rx.push(&frame.to_bytes().unwrap());

        assert_eq!(drain(&mut rx), vec![frame]);
        assert_eq!(rx.buffered_len(), 0);
    }

    #[test]
    fn several_frames_in_one_chunk() {
        let a = Frame::new(0u8, Bytes::from_static(b"one"));
        let b = Frame::new(1u8, Bytes::from_static(b"two"));
        let mut wire = a.to_bytes().unwrap().to_vec();
        wire.extend_from_slice(&b.to_bytes().unwrap());

        let mut rx = FrameReceiver::new();
        rx.push(&wire);
        assert_eq!(drain(&mut rx), vec![a, b]);
    }

    #[test]
    fn fragmented_transfer_round_trips() {
        let mtu = 24;
        let original = Frame::new(PacketId::SlaveToBackend, payload(mtu * 3 + 17));
        let mut rx = FrameReceiver::new();
        for fragment in fragment_frame(&original, mtu).unwrap() {
            rx.push(&fragment);
        }

        assert_eq!(drain(&mut rx), vec![original]);
        assert_eq!(rx.pending_groups(), 0);
    }

    #[test]
    fn out_of_order_fragments_round_trip() {
        let original = Frame::new(PacketId::BackendToMaster, payload(40));
        let pieces = fragment_frame(&original, 24).unwrap();
        assert_eq!(pieces.len(), 3);

        let mut rx = FrameReceiver::new();
        rx.push(&pieces[2]);
        rx.push(&pieces[0]);
        assert!(rx.next_frame().is_none());
        rx.push(&pieces[1]);

        assert_eq!(drain(&mut rx), vec![original]);
    }

    #[test]
    fn garbage_before_frame_is_skipped() {
        let frame = Frame::new(2u8, Bytes::from_static(b"payload"));
        let mut wire = vec![0x00, 0x11, 0xAB, 0x22, 0xCD];
        wire.extend_from_slice(&frame.to_bytes().unwrap());

        let mut rx = FrameReceiver::new();
        rx.push(&wire);
        assert_eq!(drain(&mut rx), vec![frame]);
        assert_eq!(rx.buffered_len(), 0);
    }

    #[test]
    fn frame_split_across_chunks() {
        let frame = Frame::new(3u8, Bytes::from_static(b"split me please"));
        let wire = frame.to_bytes().unwrap();

        let mut rx = FrameReceiver::new();
        rx.push(&wire[..1]);
        assert!(rx.next_frame().is_none());
        rx.push(&wire[1..4]);
        assert!(rx.next_frame().is_none());
        rx.push(&wire[4..10]);
        assert!(rx.next_frame().is_none());
        rx.push(&wire[10..]);

        assert_eq!(drain(&mut rx), vec![frame]);
    }

    #[test]
    fn byte_at_a_time_delivery() {
        let frame = Frame::new(1u8, payload(30));
        let mut rx = FrameReceiver::new();
        for byte in frame.to_bytes().unwrap().iter() {
            rx.push(std::slice::from_ref(byte));
        }
        assert_eq!(drain(&mut rx), vec![frame]);
    }

    #[test]
    fn noise_without_delimiter_is_discarded() {
        let mut rx = FrameReceiver::new();
        rx.push(&[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(rx.buffered_len(), 0);

        rx.push(&[0x05, 0xAB]);
        assert_eq!(rx.buffered_len(), 1);
    }

    #[test]
    fn buffer_never_exceeds_cap() {
        let config = ReceiverConfig {
            max_buffer_size: 64,
            fragment_timeout: None,
        };
        let mut rx = FrameReceiver::with_config(config);

        // Header declaring a 50-byte payload, never completed.
        rx.push(&[0xAB, 0xCD, 0x00, 0x00, 0x00, 50, 0x00]);
        rx.push(&[0u8; 40]);
        assert!(rx.buffered_len() <= 64);

        rx.push(&[0u8; 30]);
        assert!(rx.buffered_len() <= 64);

        rx.push(&vec![0xABu8; 500]);
        assert!(rx.buffered_len() <= 64);
    }

    #[test]
    fn overflow_recovers_on_next_frame() {
        let config = ReceiverConfig {
            max_buffer_size: 32,
            fragment_timeout: None,
        };
        let mut rx = FrameReceiver::with_config(config);
        rx.push(&[0xAB, 0xCD, 0x00, 0x00, 0x00, 20, 0x00, 1, 2, 3]);

        let frame = Frame::new(4u8, payload(20));
        rx.push(&frame.to_bytes().unwrap());
        assert_eq!(drain(&mut rx), vec![frame]);
    }

    #[test]
    fn oversized_declaration_resyncs() {
        let config = ReceiverConfig {
            max_buffer_size: 64,
            fragment_timeout: None,
        };
        let mut rx = FrameReceiver::with_config(config);
        let frame = Frame::new(1u8, Bytes::from_static(b"ok"));

        let mut wire = vec![0xAB, 0xCD, 0x00, 0x00, 0x00, 0xFF, 0xFF];
        wire.extend_from_slice(&frame.to_bytes().unwrap());
        rx.push(&wire);

        assert_eq!(drain(&mut rx), vec![frame]);
    }

    #[test]
    fn clear_discards_everything() {
        let original = Frame::new(0u8, payload(60));
        let pieces = fragment_frame(&original, 24).unwrap();

        let mut rx = FrameReceiver::new();
        rx.push(&pieces[0]);
        rx.push(&pieces[1][..3]);
        rx.push(&Frame::new(1u8, Bytes::from_static(b"x")).to_bytes().unwrap());
        rx.clear();

        assert_eq!(rx.buffered_len(), 0);
        assert_eq!(rx.queued_frames(), 0);
        assert_eq!(rx.pending_groups(), 0);
    }

    #[test]
    fn stale_fragments_expire() {
        let config = ReceiverConfig {
            max_buffer_size: MAX_RECEIVE_BUFFER_SIZE,
            fragment_timeout: Some(Duration::from_millis(100)),
        };
        let mut rx = FrameReceiver::with_config(config);
        let original = Frame::new(2u8, payload(40));
        let pieces = fragment_frame(&original, 24).unwrap();

        let start = Instant::now();
        rx.push_at(&pieces[0], start);
        assert_eq!(rx.pending_groups(), 1);

        rx.push_at(&[], start + Duration::from_millis(200));
        assert_eq!(rx.pending_groups(), 0);
    }
}
