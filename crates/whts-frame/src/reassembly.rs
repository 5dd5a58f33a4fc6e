//! Receive-side recombination of fragmented transfers.
//!
//! Fragments are grouped by [`FragmentKey`]. A group moves through
//! [`GroupState::Accumulating`] (total unknown), [`GroupState::Sized`] (the
//! last fragment has been seen, so the total is known) and
//! [`GroupState::Complete`] (every sequence number below the total is present).
//! Completion is a set-membership check, so fragments may arrive in any order.
//! A completed group is turned into one unfragmented frame and erased.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};

use crate::codec::{decode_frame, encode_frame, Frame, HEADER_SIZE, MAX_PAYLOAD};
use crate::error::{FrameError, Result};

/// Identifies the fragment group a fragment belongs to.
///
/// Only the first fragment of a transfer carries the sender's id, so later
/// fragments can only be attributed by channel. Two transfers in flight on the
/// same channel therefore share one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentKey(u8);

impl FragmentKey {
    /// Group key for a fragment.
    pub fn for_frame(frame: &Frame) -> Self {
        Self(frame.packet_id)
    }

    /// Packet id this key groups by.
    pub fn packet_id(self) -> u8 {
        self.0
    }
}

/// Progress of one fragment group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    /// Fragments received, last fragment not yet seen.
    Accumulating { received: usize },
    /// Last fragment seen; waiting on the rest.
    Sized { received: usize, total: usize },
    /// All fragments `0..total` present.
    Complete { total: usize },
}

/// Fragments collected so far for one transfer.
#[derive(Debug)]
pub struct FragmentGroup {
    packet_id: u8,
    fragments: BTreeMap<u8, Bytes>,
    total: Option<usize>,
    first_seen: Instant,
}

impl FragmentGroup {
    fn new(packet_id: u8, first_seen: Instant) -> Self {
        Self {
            packet_id,
            fragments: BTreeMap::new(),
            total: None,
            first_seen,
        }
    }

    fn insert(&mut self, frame: Frame) {
        if !frame.has_more() {
            self.total = Some(usize::from(frame.fragments_sequence) + 1);
        }
        self.fragments
            .insert(frame.fragments_sequence, frame.payload);
    }

    /// Current state of the group.
    pub fn state(&self) -> GroupState {
        match self.total {
            None => GroupState::Accumulating {
                received: self.fragments.len(),
            },
            Some(total) => {
                let present = (0..total).all(|seq| self.fragments.contains_key(&(seq as u8)));
                if present {
                    GroupState::Complete { total }
                } else {
                    GroupState::Sized {
                        received: self.fragments.len(),
                        total,
                    }
                }
            }
        }
    }

    /// Packet id of the grouped fragments.
    pub fn packet_id(&self) -> u8 {
        self.packet_id
    }

    /// When the first fragment of this group arrived.
    pub fn first_seen(&self) -> Instant {
        self.first_seen
    }

    /// Concatenate fragments `0..total` in sequence order.
    fn assemble(&self, total: usize) -> Vec<u8> {
        let mut payload = Vec::new();
        for (_, chunk) in self.fragments.range(..=(total - 1) as u8) {
            payload.extend_from_slice(chunk);
        }
        payload
    }
}

/// Collects fragments and emits completed frames.
#[derive(Debug, Default)]
pub struct Reassembler {
    groups: HashMap<FragmentKey, FragmentGroup>,
    timeout: Option<Duration>,
}

impl Reassembler {
    /// Create a reassembler that keeps partial groups until they complete.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reassembler that evicts groups older than `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self {
            groups: HashMap::new(),
            timeout,
        }
    }

    /// Store one fragment. Returns the rebuilt frame once its group is complete.
    ///
    /// On error the offending group has already been discarded.
    pub fn push(&mut self, fragment: Frame, now: Instant) -> Result<Option<Frame>> {
        let key = FragmentKey::for_frame(&fragment);
        let group = self
            .groups
            .entry(key)
            .or_insert_with(|| FragmentGroup::new(fragment.packet_id, now));

        debug!(
            packet_id = fragment.packet_id,
            sequence = fragment.fragments_sequence,
            more = fragment.has_more(),
            size = fragment.payload.len(),
            "storing fragment"
        );
        group.insert(fragment);

        let GroupState::Complete { total } = group.state() else {
            return Ok(None);
        };

        let packet_id = group.packet_id;
        let payload = group.assemble(total);
        self.groups.remove(&key);

        if payload.len() > MAX_PAYLOAD {
            warn!(
                packet_id,
                size = payload.len(),
                "dropping reassembled transfer larger than one frame"
            );
            return Err(FrameError::ReassembledTooLarge {
                packet_id,
                size: payload.len(),
            });
        }

        let mut wire = BytesMut::with_capacity(HEADER_SIZE + payload.len());
        encode_frame(&Frame::new(packet_id, payload), &mut wire)?;
        let frame = decode_frame(&wire)?;

        debug!(
            packet_id,
            fragments = total,
            size = frame.payload.len(),
            "reassembled transfer"
        );
        Ok(Some(frame))
    }

    /// Drop groups whose first fragment is older than the configured timeout.
    ///
    /// Returns the number of groups removed. Without a timeout this does nothing.
    pub fn evict_expired(&mut self, now: Instant) -> usize {
        let Some(timeout) = self.timeout else {
            return 0;
        };

        let before = self.groups.len();
        self.groups.retain(|key, group| {
            let keep = now.saturating_duration_since(group.first_seen) < timeout;
            if !keep {
                warn!(
                    packet_id = key.packet_id(),
                    state = ?group.state(),
                    "evicting stale fragment group"
                );
            }
            keep
        });
        before - self.groups.len()
    }

    /// Inspect the group for a key.
    pub fn group(&self, key: FragmentKey) -> Option<&FragmentGroup> {
        self.groups.get(&key)
    }

    /// Number of groups still waiting on fragments.
    pub fn pending_groups(&self) -> usize {
        self.groups.len()
    }

    /// Configured eviction timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Discard every partial group.
    pub fn clear(&mut self) {
        self.groups.clear();
    }
}
