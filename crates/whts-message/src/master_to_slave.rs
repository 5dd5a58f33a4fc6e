//! Master→Slave messages: TDMA scheduling and slave housekeeping.

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use whts_frame::PacketId;

use crate::error::Result;
use crate::wire::{channel_messages, BodyReader, MessageBody};

pub const SYNC: u8 = 0x00;
pub const PING_REQUEST: u8 = 0x01;
pub const SHORT_ID_ASSIGN: u8 = 0x02;

/// Per-slave slot assignment carried in a [`TdmaSync`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSlot {
    pub id: u32,
    pub time_slot: u8,
    /// 1 asks the slave to reset.
    pub reset: u8,
    /// Number of conduction, resistance or clip tests, depending on the mode.
    pub test_count: u8,
}

impl SyncSlot {
    pub const SIZE: usize = 7;
}

/// TDMA sync broadcast: run mode, timing and every slave's slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TdmaSync {
    /// 0 conduction, 1 resistance, 2 clip.
    pub mode: u8,
    /// Sampling interval in milliseconds.
    pub interval: u8,
    /// Current time in microseconds.
    pub current_time: u64,
    /// Start time in microseconds.
    pub start_time: u64,
    pub slots: Vec<SyncSlot>,
}

impl MessageBody for TdmaSync {
    const MESSAGE_ID: u8 = SYNC;
    const TYPE_NAME: &'static str = "TDMA Sync";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.mode);
        dst.put_u8(self.interval);
        dst.put_u64_le(self.current_time);
        dst.put_u64_le(self.start_time);
        for slot in &self.slots {
            dst.put_u32_le(slot.id);
            dst.put_u8(slot.time_slot);
            dst.put_u8(slot.reset);
            dst.put_u8(slot.test_count);
        }
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            mode: r.u8()?,
            interval: r.u8()?,
            current_time: r.u64()?,
            start_time: r.u64()?,
            slots: r.records(SyncSlot::SIZE, |r| {
                Ok(SyncSlot {
                    id: r.u32()?,
                    time_slot: r.u8()?,
                    reset: r.u8()?,
                    test_count: r.u8()?,
                })
            })?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingRequest {
    pub sequence_number: u16,
    pub timestamp: u32,
}

impl MessageBody for PingRequest {
    const MESSAGE_ID: u8 = PING_REQUEST;
    const TYPE_NAME: &'static str = "Ping Request";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u16_le(self.sequence_number);
        dst.put_u32_le(self.timestamp);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            sequence_number: r.u16()?,
            timestamp: r.u32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortIdAssign {
    pub short_id: u8,
}

impl MessageBody for ShortIdAssign {
    const MESSAGE_ID: u8 = SHORT_ID_ASSIGN;
    const TYPE_NAME: &'static str = "Short ID Assign";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.short_id);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            short_id: r.u8()?,
        })
    }
}

channel_messages! {
    /// Every message the Master sends to a Slave.
    MasterToSlaveMessage on PacketId::MasterToSlave => {
        Sync(TdmaSync),
        PingRequest(PingRequest),
        ShortIdAssign(ShortIdAssign),
    }
}
