//! Slave→Master messages: join, addressing handshake and liveness.

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use whts_frame::PacketId;

use crate::error::Result;
use crate::wire::{channel_messages, BodyReader, MessageBody};

pub const RESET_RESPONSE: u8 = 0x00;
pub const PING_RESPONSE: u8 = 0x01;
pub const ANNOUNCE: u8 = 0x02;
pub const SHORT_ID_CONFIRM: u8 = 0x03;
pub const HEARTBEAT: u8 = 0x04;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub status: u8,
    pub lock_status: u8,
    pub clip_led: u16,
}

impl MessageBody for ResetResponse {
    const MESSAGE_ID: u8 = RESET_RESPONSE;
    const TYPE_NAME: &'static str = "Reset Response";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.status);
        dst.put_u8(self.lock_status);
        dst.put_u16_le(self.clip_led);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            status: r.u8()?,
            lock_status: r.u8()?,
            clip_led: r.u16()?,
        })
    }
}

/// Echo of a [`PingRequest`](crate::master_to_slave::PingRequest).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub sequence_number: u16,
    pub timestamp: u32,
}

impl MessageBody for PingResponse {
    const MESSAGE_ID: u8 = PING_RESPONSE;
    const TYPE_NAME: &'static str = "Ping Response";

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

/// Join request a slave broadcasts until it is assigned a short id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announce {
    pub device_id: u32,
    pub version_major: u8,
    pub version_minor: u8,
    pub version_patch: u16,
}

impl MessageBody for Announce {
    const MESSAGE_ID: u8 = ANNOUNCE;
    const TYPE_NAME: &'static str = "Announce";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u32_le(self.device_id);
        dst.put_u8(self.version_major);
        dst.put_u8(self.version_minor);
        dst.put_u16_le(self.version_patch);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            device_id: r.u32()?,
            version_major: r.u8()?,
            version_minor: r.u8()?,
            version_patch: r.u16()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortIdConfirm {
    pub status: u8,
    pub short_id: u8,
}

impl MessageBody for ShortIdConfirm {
    const MESSAGE_ID: u8 = SHORT_ID_CONFIRM;
    const TYPE_NAME: &'static str = "Short ID Confirm";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.status);
        dst.put_u8(self.short_id);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            status: r.u8()?,
            short_id: r.u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heartbeat {
    /// Battery charge in percent.
    pub battery_level: u8,
}

impl MessageBody for Heartbeat {
    const MESSAGE_ID: u8 = HEARTBEAT;
    const TYPE_NAME: &'static str = "Heartbeat";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.battery_level);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            battery_level: r.u8()?,
        })
    }
}

channel_messages! {
    /// Every message a Slave sends to the Master.
    SlaveToMasterMessage on PacketId::SlaveToMaster => {
        ResetResponse(ResetResponse),
        PingResponse(PingResponse),
        Announce(Announce),
        ShortIdConfirm(ShortIdConfirm),
        Heartbeat(Heartbeat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn announce_layout() {
        let announce = Announce {
            device_id: 0x1234_5678,
            version_major: 2,
            version_minor: 7,
            version_patch: 0xFFFF,
        };
        let body = announce.encode();
        assert_eq!(body.as_ref(), &[0x78, 0x56, 0x34, 0x12, 2, 7, 0xFF, 0xFF]);
        assert_eq!(Announce::decode(&body).unwrap(), announce);
    }

    #[test]
    fn reset_response_round_trips() {
        let msg = ResetResponse {
            status: 1,
            lock_status: 0,
            clip_led: 0x8001,
        };
        let decoded = SlaveToMasterMessage::deserialize(RESET_RESPONSE, &msg.encode()).unwrap();
        assert_eq!(decoded, SlaveToMasterMessage::ResetResponse(msg));
    }

    #[test]
    fn truncated_bodies_fail() {
        assert!(Announce::decode(&[0; 7]).is_err());
        assert!(ShortIdConfirm::decode(&[0]).is_err());
        assert!(Heartbeat::decode(&[]).is_err());
    }

    #[test]
    fn every_id_creates_its_variant() {
        for id in RESET_RESPONSE..=HEARTBEAT {
            let msg = SlaveToMasterMessage::create(id).unwrap();
            assert_eq!(msg.message_id(), id);
        }
        assert!(SlaveToMasterMessage::create(0x05).is_none());
        assert!(SlaveToMasterMessage::create(0xFF).is_none());
    }
}
