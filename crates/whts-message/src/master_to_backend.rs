//! Master→Backend responses.

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use whts_frame::PacketId;

use crate::backend_to_master::{count_u8, ResetEntry, SlaveEntry};
use crate::error::Result;
use crate::wire::{channel_messages, BodyReader, MessageBody};

pub const SLAVE_CONFIG_RESPONSE: u8 = 0x00;
pub const MODE_CONFIG_RESPONSE: u8 = 0x01;
pub const RESET_RESPONSE: u8 = 0x02;
pub const CONTROL_RESPONSE: u8 = 0x03;
pub const PING_RESPONSE: u8 = 0x04;
pub const DEVICE_LIST_RESPONSE: u8 = 0x05;
pub const INTERVAL_CONFIG_RESPONSE: u8 = 0x06;
pub const SET_UWB_CHANNEL_RESPONSE: u8 = 0x08;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaveConfigResponse {
    pub status: u8,
    pub slave_num: u8,
    pub slaves: Vec<SlaveEntry>,
}

impl MessageBody for SlaveConfigResponse {
    const MESSAGE_ID: u8 = SLAVE_CONFIG_RESPONSE;
    const TYPE_NAME: &'static str = "Slave Config Response";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.status);
        dst.put_u8(self.slave_num);
        for slave in &self.slaves {
            slave.write(dst);
        }
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            status: r.u8()?,
            slave_num: r.u8()?,
            slaves: r.records(SlaveEntry::SIZE, SlaveEntry::read)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeConfigResponse {
    pub status: u8,
    pub mode: u8,
}

impl MessageBody for ModeConfigResponse {
    const MESSAGE_ID: u8 = MODE_CONFIG_RESPONSE;
    const TYPE_NAME: &'static str = "Mode Config Response";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.status);
        dst.put_u8(self.mode);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            status: r.u8()?,
            mode: r.u8()?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub status: u8,
    pub slave_num: u8,
    pub slaves: Vec<ResetEntry>,
}

impl MessageBody for ResetResponse {
    const MESSAGE_ID: u8 = RESET_RESPONSE;
    const TYPE_NAME: &'static str = "Reset Response";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.status);
        dst.put_u8(self.slave_num);
        for slave in &self.slaves {
            slave.write(dst);
        }
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            status: r.u8()?,
            slave_num: r.u8()?,
            slaves: r.records(ResetEntry::SIZE, ResetEntry::read)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlResponse {
    pub status: u8,
    pub running_status: u8,
}

impl MessageBody for ControlResponse {
    const MESSAGE_ID: u8 = CONTROL_RESPONSE;
    const TYPE_NAME: &'static str = "Control Response";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.status);
        dst.put_u8(self.running_status);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            status: r.u8()?,
            running_status: r.u8()?,
        })
    }
}

/// Outcome of a ping run started by a `PingControl`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub ping_mode: u8,
    pub total_count: u16,
    pub success_count: u16,
    pub destination_id: u32,
}

impl MessageBody for PingResponse {
    const MESSAGE_ID: u8 = PING_RESPONSE;
    const TYPE_NAME: &'static str = "Ping Response";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.ping_mode);
        dst.put_u16_le(self.total_count);
        dst.put_u16_le(self.success_count);
        dst.put_u32_le(self.destination_id);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            ping_mode: r.u8()?,
            total_count: r.u16()?,
            success_count: r.u16()?,
            destination_id: r.u32()?,
        })
    }
}

/// One slave known to the Master.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub device_id: u32,
    pub short_id: u8,
    pub online: u8,
    pub version_major: u8,
    pub version_minor: u8,
    pub version_patch: u16,
    pub battery_level: u8,
}

impl DeviceInfo {
    pub const SIZE: usize = 11;

    fn write(&self, dst: &mut BytesMut) {
        dst.put_u32_le(self.device_id);
        dst.put_u8(self.short_id);
        dst.put_u8(self.online);
        dst.put_u8(self.version_major);
        dst.put_u8(self.version_minor);
        dst.put_u16_le(self.version_patch);
        dst.put_u8(self.battery_level);
    }

    fn read(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            device_id: r.u32()?,
            short_id: r.u8()?,
            online: r.u8()?,
            version_major: r.u8()?,
            version_minor: r.u8()?,
            version_patch: r.u16()?,
            battery_level: r.u8()?,
        })
    }

    /// `major.minor.patch`.
    pub fn version(&self) -> String {
        format!(
            "{}.{}.{}",
            self.version_major, self.version_minor, self.version_patch
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListResponse {
    pub device_count: u8,
    pub devices: Vec<DeviceInfo>,
}

impl DeviceListResponse {
    pub fn new(devices: Vec<DeviceInfo>) -> Self {
        Self {
            device_count: count_u8(devices.len()),
            devices,
        }
    }
}

impl MessageBody for DeviceListResponse {
    const MESSAGE_ID: u8 = DEVICE_LIST_RESPONSE;
    const TYPE_NAME: &'static str = "Device List Response";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.device_count);
        for device in &self.devices {
            device.write(dst);
        }
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            device_count: r.u8()?,
            devices: r.records(DeviceInfo::SIZE, DeviceInfo::read)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalConfigResponse {
    pub status: u8,
    pub interval_ms: u8,
}

impl MessageBody for IntervalConfigResponse {
    const MESSAGE_ID: u8 = INTERVAL_CONFIG_RESPONSE;
    const TYPE_NAME: &'static str = "Interval Config Response";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.status);
        dst.put_u8(self.interval_ms);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            status: r.u8()?,
            interval_ms: r.u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUwbChannelResponse {
    pub status: u8,
    pub channel: u8,
}

impl MessageBody for SetUwbChannelResponse {
    const MESSAGE_ID: u8 = SET_UWB_CHANNEL_RESPONSE;
    const TYPE_NAME: &'static str = "Set UWB Channel Response";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.status);
        dst.put_u8(self.channel);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            status: r.u8()?,
            channel: r.u8()?,
        })
    }
}

channel_messages! {
    /// Every response the Master sends to the Backend.
    MasterToBackendMessage on PacketId::MasterToBackend => {
        SlaveConfigResponse(SlaveConfigResponse),
        ModeConfigResponse(ModeConfigResponse),
        ResetResponse(ResetResponse),
        ControlResponse(ControlResponse),
        PingResponse(PingResponse),
        DeviceListResponse(DeviceListResponse),
        IntervalConfigResponse(IntervalConfigResponse),
        SetUwbChannelResponse(SetUwbChannelResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: u32) -> DeviceInfo {
        DeviceInfo {
            device_id: id,
            short_id: id as u8,
            online: 1,
            version_major: 1,
            version_minor: 2,
            version_patch: 300,
            battery_level: 87,
        }
    }

    #[test]
    fn device_list_layout() {
        let msg = DeviceListResponse::new(vec![device(0xAABB_CCDD)]);
        let body = msg.encode();
        assert_eq!(body.len(), 1 + DeviceInfo::SIZE);
        assert_eq!(
            body.as_ref(),
            &[1, 0xDD, 0xCC, 0xBB, 0xAA, 0xDD, 1, 1, 2, 0x2C, 0x01, 87]
        );
        assert_eq!(DeviceListResponse::decode(&body).unwrap(), msg);
        assert_eq!(msg.devices[0].version(), "1.2.300");
    }

    #[test]
    fn device_list_ignores_partial_record() {
        let mut body = DeviceListResponse::new(vec![device(1), device(2)])
            .encode()
            .to_vec();
        body.truncate(body.len() - 1);
        let msg = DeviceListResponse::decode(&body).unwrap();
        assert_eq!(msg.device_count, 2);
        assert_eq!(msg.devices, vec![device(1)]);
    }

    #[test]
    fn slave_config_response_round_trips() {
        let msg = SlaveConfigResponse {
            status: 0,
            slave_num: 1,
            slaves: vec![SlaveEntry {
                id: 7,
                conduction_num: 1,
                resistance_num: 2,
                clip_mode: 3,
                clip_status: 4,
            }],
        };
        let body = msg.encode();
        assert_eq!(body.len(), 2 + SlaveEntry::SIZE);
        assert_eq!(SlaveConfigResponse::decode(&body).unwrap(), msg);
    }

    #[test]
    fn ping_response_extremes() {
        let msg = PingResponse {
            ping_mode: u8::MAX,
            total_count: u16::MAX,
            success_count: 0,
            destination_id: u32::MAX,
        };
        assert_eq!(PingResponse::decode(&msg.encode()).unwrap(), msg);
        assert!(PingResponse::decode(&msg.encode()[..8]).is_err());
    }

    #[test]
    fn id_seven_is_unassigned() {
        assert!(MasterToBackendMessage::create(0x07).is_none());
        assert!(MasterToBackendMessage::create(0xFF).is_none());
        assert!(matches!(
            MasterToBackendMessage::create(SET_UWB_CHANNEL_RESPONSE),
            Some(MasterToBackendMessage::SetUwbChannelResponse(_))
        ));
    }
}
