//! Backend→Master commands.

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use whts_frame::PacketId;

use crate::error::Result;
use crate::wire::{channel_messages, BodyReader, MessageBody};

pub const SLAVE_CONFIG: u8 = 0x00;
pub const MODE_CONFIG: u8 = 0x01;
pub const RESET: u8 = 0x02;
pub const CONTROL: u8 = 0x03;
pub const PING_CONTROL: u8 = 0x04;
pub const DEVICE_LIST_REQUEST: u8 = 0x05;
pub const INTERVAL_CONFIG: u8 = 0x06;
pub const CLEAR_DEVICE_LIST: u8 = 0x07;
pub const SET_UWB_CHANNEL: u8 = 0x08;

/// Test setup for one slave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaveEntry {
    pub id: u32,
    pub conduction_num: u8,
    pub resistance_num: u8,
    pub clip_mode: u8,
    pub clip_status: u16,
}

impl SlaveEntry {
    pub const SIZE: usize = 9;

    pub(crate) fn write(&self, dst: &mut BytesMut) {
        dst.put_u32_le(self.id);
        dst.put_u8(self.conduction_num);
        dst.put_u8(self.resistance_num);
        dst.put_u8(self.clip_mode);
        dst.put_u16_le(self.clip_status);
    }

    pub(crate) fn read(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            id: r.u32()?,
            conduction_num: r.u8()?,
            resistance_num: r.u8()?,
            clip_mode: r.u8()?,
            clip_status: r.u16()?,
        })
    }
}

/// Reset instruction for one slave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetEntry {
    pub id: u32,
    pub lock: u8,
    pub clip_status: u16,
}

impl ResetEntry {
    pub const SIZE: usize = 7;

    pub(crate) fn write(&self, dst: &mut BytesMut) {
        dst.put_u32_le(self.id);
        dst.put_u8(self.lock);
        dst.put_u16_le(self.clip_status);
    }

    pub(crate) fn read(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            id: r.u32()?,
            lock: r.u8()?,
            clip_status: r.u16()?,
        })
    }
}

/// Clamp a record count to the `u8` count field.
pub(crate) fn count_u8(len: usize) -> u8 {
    u8::try_from(len).unwrap_or(u8::MAX)
}

/// Configure which slaves take part in testing.
///
/// `slave_num` is sent as given; decoding reads every whole entry that
/// follows regardless of the count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaveConfig {
    pub slave_num: u8,
    pub slaves: Vec<SlaveEntry>,
}

impl SlaveConfig {
    /// Build a config whose count matches `slaves`.
    pub fn new(slaves: Vec<SlaveEntry>) -> Self {
        Self {
            slave_num: count_u8(slaves.len()),
            slaves,
        }
    }
}

impl MessageBody for SlaveConfig {
    const MESSAGE_ID: u8 = SLAVE_CONFIG;
    const TYPE_NAME: &'static str = "Slave Config";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.slave_num);
        for slave in &self.slaves {
            slave.write(dst);
        }
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            slave_num: r.u8()?,
            slaves: r.records(SlaveEntry::SIZE, SlaveEntry::read)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeConfig {
    /// 0 conduction, 1 resistance, 2 clip.
    pub mode: u8,
}

impl MessageBody for ModeConfig {
    const MESSAGE_ID: u8 = MODE_CONFIG;
    const TYPE_NAME: &'static str = "Mode Config";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.mode);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self { mode: r.u8()? })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reset {
    pub slave_num: u8,
    pub slaves: Vec<ResetEntry>,
}

impl Reset {
    pub fn new(slaves: Vec<ResetEntry>) -> Self {
        Self {
            slave_num: count_u8(slaves.len()),
            slaves,
        }
    }
}

impl MessageBody for Reset {
    const MESSAGE_ID: u8 = RESET;
    const TYPE_NAME: &'static str = "Reset";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.slave_num);
        for slave in &self.slaves {
            slave.write(dst);
        }
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            slave_num: r.u8()?,
            slaves: r.records(ResetEntry::SIZE, ResetEntry::read)?,
        })
    }
}

/// Start or stop the test cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    /// 0 stop, 1 run.
    pub running_status: u8,
}

impl MessageBody for Control {
    const MESSAGE_ID: u8 = CONTROL;
    const TYPE_NAME: &'static str = "Control";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.running_status);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            running_status: r.u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingControl {
    pub ping_mode: u8,
    pub ping_count: u16,
    /// Milliseconds between pings.
    pub interval: u16,
    pub destination_id: u32,
}

impl MessageBody for PingControl {
    const MESSAGE_ID: u8 = PING_CONTROL;
    const TYPE_NAME: &'static str = "Ping Control";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.ping_mode);
        dst.put_u16_le(self.ping_count);
        dst.put_u16_le(self.interval);
        dst.put_u32_le(self.destination_id);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            ping_mode: r.u8()?,
            ping_count: r.u16()?,
            interval: r.u16()?,
            destination_id: r.u32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListRequest {
    pub reserve: u8,
}

impl MessageBody for DeviceListRequest {
    const MESSAGE_ID: u8 = DEVICE_LIST_REQUEST;
    const TYPE_NAME: &'static str = "Device List Request";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.reserve);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self { reserve: r.u8()? })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalConfig {
    pub interval_ms: u8,
}

impl MessageBody for IntervalConfig {
    const MESSAGE_ID: u8 = INTERVAL_CONFIG;
    const TYPE_NAME: &'static str = "Interval Config";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.interval_ms);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            interval_ms: r.u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearDeviceList {
    pub reserve: u8,
}

impl MessageBody for ClearDeviceList {
    const MESSAGE_ID: u8 = CLEAR_DEVICE_LIST;
    const TYPE_NAME: &'static str = "Clear Device List";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.reserve);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self { reserve: r.u8()? })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUwbChannel {
    pub channel: u8,
}

impl MessageBody for SetUwbChannel {
    const MESSAGE_ID: u8 = SET_UWB_CHANNEL;
    const TYPE_NAME: &'static str = "Set UWB Channel";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u8(self.channel);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self { channel: r.u8()? })
    }
}

channel_messages! {
    /// Every command the Backend sends to the Master.
    BackendToMasterMessage on PacketId::BackendToMaster => {
        SlaveConfig(SlaveConfig),
        ModeConfig(ModeConfig),
        Reset(Reset),
        Control(Control),
        PingControl(PingControl),
        DeviceListRequest(DeviceListRequest),
        IntervalConfig(IntervalConfig),
        ClearDeviceList(ClearDeviceList),
        SetUwbChannel(SetUwbChannel),
    }
}
