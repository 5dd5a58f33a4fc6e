//! Channel payloads: addressing prefix plus a typed message.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::Serialize;
use whts_frame::{Frame, PacketId};
use whts_message::{
    BackendToMasterMessage, DeviceStatus, Message, MasterToBackendMessage, MasterToSlaveMessage,
    MessageError, SlaveToBackendMessage, SlaveToMasterMessage,
};

use crate::error::{ProcessorError, Result};

/// Split `payload` into the channel prefix and the message body.
fn split_prefix(channel: PacketId, payload: &[u8]) -> Result<(&[u8], &[u8])> {
    let needed = channel.prefix_len();
    if payload.len() < needed {
        return Err(ProcessorError::PrefixTooShort {
            channel,
            needed,
            available: payload.len(),
        });
    }
    Ok(payload.split_at(needed))
}

/// Master→Slave payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterToSlavePacket {
    pub destination_id: u32,
    pub message: MasterToSlaveMessage,
}

impl MasterToSlavePacket {
    pub fn encode(&self) -> Bytes {
        let body = self.message.serialize();
        let mut dst = BytesMut::with_capacity(PacketId::MasterToSlave.prefix_len() + body.len());
        dst.put_u8(self.message.message_id());
        dst.put_u32_le(self.destination_id);
        dst.put_slice(&body);
        dst.freeze()
    }

    pub fn parse(payload: &[u8]) -> Result<Self> {
        let (mut prefix, body) = split_prefix(PacketId::MasterToSlave, payload)?;
        let message_id = prefix.get_u8();
        let destination_id = prefix.get_u32_le();
        Ok(Self {
            destination_id,
            message: MasterToSlaveMessage::deserialize(message_id, body)?,
        })
    }
}

/// Slave→Master payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaveToMasterPacket {
    pub slave_id: u32,
    pub message: SlaveToMasterMessage,
}

impl SlaveToMasterPacket {
    pub fn encode(&self) -> Bytes {
        let body = self.message.serialize();
        let mut dst = BytesMut::with_capacity(PacketId::SlaveToMaster.prefix_len() + body.len());
        dst.put_u8(self.message.message_id());
        dst.put_u32_le(self.slave_id);
        dst.put_slice(&body);
        dst.freeze()
    }

    pub fn parse(payload: &[u8]) -> Result<Self> {
        let (mut prefix, body) = split_prefix(PacketId::SlaveToMaster, payload)?;
        let message_id = prefix.get_u8();
        let slave_id = prefix.get_u32_le();
        Ok(Self {
            slave_id,
            message: SlaveToMasterMessage::deserialize(message_id, body)?,
        })
    }
}

/// Slave→Backend payload. Carries the reporting slave's device status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaveToBackendPacket {
    pub slave_id: u32,
    pub device_status: DeviceStatus,
    pub message: SlaveToBackendMessage,
}

impl SlaveToBackendPacket {
    pub fn encode(&self) -> Bytes {
        let body = self.message.serialize();
        let mut dst = BytesMut::with_capacity(PacketId::SlaveToBackend.prefix_len() + body.len());
        dst.put_u8(self.message.message_id());
        dst.put_u32_le(self.slave_id);
        dst.put_u16_le(self.device_status.to_u16());
        dst.put_slice(&body);
        dst.freeze()
    }

    pub fn parse(payload: &[u8]) -> Result<Self> {
        let (mut prefix, body) = split_prefix(PacketId::SlaveToBackend, payload)?;
        let message_id = prefix.get_u8();
        let slave_id = prefix.get_u32_le();
        let device_status = DeviceStatus::from_u16(prefix.get_u16_le());
        Ok(Self {
            slave_id,
            device_status,
            message: SlaveToBackendMessage::deserialize(message_id, body)?,
        })
    }
}

/// Backend→Master payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendToMasterPacket {
    pub message: BackendToMasterMessage,
}

impl BackendToMasterPacket {
    pub fn encode(&self) -> Bytes {
        let body = self.message.serialize();
        let mut dst = BytesMut::with_capacity(1 + body.len());
        dst.put_u8(self.message.message_id());
        dst.put_slice(&body);
        dst.freeze()
    }

    pub fn parse(payload: &[u8]) -> Result<Self> {
        let (prefix, body) = split_prefix(PacketId::BackendToMaster, payload)?;
        Ok(Self {
            message: BackendToMasterMessage::deserialize(prefix[0], body)?,
        })
    }
}

/// Master→Backend payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MasterToBackendPacket {
    pub message: MasterToBackendMessage,
}

impl MasterToBackendPacket {
    pub fn encode(&self) -> Bytes {
        let body = self.message.serialize();
        let mut dst = BytesMut::with_capacity(1 + body.len());
        dst.put_u8(self.message.message_id());
        dst.put_slice(&body);
        dst.freeze()
    }

    pub fn parse(payload: &[u8]) -> Result<Self> {
        let (prefix, body) = split_prefix(PacketId::MasterToBackend, payload)?;
        Ok(Self {
            message: MasterToBackendMessage::deserialize(prefix[0], body)?,
        })
    }
}

/// A decoded packet on any channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "channel")]
pub enum Packet {
    MasterToSlave(MasterToSlavePacket),
    SlaveToMaster(SlaveToMasterPacket),
    BackendToMaster(BackendToMasterPacket),
    MasterToBackend(MasterToBackendPacket),
    SlaveToBackend(SlaveToBackendPacket),
}

impl Packet {
    /// Decode a complete frame according to its packet id.
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        let channel = frame
            .channel()
            .ok_or(MessageError::UnknownChannel(frame.packet_id))?;
        let payload = frame.payload.as_ref();
        Ok(match channel {
            PacketId::MasterToSlave => Self::MasterToSlave(MasterToSlavePacket::parse(payload)?),
            PacketId::SlaveToMaster => Self::SlaveToMaster(SlaveToMasterPacket::parse(payload)?),
            PacketId::BackendToMaster => {
                Self::BackendToMaster(BackendToMasterPacket::parse(payload)?)
            }
            PacketId::MasterToBackend => {
                Self::MasterToBackend(MasterToBackendPacket::parse(payload)?)
            }
            PacketId::SlaveToBackend => Self::SlaveToBackend(SlaveToBackendPacket::parse(payload)?),
        })
    }

    pub fn packet_id(&self) -> PacketId {
        match self {
            Self::MasterToSlave(_) => PacketId::MasterToSlave,
            Self::SlaveToMaster(_) => PacketId::SlaveToMaster,
            Self::BackendToMaster(_) => PacketId::BackendToMaster,
            Self::MasterToBackend(_) => PacketId::MasterToBackend,
            Self::SlaveToBackend(_) => PacketId::SlaveToBackend,
        }
    }

    /// Slave or destination id from the prefix, for channels that carry one.
    pub fn device_id(&self) -> Option<u32> {
        match self {
            Self::MasterToSlave(p) => Some(p.destination_id),
            Self::SlaveToMaster(p) => Some(p.slave_id),
            Self::SlaveToBackend(p) => Some(p.slave_id),
            Self::BackendToMaster(_) | Self::MasterToBackend(_) => None,
        }
    }

    pub fn message_id(&self) -> u8 {
        match self {
            Self::MasterToSlave(p) => p.message.message_id(),
            Self::SlaveToMaster(p) => p.message.message_id(),
            Self::BackendToMaster(p) => p.message.message_id(),
            Self::MasterToBackend(p) => p.message.message_id(),
            Self::SlaveToBackend(p) => p.message.message_id(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::MasterToSlave(p) => p.message.type_name(),
            Self::SlaveToMaster(p) => p.message.type_name(),
            Self::BackendToMaster(p) => p.message.type_name(),
            Self::MasterToBackend(p) => p.message.type_name(),
            Self::SlaveToBackend(p) => p.message.type_name(),
        }
    }

    /// Re-encode the frame payload: prefix, message id, body.
    pub fn encode_payload(&self) -> Bytes {
        match self {
            Self::MasterToSlave(p) => p.encode(),
            Self::SlaveToMaster(p) => p.encode(),
            Self::BackendToMaster(p) => p.encode(),
            Self::MasterToBackend(p) => p.encode(),
            Self::SlaveToBackend(p) => p.encode(),
        }
    }

    /// Drop the addressing prefix and keep the message.
    pub fn into_message(self) -> Message {
        match self {
            Self::MasterToSlave(p) => p.message.into(),
            Self::SlaveToMaster(p) => p.message.into(),
            Self::BackendToMaster(p) => p.message.into(),
            Self::MasterToBackend(p) => p.message.into(),
            Self::SlaveToBackend(p) => p.message.into(),
        }
    }
}
