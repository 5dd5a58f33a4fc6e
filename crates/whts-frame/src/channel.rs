//! Channel ids carried in the `packetId` header byte.
//!
//! Each channel is one directional flow between the Backend, Master and Slave
//! roles, with its own payload prefix and message-id space.

use std::fmt;

/// Raw id of the Master→Slave channel.
pub const MASTER_TO_SLAVE: u8 = 0x00;
/// Raw id of the Slave→Master channel.
pub const SLAVE_TO_MASTER: u8 = 0x01;
/// Raw id of the Backend→Master channel.
pub const BACKEND_TO_MASTER: u8 = 0x02;
/// Raw id of the Master→Backend channel.
pub const MASTER_TO_BACKEND: u8 = 0x03;
/// Raw id of the Slave→Backend channel.
pub const SLAVE_TO_BACKEND: u8 = 0x04;

/// One of the five directional channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PacketId {
    MasterToSlave = MASTER_TO_SLAVE,
    SlaveToMaster = SLAVE_TO_MASTER,
    BackendToMaster = BACKEND_TO_MASTER,
    MasterToBackend = MASTER_TO_BACKEND,
    SlaveToBackend = SLAVE_TO_BACKEND,
}

impl PacketId {
    /// All channels in id order.
    pub const ALL: [PacketId; 5] = [
        PacketId::MasterToSlave,
        PacketId::SlaveToMaster,
        PacketId::BackendToMaster,
        PacketId::MasterToBackend,
        PacketId::SlaveToBackend,
    ];

    /// Map a raw header byte to a channel.
    pub fn from_u8(id: u8) -> Option<Self> {
        match id {
            MASTER_TO_SLAVE => Some(Self::MasterToSlave),
            SLAVE_TO_MASTER => Some(Self::SlaveToMaster),
            BACKEND_TO_MASTER => Some(Self::BackendToMaster),
            MASTER_TO_BACKEND => Some(Self::MasterToBackend),
            SLAVE_TO_BACKEND => Some(Self::SlaveToBackend),
            _ => None,
        }
    }

    /// The raw header byte.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable channel name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::MasterToSlave => "MASTER_TO_SLAVE",
            Self::SlaveToMaster => "SLAVE_TO_MASTER",
            Self::BackendToMaster => "BACKEND_TO_MASTER",
            Self::MasterToBackend => "MASTER_TO_BACKEND",
            Self::SlaveToBackend => "SLAVE_TO_BACKEND",
        }
    }

    /// Bytes of addressing prefix (message id included) before the message body.
    pub const fn prefix_len(self) -> usize {
        match self {
            Self::MasterToSlave | Self::SlaveToMaster => 5,
            Self::SlaveToBackend => 7,
            Self::BackendToMaster | Self::MasterToBackend => 1,
        }
    }
}

impl From<PacketId> for u8 {
    fn from(id: PacketId) -> Self {
        id.as_u8()
    }
}

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns a human-readable name for a raw channel id.
pub fn channel_name(id: u8) -> &'static str {
    PacketId::from_u8(id).map_or("UNKNOWN", PacketId::name)
}
