use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, warn};
use whts_frame::{Frame, Fragmenter, FrameReceiver, PacketId};
use whts_message::{
    BackendToMasterMessage, DeviceStatus, MasterToBackendMessage, MasterToSlaveMessage,
    SlaveToBackendMessage, SlaveToMasterMessage,
};

use crate::config::ProcessorConfig;
use crate::error::Result;
use crate::packet::{
    BackendToMasterPacket, MasterToBackendPacket, MasterToSlavePacket, Packet,
    SlaveToBackendPacket, SlaveToMasterPacket,
};

/// Packs typed messages into wire buffers and turns received bytes back into
/// packets.
///
/// Packing is pure and takes `&self`. All receive state (the byte buffer, the
/// completed-frame queue and partial fragment groups) is owned by the value,
/// so independent processors never interfere.
#[derive(Debug, Default)]
pub struct ProtocolProcessor {
    fragmenter: Fragmenter,
    receiver: FrameReceiver,
}

impl ProtocolProcessor {
    /// Create a processor with default MTU and receive limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a processor with explicit configuration.
    pub fn with_config(config: ProcessorConfig) -> Result<Self> {
        Ok(Self {
            fragmenter: Fragmenter::new(config.mtu)?,
            receiver: FrameReceiver::with_config(config.receiver),
        })
    }

    /// Change the MTU used by subsequent `pack_*` calls.
    pub fn set_mtu(&mut self, mtu: usize) -> Result<()> {
        self.fragmenter.set_mtu(mtu)?;
        Ok(())
    }

    pub fn mtu(&self) -> usize {
        self.fragmenter.mtu()
    }

    fn pack(&self, channel: PacketId, payload: Bytes) -> Result<Vec<Bytes>> {
        let frame = Frame::new(channel, payload);
        let buffers = self.fragmenter.split(&frame)?;
        debug!(
            channel = %channel,
            size = frame.wire_size(),
            fragments = buffers.len(),
            "packed frame"
        );
        Ok(buffers)
    }

    /// Wire buffers for a Master→Slave message, first fragment first.
    pub fn pack_master_to_slave(
        &self,
        destination_id: u32,
        message: &MasterToSlaveMessage,
    ) -> Result<Vec<Bytes>> {
        let packet = MasterToSlavePacket {
            destination_id,
            message: message.clone(),
        };
        self.pack(PacketId::MasterToSlave, packet.encode())
    }

    /// Wire buffers for a Slave→Master message.
    pub fn pack_slave_to_master(
        &self,
        slave_id: u32,
        message: &SlaveToMasterMessage,
    ) -> Result<Vec<Bytes>> {
        let packet = SlaveToMasterPacket {
            slave_id,
            message: message.clone(),
        };
        self.pack(PacketId::SlaveToMaster, packet.encode())
    }

    /// Wire buffers for a Slave→Backend message.
    pub fn pack_slave_to_backend(
        &self,
        slave_id: u32,
        device_status: DeviceStatus,
        message: &SlaveToBackendMessage,
    ) -> Result<Vec<Bytes>> {
        let packet = SlaveToBackendPacket {
            slave_id,
            device_status,
            message: message.clone(),
        };
        self.pack(PacketId::SlaveToBackend, packet.encode())
    }

    /// Wire buffers for a Backend→Master message.
    pub fn pack_backend_to_master(&self, message: &BackendToMasterMessage) -> Result<Vec<Bytes>> {
        let packet = BackendToMasterPacket {
            message: message.clone(),
        };
        self.pack(PacketId::BackendToMaster, packet.encode())
    }

    /// Wire buffers for a Master→Backend message.
    pub fn pack_master_to_backend(&self, message: &MasterToBackendMessage) -> Result<Vec<Bytes>> {
        let packet = MasterToBackendPacket {
            message: message.clone(),
        };
        self.pack(PacketId::MasterToBackend, packet.encode())
    }

    /// Feed one received chunk. Completed frames become available through
    /// [`next_complete_frame`](Self::next_complete_frame).
    pub fn process_received_data(&mut self, data: &[u8]) {
        self.receiver.push(data);
    }

    /// Like [`process_received_data`](Self::process_received_data) with an
    /// explicit arrival time for fragment expiry.
    pub fn process_received_data_at(&mut self, data: &[u8], now: Instant) {
        self.receiver.push_at(data, now);
    }

    /// Pop the oldest completed frame.
    pub fn next_complete_frame(&mut self) -> Option<Frame> {
        self.receiver.next_frame()
    }

    /// Pop and decode the oldest completed frame.
    ///
    /// Frames that fail to decode are logged and skipped.
    pub fn next_packet(&mut self) -> Option<Packet> {
        while let Some(frame) = self.next_complete_frame() {
            match self.parse_frame(&frame) {
                Ok(packet) => return Some(packet),
                Err(err) => warn!(
                    packet_id = frame.packet_id,
                    size = frame.payload.len(),
                    error = %err,
                    "dropping undecodable frame"
                ),
            }
        }
        None
    }

    /// Decode a Master→Slave payload: message id, destination id, body.
    pub fn parse_master_to_slave_packet(&self, payload: &[u8]) -> Result<MasterToSlavePacket> {
        MasterToSlavePacket::parse(payload)
    }

    /// Decode a Slave→Master payload: message id, slave id, body.
    pub fn parse_slave_to_master_packet(&self, payload: &[u8]) -> Result<SlaveToMasterPacket> {
        SlaveToMasterPacket::parse(payload)
    }

    /// Decode a Slave→Backend payload: message id, slave id, device status, body.
    pub fn parse_slave_to_backend_packet(&self, payload: &[u8]) -> Result<SlaveToBackendPacket> {
        SlaveToBackendPacket::parse(payload)
    }

    /// Decode a Backend→Master payload: message id, body.
    pub fn parse_backend_to_master_packet(&self, payload: &[u8]) -> Result<BackendToMasterPacket> {
        BackendToMasterPacket::parse(payload)
    }

    /// Decode a Master→Backend payload: message id, body.
    pub fn parse_master_to_backend_packet(&self, payload: &[u8]) -> Result<MasterToBackendPacket> {
        MasterToBackendPacket::parse(payload)
    }

    /// Decode a complete frame on whichever channel its packet id names.
    pub fn parse_frame(&self, frame: &Frame) -> Result<Packet> {
        Packet::from_frame(frame)
    }

    /// Drop buffered bytes, queued frames and partial fragment groups.
    pub fn clear_receive_buffer(&mut self) {
        self.receiver.clear();
    }

    /// Bytes buffered but not yet framed.
    pub fn buffered_len(&self) -> usize {
        self.receiver.buffered_len()
    }

    /// Completed frames not yet taken.
    pub fn queued_frames(&self) -> usize {
        self.receiver.queued_frames()
    }

    /// Fragment groups waiting on more fragments.
    pub fn pending_fragment_groups(&self) -> usize {
        self.receiver.pending_groups()
    }
}
