use bytes::Bytes;
use tracing::{debug, trace};
use whts_message::{
    BackendToMasterMessage, DeviceStatus, MasterToBackendMessage, MasterToSlaveMessage,
    SlaveToBackendMessage, SlaveToMasterMessage,
};
use whts_transport::{DatagramTransport, MAX_DATAGRAM_SIZE};

use crate::error::Result;
use crate::packet::Packet;
use crate::processor::ProtocolProcessor;

/// One protocol processor bound to one datagram transport.
///
/// Sends pack a message and transmit every fragment in order. Receives read
/// datagrams until a packet decodes.
pub struct Endpoint<T> {
    transport: T,
    processor: ProtocolProcessor,
    buf: Vec<u8>,
}

impl<T: DatagramTransport> Endpoint<T> {
    /// Wrap a transport with a default processor.
    pub fn new(transport: T) -> Self {
        Self::with_processor(transport, ProtocolProcessor::new())
    }

    /// Wrap a transport with an explicitly configured processor.
    pub fn with_processor(transport: T, processor: ProtocolProcessor) -> Self {
        Self {
            transport,
            processor,
            buf: vec![0u8; MAX_DATAGRAM_SIZE],
        }
    }

    fn transmit(&self, buffers: Vec<Bytes>) -> Result<usize> {
        let count = buffers.len();
        for buf in &buffers {
            self.transport.send(buf)?;
        }
        debug!(fragments = count, "sent message");
        Ok(count)
    }

    /// Send a Master→Slave message. Returns the number of datagrams sent.
    pub fn send_master_to_slave(
        &self,
        destination_id: u32,
        message: &MasterToSlaveMessage,
    ) -> Result<usize> {
        let buffers = self
            .processor
            .pack_master_to_slave(destination_id, message)?;
        self.transmit(buffers)
    }

    pub fn send_slave_to_master(&self, slave_id: u32, message: &SlaveToMasterMessage) -> Result<usize> {
        let buffers = self.processor.pack_slave_to_master(slave_id, message)?;
        self.transmit(buffers)
    }

    pub fn send_slave_to_backend(
        &self,
        slave_id: u32,
        device_status: DeviceStatus,
        message: &SlaveToBackendMessage,
    ) -> Result<usize> {
        let buffers = self
            .processor
            .pack_slave_to_backend(slave_id, device_status, message)?;
        self.transmit(buffers)
    }

    pub fn send_backend_to_master(&self, message: &BackendToMasterMessage) -> Result<usize> {
        let buffers = self.processor.pack_backend_to_master(message)?;
        self.transmit(buffers)
    }

    pub fn send_master_to_backend(&self, message: &MasterToBackendMessage) -> Result<usize> {
        let buffers = self.processor.pack_master_to_backend(message)?;
        self.transmit(buffers)
    }

    /// Receive the next decodable packet.
    ///
    /// Frames that fail to decode are skipped. Transport errors, including
    /// read timeouts, are returned as-is.
    pub fn recv(&mut self) -> Result<Packet> {
        loop {
            if let Some(packet) = self.processor.next_packet() {
                return Ok(packet);
            }
            let (len, sender) = self.transport.recv_from(&mut self.buf)?;
            trace!(%sender, size = len, "feeding datagram");
            self.processor.process_received_data(&self.buf[..len]);
        }
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Borrow the processor.
    pub fn processor(&self) -> &ProtocolProcessor {
        &self.processor
    }

    /// Mutably borrow the processor, e.g. to change the MTU.
    pub fn processor_mut(&mut self) -> &mut ProtocolProcessor {
        &mut self.processor
    }

    /// Split into the transport and processor.
    pub fn into_parts(self) -> (T, ProtocolProcessor) {
        (self.transport, self.processor)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Endpoint<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("transport", &self.transport)
            .field("processor", &self.processor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use whts_message::backend_to_master::Control;
    use whts_message::slave_to_backend::ResistanceData;
    use whts_transport::{UdpConfig, UdpTransport};

    use super::*;

    fn loopback_pair() -> (Endpoint<UdpTransport>, Endpoint<UdpTransport>) {
        let config = UdpConfig {
            read_timeout: Some(Duration::from_secs(2)),
            write_timeout: None,
        };
        let a = UdpTransport::bind_with_config("127.0.0.1:0", &config).unwrap();
        let b = UdpTransport::bind_with_config("127.0.0.1:0", &config).unwrap();
        let a_addr = a.local_addr().unwrap();
        let b_addr = b.local_addr().unwrap();
        (
            Endpoint::new(a.with_remote(b_addr)),
            Endpoint::new(b.with_remote(a_addr)),
        )
    }

    #[test]
    fn fragmented_slave_report_arrives_intact() {
        let (mut slave, mut backend) = loopback_pair();
        slave.processor_mut().set_mtu(32).unwrap();

        let msg = SlaveToBackendMessage::from(ResistanceData {
            data: (0..=255).collect(),
        });
        let status = DeviceStatus::from_u16(0x0011);
        let sent = slave.send_slave_to_backend(0xBEEF, status, &msg).unwrap();
        assert!(sent > 1);

        match backend.recv().unwrap() {
            Packet::SlaveToBackend(p) => {
                assert_eq!(p.slave_id, 0xBEEF);
                assert_eq!(p.device_status, status);
                assert_eq!(p.message, msg);
            }
            other => panic!("unexpected packet {other:?}"),
        }
    }

    #[test]
    fn command_and_reply() {
        let (backend, mut master) = loopback_pair();
        backend
            .send_backend_to_master(&Control { running_status: 1 }.into())
            .unwrap();

        let packet = master.recv().unwrap();
        assert_eq!(packet.type_name(), "Control");
    }

    #[test]
    fn recv_timeout_propagates() {
        let (_a, mut b) = loopback_pair();
        b.transport()
            .set_read_timeout(Some(Duration::from_millis(20)))
            .unwrap();
        let err = b.recv().unwrap_err();
        assert!(err.is_timeout());
    }
}
