//! Receive WHTS packets with tokio's `UdpFramed`.
//!
//! Binds a socket, sends itself a fragmented Slave→Backend report and prints
//! what the codec reassembles.

use futures_util::StreamExt;
use tokio::net::UdpSocket;
use tokio_util::udp::UdpFramed;
use whts::frame::WhtsCodec;
use whts::message::slave_to_backend::ResistanceData;
use whts::message::{DeviceStatus, SlaveToBackendMessage};
use whts::{Packet, ProtocolProcessor};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let socket = UdpSocket::bind("127.0.0.1:0").await?;
    let local = socket.local_addr()?;
    let sender = UdpSocket::bind("127.0.0.1:0").await?;

    let mut processor = ProtocolProcessor::new();
    processor.set_mtu(48)?;
    let message = SlaveToBackendMessage::from(ResistanceData {
        data: (0..120).collect(),
    });
    let status = DeviceStatus::from_u16(0x0005);
    for datagram in processor.pack_slave_to_backend(0xCAFE, status, &message)? {
        sender.send_to(&datagram, local).await?;
    }

    let mut framed = UdpFramed::new(socket, WhtsCodec::new());
    if let Some(result) = framed.next().await {
        let (frame, from) = result?;
        let packet = Packet::from_frame(&frame)?;
        println!(
            "{from}: {} from 0x{:08X} ({} payload bytes)",
            packet.type_name(),
            packet.device_id().unwrap_or_default(),
            frame.payload.len()
        );
        if let Packet::SlaveToBackend(p) = packet {
            println!("device status: {}", p.device_status);
        }
    }

    Ok(())
}
