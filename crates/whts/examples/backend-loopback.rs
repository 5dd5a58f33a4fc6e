//! A Backend and a simulated Master talking over loopback UDP.
//!
//! The Backend asks for the device list; the Master answers with enough
//! devices that the response is fragmented at the default MTU.

use std::time::Duration;

use whts::message::backend_to_master::DeviceListRequest;
use whts::message::master_to_backend::{DeviceInfo, DeviceListResponse};
use whts::message::{BackendToMasterMessage, MasterToBackendMessage};
use whts::transport::{UdpConfig, UdpTransport};
use whts::{Endpoint, Packet};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = UdpConfig {
        read_timeout: Some(Duration::from_secs(2)),
        write_timeout: None,
    };
    let backend_socket = UdpTransport::bind_with_config("127.0.0.1:0", &config)?;
    let master_socket = UdpTransport::bind_with_config("127.0.0.1:0", &config)?;
    let backend_addr = backend_socket.local_addr()?;
    let master_addr = master_socket.local_addr()?;

    let mut backend = Endpoint::new(backend_socket.with_remote(master_addr));
    let mut master = Endpoint::new(master_socket.with_remote(backend_addr));

    let request = BackendToMasterMessage::from(DeviceListRequest { reserve: 0 });
    backend.send_backend_to_master(&request)?;

    match master.recv()? {
        Packet::BackendToMaster(p) => println!("master <- {}", p.message.type_name()),
        other => return Err(format!("unexpected packet {other:?}").into()),
    }

    let devices = (0..12u32)
        .map(|i| DeviceInfo {
            device_id: 0x3000_0000 + i,
            short_id: i as u8,
            online: u8::from(i % 3 != 0),
            version_major: 1,
            version_minor: 2,
            version_patch: 30,
            battery_level: 100 - i as u8 * 5,
        })
        .collect();
    let response = MasterToBackendMessage::from(DeviceListResponse::new(devices));
    let sent = master.send_master_to_backend(&response)?;
    println!("master -> {} ({sent} datagrams)", response.type_name());

    match backend.recv()? {
        Packet::MasterToBackend(p) => match p.message {
            MasterToBackendMessage::DeviceListResponse(list) => {
                println!("backend <- {} devices", list.device_count);
                for device in &list.devices {
                    println!(
                        "  0x{:08X} short={} online={} v{} battery={}%",
                        device.device_id,
                        device.short_id,
                        device.online,
                        device.version(),
                        device.battery_level
                    );
                }
            }
            other => println!("backend <- {}", other.type_name()),
        },
        other => return Err(format!("unexpected packet {other:?}").into()),
    }

    Ok(())
}
