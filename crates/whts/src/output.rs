use std::io::IsTerminal;
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use whts::message::master_to_backend::DeviceInfo;
use whts::message::{MasterToBackendMessage, SlaveToBackendMessage};
use whts::store::SlaveConfigRecord;
use whts::Packet;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PacketOutput<'a> {
    channel_name: &'a str,
    packet_id: u8,
    message_id: u8,
    type_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender: Option<String>,
    timestamp: String,
    packet: &'a Packet,
}

pub fn print_packet(packet: &Packet, sender: Option<SocketAddr>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = PacketOutput {
                channel_name: packet.packet_id().name(),
                packet_id: packet.packet_id().as_u8(),
                message_id: packet.message_id(),
                type_name: packet.type_name(),
                device_id: packet.device_id().map(hex_id),
                sender: sender.map(|addr| addr.to_string()),
                timestamp: now_unix_seconds(),
                packet,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "DEVICE", "MESSAGE", "DETAILS"])
                .add_row(vec![
                    packet.packet_id().name().to_string(),
                    packet.device_id().map(hex_id).unwrap_or_else(|| "-".into()),
                    format!("{} (0x{:02X})", packet.type_name(), packet.message_id()),
                    details(packet),
                ]);
            println!("{table}");

            if let Some(devices) = device_list(packet) {
                println!("{}", device_table(devices));
            }
        }
        OutputFormat::Pretty => {
            println!(
                "channel={} device={} message={} (0x{:02X}) {}",
                packet.packet_id(),
                packet.device_id().map(hex_id).unwrap_or_else(|| "-".into()),
                packet.type_name(),
                packet.message_id(),
                details(packet)
            );
        }
        OutputFormat::Raw => {
            println!(
                "{:02X} {}",
                packet.packet_id().as_u8(),
                to_hex(&packet.encode_payload())
            );
        }
    }
}

pub fn print_records(records: &[SlaveConfigRecord], format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Raw => {
            println!(
                "{}",
                serde_json::to_string(records).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["NAME", "SLAVES", "IDS"]);
            for record in records {
                let ids = record
                    .slaves
                    .iter()
                    .map(|s| hex_id(s.id))
                    .collect::<Vec<_>>()
                    .join(", ");
                table.add_row(vec![record.name.clone(), record.slave_num.to_string(), ids]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for record in records {
                println!("{} ({} slaves)", record.name, record.slave_num);
            }
        }
    }
}

pub fn print_record(record: &SlaveConfigRecord, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Raw => {
            println!(
                "{}",
                serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("name: {}", record.name);
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "CONDUCTION", "RESISTANCE", "CLIP MODE", "CLIP STATUS"]);
            for slave in &record.slaves {
                table.add_row(vec![
                    hex_id(slave.id),
                    slave.conduction_num.to_string(),
                    slave.resistance_num.to_string(),
                    slave.clip_mode.to_string(),
                    format!("0x{:04X}", slave.clip_status),
                ]);
            }
            println!("{table}");
        }
    }
}

fn details(packet: &Packet) -> String {
    match packet {
        Packet::SlaveToBackend(p) => {
            let size = match &p.message {
                SlaveToBackendMessage::ConductionData(m) => format!("{} bytes", m.data.len()),
                SlaveToBackendMessage::ResistanceData(m) => format!("{} bytes", m.data.len()),
                SlaveToBackendMessage::ClipData(m) => format!("clip=0x{:04X}", m.clip_data),
            };
            format!("status=[{}] {size}", p.device_status)
        }
        Packet::MasterToBackend(p) => match &p.message {
            MasterToBackendMessage::DeviceListResponse(m) => {
                format!("{} devices", m.device_count)
            }
            other => message_json(other),
        },
        Packet::MasterToSlave(p) => message_json(&p.message),
        Packet::SlaveToMaster(p) => message_json(&p.message),
        Packet::BackendToMaster(p) => message_json(&p.message),
    }
}

fn message_json<T: Serialize>(message: &T) -> String {
    serde_json::to_string(message).unwrap_or_default()
}

fn device_list(packet: &Packet) -> Option<&[DeviceInfo]> {
    match packet {
        Packet::MasterToBackend(p) => match &p.message {
            MasterToBackendMessage::DeviceListResponse(m) => Some(&m.devices),
            _ => None,
        },
        _ => None,
    }
}

fn device_table(devices: &[DeviceInfo]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["DEVICE", "SHORT ID", "ONLINE", "VERSION", "BATTERY"]);
    for device in devices {
        table.add_row(vec![
            hex_id(device.device_id),
            device.short_id.to_string(),
            String::from(if device.online != 0 { "yes" } else { "no" }),
            device.version(),
            format!("{}%", device.battery_level),
        ]);
    }
    table
}

pub fn hex_id(id: u32) -> String {
    format!("0x{id:08X}")
}

pub fn to_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_formatting() {
        assert_eq!(hex_id(0x1234), "0x00001234");
        assert_eq!(to_hex(&[0xAB, 0xCD, 0x01]), "AB CD 01");
        assert_eq!(to_hex(&[]), "");
    }
}
