#![cfg(feature = "cli")]

use std::process::Command;

use whts::message::master_to_backend::ControlResponse;
use whts::message::slave_to_backend::ConductionData;
use whts::message::{DeviceStatus, MasterToBackendMessage, SlaveToBackendMessage};
use whts::ProtocolProcessor;

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn whts() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_whts"));
    cmd.arg("--log-level").arg("error");
    cmd
}

#[test]
fn decode_prints_master_to_backend_json() {
    let processor = ProtocolProcessor::new();
    let msg = MasterToBackendMessage::from(ControlResponse {
        status: 0,
        running_status: 1,
    });
    let buffers = processor.pack_master_to_backend(&msg).unwrap();
    assert_eq!(buffers.len(), 1);

    let output = whts()
        .arg("--format")
        .arg("json")
        .arg("decode")
        .arg(hex(&buffers[0]))
        .output()
        .expect("decode should run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"channel_name\":\"MASTER_TO_BACKEND\""));
    assert!(stdout.contains("\"type_name\":\"Control Response\""));
    assert!(stdout.contains("\"runningStatus\":1"));
}

#[test]
fn decode_reassembles_fragments_split_across_arguments() {
    let mut processor = ProtocolProcessor::new();
    processor.set_mtu(16).unwrap();
    let msg = SlaveToBackendMessage::from(ConductionData {
        data: (0..40).collect(),
    });
    let buffers = processor
        .pack_slave_to_backend(0x1234, DeviceStatus::from_u16(0x0003), &msg)
        .unwrap();
    assert!(buffers.len() > 1);

    // Deliver in reverse with leading garbage.
    let mut cmd = whts();
    cmd.arg("--format").arg("json").arg("decode").arg("00ff11");
    for buf in buffers.iter().rev() {
        cmd.arg(hex(buf));
    }
    let output = cmd.output().expect("decode should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains("\"device_id\":\"0x00001234\""));
    assert!(stdout.contains("\"channel_name\":\"SLAVE_TO_BACKEND\""));
}

#[test]
fn decode_garbage_exits_60() {
    let output = whts()
        .arg("decode")
        .arg("deadbeef")
        .output()
        .expect("decode should run");

    assert_eq!(output.status.code(), Some(60));
    assert!(output.stdout.is_empty());
}

#[test]
fn decode_rejects_malformed_hex() {
    let output = whts()
        .arg("decode")
        .arg("abc")
        .output()
        .expect("decode should run");

    assert_eq!(output.status.code(), Some(64));
}
