use std::time::{Duration, Instant};

use tracing::{debug, info};
use whts::message::backend_to_master::{
    ClearDeviceList, Control, DeviceListRequest, IntervalConfig, ModeConfig, PingControl, Reset,
    ResetEntry, SetUwbChannel,
};
use whts::message::BackendToMasterMessage;
use whts::store::{SlaveConfigStore, StoreError};
use whts::transport::{DatagramTransport, UdpConfig, UdpTransport, MAX_DATAGRAM_SIZE};
use whts::{Endpoint, Packet, ProcessorConfig, ProtocolProcessor};

use crate::cmd::{parse_duration, SendArgs, SendMessage};
use crate::exit::{
    processor_error, store_error, transport_error, CliError, CliResult, SUCCESS, TIMEOUT,
};
use crate::output::{print_packet, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let wait_timeout = parse_duration(&args.wait_timeout)?;
    let message = build_message(&args.message)?;

    let processor = ProtocolProcessor::with_config(ProcessorConfig::default().with_mtu(args.mtu))
        .map_err(|err| processor_error("invalid --mtu", err))?;
    let config = UdpConfig {
        read_timeout: Some(wait_timeout),
        write_timeout: None,
    };
    let transport = UdpTransport::bind_with_config(args.bind.as_str(), &config)
        .and_then(|t| t.with_remote_addr(&args.remote))
        .map_err(|err| transport_error("socket setup failed", err))?;
    let mut endpoint = Endpoint::with_processor(transport, processor);

    let datagrams = endpoint
        .send_backend_to_master(&message)
        .map_err(|err| processor_error("send failed", err))?;
    info!(
        remote = %args.remote,
        message = message.type_name(),
        datagrams,
        "sent command"
    );

    if args.wait {
        let packet = wait_for_response(&mut endpoint, wait_timeout)?;
        print_packet(&packet, None, format);
    }

    Ok(SUCCESS)
}

/// Receive until a Master→Backend packet arrives or `timeout` has elapsed
/// since the call. Other traffic is skipped and does not extend the wait.
///
/// The deadline is checked per datagram, so undecodable input cannot hold
/// the wait open either.
fn wait_for_response(
    endpoint: &mut Endpoint<UdpTransport>,
    timeout: Duration,
) -> CliResult<Packet> {
    let deadline = Instant::now() + timeout;
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    loop {
        while let Some(packet) = endpoint.processor_mut().next_packet() {
            if matches!(packet, Packet::MasterToBackend(_)) {
                return Ok(packet);
            }
            debug!(
                channel = %packet.packet_id(),
                message = packet.type_name(),
                "ignoring packet while waiting for response"
            );
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(CliError::new(
                TIMEOUT,
                format!("no response within {timeout:?}"),
            ));
        }
        endpoint
            .transport()
            .set_read_timeout(Some(remaining))
            .map_err(|err| transport_error("socket setup failed", err))?;

        let (len, _) = endpoint
            .transport()
            .recv_from(&mut buf)
            .map_err(|err| transport_error("waiting for response failed", err))?;
        endpoint.processor_mut().process_received_data(&buf[..len]);
    }
}

fn build_message(message: &SendMessage) -> CliResult<BackendToMasterMessage> {
    Ok(match message {
        SendMessage::DeviceList => DeviceListRequest { reserve: 0 }.into(),
        SendMessage::Control { running } => Control {
            running_status: *running,
        }
        .into(),
        SendMessage::Mode { mode } => {
            if *mode > 2 {
                return Err(CliError::usage(format!(
                    "--mode must be 0 (conduction), 1 (resistance) or 2 (clip), got {mode}"
                )));
            }
            ModeConfig { mode: *mode }.into()
        }
        SendMessage::Interval { ms } => IntervalConfig { interval_ms: *ms }.into(),
        SendMessage::UwbChannel { channel } => SetUwbChannel { channel: *channel }.into(),
        SendMessage::ClearDevices => ClearDeviceList { reserve: 0 }.into(),
        SendMessage::ResetSlave {
            ids,
            lock,
            clip_status,
        } => Reset::new(
            ids.iter()
                .map(|&id| ResetEntry {
                    id,
                    lock: *lock,
                    clip_status: *clip_status,
                })
                .collect(),
        )
        .into(),
        SendMessage::SlaveConfig { name, store } => {
            let path = SlaveConfigStore::default_path(store.as_deref());
            let store = SlaveConfigStore::load(path)
                .map_err(|err| store_error("failed to load store", err))?;
            let record = store
                .get(name)
                .ok_or_else(|| store_error("lookup failed", StoreError::NotFound(name.clone())))?;
            record.to_message().into()
        }
        SendMessage::Ping {
            destination,
            mode,
            count,
            interval,
        } => PingControl {
            ping_mode: *mode,
            ping_count: *count,
            interval: *interval,
            destination_id: *destination,
        }
        .into(),
    })
}
