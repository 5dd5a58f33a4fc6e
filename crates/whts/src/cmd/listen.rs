use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use whts::transport::{DatagramTransport, UdpConfig, UdpTransport, MAX_DATAGRAM_SIZE};
use whts::{Packet, ProcessorConfig, ProtocolProcessor};

use crate::cmd::{parse_duration, ListenArgs};
use crate::exit::{processor_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_packet, OutputFormat};

/// How often the receive loop wakes to check for ctrl-c.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let fragment_timeout = args
        .fragment_timeout
        .as_deref()
        .map(parse_duration)
        .transpose()?;
    let mut processor = ProtocolProcessor::with_config(
        ProcessorConfig::default().with_fragment_timeout(fragment_timeout),
    )
    .map_err(|err| processor_error("invalid processor config", err))?;

    let config = UdpConfig {
        read_timeout: Some(POLL_INTERVAL),
        write_timeout: None,
    };
    let transport = UdpTransport::bind_with_config(args.bind.as_str(), &config)
        .map_err(|err| transport_error("bind failed", err))?;
    if let Ok(local) = transport.local_addr() {
        info!(%local, "listening");
    }

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let (len, sender) = match transport.recv_from(&mut buf) {
            Ok(received) => received,
            Err(err) if err.is_timeout() => continue,
            Err(err) => return Err(transport_error("receive failed", err)),
        };
        processor.process_received_data(&buf[..len]);

        while let Some(packet) = processor.next_packet() {
            if !args.all && !addressed_to_backend(&packet) {
                debug!(channel = %packet.packet_id(), "ignoring packet");
                continue;
            }

            print_packet(&packet, Some(sender), format);
            printed = printed.saturating_add(1);

            if let Some(count) = args.count {
                if printed >= count {
                    return Ok(SUCCESS);
                }
            }
        }
    }

    Ok(SUCCESS)
}

fn addressed_to_backend(packet: &Packet) -> bool {
    matches!(
        packet,
        Packet::MasterToBackend(_) | Packet::SlaveToBackend(_)
    )
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
