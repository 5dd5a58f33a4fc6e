use tracing::debug;
use whts::{ProcessorConfig, ProtocolProcessor};

use crate::cmd::DecodeArgs;
use crate::exit::{processor_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_packet, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let mut processor = ProtocolProcessor::with_config(
        ProcessorConfig::default().with_max_buffer_size(args.max_buffer),
    )
    .map_err(|err| processor_error("invalid processor config", err))?;

    let mut decoded = 0usize;
    for (index, chunk) in args.chunks.iter().enumerate() {
        let bytes = parse_hex(chunk)?;
        debug!(chunk = index, size = bytes.len(), "feeding chunk");
        processor.process_received_data(&bytes);

        while let Some(packet) = processor.next_packet() {
            print_packet(&packet, None, format);
            decoded += 1;
        }
    }

    if decoded == 0 {
        return Err(CliError::new(DATA_INVALID, "no complete packet decoded"));
    }
    if processor.pending_fragment_groups() > 0 {
        debug!(
            groups = processor.pending_fragment_groups(),
            "incomplete fragment groups left over"
        );
    }
    Ok(SUCCESS)
}

/// Parse a hex string, ignoring whitespace, `:` and `-` separators and an
/// optional `0x` prefix.
fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: Vec<u8> = trimmed
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b':' && *b != b'-')
        .collect();

    if digits.len() % 2 != 0 {
        return Err(CliError::usage(format!(
            "hex input has an odd number of digits: {input:?}"
        )));
    }

    digits
        .chunks(2)
        .map(|pair| {
            let s = std::str::from_utf8(pair).unwrap_or("");
            u8::from_str_radix(s, 16)
                .map_err(|_| CliError::usage(format!("invalid hex byte {s:?} in {input:?}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_accepts_separators() {
        assert_eq!(parse_hex("AB CD 01").unwrap(), vec![0xAB, 0xCD, 0x01]);
        assert_eq!(parse_hex("ab:cd:01").unwrap(), vec![0xAB, 0xCD, 0x01]);
        assert_eq!(parse_hex("0xabcd").unwrap(), vec![0xAB, 0xCD]);
        assert!(parse_hex("").unwrap().is_empty());
    }

    #[test]
    fn parse_hex_rejects_bad_input() {
        assert!(parse_hex("ABC").is_err());
        assert!(parse_hex("ZZ").is_err());
    }
}
