/// Errors that can occur during frame encoding, decoding and fragmentation.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame does not start with the `0xAB 0xCD` delimiter.
    #[error("invalid frame delimiter {found:02X?} (expected [AB, CD])")]
    InvalidDelimiter { found: [u8; 2] },

    /// Fewer bytes were supplied than the header or declared length requires.
    #[error("truncated frame ({available} bytes available, {needed} needed)")]
    Truncated { needed: usize, available: usize },

    /// The payload does not fit the 16-bit length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The MTU leaves no room for payload after the header.
    #[error("invalid MTU {mtu} (minimum {min})")]
    InvalidMtu { mtu: usize, min: usize },

    /// Splitting would need more fragments than the sequence byte can address.
    #[error("message needs {fragments} fragments, max {max}")]
    TooManyFragments { fragments: usize, max: usize },

    /// A completed fragment group does not fit into a single frame.
    #[error("reassembled payload on packet 0x{packet_id:02X} too large ({size} bytes)")]
    ReassembledTooLarge { packet_id: u8, size: usize },

    /// An I/O error surfaced through the async codec.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
