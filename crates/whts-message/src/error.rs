/// Errors that can occur while decoding a message body.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// The body ended before a field could be read.
    #[error("truncated {message} body ({available} bytes left, {needed} needed)")]
    Truncated {
        message: &'static str,
        needed: usize,
        available: usize,
    },

    /// The message id is not defined on this channel.
    #[error("unknown message 0x{message_id:02X} on packet 0x{packet_id:02X}")]
    UnknownMessage { packet_id: u8, message_id: u8 },

    /// The packet id names no channel.
    #[error("unknown packet id 0x{0:02X}")]
    UnknownChannel(u8),
}

pub type Result<T> = std::result::Result<T, MessageError>;
