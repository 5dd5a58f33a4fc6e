use whts_frame::PacketId;

/// Errors that can occur in protocol processing.
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] whts_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] whts_frame::FrameError),

    /// Message-level error.
    #[error("message error: {0}")]
    Message(#[from] whts_message::MessageError),

    /// The payload is shorter than the channel's addressing prefix.
    #[error("{channel} payload too short for prefix ({available} bytes, {needed} needed)")]
    PrefixTooShort {
        channel: PacketId,
        needed: usize,
        available: usize,
    },
}

impl ProcessorError {
    /// True when the underlying transport timed out waiting for data.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProcessorError::Transport(err) if err.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, ProcessorError>;
