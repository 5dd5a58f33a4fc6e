use std::time::Duration;

use whts_frame::{ReceiverConfig, DEFAULT_MTU};

/// Configuration for a [`ProtocolProcessor`](crate::ProtocolProcessor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Largest wire buffer produced by the `pack_*` methods.
    pub mtu: usize,
    /// Receive pipeline limits.
    pub receiver: ReceiverConfig,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            mtu: DEFAULT_MTU,
            receiver: ReceiverConfig::default(),
        }
    }
}

impl ProcessorConfig {
    /// Set the MTU.
    pub fn with_mtu(mut self, mtu: usize) -> Self {
        self.mtu = mtu;
        self
    }

    /// Evict partial fragment groups older than `timeout`.
    pub fn with_fragment_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.receiver.fragment_timeout = timeout;
        self
    }

    /// Bound the receive buffer.
    pub fn with_max_buffer_size(mut self, max: usize) -> Self {
        self.receiver.max_buffer_size = max;
        self
    }
}
