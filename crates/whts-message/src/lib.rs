//! Typed message bodies for the five WHTS channels.
//!
//! Each channel has its own message-id space and is modelled as one enum
//! ([`MasterToSlaveMessage`], [`SlaveToMasterMessage`], ...). [`Message`] is
//! the sum over all channels, and [`create`]/[`decode`] map a
//! `(packet id, message id)` pair onto the right variant.
//!
//! All integers are little-endian. Variable-length record lists are read for
//! as long as a whole record remains.

pub mod backend_to_master;
pub mod device_status;
pub mod error;
pub mod master_to_backend;
pub mod master_to_slave;
pub mod registry;
pub mod slave_to_backend;
pub mod slave_to_master;
pub mod wire;

pub use backend_to_master::BackendToMasterMessage;
pub use device_status::{DeviceStatus, DEVICE_STATUS_MASK};
pub use error::{MessageError, Result};
pub use master_to_backend::MasterToBackendMessage;
pub use master_to_slave::MasterToSlaveMessage;
pub use registry::{create, decode, Message};
pub use slave_to_backend::SlaveToBackendMessage;
pub use slave_to_master::SlaveToMasterMessage;
pub use wire::{BodyReader, MessageBody};
