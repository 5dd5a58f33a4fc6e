//! Dispatch from `(packet id, message id)` to a typed message.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;
use whts_frame::PacketId;

use crate::backend_to_master::BackendToMasterMessage;
use crate::error::{MessageError, Result};
use crate::master_to_backend::MasterToBackendMessage;
use crate::master_to_slave::MasterToSlaveMessage;
use crate::slave_to_backend::SlaveToBackendMessage;
use crate::slave_to_master::SlaveToMasterMessage;

/// A message on any channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "message")]
pub enum Message {
    MasterToSlave(MasterToSlaveMessage),
    SlaveToMaster(SlaveToMasterMessage),
    BackendToMaster(BackendToMasterMessage),
    MasterToBackend(MasterToBackendMessage),
    SlaveToBackend(SlaveToBackendMessage),
}

impl Message {
    /// Channel the message belongs to.
    pub fn packet_id(&self) -> PacketId {
        match self {
            Self::MasterToSlave(_) => PacketId::MasterToSlave,
            Self::SlaveToMaster(_) => PacketId::SlaveToMaster,
            Self::BackendToMaster(_) => PacketId::BackendToMaster,
            Self::MasterToBackend(_) => PacketId::MasterToBackend,
            Self::SlaveToBackend(_) => PacketId::SlaveToBackend,
        }
    }

    pub fn message_id(&self) -> u8 {
        match self {
            Self::MasterToSlave(m) => m.message_id(),
            Self::SlaveToMaster(m) => m.message_id(),
            Self::BackendToMaster(m) => m.message_id(),
            Self::MasterToBackend(m) => m.message_id(),
            Self::SlaveToBackend(m) => m.message_id(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::MasterToSlave(m) => m.type_name(),
            Self::SlaveToMaster(m) => m.type_name(),
            Self::BackendToMaster(m) => m.type_name(),
            Self::MasterToBackend(m) => m.type_name(),
            Self::SlaveToBackend(m) => m.type_name(),
        }
    }

    /// Encode the body (no message id, no addressing prefix).
    pub fn serialize(&self) -> Bytes {
        match self {
            Self::MasterToSlave(m) => m.serialize(),
            Self::SlaveToMaster(m) => m.serialize(),
            Self::BackendToMaster(m) => m.serialize(),
            Self::MasterToBackend(m) => m.serialize(),
            Self::SlaveToBackend(m) => m.serialize(),
        }
    }
}

/// Default-valued message for a `(packet id, message id)` pair.
///
/// Returns `None` for unknown channels and for ids a channel does not define.
pub fn create(packet_id: u8, message_id: u8) -> Option<Message> {
    match PacketId::from_u8(packet_id)? {
        PacketId::MasterToSlave => MasterToSlaveMessage::create(message_id).map(Message::MasterToSlave),
        PacketId::SlaveToMaster => SlaveToMasterMessage::create(message_id).map(Message::SlaveToMaster),
        PacketId::BackendToMaster => {
            BackendToMasterMessage::create(message_id).map(Message::BackendToMaster)
        }
        PacketId::MasterToBackend => {
            MasterToBackendMessage::create(message_id).map(Message::MasterToBackend)
        }
        PacketId::SlaveToBackend => {
            SlaveToBackendMessage::create(message_id).map(Message::SlaveToBackend)
        }
    }
}

/// Decode a message body on a channel.
pub fn decode(packet_id: u8, message_id: u8, body: &[u8]) -> Result<Message> {
    let channel = PacketId::from_u8(packet_id).ok_or(MessageError::UnknownChannel(packet_id))?;
    let message = match channel {
        PacketId::MasterToSlave => {
            Message::MasterToSlave(MasterToSlaveMessage::deserialize(message_id, body)?)
        }
        PacketId::SlaveToMaster => {
            Message::SlaveToMaster(SlaveToMasterMessage::deserialize(message_id, body)?)
        }
        PacketId::BackendToMaster => {
            Message::BackendToMaster(BackendToMasterMessage::deserialize(message_id, body)?)
        }
        PacketId::MasterToBackend => {
            Message::MasterToBackend(MasterToBackendMessage::deserialize(message_id, body)?)
        }
        PacketId::SlaveToBackend => {
            Message::SlaveToBackend(SlaveToBackendMessage::deserialize(message_id, body)?)
        }
    };
    debug!(
        channel = %channel,
        message_id,
        message = message.type_name(),
        size = body.len(),
        "decoded message"
    );
    Ok(message)
}

macro_rules! impl_from_channel {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(
            impl From<$ty> for Message {
                fn from(message: $ty) -> Self {
                    Self::$variant(message)
                }
            }
        )+
    };
}

impl_from_channel! {
    MasterToSlave(MasterToSlaveMessage),
    SlaveToMaster(SlaveToMasterMessage),
    BackendToMaster(BackendToMasterMessage),
    MasterToBackend(MasterToBackendMessage),
    SlaveToBackend(SlaveToBackendMessage),
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::backend_to_master::{Control, Reset};
    use crate::master_to_slave::TdmaSync;
    use crate::master_to_backend::{DeviceInfo, DeviceListResponse};

    #[test]
    fn every_defined_pair_creates_a_message() {
        let defined: [(PacketId, &[u8]); 5] = [
            (PacketId::MasterToSlave, &[0, 1, 2]),
            (PacketId::SlaveToMaster, &[0, 1, 2, 3, 4]),
            (PacketId::SlaveToBackend, &[0, 1, 2]),
            (PacketId::BackendToMaster, &[0, 1, 2, 3, 4, 5, 6, 7, 8]),
            (PacketId::MasterToBackend, &[0, 1, 2, 3, 4, 5, 6, 8]),
        ];
        for (channel, ids) in defined {
            for &id in ids {
                let msg = create(channel.as_u8(), id).unwrap();
                assert_eq!(msg.packet_id(), channel);
                assert_eq!(msg.message_id(), id);
            }
        }
    }

    #[test]
    fn undefined_pairs_create_nothing() {
        for channel in PacketId::ALL {
            assert!(create(channel.as_u8(), 0xFF).is_none());
        }
        assert!(create(0x05, 0x00).is_none());
        assert!(create(PacketId::MasterToBackend.as_u8(), 0x07).is_none());
    }

    #[test]
    fn decode_reports_unknown_ids() {
        let err = decode(0x03, 0x07, &[0, 0]).unwrap_err();
        assert!(matches!(
            err,
            MessageError::UnknownMessage {
                packet_id: 0x03,
                message_id: 0x07
            }
        ));
        assert!(matches!(
            decode(0x09, 0x00, &[]).unwrap_err(),
            MessageError::UnknownChannel(0x09)
        ));
    }

    #[test]
    fn decode_round_trips_through_serialize() {
        let original = Message::from(MasterToBackendMessage::from(DeviceListResponse::new(
            vec![DeviceInfo {
                device_id: 42,
                short_id: 3,
                online: 1,
                ..Default::default()
            }],
        )));
        let body = original.serialize();
        let decoded = decode(0x03, original.message_id(), &body).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.type_name(), "Device List Response");
    }

    #[test]
    fn json_carries_channel_and_type() {
        let msg = Message::from(BackendToMasterMessage::from(Control { running_status: 1 }));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["channel"], "BackendToMaster");
        assert_eq!(json["message"]["type"], "Control");
    }

    /// Every message the registry can create, in (channel, id) order.
    fn defined_messages() -> Vec<Message> {
        PacketId::ALL
            .iter()
            .flat_map(|channel| (0..=u8::MAX).filter_map(move |id| create(channel.as_u8(), id)))
            .collect()
    }

    fn assert_round_trips(msg: &Message) {
        let body = msg.serialize();
        let decoded = decode(msg.packet_id().as_u8(), msg.message_id(), &body)
            .unwrap_or_else(|err| panic!("{} failed to decode: {err}", msg.type_name()));
        assert_eq!(&decoded, msg, "{} changed across a round trip", msg.type_name());
    }

    #[test]
    fn created_messages_report_their_id_and_a_unique_name() {
        for channel in PacketId::ALL {
            let mut names = std::collections::HashSet::new();
            for id in 0..=u8::MAX {
                let Some(msg) = create(channel.as_u8(), id) else {
                    continue;
                };
                assert_eq!(msg.packet_id(), channel);
                assert_eq!(msg.message_id(), id);
                assert!(!msg.type_name().is_empty());
                assert!(
                    names.insert(msg.type_name()),
                    "{channel} reuses {}",
                    msg.type_name()
                );
            }
        }
    }

    #[test]
    fn default_values_round_trip_on_every_channel() {
        let messages = defined_messages();
        assert_eq!(messages.len(), 3 + 5 + 3 + 9 + 8);
        for msg in &messages {
            assert_round_trips(msg);
        }
    }

    #[test]
    fn max_values_round_trip_on_every_channel() {
        // Enough 0xFF bytes for every fixed field, a full 65535-byte sized
        // block, and as many whole 0xFF records as fit.
        let body = vec![0xFF; 2 + usize::from(u16::MAX)];
        for template in defined_messages() {
            let msg = decode(template.packet_id().as_u8(), template.message_id(), &body)
                .unwrap_or_else(|err| panic!("{} rejected 0xFF body: {err}", template.type_name()));
            assert_round_trips(&msg);
        }
    }

    #[test]
    fn empty_record_lists_round_trip() {
        let sync = Message::from(MasterToSlaveMessage::from(TdmaSync {
            mode: 2,
            interval: u8::MAX,
            current_time: u64::MAX,
            start_time: 0,
            slots: Vec::new(),
        }));
        assert_round_trips(&sync);

        let reset = Message::from(BackendToMasterMessage::from(Reset::new(Vec::new())));
        assert_eq!(reset.serialize().as_ref(), &[0]);
        assert_round_trips(&reset);

        let devices = Message::from(MasterToBackendMessage::from(DeviceListResponse::new(
            Vec::new(),
        )));
        assert_round_trips(&devices);
    }

    proptest! {
        #[test]
        fn any_decodable_body_round_trips(
            channel in 0u8..5,
            id in 0u8..9,
            body in proptest::collection::vec(any::<u8>(), 0..128),
        ) {
            if let Ok(msg) = decode(channel, id, &body) {
                let again = decode(channel, id, &msg.serialize()).unwrap();
                prop_assert_eq!(again, msg);
            }
        }
    }
}
