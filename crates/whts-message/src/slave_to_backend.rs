//! Slave→Backend messages: raw test results.

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use tracing::warn;
use whts_frame::PacketId;

use crate::error::Result;
use crate::wire::{channel_messages, BodyReader, MessageBody};

pub const CONDUCTION_DATA: u8 = 0x00;
pub const RESISTANCE_DATA: u8 = 0x01;
pub const CLIP_DATA: u8 = 0x02;

/// Largest data block a single Conduction or Resistance Data body can carry.
pub const MAX_DATA_LEN: usize = u16::MAX as usize;

/// Write a u16 length and the data. Anything past [`MAX_DATA_LEN`] is dropped.
fn write_sized(data: &[u8], dst: &mut BytesMut) {
    let len = data.len().min(MAX_DATA_LEN);
    if len < data.len() {
        warn!(
            size = data.len(),
            max = MAX_DATA_LEN,
            "data block truncated to the u16 length field"
        );
    }
    dst.put_u16_le(len as u16);
    dst.put_slice(&data[..len]);
}

fn read_sized(r: &mut BodyReader<'_>) -> Result<Vec<u8>> {
    let len = r.u16()?;
    r.bytes(usize::from(len))
}

/// Conduction test result bits, as sampled by the slave.
///
/// `data` is length-prefixed with a u16; at most [`MAX_DATA_LEN`] bytes are
/// encoded, the rest is dropped. Packed into a frame, the payload limit of
/// 65535 bytes is hit first and packing fails with `PayloadTooLarge`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConductionData {
    pub data: Vec<u8>,
}

impl MessageBody for ConductionData {
    const MESSAGE_ID: u8 = CONDUCTION_DATA;
    const TYPE_NAME: &'static str = "Conduction Data";

    fn write_body(&self, dst: &mut BytesMut) {
        write_sized(&self.data, dst);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            data: read_sized(r)?,
        })
    }
}

/// Resistance test results. Same length limit as [`ConductionData`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResistanceData {
    pub data: Vec<u8>,
}

impl MessageBody for ResistanceData {
    const MESSAGE_ID: u8 = RESISTANCE_DATA;
    const TYPE_NAME: &'static str = "Resistance Data";

    fn write_body(&self, dst: &mut BytesMut) {
        write_sized(&self.data, dst);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            data: read_sized(r)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipData {
    pub clip_data: u16,
}

impl MessageBody for ClipData {
    const MESSAGE_ID: u8 = CLIP_DATA;
    const TYPE_NAME: &'static str = "Clip Data";

    fn write_body(&self, dst: &mut BytesMut) {
        dst.put_u16_le(self.clip_data);
    }

    fn read_body(r: &mut BodyReader<'_>) -> Result<Self> {
        Ok(Self {
            clip_data: r.u16()?,
        })
    }
}

channel_messages! {
    /// Every message a Slave reports to the Backend.
    SlaveToBackendMessage on PacketId::SlaveToBackend => {
        ConductionData(ConductionData),
        ResistanceData(ResistanceData),
        ClipData(ClipData),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MessageError;

    #[test]
    fn length_prefixed_data_layout() {
        let msg = ConductionData {
            data: vec![0xAA, 0xBB, 0xCC],
        };
        let body = msg.encode();
        assert_eq!(body.as_ref(), &[3, 0, 0xAA, 0xBB, 0xCC]);
        assert_eq!(ConductionData::decode(&body).unwrap(), msg);
    }

    #[test]
    fn oversized_data_is_cut_to_length_field() {
        let msg = ConductionData {
            data: vec![7; MAX_DATA_LEN + 10],
        };
        let body = msg.encode();
        assert_eq!(&body[..2], &[0xFF, 0xFF]);
        assert_eq!(body.len(), 2 + MAX_DATA_LEN);

        let decoded = ConductionData::decode(&body).unwrap();
        assert_eq!(decoded.data.len(), MAX_DATA_LEN);
    }

    #[test]
    fn short_data_is_rejected() {
        let err = ResistanceData::decode(&[4, 0, 1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            MessageError::Truncated {
                needed: 4,
                available: 3,
                ..
            }
        ));
    }

    #[test]
    fn extra_trailing_bytes_are_ignored() {
        let msg = ResistanceData::decode(&[2, 0, 7, 8, 9, 9]).unwrap();
        assert_eq!(msg.data, vec![7, 8]);
    }

    #[test]
    fn empty_data_round_trips() {
        let body = ConductionData::default().encode();
        assert_eq!(body.as_ref(), &[0, 0]);
        assert!(ConductionData::decode(&body).unwrap().data.is_empty());
    }

    #[test]
    fn clip_data_round_trips() {
        let msg = SlaveToBackendMessage::from(ClipData { clip_data: 0xFFFF });
        let decoded = SlaveToBackendMessage::deserialize(CLIP_DATA, &msg.serialize()).unwrap();
        assert_eq!(decoded, msg);
        assert!(SlaveToBackendMessage::create(0xFF).is_none());
    }
}
