//! Body encoding primitives shared by every message type.

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{MessageError, Result};

/// A message body with a fixed id on its channel.
pub trait MessageBody: Sized + Default {
    /// Id of this message within its channel.
    const MESSAGE_ID: u8;
    /// Display name, e.g. `"Ping Request"`.
    const TYPE_NAME: &'static str;

    /// Append the body to `dst`.
    fn write_body(&self, dst: &mut BytesMut);

    /// Read the body from `reader`.
    fn read_body(reader: &mut BodyReader<'_>) -> Result<Self>;

    /// Encode the body into a standalone buffer.
    fn encode(&self) -> Bytes {
        let mut dst = BytesMut::new();
        self.write_body(&mut dst);
        dst.freeze()
    }

    /// Decode a body. Trailing bytes beyond what the layout reads are ignored.
    fn decode(body: &[u8]) -> Result<Self> {
        Self::read_body(&mut BodyReader::new(Self::TYPE_NAME, body))
    }
}

/// Bounds-checked little-endian reader over a message body.
#[derive(Debug)]
pub struct BodyReader<'a> {
    buf: &'a [u8],
    message: &'static str,
}

impl<'a> BodyReader<'a> {
    /// Read `buf` as the body of `message` (used in error reports).
    pub fn new(message: &'static str, buf: &'a [u8]) -> Self {
        Self { buf, message }
    }

    /// Bytes not yet read.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn need(&self, needed: usize) -> Result<()> {
        if self.buf.remaining() < needed {
            return Err(MessageError::Truncated {
                message: self.message,
                needed,
                available: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn u8(&mut self) -> Result<u8> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn u16(&mut self) -> Result<u16> {
        self.need(2)?;
        Ok(self.buf.get_u16_le())
    }

    pub fn u32(&mut self) -> Result<u32> {
        self.need(4)?;
        Ok(self.buf.get_u32_le())
    }

    pub fn u64(&mut self) -> Result<u64> {
        self.need(8)?;
        Ok(self.buf.get_u64_le())
    }

    /// Read exactly `len` raw bytes.
    pub fn bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        self.need(len)?;
        let out = self.buf[..len].to_vec();
        self.buf.advance(len);
        Ok(out)
    }

    /// Read fixed-size records for as long as a whole record remains.
    ///
    /// A trailing partial record is left unread.
    pub fn records<T>(
        &mut self,
        record_size: usize,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(self.remaining() / record_size.max(1));
        while record_size > 0 && self.remaining() >= record_size {
            out.push(read(self)?);
        }
        Ok(out)
    }
}

/// Generates a per-channel message enum over a set of [`MessageBody`] types.
macro_rules! channel_messages {
    (
        $(#[$meta:meta])*
        $name:ident on $packet:expr => {
            $($variant:ident($ty:ty)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        #[serde(tag = "type")]
        pub enum $name {
            $($variant($ty)),+
        }

        impl $name {
            /// Channel these messages travel on.
            pub const PACKET_ID: whts_frame::PacketId = $packet;

            /// Default-valued message for `message_id`, or `None` if the id is not defined.
            pub fn create(message_id: u8) -> Option<Self> {
                match message_id {
                    $(id if id == <$ty as $crate::wire::MessageBody>::MESSAGE_ID => {
                        Some(Self::$variant(<$ty>::default()))
                    })+
                    _ => None,
                }
            }

            /// Decode the body of message `message_id`.
            pub fn deserialize(message_id: u8, body: &[u8]) -> $crate::error::Result<Self> {
                match message_id {
                    $(id if id == <$ty as $crate::wire::MessageBody>::MESSAGE_ID => {
                        <$ty as $crate::wire::MessageBody>::decode(body).map(Self::$variant)
                    })+
                    _ => Err($crate::error::MessageError::UnknownMessage {
                        packet_id: Self::PACKET_ID.as_u8(),
                        message_id,
                    }),
                }
            }

            /// Id of the carried message, unique within this channel.
            pub fn message_id(&self) -> u8 {
                match self {
                    $(Self::$variant(_) => <$ty as $crate::wire::MessageBody>::MESSAGE_ID),+
                }
            }

            /// Human-readable name of the carried message, e.g. `"Control"`.
            pub fn type_name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => <$ty as $crate::wire::MessageBody>::TYPE_NAME),+
                }
            }

            /// Encode the message body (without message id or addressing prefix).
            pub fn serialize(&self) -> bytes::Bytes {
                match self {
                    $(Self::$variant(m) => $crate::wire::MessageBody::encode(m)),+
                }
            }
        }

        $(
            impl From<$ty> for $name {
                fn from(message: $ty) -> Self {
                    Self::$variant(message)
                }
            }
        )+
    };
}

pub(crate) use channel_messages;
