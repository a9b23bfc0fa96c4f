//! Fixed-width packet codec.
//!
//! Wire format (8 bytes, little-endian, no length prefix, no version byte):
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┐
//! │ id (2B)  │ chan (2B)│ kind (2B)│ tgt (2B) │
//! │ LE u16   │ LE u16   │ LE u16   │ LE u16   │
//! └──────────┴──────────┴──────────┴──────────┘
//! ```
//!
//! The codec is pure and stateless. Anything that is not exactly
//! [`PACKET_LEN`] bytes, or that carries an unknown kind code, is
//! rejected with a [`DecodeError`]; callers log and discard.

use core::fmt;

/// Size of an encoded [`Message`] on the wire.
pub const PACKET_LEN: usize = 8;

/// Protocol message kinds with their wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MessageKind {
    Ack = 0,
    Ping = 1,
    Pong = 2,
    Trigger = 3,
}

impl MessageKind {
    /// Wire code for this kind.
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Map a wire code back to a kind. `None` for anything outside 0–3.
    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::Ack),
            1 => Some(Self::Ping),
            2 => Some(Self::Pong),
            3 => Some(Self::Trigger),
            _ => None,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ack => write!(f, "ack"),
            Self::Ping => write!(f, "ping"),
            Self::Pong => write!(f, "pong"),
            Self::Trigger => write!(f, "trigger"),
        }
    }
}

/// The protocol's only entity.
///
/// `target` is the `id` of the message being acknowledged or replied to;
/// `0` means unsolicited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub id: u16,
    pub channel: u16,
    pub kind: MessageKind,
    pub target: u16,
}

impl Message {
    /// `true` when this message answers an earlier one.
    pub fn is_reply(&self) -> bool {
        self.target != 0
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{} ch={} target={}",
            self.kind, self.id, self.channel, self.target
        )
    }
}

/// Reasons a received buffer could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer was not exactly [`PACKET_LEN`] bytes (carries actual length).
    BadLength(usize),
    /// Kind field held an unknown code.
    BadKind(u16),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadLength(len) => {
                write!(f, "bad packet length {} (expected {})", len, PACKET_LEN)
            }
            Self::BadKind(code) => write!(f, "unknown message kind {}", code),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Encode a message into its 8-byte wire form.
pub fn encode(msg: &Message) -> [u8; PACKET_LEN] {
    let mut out = [0u8; PACKET_LEN];
    let fields = [msg.id, msg.channel, msg.kind.code(), msg.target];
    for (chunk, field) in out.chunks_exact_mut(2).zip(fields) {
        chunk.copy_from_slice(&field.to_le_bytes());
    }
    out
}

/// Decode an 8-byte wire packet.
pub fn decode(buf: &[u8]) -> Result<Message, DecodeError> {
    let raw: &[u8; PACKET_LEN] = buf
        .try_into()
        .map_err(|_| DecodeError::BadLength(buf.len()))?;

    let field = |i: usize| u16::from_le_bytes([raw[i * 2], raw[i * 2 + 1]]);

    let code = field(2);
    let kind = MessageKind::from_code(code).ok_or(DecodeError::BadKind(code))?;

    Ok(Message {
        id: field(0),
        channel: field(1),
        kind,
        target: field(3),
    })
}
