//! Error types for the codec. Mirrors the teacher crate's style: small,
//! `Display`/`Error`-implementing types that callers fold into `anyhow::Error`
//! at the boundary rather than a single catch-all enum with `thiserror`.

use std::fmt;

/// Fatal-to-connection failures raised while framing or decoding a packet.
///
/// None of these carry a dangling pointer or any other unsafe construct —
/// each variant owns its text and context directly.
#[derive(Debug, Clone)]
pub enum CodecError {
    /// The declared frame body length exceeds the pipe's `max_read_size`.
    FrameTooLarge { declared: u32, max: u32 },
    /// A VarInt did not terminate within 5 bytes.
    MalformedVarInt,
    /// A length-prefixed string was not valid UTF-8.
    InvalidUtf8,
    /// A decoded string exceeded the configured max character count.
    StringTooLong { len: usize, max: usize },
    /// A packet's `read` consumed a different number of bytes than the frame declared.
    InvalidPacketSize { expected: u32, consumed: u32 },
    /// A packet's `write` produced more bytes than its `size` promised.
    EncodeOverflow { promised: u32, written: usize },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::FrameTooLarge { declared, max } => {
                write!(f, "frame body length {declared} exceeds max read size {max}")
            }
            CodecError::MalformedVarInt => write!(f, "varint exceeded 5 bytes without a terminator"),
            CodecError::InvalidUtf8 => write!(f, "string payload was not valid utf-8"),
            CodecError::StringTooLong { len, max } => {
                write!(f, "string of {len} characters exceeds max of {max}")
            }
            CodecError::InvalidPacketSize { expected, consumed } => {
                write!(f, "invalid packet size: expected {expected} bytes, consumed {consumed}")
            }
            CodecError::EncodeOverflow { promised, written } => {
                write!(f, "packet wrote {written} bytes but promised size {promised}")
            }
        }
    }
}

impl std::error::Error for CodecError {}

/// Startup-only registration failures. Kept distinct from [`CodecError`]
/// because, per the concurrency model, they can only ever occur before any
/// connection is served.
#[derive(Debug, Clone)]
pub enum RegistryError {
    /// Two packet constructors were registered at the same `(version, id)`.
    DuplicateId { id: u32 },
    /// The same packet type was registered twice for one version.
    DuplicateType { type_name: &'static str },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateId { id } => write!(f, "duplicate registration for packet id {id:#x}"),
            RegistryError::DuplicateType { type_name } => {
                write!(f, "duplicate registration for packet type {type_name}")
            }
        }
    }
}

impl std::error::Error for RegistryError {}
