//! Framed packet codec for a version-aware Minecraft protocol proxy.
//!
//! This crate covers the core's responsibility only: turning a byte stream
//! into discrete, typed packets and back, for a registry of packet types
//! that differs by protocol version and connection direction. It does not
//! open sockets, schedule connections, or interpret packet payloads beyond
//! what decoding requires — those are a proxy's job, built on top of this.
//!
//! The pieces, in dependency order:
//!
//! - [`buffer`] — cursor-based binary reader/writer, VarInt and string codecs
//! - [`nbt`] — the black-box nested tag format some payloads embed
//! - [`version`] — the closed, identity-ordered set of supported wire versions
//! - [`packet`] — the `Packet` contract, ordinals, and the `AnyPacket` sum type
//! - [`registry`] — per-version, per-direction id-to-constructor mappings
//! - [`pipe`] — length-delimited framing, specialized in [`pipe::minecraft`]
//!   into the full read/write packet pipeline
//! - [`error`] — the error types the above raise

pub mod buffer;
pub mod error;
pub mod nbt;
pub mod packet;
pub mod pipe;
pub mod registry;
pub mod version;

pub use buffer::ByteBuffer;
pub use error::{CodecError, RegistryError};
pub use nbt::TreeNode;
pub use packet::{ordinal_of, AnyPacket, Packet, PacketSize, PreparedPacket, SingleVersionPreparedPacket};
pub use pipe::minecraft::{frame_for_write, MinecraftFramedBytePacketPipe, PipeConfig};
pub use pipe::{FrameResult, FramedBytePacketPipe};
pub use registry::{DirectionRegistry, DirectionRegistryBuilder, PacketDirection, PacketRegistry};
pub use version::ProtocolVersion;
