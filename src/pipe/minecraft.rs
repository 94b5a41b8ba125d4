//! Specialization wiring the packet registry and `Packet` contract into the
//! frame codec (C8). Grounded directly on
//! `MinecraftFramedBytePacketPipe.cpp`'s `ReadPacket`/`WriteWithoutDeletion`
//! in `original_source/` — this module keeps that read/write shape but
//! replaces its raw-pointer `ByteBuffer*` ownership with owned `Vec<u8>`s
//! and ordinary `Result`s instead of a throw-from-`what()` exception.

use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::buffer::ByteBuffer;
use crate::error::CodecError;
use crate::packet::{ordinal_of, AnyPacket, Packet, PacketSize, PreparedPacket, SingleVersionPreparedPacket};
use crate::pipe::{FrameResult, FramedBytePacketPipe};
use crate::registry::{DirectionRegistry, PacketDirection, PacketRegistry};
use crate::version::ProtocolVersion;

/// Construction-time options (§6 "Configuration options").
#[derive(Debug, Clone, Copy)]
pub struct PipeConfig {
    pub max_read_size: u32,
    pub reader_direction: PacketDirection,
    pub writer_direction: PacketDirection,
    pub long_packet_buffer_capacity: u32,
}

impl Default for PipeConfig {
    fn default() -> Self {
        PipeConfig {
            max_read_size: 1 << 21,
            reader_direction: PacketDirection::Serverbound,
            writer_direction: PacketDirection::Clientbound,
            long_packet_buffer_capacity: 4096,
        }
    }
}

/// Per-connection framed packet codec: one per connection, mutated only by
/// that connection's task (§5 scheduling model — no internal locking).
pub struct MinecraftFramedBytePacketPipe {
    base: FramedBytePacketPipe,
    version: ProtocolVersion,
    direction_registry: Arc<PacketRegistry>,
    reader_registry: Arc<DirectionRegistry>,
    writer_registry: Arc<DirectionRegistry>,
    reader_direction: PacketDirection,
    writer_direction: PacketDirection,
    long_packet_buffer_capacity: usize,
}

impl MinecraftFramedBytePacketPipe {
    pub fn new(config: PipeConfig, initial_registry: Arc<PacketRegistry>, version: ProtocolVersion) -> Self {
        let reader_registry = initial_registry.for_direction(config.reader_direction);
        let writer_registry = initial_registry.for_direction(config.writer_direction);
        MinecraftFramedBytePacketPipe {
            base: FramedBytePacketPipe::new(config.max_read_size),
            version,
            direction_registry: initial_registry,
            reader_registry,
            writer_registry,
            reader_direction: config.reader_direction,
            writer_direction: config.writer_direction,
            long_packet_buffer_capacity: config.long_packet_buffer_capacity as usize,
        }
    }

    pub fn registry(&self) -> &Arc<PacketRegistry> {
        &self.direction_registry
    }

    /// Replaces the active registry. Both memoized projections are
    /// recomputed immediately, preserving the invariant that
    /// `reader_registry == registry.for_direction(reader_direction)` (and
    /// likewise for the writer) after this call returns. Calling this while
    /// a read or write on the same pipe is in progress is undefined
    /// behavior per §4.4/§5 — callers own that synchronization.
    pub fn set_registry(&mut self, new_registry: Arc<PacketRegistry>) {
        self.reader_registry = new_registry.for_direction(self.reader_direction);
        self.writer_registry = new_registry.for_direction(self.writer_direction);
        self.direction_registry = new_registry;
        tracing::debug!(version = %self.version, "packet registry swapped");
    }

    pub fn protocol_version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn set_protocol_version(&mut self, version: ProtocolVersion) {
        self.version = version;
    }

    /// Attempts to decode one packet out of buffered input.
    ///
    /// Returns `Ok(None)` when not enough bytes are buffered yet (NeedMore);
    /// the caller should append more transport bytes and retry. Any `Err`
    /// is fatal to the connection per §5/§7 — the stream is poisoned and
    /// should be closed, never retried.
    pub fn read_packet(&self, input: &mut Vec<u8>) -> Result<Option<AnyPacket>> {
        let frame = match self.base.try_read_frame(input)? {
            FrameResult::Frame(body) => body,
            FrameResult::NeedMore => return Ok(None),
        };

        let frame_len = frame.len() as u32;
        let mut buffer = ByteBuffer::from_vec(frame);
        let id = buffer.read_var_int()?;
        let id_bytes = ByteBuffer::var_int_bytes(id) as u32;

        match self.reader_registry.constructor(self.version, id) {
            Some(ctor) => {
                let before = buffer.readable_bytes();
                let packet = ctor(self.version, &mut buffer)?;
                let consumed = (before - buffer.readable_bytes()) as u32;
                let expected = frame_len - id_bytes;
                if consumed != expected {
                    return Err(CodecError::InvalidPacketSize { expected, consumed }.into());
                }
                tracing::trace!(id, version = %self.version, "decoded packet");
                Ok(Some(packet))
            }
            None => {
                // Unknown packet id is not an error (§7): reconstruct the
                // whole frame byte-for-byte so it can be forwarded untouched.
                tracing::trace!(id, version = %self.version, "unknown packet id, passing through");
                let remaining = (frame_len - id_bytes) as usize;
                let mut reconstructed = ByteBuffer::with_capacity(buffer.single_capacity());
                reconstructed.write_var_int(frame_len);
                reconstructed.write_var_int(id);
                reconstructed.write_bytes_from(&mut buffer, remaining)?;
                let packet = SingleVersionPreparedPacket::from_frame(reconstructed.into_bytes());
                Ok(Some(AnyPacket::new(packet)))
            }
        }
    }

    /// Serializes `packet` for the wire: the two fast paths return a
    /// precomputed buffer verbatim; the generic path sizes and writes a
    /// fresh one.
    pub fn write_packet(&self, packet: &AnyPacket) -> Result<Vec<u8>> {
        if packet.ordinal() == ordinal_of::<PreparedPacket>() {
            let prepared = packet
                .downcast_ref::<PreparedPacket>()
                .ok_or_else(|| anyhow!("ordinal identified a PreparedPacket but downcast failed"))?;
            let bytes = prepared
                .bytes(self.version)
                .ok_or_else(|| anyhow!("PreparedPacket has no bytes prepared for {}", self.version))?;
            return Ok(bytes.to_vec());
        }

        if packet.ordinal() == ordinal_of::<SingleVersionPreparedPacket>() {
            let prepared = packet
                .downcast_ref::<SingleVersionPreparedPacket>()
                .ok_or_else(|| anyhow!("ordinal identified a SingleVersionPreparedPacket but downcast failed"))?;
            return Ok(prepared.bytes().to_vec());
        }

        let id = self.writer_registry.id_by_type(self.version, packet.type_id())?;
        frame_for_write(packet, self.version, id, self.long_packet_buffer_capacity)
    }
}

/// Shared by [`MinecraftFramedBytePacketPipe::write_packet`]'s generic path
/// and [`crate::packet::prepared::PreparedPacket::build`], which needs the
/// exact same framing to precompute bytes for a set of versions.
pub fn frame_for_write(
    packet: &AnyPacket,
    version: ProtocolVersion,
    id: u32,
    long_packet_buffer_capacity: usize,
) -> Result<Vec<u8>> {
    match packet.size(version) {
        PacketSize::Known(size) => {
            let id_bytes = ByteBuffer::var_int_bytes(id) as u32;
            let body = size + id_bytes;
            let mut buf = ByteBuffer::with_capacity(body as usize + ByteBuffer::var_int_bytes(body));
            buf.write_var_int(body);
            buf.write_var_int(id);
            let before = buf.written_len();
            packet.encode(version, &mut buf)?;
            let written = (buf.written_len() - before) as u32;
            if written != size {
                return Err(CodecError::EncodeOverflow { promised: size, written: written as usize }.into());
            }
            Ok(buf.into_bytes())
        }
        PacketSize::Unknown => {
            let mut scratch = ByteBuffer::with_capacity(long_packet_buffer_capacity);
            packet.encode(version, &mut scratch)?;
            let payload_len = scratch.written_len() as u32;
            let id_bytes = ByteBuffer::var_int_bytes(id) as u32;
            let body = payload_len + id_bytes;
            let mut buf = ByteBuffer::with_capacity(body as usize + ByteBuffer::var_int_bytes(body));
            buf.write_var_int(body);
            buf.write_var_int(id);
            buf.write_bytes(scratch.as_bytes());
            // scratch is dropped here on every exit path, success or not.
            Ok(buf.into_bytes())
        }
    }
}
