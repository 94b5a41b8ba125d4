//! Precomputed-bytes fast-path packet carriers (C4).
//!
//! `GetBytes` on both types returns the *complete* pre-framed wire bytes —
//! `VarInt(length) :: VarInt(id) :: payload` — ready to hand straight to the
//! transport. §4.4's write path treats both ordinals as "already framed,
//! forward verbatim"; §4.5 calls the per-version mapping "pre-framed bytes"
//! for the same reason. `PreparedPacket` is built once, outside the hot
//! path, by encoding a real packet at each of a set of target versions.

use std::collections::HashMap;

use anyhow::Result;

use crate::buffer::ByteBuffer;
use crate::packet::{AnyPacket, Packet, PacketSize};
use crate::registry::DirectionRegistry;
use crate::version::ProtocolVersion;

/// A packet whose wire bytes have been precomputed for one or more
/// versions. `encode`/`decode` are implemented only so it satisfies the
/// [`Packet`] contract uniformly; the pipe never calls them — it recognizes
/// `PreparedPacket` by ordinal and calls [`PreparedPacket::bytes`] instead.
#[derive(Debug, Clone, Default)]
pub struct PreparedPacket {
    by_version: HashMap<ProtocolVersion, Vec<u8>>,
}

impl PreparedPacket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes `packet` once per version in `versions` through `registry`,
    /// producing a `PreparedPacket` whose `bytes(version)` are returned
    /// verbatim on every subsequent write — the broadcast fast path.
    pub fn build<T: Packet + Clone>(
        packet: &T,
        versions: impl IntoIterator<Item = ProtocolVersion>,
        registry: &DirectionRegistry,
        long_packet_buffer_capacity: usize,
    ) -> Result<PreparedPacket> {
        let mut by_version = HashMap::new();
        for version in versions {
            let any = AnyPacket::new(packet.clone());
            let id = registry.id_by_type(version, any.type_id())?;
            let framed = crate::pipe::minecraft::frame_for_write(
                &any,
                version,
                id,
                long_packet_buffer_capacity,
            )?;
            by_version.insert(version, framed);
        }
        Ok(PreparedPacket { by_version })
    }

    /// The pre-framed bytes for `version`, if this packet was prepared for it.
    pub fn bytes(&self, version: ProtocolVersion) -> Option<&[u8]> {
        self.by_version.get(&version).map(Vec::as_slice)
    }

    pub fn insert(&mut self, version: ProtocolVersion, framed_bytes: Vec<u8>) {
        self.by_version.insert(version, framed_bytes);
    }
}

impl Packet for PreparedPacket {
    fn decode(_version: ProtocolVersion, buffer: &mut ByteBuffer) -> Result<Self> {
        let mut packet = PreparedPacket::new();
        packet.by_version.insert(ProtocolVersion::V1_12_2, buffer.as_bytes().to_vec());
        Ok(packet)
    }

    fn encode(&self, version: ProtocolVersion, buffer: &mut ByteBuffer) -> Result<()> {
        if let Some(bytes) = self.bytes(version) {
            buffer.write_bytes(bytes);
        }
        Ok(())
    }

    fn size(&self, version: ProtocolVersion) -> PacketSize {
        match self.bytes(version) {
            Some(bytes) => PacketSize::Known(bytes.len() as u32),
            None => PacketSize::Unknown,
        }
    }
}

/// A single opaque byte blob representing a complete frame. Doubles as the
/// pass-through carrier for unknown incoming packet ids (§4.4 read path
/// step 3): the pipe reconstitutes the whole frame's bytes and hands them
/// to a fresh `SingleVersionPreparedPacket` rather than failing.
#[derive(Debug, Clone, Default)]
pub struct SingleVersionPreparedPacket {
    frame: Vec<u8>,
}

impl SingleVersionPreparedPacket {
    pub fn from_frame(frame: Vec<u8>) -> Self {
        SingleVersionPreparedPacket { frame }
    }

    /// The complete framed bytes: `VarInt(length) :: VarInt(id) :: payload`.
    pub fn bytes(&self) -> &[u8] {
        &self.frame
    }
}

impl Packet for SingleVersionPreparedPacket {
    fn decode(_version: ProtocolVersion, buffer: &mut ByteBuffer) -> Result<Self> {
        Ok(SingleVersionPreparedPacket::from_frame(buffer.as_bytes().to_vec()))
    }

    fn encode(&self, _version: ProtocolVersion, buffer: &mut ByteBuffer) -> Result<()> {
        buffer.write_bytes(&self.frame);
        Ok(())
    }

    fn size(&self, _version: ProtocolVersion) -> PacketSize {
        PacketSize::Known(self.frame.len() as u32)
    }
}
