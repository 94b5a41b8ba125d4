//! Version-aware packet registries (C5, C6).
//!
//! Grounded on the same shape the pack's `minecrevy_protocol::registry`
//! module uses for its per-`ProtocolVersion` `Packets<S>` maps: a `TypeId`-
//! keyed inverse map alongside a forward map, built once through a builder
//! and then treated as read-only. The teacher crate doesn't need this
//! (Ultima Online ids are a flat `u8` with no per-version remapping), so
//! this module is grounded on that pack file rather than on `yewoh`.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::buffer::ByteBuffer;
use crate::error::RegistryError;
use crate::packet::{AnyPacket, Packet};
use crate::version::ProtocolVersion;

/// Which half of a registry pair a pipe's reader or writer is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketDirection {
    Serverbound,
    Clientbound,
}

type Constructor = fn(ProtocolVersion, &mut ByteBuffer) -> Result<AnyPacket>;

fn construct<T: Packet>(version: ProtocolVersion, buffer: &mut ByteBuffer) -> Result<AnyPacket> {
    Ok(AnyPacket::new(T::decode(version, buffer)?))
}

/// For a fixed direction, the mapping from `(version, id)` to a packet
/// constructor, and its inverse from `(version, type)` to numeric id.
///
/// Populated at startup through [`DirectionRegistryBuilder`], then immutable
/// for the lifetime of every connection that references it (§4.4's
/// "registry swap" replaces the whole `Arc`/reference, it never mutates one
/// in place).
#[derive(Debug, Default)]
pub struct DirectionRegistry {
    by_id: HashMap<(ProtocolVersion, u32), (TypeId, Constructor, &'static str)>,
    by_type: HashMap<(ProtocolVersion, TypeId), u32>,
}

impl DirectionRegistry {
    /// Looks up the constructor registered for `(version, id)`, if any.
    pub fn constructor(&self, version: ProtocolVersion, id: u32) -> Option<Constructor> {
        self.by_id.get(&(version, id)).map(|(_, ctor, _)| *ctor)
    }

    /// The numeric id registered for `packet`'s concrete type at `version`.
    /// Must succeed for every packet the application actually constructs and
    /// hands to the write path — an error here means a packet type was
    /// never registered for this direction/version, which is an
    /// application bug, not a wire condition.
    pub fn id_by_type(&self, version: ProtocolVersion, type_id: TypeId) -> Result<u32> {
        self.by_type
            .get(&(version, type_id))
            .copied()
            .ok_or_else(|| anyhow!("packet type has no registered id at {version} for this direction"))
    }
}

/// Builds a [`DirectionRegistry`], rejecting duplicate `(version, id)` or
/// `(version, type)` registrations.
#[derive(Debug, Default)]
pub struct DirectionRegistryBuilder {
    by_id: HashMap<(ProtocolVersion, u32), (TypeId, Constructor, &'static str)>,
    by_type: HashMap<(ProtocolVersion, TypeId), u32>,
}

impl DirectionRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` at a single `(version, id)` pair.
    pub fn register<T: Packet>(&mut self, version: ProtocolVersion, id: u32) -> Result<&mut Self, RegistryError> {
        let type_id = TypeId::of::<T>();
        if self.by_id.contains_key(&(version, id)) {
            return Err(RegistryError::DuplicateId { id });
        }
        if self.by_type.contains_key(&(version, type_id)) {
            return Err(RegistryError::DuplicateType { type_name: type_name::<T>() });
        }

        self.by_id.insert((version, id), (type_id, construct::<T>, type_name::<T>()));
        self.by_type.insert((version, type_id), id);
        Ok(self)
    }

    /// Registers `T` at `id` across every version in `versions` — the common
    /// case where a packet's id is stable across a contiguous version range.
    pub fn register_range<T: Packet>(
        &mut self,
        versions: impl IntoIterator<Item = ProtocolVersion>,
        id: u32,
    ) -> Result<&mut Self, RegistryError> {
        for version in versions {
            self.register::<T>(version, id)?;
        }
        Ok(self)
    }

    pub fn build(self) -> DirectionRegistry {
        DirectionRegistry {
            by_id: self.by_id,
            by_type: self.by_type,
        }
    }
}

/// A pair of [`DirectionRegistry`]s keyed by [`PacketDirection`] (C6). May be
/// swapped atomically on a pipe, e.g. when a connection transitions between
/// protocol phases. Each half is `Arc`-wrapped so a pipe can memoize its
/// reader/writer projections (cheap clone) rather than re-resolving the
/// direction on every call.
#[derive(Debug, Default, Clone)]
pub struct PacketRegistry {
    serverbound: Arc<DirectionRegistry>,
    clientbound: Arc<DirectionRegistry>,
}

impl PacketRegistry {
    pub fn new(serverbound: DirectionRegistry, clientbound: DirectionRegistry) -> Self {
        PacketRegistry {
            serverbound: Arc::new(serverbound),
            clientbound: Arc::new(clientbound),
        }
    }

    pub fn for_direction(&self, direction: PacketDirection) -> Arc<DirectionRegistry> {
        match direction {
            PacketDirection::Serverbound => self.serverbound.clone(),
            PacketDirection::Clientbound => self.clientbound.clone(),
        }
    }
}
