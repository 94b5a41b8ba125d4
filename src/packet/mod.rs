//! Packet capability set and the closed-sum runtime representation (C3).
//!
//! The teacher crate (`protocol/mod.rs` + `protocol/any.rs`) realizes "closed
//! sum of packet variants, dispatched through an ordinal" with a hand-rolled
//! vtable (`PacketRegistration`) and a fixed-size inline buffer filled via
//! `transmute`/`MaybeUninit`, so `AnyPacket` never allocates. That's UB-
//! adjacent machinery this repo does not carry over: per design note §9
//! ("implementers may realize this via … trait/interface objects"), the same
//! shape is built from a boxed trait object instead. One allocation per
//! decoded packet is an acceptable trade against removing every unsafe block
//! the original used to avoid it.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use once_cell::sync::OnceCell;

use crate::buffer::ByteBuffer;
use crate::version::ProtocolVersion;

pub mod join_game;
pub mod keep_alive;
pub mod handshake;
pub mod prepared;

pub use prepared::{PreparedPacket, SingleVersionPreparedPacket};

/// Result of `Packet::size`: either a cheaply-known byte count, or
/// "not cheaply computable, serialize into a scratch buffer to find out".
///
/// Spec §9 flags the original's `-1`-as-`u32::MAX` sentinel as something to
/// model explicitly rather than overload; this is that model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketSize {
    Known(u32),
    Unknown,
}

/// The per-packet-type encode/decode/size/ordinal contract (C3).
pub trait Packet: fmt::Debug + Send + Sync + 'static {
    /// Constructs a value of this type from its payload (id already consumed).
    fn decode(version: ProtocolVersion, buffer: &mut ByteBuffer) -> Result<Self>
    where
        Self: Sized;

    /// Writes this value's payload (id is written by the caller).
    fn encode(&self, version: ProtocolVersion, buffer: &mut ByteBuffer) -> Result<()>;

    /// The byte length `encode` will produce at `version`, if cheaply known.
    fn size(&self, version: ProtocolVersion) -> PacketSize;

    /// Startup-assigned numeric tag identifying this packet variant at
    /// runtime; unrelated to its on-wire id. Assigned lazily on first call
    /// and memoized — see [`ordinal_of`].
    fn ordinal(&self) -> u32
    where
        Self: Sized,
    {
        ordinal_of::<Self>()
    }
}

/// Process-wide monotonic ordinal counter plus the per-type assignment it
/// hands out. A type's ordinal is fixed on first request and never changes,
/// satisfying "ordinals and registries are initialized once at startup and
/// thereafter treated as immutable" as long as nothing calls `ordinal_of`
/// concurrently with connection I/O — it is always called well before, via
/// packet construction or registry population.
static NEXT_ORDINAL: AtomicU32 = AtomicU32::new(0);
static ASSIGNED_ORDINALS: OnceCell<Mutex<HashMap<TypeId, u32>>> = OnceCell::new();

/// Returns the ordinal for `T`, assigning one from the global counter the
/// first time `T` is seen.
pub fn ordinal_of<T: 'static>() -> u32 {
    let map = ASSIGNED_ORDINALS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = map.lock().expect("ordinal registry poisoned");
    *guard
        .entry(TypeId::of::<T>())
        .or_insert_with(|| NEXT_ORDINAL.fetch_add(1, Ordering::SeqCst))
}

/// Type-erased packet value: the sum-type arm every decoded or
/// about-to-be-sent packet travels in through the registry and pipe.
pub struct AnyPacket(Box<dyn ErasedPacket>);

trait ErasedPacket: fmt::Debug + Send + Sync {
    fn ordinal_dyn(&self) -> u32;
    fn size_dyn(&self, version: ProtocolVersion) -> PacketSize;
    fn encode_dyn(&self, version: ProtocolVersion, buffer: &mut ByteBuffer) -> Result<()>;
    fn as_any(&self) -> &dyn Any;
    fn type_id_dyn(&self) -> TypeId;
}

impl<T: Packet> ErasedPacket for T {
    fn ordinal_dyn(&self) -> u32 {
        Packet::ordinal(self)
    }

    fn size_dyn(&self, version: ProtocolVersion) -> PacketSize {
        Packet::size(self, version)
    }

    fn encode_dyn(&self, version: ProtocolVersion, buffer: &mut ByteBuffer) -> Result<()> {
        Packet::encode(self, version, buffer)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_id_dyn(&self) -> TypeId {
        TypeId::of::<T>()
    }
}

impl AnyPacket {
    pub fn new<T: Packet>(packet: T) -> Self {
        AnyPacket(Box::new(packet))
    }

    pub fn ordinal(&self) -> u32 {
        self.0.ordinal_dyn()
    }

    pub fn size(&self, version: ProtocolVersion) -> PacketSize {
        self.0.size_dyn(version)
    }

    pub fn encode(&self, version: ProtocolVersion, buffer: &mut ByteBuffer) -> Result<()> {
        self.0.encode_dyn(version, buffer)
    }

    pub fn downcast_ref<T: Packet>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn type_id(&self) -> TypeId {
        self.0.type_id_dyn()
    }
}

impl fmt::Debug for AnyPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl<T: Packet> From<T> for AnyPacket {
    fn from(packet: T) -> Self {
        AnyPacket::new(packet)
    }
}
