//! Version-conditional packet worked example (§6's illustrative table),
//! grounded directly on `original_source/src/protocol/packets/play/JoinGame.hpp`.
//!
//! The original embeds full dimension/biome/chat-type registry data inside
//! a single NBT tree; this keeps that shape (`registry_codec: Option<TreeNode>`)
//! rather than modeling dimension/biome semantics the codec has no business
//! interpreting (spec §1: "does not interpret packet semantics beyond what
//! decoding requires").

use anyhow::{anyhow, Result};

use crate::buffer::{ByteBuffer, DEFAULT_MAX_STRING_CHARS};
use crate::nbt::{self, TreeNode};
use crate::packet::{Packet, PacketSize};
use crate::version::ProtocolVersion;

const GAMEMODE_SPECTATOR: u8 = 3;
const GAMEMODE_SURVIVAL: u8 = 0;
const HARDCORE_BIT: u8 = 0x08;

#[derive(Debug, Clone, PartialEq)]
pub struct JoinGame {
    pub entity_id: i32,
    pub is_hardcore: bool,
    pub gamemode: u8,
    pub previous_gamemode: u8,
    pub level_names: Vec<String>,
    /// Present from 1.16.2 onward: dimension/biome/chat-type registry NBT.
    pub registry_codec: Option<TreeNode>,
    /// 1.16.2 ≤ version < 1.19 only: the joining dimension's own NBT tag,
    /// written separately from `registry_codec` (`JoinGame.hpp`'s
    /// `dimension`/`Dimension::FromNBT` field, not part of the registry
    /// container). Forwarded verbatim rather than interpreted — losing it
    /// would silently corrupt a proxied `JoinGame` in that version band.
    pub current_dimension: Option<TreeNode>,
    pub dimension_type: String,
    pub dimension_name: String,
    pub hashed_seed: i64,
    pub max_players: u32,
    pub view_distance: u32,
    pub simulation_distance: u32,
    pub reduced_debug_info: bool,
    pub show_respawn_screen: bool,
    pub is_debug: bool,
    pub is_flat: bool,
    /// 1.19+: optional (dimension name, block position as packed long).
    pub last_death_position: Option<(String, i64)>,
    pub difficulty: u8,
}

impl Packet for JoinGame {
    fn decode(version: ProtocolVersion, buffer: &mut ByteBuffer) -> Result<Self> {
        let entity_id = buffer.read_i32()?;

        let (is_hardcore, gamemode) = if version >= ProtocolVersion::V1_16_2 {
            (buffer.read_bool()?, buffer.read_u8()?)
        } else {
            let byte = buffer.read_u8()?;
            (byte & HARDCORE_BIT != 0, byte & !HARDCORE_BIT)
        };

        if version >= ProtocolVersion::V1_16_2 {
            let previous_gamemode = buffer.read_u8()?;
            let count = buffer.read_var_int()?;
            let mut level_names = Vec::with_capacity(count as usize);
            for _ in 0..count {
                level_names.push(buffer.read_string(DEFAULT_MAX_STRING_CHARS)?);
            }

            let registry_codec = nbt::read_nbt(buffer)?;

            let (current_dimension, dimension_type, dimension_name) = if version < ProtocolVersion::V1_19 {
                let current_dimension = nbt::read_nbt(buffer)?;
                let dimension_type = buffer.read_string(DEFAULT_MAX_STRING_CHARS)?;
                (Some(current_dimension), dimension_type, "world".to_string())
            } else {
                let dimension_type = buffer.read_string(DEFAULT_MAX_STRING_CHARS)?;
                let dimension_name = buffer.read_string(DEFAULT_MAX_STRING_CHARS)?;
                (None, dimension_type, dimension_name)
            };

            let hashed_seed = buffer.read_i64()?;
            let max_players = buffer.read_var_int()?;
            let view_distance = buffer.read_var_int()?;
            let simulation_distance = buffer.read_var_int()?;
            let reduced_debug_info = buffer.read_bool()?;
            let show_respawn_screen = buffer.read_bool()?;
            let is_debug = buffer.read_bool()?;
            let is_flat = buffer.read_bool()?;
            let last_death_position = if version >= ProtocolVersion::V1_19 && buffer.read_bool()? {
                Some((buffer.read_string(DEFAULT_MAX_STRING_CHARS)?, buffer.read_i64()?))
            } else {
                None
            };

            Ok(JoinGame {
                entity_id,
                is_hardcore,
                gamemode,
                previous_gamemode,
                level_names,
                registry_codec: Some(registry_codec),
                current_dimension,
                dimension_type,
                dimension_name,
                hashed_seed,
                max_players,
                view_distance,
                simulation_distance,
                reduced_debug_info,
                show_respawn_screen,
                is_debug,
                is_flat,
                last_death_position,
                difficulty: 0,
            })
        } else {
            let previous_gamemode = if gamemode == GAMEMODE_SPECTATOR { GAMEMODE_SURVIVAL } else { GAMEMODE_SPECTATOR };
            let legacy_dimension_id = buffer.read_i32()?;

            let difficulty = if version <= ProtocolVersion::V1_13_2 { buffer.read_u8()? } else { 0 };
            let hashed_seed = if version >= ProtocolVersion::V1_15 { buffer.read_i64()? } else { 0 };

            let max_players = buffer.read_u8()? as u32;
            let is_flat = buffer.read_string(16)? == "flat";

            let view_distance = if version >= ProtocolVersion::V1_14 { buffer.read_var_int()? } else { 10 };
            let simulation_distance = view_distance;

            let reduced_debug_info = buffer.read_bool()?;
            let show_respawn_screen = if version >= ProtocolVersion::V1_15 { buffer.read_bool()? } else { true };

            Ok(JoinGame {
                entity_id,
                is_hardcore,
                gamemode,
                previous_gamemode,
                level_names: vec!["world".to_string()],
                registry_codec: None,
                current_dimension: None,
                dimension_type: legacy_dimension_id.to_string(),
                dimension_name: "world".to_string(),
                hashed_seed,
                max_players,
                view_distance,
                simulation_distance,
                reduced_debug_info,
                show_respawn_screen,
                is_debug: false,
                is_flat,
                last_death_position: None,
                difficulty,
            })
        }
    }

    fn encode(&self, version: ProtocolVersion, buffer: &mut ByteBuffer) -> Result<()> {
        buffer.write_i32(self.entity_id);

        if version >= ProtocolVersion::V1_16_2 {
            buffer.write_bool(self.is_hardcore);
            buffer.write_u8(self.gamemode);
        } else {
            let byte = if self.is_hardcore && version >= ProtocolVersion::V1_13 {
                self.gamemode | HARDCORE_BIT
            } else {
                self.gamemode
            };
            buffer.write_u8(byte);
        }

        if version >= ProtocolVersion::V1_16_2 {
            buffer.write_u8(self.previous_gamemode);
            buffer.write_var_int(self.level_names.len() as u32);
            for name in &self.level_names {
                buffer.write_string(name);
            }

            let registry_codec = self.registry_codec.clone().unwrap_or_else(TreeNode::empty_compound);
            nbt::write_nbt(buffer, &registry_codec);

            if version < ProtocolVersion::V1_19 {
                let current_dimension = self.current_dimension.clone().unwrap_or_else(TreeNode::empty_compound);
                nbt::write_nbt(buffer, &current_dimension);
                buffer.write_string(&self.dimension_type);
            } else {
                buffer.write_string(&self.dimension_type);
                buffer.write_string(&self.dimension_name);
            }

            buffer.write_i64(self.hashed_seed);
            buffer.write_var_int(self.max_players);
            buffer.write_var_int(self.view_distance);
            buffer.write_var_int(self.simulation_distance);
            buffer.write_bool(self.reduced_debug_info);
            buffer.write_bool(self.show_respawn_screen);
            buffer.write_bool(self.is_debug);
            buffer.write_bool(self.is_flat);

            if version >= ProtocolVersion::V1_19 {
                buffer.write_bool(self.last_death_position.is_some());
                if let Some((dimension, position)) = &self.last_death_position {
                    buffer.write_string(dimension);
                    buffer.write_i64(*position);
                }
            }
        } else {
            let legacy_dimension_id: i32 = self.dimension_type.parse().map_err(|_| {
                anyhow!(
                    "cannot encode JoinGame at {version}: dimension_type {:?} is not a legacy numeric dimension id",
                    self.dimension_type
                )
            })?;
            buffer.write_i32(legacy_dimension_id);

            if version <= ProtocolVersion::V1_13_2 {
                buffer.write_u8(self.difficulty);
            }
            if version >= ProtocolVersion::V1_15 {
                buffer.write_i64(self.hashed_seed);
            }

            buffer.write_u8(self.max_players as u8);
            buffer.write_string(if self.is_flat { "flat" } else { "default" });

            if version >= ProtocolVersion::V1_14 {
                buffer.write_var_int(self.view_distance);
            }

            buffer.write_bool(self.reduced_debug_info);
            if version >= ProtocolVersion::V1_15 {
                buffer.write_bool(self.show_respawn_screen);
            }
        }

        Ok(())
    }

    fn size(&self, _version: ProtocolVersion) -> PacketSize {
        // Variable-length NBT and strings make this expensive to precompute
        // cheaply; the original returns `-1` (unknown) unconditionally too.
        PacketSize::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_modern() -> JoinGame {
        JoinGame {
            entity_id: 42,
            is_hardcore: false,
            gamemode: 0,
            previous_gamemode: 255,
            level_names: vec!["minecraft:overworld".to_string()],
            registry_codec: Some(TreeNode::Compound(vec![(
                "minecraft:dimension_type".to_string(),
                TreeNode::String("overworld".to_string()),
            )])),
            current_dimension: None,
            dimension_type: "minecraft:overworld".to_string(),
            dimension_name: "minecraft:overworld".to_string(),
            hashed_seed: 123456789,
            max_players: 20,
            view_distance: 10,
            simulation_distance: 10,
            reduced_debug_info: false,
            show_respawn_screen: true,
            is_debug: false,
            is_flat: false,
            last_death_position: None,
            difficulty: 0,
        }
    }

    #[test]
    fn round_trips_at_1_16_2() {
        let packet = sample_modern();
        let mut buf = ByteBuffer::with_capacity(256);
        packet.encode(ProtocolVersion::V1_16_2, &mut buf).unwrap();
        let mut read_buf = ByteBuffer::from_vec(buf.into_bytes());
        let decoded = JoinGame::decode(ProtocolVersion::V1_16_2, &mut read_buf).unwrap();
        assert_eq!(decoded.entity_id, packet.entity_id);
        assert_eq!(decoded.dimension_type, packet.dimension_type);
        assert_eq!(decoded.max_players, packet.max_players);
        assert_eq!(read_buf.readable_bytes(), 0);
    }

    #[test]
    fn preserves_current_dimension_tag_between_1_16_2_and_1_19() {
        let mut packet = sample_modern();
        packet.current_dimension = Some(TreeNode::Compound(vec![(
            "minecraft:fixed_time".to_string(),
            TreeNode::Long(6000),
        )]));

        let mut buf = ByteBuffer::with_capacity(256);
        packet.encode(ProtocolVersion::V1_18, &mut buf).unwrap();
        let mut read_buf = ByteBuffer::from_vec(buf.into_bytes());
        let decoded = JoinGame::decode(ProtocolVersion::V1_18, &mut read_buf).unwrap();
        assert_eq!(decoded.current_dimension, packet.current_dimension);
        assert_eq!(read_buf.readable_bytes(), 0);
    }

    #[test]
    fn round_trips_at_1_19_with_last_death_position() {
        let mut packet = sample_modern();
        packet.last_death_position = Some(("minecraft:overworld".to_string(), 0x0102030405060708));

        let mut buf = ByteBuffer::with_capacity(256);
        packet.encode(ProtocolVersion::V1_19, &mut buf).unwrap();
        let mut read_buf = ByteBuffer::from_vec(buf.into_bytes());
        let decoded = JoinGame::decode(ProtocolVersion::V1_19, &mut read_buf).unwrap();
        assert_eq!(decoded.last_death_position, packet.last_death_position);
        assert_eq!(read_buf.readable_bytes(), 0);
    }

    #[test]
    fn different_versions_produce_different_bytes() {
        let packet = sample_modern();
        let mut buf_1_16 = ByteBuffer::with_capacity(256);
        packet.encode(ProtocolVersion::V1_16_2, &mut buf_1_16).unwrap();

        let mut buf_1_15 = ByteBuffer::with_capacity(256);
        let mut legacy = packet.clone();
        legacy.max_players = 20;
        legacy.dimension_type = "0".to_string();
        legacy.registry_codec = None;
        legacy.level_names = vec!["world".to_string()];
        legacy.encode(ProtocolVersion::V1_15, &mut buf_1_15).unwrap();

        assert_ne!(buf_1_16.as_bytes(), buf_1_15.as_bytes());
    }
}
