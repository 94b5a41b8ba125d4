//! Integration tests exercising the pipe end-to-end, one per scenario class
//! the crate's design is meant to handle: VarInt edges, fixed-size packets,
//! unknown-id pass-through, unknown-size packets, frame/packet size
//! mismatches, and a version-conditional packet switching wire shape.

use std::sync::Arc;

use gateway_codec::packet::handshake::{Handshake, HandshakeNextState};
use gateway_codec::packet::join_game::JoinGame;
use gateway_codec::packet::keep_alive::KeepAlive;
use gateway_codec::{
    ByteBuffer, CodecError, DirectionRegistryBuilder, PacketDirection, PacketRegistry, PipeConfig,
    MinecraftFramedBytePacketPipe, ProtocolVersion, TreeNode,
};

fn test_registry() -> PacketRegistry {
    let mut serverbound = DirectionRegistryBuilder::new();
    serverbound
        .register_range::<Handshake>(ProtocolVersion::ALL.iter().copied(), 0x00)
        .unwrap();
    serverbound
        .register_range::<KeepAlive>(ProtocolVersion::ALL.iter().copied(), 0x10)
        .unwrap();

    let mut clientbound = DirectionRegistryBuilder::new();
    clientbound
        .register_range::<KeepAlive>(ProtocolVersion::ALL.iter().copied(), 0x21)
        .unwrap();
    clientbound
        .register_range::<JoinGame>(ProtocolVersion::ALL.iter().copied(), 0x28)
        .unwrap();

    PacketRegistry::new(serverbound.build(), clientbound.build())
}

fn pipe(version: ProtocolVersion, config: PipeConfig) -> MinecraftFramedBytePacketPipe {
    MinecraftFramedBytePacketPipe::new(config, Arc::new(test_registry()), version)
}

/// S1: VarInt boundary values survive the full frame round trip, not just
/// the unit-level buffer codec.
#[test]
fn s1_var_int_edges_round_trip_through_frames() {
    let pipe = pipe(
        ProtocolVersion::V1_19,
        PipeConfig { reader_direction: PacketDirection::Serverbound, writer_direction: PacketDirection::Serverbound, ..Default::default() },
    );

    for protocol_version in [0u32, 127, 128, 16383, 16384, 2097151] {
        let packet = Handshake {
            protocol_version,
            server_address: "example.com".to_string(),
            server_port: 25565,
            next_state: HandshakeNextState::Status,
        };
        let frame = pipe.write_packet(&packet.into()).unwrap();

        let mut input = frame;
        let decoded = pipe.read_packet(&mut input).unwrap().expect("full frame was buffered");
        let handshake = decoded.downcast_ref::<Handshake>().unwrap();
        assert_eq!(handshake.protocol_version, protocol_version);
        assert!(input.is_empty());
    }
}

/// S2: KeepAlive's wire bytes are the exact fixed sequence the frame format
/// promises — VarInt(9) length, VarInt(0x21) id, 8 big-endian payload bytes.
#[test]
fn s2_keep_alive_exact_wire_bytes() {
    let pipe = pipe(ProtocolVersion::V1_19, PipeConfig::default());
    let packet = KeepAlive { id: 0x0102030405060708 };
    let frame = pipe.write_packet(&packet.into()).unwrap();
    assert_eq!(frame, vec![0x09, 0x21, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
}

/// S3: a packet id with no registered constructor is reconstructed
/// byte-identically rather than rejected, so a proxy can forward it.
#[test]
fn s3_unknown_packet_id_passes_through_unchanged() {
    let pipe = pipe(
        ProtocolVersion::V1_19,
        PipeConfig { reader_direction: PacketDirection::Serverbound, ..Default::default() },
    );

    let mut body = ByteBuffer::with_capacity(8);
    body.write_var_int(0x7f); // unregistered id
    body.write_bytes(&[9, 9, 9, 9]);
    let body_bytes = body.into_bytes();

    let mut frame = ByteBuffer::with_capacity(body_bytes.len() + 1);
    frame.write_var_int(body_bytes.len() as u32);
    frame.write_bytes(&body_bytes);
    let original_frame = frame.into_bytes();

    let mut input = original_frame.clone();
    let decoded = pipe.read_packet(&mut input).unwrap().expect("full frame was buffered");
    assert!(input.is_empty());

    let forwarded = pipe.write_packet(&decoded).unwrap();
    assert_eq!(forwarded, original_frame);
}

/// S4: a packet whose `size` is `Unknown` still round-trips, exercising the
/// scratch-buffer write path instead of the known-size path.
#[test]
fn s4_unknown_size_packet_round_trips() {
    let pipe = pipe(
        ProtocolVersion::V1_19,
        PipeConfig { writer_direction: PacketDirection::Clientbound, reader_direction: PacketDirection::Clientbound, ..Default::default() },
    );

    let packet = JoinGame {
        entity_id: 7,
        is_hardcore: false,
        gamemode: 0,
        previous_gamemode: 255,
        level_names: vec!["minecraft:overworld".to_string()],
        registry_codec: Some(TreeNode::empty_compound()),
        current_dimension: None,
        dimension_type: "minecraft:overworld".to_string(),
        dimension_name: "minecraft:overworld".to_string(),
        hashed_seed: 42,
        max_players: 20,
        view_distance: 10,
        simulation_distance: 10,
        reduced_debug_info: false,
        show_respawn_screen: true,
        is_debug: false,
        is_flat: false,
        last_death_position: None,
        difficulty: 0,
    };

    let mut frame = pipe.write_packet(&packet.clone().into()).unwrap();
    let decoded = pipe.read_packet(&mut frame).unwrap().expect("full frame was buffered");
    let join_game = decoded.downcast_ref::<JoinGame>().unwrap();
    assert_eq!(join_game.entity_id, packet.entity_id);
    assert_eq!(join_game.dimension_name, packet.dimension_name);
}

/// S5: a constructor that doesn't consume exactly the declared body bytes
/// is a fatal `InvalidPacketSize`, never a silent truncation or overrun.
#[test]
fn s5_frame_body_size_mismatch_is_fatal() {
    let pipe = pipe(
        ProtocolVersion::V1_19,
        PipeConfig { reader_direction: PacketDirection::Serverbound, ..Default::default() },
    );

    // KeepAlive (0x10) always consumes exactly 8 bytes; pad the body with a
    // trailing byte so the frame declares more than the packet will read.
    let mut body = ByteBuffer::with_capacity(16);
    body.write_var_int(0x10);
    body.write_i64(1);
    body.write_u8(0xff);
    let body_bytes = body.into_bytes();

    let mut frame = ByteBuffer::with_capacity(body_bytes.len() + 2);
    frame.write_var_int(body_bytes.len() as u32);
    frame.write_bytes(&body_bytes);
    let mut input = frame.into_bytes();

    let err = pipe.read_packet(&mut input).unwrap_err();
    assert!(matches!(err.downcast_ref::<CodecError>(), Some(CodecError::InvalidPacketSize { .. })));
}

/// S6: JoinGame's wire shape genuinely differs across the version-anchor
/// table; the same logical packet produces different bytes pre/post 1.16.2.
#[test]
fn s6_join_game_switches_shape_across_version_anchor() {
    let modern = JoinGame {
        entity_id: 1,
        is_hardcore: false,
        gamemode: 0,
        previous_gamemode: 255,
        level_names: vec!["world".to_string()],
        registry_codec: Some(TreeNode::empty_compound()),
        current_dimension: None,
        dimension_type: "minecraft:overworld".to_string(),
        dimension_name: "minecraft:overworld".to_string(),
        hashed_seed: 0,
        max_players: 10,
        view_distance: 8,
        simulation_distance: 8,
        reduced_debug_info: false,
        show_respawn_screen: true,
        is_debug: false,
        is_flat: false,
        last_death_position: None,
        difficulty: 0,
    };
    let mut legacy = modern.clone();
    legacy.dimension_type = "0".to_string();
    legacy.registry_codec = None;

    let pipe_modern = pipe(
        ProtocolVersion::V1_16_2,
        PipeConfig { writer_direction: PacketDirection::Clientbound, ..Default::default() },
    );
    let pipe_legacy = pipe(
        ProtocolVersion::V1_15,
        PipeConfig { writer_direction: PacketDirection::Clientbound, ..Default::default() },
    );

    let frame_modern = pipe_modern.write_packet(&modern.into()).unwrap();
    let frame_legacy = pipe_legacy.write_packet(&legacy.into()).unwrap();
    assert_ne!(frame_modern, frame_legacy);
}
