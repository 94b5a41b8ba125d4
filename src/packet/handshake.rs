//! Representative serverbound packet with VarInt and string fields —
//! the first packet of every connection, always size-known.

use anyhow::anyhow;
use anyhow::Result;

use crate::buffer::{ByteBuffer, DEFAULT_MAX_STRING_CHARS};
use crate::packet::{Packet, PacketSize};
use crate::version::ProtocolVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeNextState {
    Status,
    Login,
}

impl HandshakeNextState {
    fn as_var_int(self) -> u32 {
        match self {
            HandshakeNextState::Status => 1,
            HandshakeNextState::Login => 2,
        }
    }

    fn from_var_int(value: u32) -> Result<Self> {
        match value {
            1 => Ok(HandshakeNextState::Status),
            2 => Ok(HandshakeNextState::Login),
            other => Err(anyhow!("invalid handshake next state {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub protocol_version: u32,
    pub server_address: String,
    pub server_port: u16,
    pub next_state: HandshakeNextState,
}

impl Packet for Handshake {
    fn decode(_version: ProtocolVersion, buffer: &mut ByteBuffer) -> Result<Self> {
        let protocol_version = buffer.read_var_int()?;
        let server_address = buffer.read_string(DEFAULT_MAX_STRING_CHARS)?;
        let server_port = buffer.read_u16()?;
        let next_state = HandshakeNextState::from_var_int(buffer.read_var_int()?)?;
        Ok(Handshake { protocol_version, server_address, server_port, next_state })
    }

    fn encode(&self, _version: ProtocolVersion, buffer: &mut ByteBuffer) -> Result<()> {
        buffer.write_var_int(self.protocol_version);
        buffer.write_string(&self.server_address);
        buffer.write_u16(self.server_port);
        buffer.write_var_int(self.next_state.as_var_int());
        Ok(())
    }

    fn size(&self, _version: ProtocolVersion) -> PacketSize {
        let len = ByteBuffer::var_int_bytes(self.protocol_version)
            + ByteBuffer::var_int_bytes(self.server_address.len() as u32)
            + self.server_address.len()
            + 2
            + ByteBuffer::var_int_bytes(self.next_state.as_var_int());
        PacketSize::Known(len as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_and_size_contract() {
        let packet = Handshake {
            protocol_version: 763,
            server_address: "play.example.com".to_string(),
            server_port: 25565,
            next_state: HandshakeNextState::Login,
        };

        let mut buf = ByteBuffer::with_capacity(32);
        packet.encode(ProtocolVersion::V1_19_4, &mut buf).unwrap();
        let PacketSize::Known(expected) = packet.size(ProtocolVersion::V1_19_4) else {
            panic!("handshake size must be known");
        };
        assert_eq!(buf.written_len() as u32, expected);

        let mut read_buf = ByteBuffer::from_vec(buf.into_bytes());
        let decoded = Handshake::decode(ProtocolVersion::V1_19_4, &mut read_buf).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn rejects_invalid_next_state() {
        let mut buf = ByteBuffer::with_capacity(8);
        buf.write_var_int(763);
        buf.write_string("host");
        buf.write_u16(25565);
        buf.write_var_int(99);
        let mut read_buf = ByteBuffer::from_vec(buf.into_bytes());
        assert!(Handshake::decode(ProtocolVersion::V1_19_4, &mut read_buf).is_err());
    }
}
