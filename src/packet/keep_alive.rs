//! Representative fixed-size packet; worked example for §8 scenario S2.

use anyhow::Result;

use crate::buffer::ByteBuffer;
use crate::packet::{Packet, PacketSize};
use crate::version::ProtocolVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeepAlive {
    pub id: i64,
}

impl Packet for KeepAlive {
    fn decode(_version: ProtocolVersion, buffer: &mut ByteBuffer) -> Result<Self> {
        Ok(KeepAlive { id: buffer.read_i64()? })
    }

    fn encode(&self, _version: ProtocolVersion, buffer: &mut ByteBuffer) -> Result<()> {
        buffer.write_i64(self.id);
        Ok(())
    }

    fn size(&self, _version: ProtocolVersion) -> PacketSize {
        PacketSize::Known(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let packet = KeepAlive { id: 0x0102030405060708 };
        let mut buf = ByteBuffer::with_capacity(8);
        packet.encode(ProtocolVersion::V1_19, &mut buf).unwrap();
        assert_eq!(buf.as_bytes(), &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);

        let mut read_buf = ByteBuffer::from_vec(buf.into_bytes());
        let decoded = KeepAlive::decode(ProtocolVersion::V1_19, &mut read_buf).unwrap();
        assert_eq!(decoded, packet);
    }
}
