//! Minimal NBT codec.
//!
//! Spec §9 treats NBT as "a peer of ByteBuffer in dependency order ... a
//! black box with `ReadNBT(buffer) -> TreeNode` and `WriteNBT(buffer,
//! TreeNode)` that respect buffer cursors", deferring its full spec to a
//! companion document. This implements exactly enough of the real format
//! (named root compound, the scalar/string/list/compound tag kinds
//! `JoinGame`'s registry payload actually uses) to round-trip through
//! [`crate::buffer::ByteBuffer`] — it does not attempt the complete tag
//! catalog (arrays of int/long/byte, floats) since nothing in this crate's
//! packet set needs them.

use anyhow::{anyhow, Result};

use crate::buffer::ByteBuffer;
use crate::error::CodecError;

const TAG_END: u8 = 0;
const TAG_BYTE: u8 = 1;
const TAG_SHORT: u8 = 2;
const TAG_INT: u8 = 3;
const TAG_LONG: u8 = 4;
const TAG_STRING: u8 = 8;
const TAG_LIST: u8 = 9;
const TAG_COMPOUND: u8 = 10;

/// A decoded NBT value. Compounds preserve field insertion order since NBT
/// field order is observable on re-encode.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    String(String),
    List(Vec<TreeNode>),
    Compound(Vec<(String, TreeNode)>),
}

impl TreeNode {
    pub fn empty_compound() -> TreeNode {
        TreeNode::Compound(Vec::new())
    }

    pub fn get<'a>(&'a self, key: &str) -> Option<&'a TreeNode> {
        match self {
            TreeNode::Compound(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    fn tag_id(&self) -> u8 {
        match self {
            TreeNode::Byte(_) => TAG_BYTE,
            TreeNode::Short(_) => TAG_SHORT,
            TreeNode::Int(_) => TAG_INT,
            TreeNode::Long(_) => TAG_LONG,
            TreeNode::String(_) => TAG_STRING,
            TreeNode::List(_) => TAG_LIST,
            TreeNode::Compound(_) => TAG_COMPOUND,
        }
    }
}

fn read_name(buffer: &mut ByteBuffer) -> Result<String> {
    let len = buffer.read_u16()? as usize;
    let bytes = buffer.read_raw_bytes(len)?;
    String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8.into())
}

fn write_name(buffer: &mut ByteBuffer, name: &str) {
    buffer.write_u16(name.len() as u16);
    buffer.write_bytes(name.as_bytes());
}

fn read_payload(buffer: &mut ByteBuffer, tag_id: u8) -> Result<TreeNode> {
    match tag_id {
        TAG_BYTE => Ok(TreeNode::Byte(buffer.read_i8()?)),
        TAG_SHORT => Ok(TreeNode::Short(buffer.read_i16()?)),
        TAG_INT => Ok(TreeNode::Int(buffer.read_i32()?)),
        TAG_LONG => Ok(TreeNode::Long(buffer.read_i64()?)),
        TAG_STRING => {
            let len = buffer.read_u16()? as usize;
            let bytes = buffer.read_raw_bytes(len)?;
            Ok(TreeNode::String(String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?))
        }
        TAG_LIST => {
            let element_id = buffer.read_u8()?;
            let count = buffer.read_i32()?.max(0);
            let mut items = Vec::with_capacity(count as usize);
            for _ in 0..count {
                items.push(read_payload(buffer, element_id)?);
            }
            Ok(TreeNode::List(items))
        }
        TAG_COMPOUND => {
            let mut fields = Vec::new();
            loop {
                let child_id = buffer.read_u8()?;
                if child_id == TAG_END {
                    break;
                }
                let name = read_name(buffer)?;
                let value = read_payload(buffer, child_id)?;
                fields.push((name, value));
            }
            Ok(TreeNode::Compound(fields))
        }
        other => Err(anyhow!("unsupported nbt tag id {other}")),
    }
}

fn write_payload(buffer: &mut ByteBuffer, node: &TreeNode) {
    match node {
        TreeNode::Byte(v) => buffer.write_i8(*v),
        TreeNode::Short(v) => buffer.write_i16(*v),
        TreeNode::Int(v) => buffer.write_i32(*v),
        TreeNode::Long(v) => buffer.write_i64(*v),
        TreeNode::String(s) => {
            buffer.write_u16(s.len() as u16);
            buffer.write_bytes(s.as_bytes());
        }
        TreeNode::List(items) => {
            let element_id = items.first().map(TreeNode::tag_id).unwrap_or(TAG_END);
            buffer.write_u8(element_id);
            buffer.write_i32(items.len() as i32);
            for item in items {
                write_payload(buffer, item);
            }
        }
        TreeNode::Compound(fields) => {
            for (name, value) in fields {
                buffer.write_u8(value.tag_id());
                write_name(buffer, name);
                write_payload(buffer, value);
            }
            buffer.write_u8(TAG_END);
        }
    }
}

/// Reads a named root tag (tag id byte, name, payload) from `buffer`,
/// advancing its read cursor past the whole value.
pub fn read_nbt(buffer: &mut ByteBuffer) -> Result<TreeNode> {
    let tag_id = buffer.read_u8()?;
    let _root_name = read_name(buffer)?;
    read_payload(buffer, tag_id)
}

/// Writes `node` as an anonymous-named root tag, the counterpart to
/// [`read_nbt`].
pub fn write_nbt(buffer: &mut ByteBuffer, node: &TreeNode) {
    buffer.write_u8(node.tag_id());
    write_name(buffer, "");
    write_payload(buffer, node);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_round_trip() {
        let tree = TreeNode::Compound(vec![
            ("minecraft:dimension_type".to_string(), TreeNode::String("overworld".to_string())),
            ("view".to_string(), TreeNode::Int(12)),
            (
                "value".to_string(),
                TreeNode::List(vec![TreeNode::Long(1), TreeNode::Long(2), TreeNode::Long(3)]),
            ),
        ]);

        let mut buf = ByteBuffer::with_capacity(128);
        write_nbt(&mut buf, &tree);
        let mut read_buf = ByteBuffer::from_vec(buf.into_bytes());
        let decoded = read_nbt(&mut read_buf).unwrap();
        assert_eq!(decoded, tree);
        assert_eq!(read_buf.readable_bytes(), 0);
    }

    #[test]
    fn empty_compound_round_trip() {
        let tree = TreeNode::empty_compound();
        let mut buf = ByteBuffer::with_capacity(16);
        write_nbt(&mut buf, &tree);
        let mut read_buf = ByteBuffer::from_vec(buf.into_bytes());
        assert_eq!(read_nbt(&mut read_buf).unwrap(), tree);
    }
}
