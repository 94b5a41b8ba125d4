//! Protocol version identifiers.
//!
//! The teacher crate's `ClientVersion` (`protocol/client_version.rs`) is a
//! `major.minor.patch.build` tuple compared numerically, because Ultima
//! Online client builds really are numerically ordered. Minecraft wire
//! versions are not: comparisons must follow the closed, named set's
//! declaration order, never a parse of the version string. This is modeled
//! as a C-like enum so `Ord`/`PartialOrd` fall out of declaration order for
//! free and no numeric parsing is possible.

use std::fmt;

/// A protocol version from a closed, totally ordered set of supported
/// Minecraft wire versions. Comparison is by identity order (declaration
/// order below), never by parsing the version string.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(u8)]
pub enum ProtocolVersion {
    V1_12_2,
    V1_13,
    V1_13_2,
    V1_14,
    V1_15,
    V1_16,
    V1_16_2,
    V1_17,
    V1_18,
    V1_19,
    V1_19_4,
    V1_20,
}

impl ProtocolVersion {
    /// All supported versions in ascending identity order.
    pub const ALL: &'static [ProtocolVersion] = &[
        ProtocolVersion::V1_12_2,
        ProtocolVersion::V1_13,
        ProtocolVersion::V1_13_2,
        ProtocolVersion::V1_14,
        ProtocolVersion::V1_15,
        ProtocolVersion::V1_16,
        ProtocolVersion::V1_16_2,
        ProtocolVersion::V1_17,
        ProtocolVersion::V1_18,
        ProtocolVersion::V1_19,
        ProtocolVersion::V1_19_4,
        ProtocolVersion::V1_20,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ProtocolVersion::V1_12_2 => "1.12.2",
            ProtocolVersion::V1_13 => "1.13",
            ProtocolVersion::V1_13_2 => "1.13.2",
            ProtocolVersion::V1_14 => "1.14",
            ProtocolVersion::V1_15 => "1.15",
            ProtocolVersion::V1_16 => "1.16",
            ProtocolVersion::V1_16_2 => "1.16.2",
            ProtocolVersion::V1_17 => "1.17",
            ProtocolVersion::V1_18 => "1.18",
            ProtocolVersion::V1_19 => "1.19",
            ProtocolVersion::V1_19_4 => "1.19.4",
            ProtocolVersion::V1_20 => "1.20",
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_order_not_numeric() {
        // 1.9 would sort after 1.12 numerically-by-minor but this set has no
        // 1.9; the point under test is that comparisons never re-derive
        // order from the string, they use the enum's declared order.
        assert!(ProtocolVersion::V1_13 < ProtocolVersion::V1_13_2);
        assert!(ProtocolVersion::V1_13_2 < ProtocolVersion::V1_14);
        assert!(ProtocolVersion::V1_16 < ProtocolVersion::V1_16_2);
        assert!(ProtocolVersion::V1_16_2 < ProtocolVersion::V1_19);
    }
}
