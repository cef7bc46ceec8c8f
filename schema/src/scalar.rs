use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const TAG_FIXARRAY: u8 = 0x90;
pub const TAG_ARRAY16: u8 = 0xdc;
pub const TAG_ARRAY32: u8 = 0xdd;
pub const TAG_FALSE: u8 = 0xc2;
pub const TAG_TRUE: u8 = 0xc3;
pub const TAG_UINT8: u8 = 0xcc;
pub const TAG_UINT16: u8 = 0xcd;
pub const TAG_UINT32: u8 = 0xce;
pub const TAG_UINT64: u8 = 0xcf;
pub const TAG_FLOAT32: u8 = 0xca;
pub const TAG_FLOAT64: u8 = 0xcb;

/// Wire width of the trailing checksum item (a tagged `uint16`).
pub const CHECKSUM_WIDTH: u64 = 3;

/// The closed set of scalar types a message field may carry.
///
/// Every value on the wire is one tag byte followed by a fixed-size,
/// big-endian payload, so each type has a fixed wire width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Bool,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
}

impl ScalarType {
    pub const ALL: [ScalarType; 7] = [
        ScalarType::Bool,
        ScalarType::Uint8,
        ScalarType::Uint16,
        ScalarType::Uint32,
        ScalarType::Uint64,
        ScalarType::Float32,
        ScalarType::Float64,
    ];

    /// Looks up a type by its schema token (`"uint16"`, `"float64"`, ...).
    pub fn from_token(token: &str) -> Option<ScalarType> {
        ScalarType::ALL.iter().copied().find(|ty| ty.token() == token)
    }

    /// The schema token naming this type.
    pub fn token(self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Uint8 => "uint8",
            ScalarType::Uint16 => "uint16",
            ScalarType::Uint32 => "uint32",
            ScalarType::Uint64 => "uint64",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
        }
    }

    /// Payload bytes following the tag. Booleans live entirely in the tag.
    pub fn payload_width(self) -> u64 {
        match self {
            ScalarType::Bool => 0,
            ScalarType::Uint8 => 1,
            ScalarType::Uint16 => 2,
            ScalarType::Uint32 | ScalarType::Float32 => 4,
            ScalarType::Uint64 | ScalarType::Float64 => 8,
        }
    }

    /// Total bytes one value occupies on the wire: tag plus payload.
    pub fn wire_width(self) -> u64 {
        1 + self.payload_width()
    }

    /// Tag byte a decoder expects. For `Bool` this is the `false` tag; `true`
    /// is accepted as well.
    pub fn tag(self) -> u8 {
        match self {
            ScalarType::Bool => TAG_FALSE,
            ScalarType::Uint8 => TAG_UINT8,
            ScalarType::Uint16 => TAG_UINT16,
            ScalarType::Uint32 => TAG_UINT32,
            ScalarType::Uint64 => TAG_UINT64,
            ScalarType::Float32 => TAG_FLOAT32,
            ScalarType::Float64 => TAG_FLOAT64,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ScalarType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScalarType::from_token(s).ok_or_else(|| format!("unsupported type {:?}", s))
    }
}

/// Size class of the leading field-count prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderClass {
    Fixarray,
    Array16,
    Array32,
}

impl HeaderClass {
    /// Candidate classes in selection priority order.
    pub const ORDERED: [HeaderClass; 3] = [
        HeaderClass::Fixarray,
        HeaderClass::Array16,
        HeaderClass::Array32,
    ];

    /// Largest count representable by this class.
    pub fn max_count(self) -> u64 {
        match self {
            HeaderClass::Fixarray => 15,
            HeaderClass::Array16 => u16::MAX as u64,
            HeaderClass::Array32 => u32::MAX as u64,
        }
    }

    /// Bytes the header occupies on the wire.
    pub fn header_size(self) -> u64 {
        match self {
            HeaderClass::Fixarray => 1,
            HeaderClass::Array16 => 3,
            HeaderClass::Array32 => 5,
        }
    }

    /// Smallest class able to hold `count`, or `None` beyond `array32`.
    pub fn for_count(count: u64) -> Option<HeaderClass> {
        HeaderClass::ORDERED
            .iter()
            .copied()
            .find(|class| count <= class.max_count())
    }
}

impl fmt::Display for HeaderClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            HeaderClass::Fixarray => "fixarray",
            HeaderClass::Array16 => "array16",
            HeaderClass::Array32 => "array32",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_widths_match_catalog() {
        let widths: Vec<u64> = ScalarType::ALL.iter().map(|ty| ty.wire_width()).collect();
        assert_eq!(widths, vec![1, 2, 3, 5, 9, 5, 9]);
    }

    #[test]
    fn tokens_round_trip() {
        for ty in ScalarType::ALL {
            assert_eq!(ScalarType::from_token(ty.token()), Some(ty));
            assert_eq!(ty.to_string().parse::<ScalarType>(), Ok(ty));
        }
        assert_eq!(ScalarType::from_token("int32"), None);
        assert_eq!(ScalarType::from_token("Float32"), None);
    }

    #[test]
    fn header_class_boundaries() {
        assert_eq!(HeaderClass::for_count(0), Some(HeaderClass::Fixarray));
        assert_eq!(HeaderClass::for_count(15), Some(HeaderClass::Fixarray));
        assert_eq!(HeaderClass::for_count(16), Some(HeaderClass::Array16));
        assert_eq!(HeaderClass::for_count(65535), Some(HeaderClass::Array16));
        assert_eq!(HeaderClass::for_count(65536), Some(HeaderClass::Array32));
        assert_eq!(HeaderClass::for_count(4294967295), Some(HeaderClass::Array32));
        assert_eq!(HeaderClass::for_count(4294967296), None);
    }
}
