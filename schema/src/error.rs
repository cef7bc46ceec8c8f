use thiserror::Error;

/// Structural failure while reading a Microbuf message.
///
/// Decoding stops at the first of these; nothing after the reported offset is
/// inspected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("buffer truncated at offset {offset}: needed {needed} more byte(s)")]
    Truncated { offset: usize, needed: usize },

    #[error("unexpected tag 0x{found:02x} at offset {offset}, expected {expected}")]
    UnexpectedTag {
        offset:   usize,
        expected: &'static str,
        found:    u8,
    },

    #[error("header declares {found} field(s), expected {expected}")]
    CountMismatch { expected: u64, found: u64 },

    #[error("checksum mismatch: computed 0x{computed:04x}, stored 0x{stored:04x}")]
    ChecksumMismatch { computed: u16, stored: u16 },

    #[error("message must be exactly {expected} bytes, got {found}")]
    InvalidLength { expected: usize, found: usize },
}
