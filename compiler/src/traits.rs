use microbuf_schema::DecodeError;

/// Implemented by every struct the Rust emitter generates.
/// We require `Sized` so that `Self` can be constructed.
pub trait MicrobufMessage: Sized {
    /// Message name as written in the schema.
    const NAME: &'static str;
    const VERSION: i64;
    /// Exact encoded size in bytes, checksum included.
    const SIZE: usize;

    fn encode(&self) -> Vec<u8>;

    /// Decodes a buffer that must be exactly `SIZE` bytes long.
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError>;
}
