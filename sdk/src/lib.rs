//! microbuf
//!
//! This crate provides runtime support for working with Microbuf-encoded data.
//!
//! - `MicrobufMessage` trait (re-exported from compiler), implemented by
//!   generated structs
//! - The byte buffers and `DecodeError` that generated code is written against
//! - A schema-driven codec for messages without generated code, including
//!   rendering decoded messages as JSON

pub mod codec;

pub use codec::{decode_message, decode_to_json, encode_message, values_from_json};
pub use microbuf_compiler::error::MicrobufError;
pub use microbuf_compiler::traits::MicrobufMessage;
pub use microbuf_compiler::{compile_layout, compile_schema, LayoutPlan, MessageSpec};
pub use microbuf_schema::{crc16_aug_ccitt, ByteBuffer, ByteBufferMut, DecodeError, ScalarType, Value};

pub mod traits {
    pub use microbuf_compiler::traits::MicrobufMessage;
}

pub mod error {
    pub use microbuf_compiler::error::MicrobufError;
    pub use microbuf_schema::DecodeError;
}
