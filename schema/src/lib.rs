//! This is the wire-level runtime for Microbuf messages: the closed catalog of
//! scalar types, byte buffers for the tagged big-endian encoding, and the
//! CRC-16 checksum. Code generated by the Microbuf compiler links against it.
//!
//! A message is a single array: a size-classed count header followed by one
//! tagged item per scalar, optionally followed by a `uint16` checksum item.
//!
//! ```
//! use microbuf_schema::*;
//!
//! let mut bb = ByteBufferMut::new();
//! bb.write_array_header(2);
//! bb.write_uint8(42);
//! bb.write_float32(0.5);
//! bb.write_checksum();
//! let bytes = bb.data();
//! assert_eq!(bytes.len(), 1 + 2 + 5 + 3);
//!
//! let mut bb = ByteBuffer::new(&bytes);
//! bb.read_array_header(2).unwrap();
//! assert_eq!(bb.read_uint8(), Ok(42));
//! assert_eq!(bb.read_float32(), Ok(0.5));
//! assert_eq!(bb.verify_checksum(), Ok(()));
//! ```

pub mod bb;
pub mod crc;
pub mod error;
pub mod scalar;
pub mod value;

pub use bb::*;
pub use crc::*;
pub use error::*;
pub use scalar::*;
pub use value::*;
