use crate::crc::crc16_aug_ccitt;
use crate::error::DecodeError;
use crate::scalar::*;
use crate::value::Value;

/// A Microbuf byte buffer meant for reading.
///
/// Every read checks the tag byte before touching the payload and fails on
/// the first mismatch, so a decoder built on it never reads past a broken
/// field.
///
/// ```
/// let mut bb = microbuf_schema::ByteBuffer::new(&[0x92, 0xc3, 0xcd, 0x01, 0x2c]);
/// assert_eq!(bb.read_array_header(2), Ok(()));
/// assert_eq!(bb.read_bool(), Ok(true));
/// assert_eq!(bb.read_uint16(), Ok(300));
/// ```
///
pub struct ByteBuffer<'a> {
    data: &'a [u8],
    index: usize,
}

impl<'a> ByteBuffer<'a> {
    /// Create a new ByteBuffer that wraps the provided byte slice. The lifetime
    /// of the returned ByteBuffer must not outlive the lifetime of the byte
    /// slice.
    pub fn new(data: &[u8]) -> ByteBuffer {
        ByteBuffer { data, index: 0 }
    }

    /// Retrieves the underlying byte slice.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Retrieves the current index into the underlying byte slice. This starts
    /// off as 0 and ends up as `self.data().len()` when everything has been
    /// read.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Try to read a raw byte starting at the current index.
    pub fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let [byte] = self.take::<1>()?;
        Ok(byte)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let remaining = self.data.len().saturating_sub(self.index);
        if remaining < N {
            return Err(DecodeError::Truncated {
                offset: self.index,
                needed: N - remaining,
            });
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.index..self.index + N]);
        self.index += N;
        Ok(out)
    }

    fn expect_tag(&mut self, tag: u8, expected: &'static str) -> Result<(), DecodeError> {
        let offset = self.index;
        let found = self.read_byte()?;
        if found != tag {
            return Err(DecodeError::UnexpectedTag { offset, expected, found });
        }
        Ok(())
    }

    /// Read the leading array header and check that it declares exactly
    /// `expected` items using the smallest size class able to hold them.
    pub fn read_array_header(&mut self, expected: u64) -> Result<(), DecodeError> {
        let offset = self.index;
        let tag = self.read_byte()?;
        let found = match HeaderClass::for_count(expected) {
            Some(HeaderClass::Fixarray) if tag & 0xf0 == TAG_FIXARRAY => (tag & 0x0f) as u64,
            Some(HeaderClass::Array16) if tag == TAG_ARRAY16 => {
                u16::from_be_bytes(self.take::<2>()?) as u64
            }
            Some(HeaderClass::Array32) if tag == TAG_ARRAY32 => {
                u32::from_be_bytes(self.take::<4>()?) as u64
            }
            Some(class) => {
                return Err(DecodeError::UnexpectedTag {
                    offset,
                    expected: match class {
                        HeaderClass::Fixarray => "fixarray header",
                        HeaderClass::Array16 => "array16 header",
                        HeaderClass::Array32 => "array32 header",
                    },
                    found: tag,
                })
            }
            None => {
                return Err(DecodeError::CountMismatch {
                    expected,
                    found: 0,
                })
            }
        };
        if found != expected {
            return Err(DecodeError::CountMismatch { expected, found });
        }
        Ok(())
    }

    /// Try to read a boolean. Only the two boolean tags are accepted.
    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        let offset = self.index;
        match self.read_byte()? {
            TAG_FALSE => Ok(false),
            TAG_TRUE => Ok(true),
            found => Err(DecodeError::UnexpectedTag {
                offset,
                expected: "bool",
                found,
            }),
        }
    }

    pub fn read_uint8(&mut self) -> Result<u8, DecodeError> {
        self.expect_tag(TAG_UINT8, "uint8")?;
        Ok(u8::from_be_bytes(self.take::<1>()?))
    }

    pub fn read_uint16(&mut self) -> Result<u16, DecodeError> {
        self.expect_tag(TAG_UINT16, "uint16")?;
        Ok(u16::from_be_bytes(self.take::<2>()?))
    }

    pub fn read_uint32(&mut self) -> Result<u32, DecodeError> {
        self.expect_tag(TAG_UINT32, "uint32")?;
        Ok(u32::from_be_bytes(self.take::<4>()?))
    }

    pub fn read_uint64(&mut self) -> Result<u64, DecodeError> {
        self.expect_tag(TAG_UINT64, "uint64")?;
        Ok(u64::from_be_bytes(self.take::<8>()?))
    }

    pub fn read_float32(&mut self) -> Result<f32, DecodeError> {
        self.expect_tag(TAG_FLOAT32, "float32")?;
        Ok(f32::from_be_bytes(self.take::<4>()?))
    }

    pub fn read_float64(&mut self) -> Result<f64, DecodeError> {
        self.expect_tag(TAG_FLOAT64, "float64")?;
        Ok(f64::from_be_bytes(self.take::<8>()?))
    }

    /// Read one value of the given scalar type.
    pub fn read_scalar(&mut self, ty: ScalarType) -> Result<Value, DecodeError> {
        Ok(match ty {
            ScalarType::Bool => Value::Bool(self.read_bool()?),
            ScalarType::Uint8 => Value::UInt8(self.read_uint8()?),
            ScalarType::Uint16 => Value::UInt16(self.read_uint16()?),
            ScalarType::Uint32 => Value::UInt32(self.read_uint32()?),
            ScalarType::Uint64 => Value::UInt64(self.read_uint64()?),
            ScalarType::Float32 => Value::Float32(self.read_float32()?),
            ScalarType::Float64 => Value::Float64(self.read_float64()?),
        })
    }

    /// Read the trailing checksum item and compare it against the CRC of
    /// every byte before it.
    pub fn verify_checksum(&mut self) -> Result<(), DecodeError> {
        let computed = crc16_aug_ccitt(&self.data[..self.index]);
        let stored = self.read_uint16()?;
        if computed != stored {
            return Err(DecodeError::ChecksumMismatch { computed, stored });
        }
        Ok(())
    }
}

#[test]
fn read_array_header() {
    assert_eq!(ByteBuffer::new(&[0x91]).read_array_header(1), Ok(()));
    assert_eq!(ByteBuffer::new(&[0x9f]).read_array_header(15), Ok(()));
    assert_eq!(
        ByteBuffer::new(&[0x9f]).read_array_header(14),
        Err(DecodeError::CountMismatch { expected: 14, found: 15 })
    );
    assert_eq!(ByteBuffer::new(&[0xdc, 0xa4, 0x10]).read_array_header(42000), Ok(()));
    assert_eq!(
        ByteBuffer::new(&[0xdc, 0xa4, 0x10]).read_array_header(42001),
        Err(DecodeError::CountMismatch { expected: 42001, found: 42000 })
    );
    assert_eq!(ByteBuffer::new(&[0xdd, 0x00, 0x06, 0x68, 0xa0]).read_array_header(420000), Ok(()));
    assert_eq!(
        ByteBuffer::new(&[0xdd, 0x00, 0x06, 0x68, 0xa0]).read_array_header(420001),
        Err(DecodeError::CountMismatch { expected: 420001, found: 420000 })
    );
}

#[test]
fn read_array_header_rejects_wrong_class() {
    // A count of 1 must use fixarray even though array16 could represent it.
    assert_eq!(
        ByteBuffer::new(&[0xdc, 0x00, 0x01]).read_array_header(1),
        Err(DecodeError::UnexpectedTag { offset: 0, expected: "fixarray header", found: 0xdc })
    );
    assert_eq!(
        ByteBuffer::new(&[0xdc, 0x00]).read_array_header(16),
        Err(DecodeError::Truncated { offset: 1, needed: 1 })
    );
}

#[test]
fn read_bool() {
    assert_eq!(ByteBuffer::new(&[0xc3]).read_bool(), Ok(true));
    assert_eq!(ByteBuffer::new(&[0xc2]).read_bool(), Ok(false));
    assert_eq!(
        ByteBuffer::new(&[0xc4]).read_bool(),
        Err(DecodeError::UnexpectedTag { offset: 0, expected: "bool", found: 0xc4 })
    );
    assert_eq!(ByteBuffer::new(&[]).read_bool(), Err(DecodeError::Truncated { offset: 0, needed: 1 }));
}

#[test]
fn read_unsigned() {
    assert_eq!(ByteBuffer::new(&[0xcc, 0x20]).read_uint8(), Ok(32));
    assert_eq!(ByteBuffer::new(&[0xcc, 0xff]).read_uint8(), Ok(255));
    assert!(ByteBuffer::new(&[0xcd, 0xff]).read_uint8().is_err());
    assert_eq!(ByteBuffer::new(&[0xcd, 0x00, 0xff]).read_uint16(), Ok(255));
    assert_eq!(ByteBuffer::new(&[0xcd, 0xa4, 0x10]).read_uint16(), Ok(42000));
    assert_eq!(ByteBuffer::new(&[0xce, 0x00, 0x06, 0x68, 0xa0]).read_uint32(), Ok(420000));
    assert_eq!(
        ByteBuffer::new(&[0xcf, 0x11, 0x22, 0x10, 0xf4, 0x7d, 0xe9, 0x81, 0x15]).read_uint64(),
        Ok(1234567890123456789)
    );
    assert_eq!(
        ByteBuffer::new(&[0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]).read_uint64(),
        Ok(u64::MAX)
    );
}

#[test]
fn read_floats() {
    assert_eq!(ByteBuffer::new(&[0xca, 0x3f, 0x9d, 0x70, 0xa4]).read_float32(), Ok(1.23f32));
    assert!(ByteBuffer::new(&[0xcb, 0x3f, 0x9d, 0x70, 0xa4]).read_float32().is_err());
    assert_eq!(
        ByteBuffer::new(&[0xcb, 0x40, 0x12, 0x3d, 0x70, 0xa3, 0xd7, 0x0a, 0x3d]).read_float64(),
        Ok(4.56f64)
    );
    assert_eq!(
        ByteBuffer::new(&[0xca, 0x3f, 0x9d]).read_float32(),
        Err(DecodeError::Truncated { offset: 1, needed: 2 })
    );
}

#[test]
fn verify_checksum() {
    let valid = [0x91, 0xcf, 0x11, 0x22, 0x10, 0xf4, 0x7d, 0xe9, 0x81, 0x15, 0xcd, 0x14, 0xe9];
    let check = |bytes: &[u8]| -> Result<(), DecodeError> {
        let mut bb = ByteBuffer::new(bytes);
        bb.read_array_header(1)?;
        bb.read_uint64()?;
        bb.verify_checksum()
    };
    assert_eq!(check(&valid), Ok(()));

    let mut bytes = valid;
    bytes[0] = 0x90;
    assert!(check(&bytes).is_err());

    let mut bytes = valid;
    bytes[12] = 0xe8;
    assert_eq!(check(&bytes), Err(DecodeError::ChecksumMismatch { computed: 0x14e9, stored: 0x14e8 }));

    let mut bytes = valid;
    bytes[10] = 0xcc;
    assert!(check(&bytes).is_err());
}

/// A Microbuf byte buffer meant for writing.
///
/// Example usage:
///
/// ```
/// let mut bb = microbuf_schema::ByteBufferMut::new();
/// bb.write_array_header(2);
/// bb.write_bool(true);
/// bb.write_uint16(300);
/// assert_eq!(bb.data(), [0x92, 0xc3, 0xcd, 0x01, 0x2c]);
/// ```
///
pub struct ByteBufferMut {
    data: Vec<u8>,
}

impl Default for ByteBufferMut {
    fn default() -> Self {
        ByteBufferMut::new()
    }
}

impl ByteBufferMut {
    /// Creates an empty ByteBufferMut ready for writing.
    pub fn new() -> ByteBufferMut {
        ByteBufferMut { data: vec![] }
    }

    /// Creates an empty buffer with room for `capacity` bytes. Generated
    /// encoders know their exact size up front.
    pub fn with_capacity(capacity: usize) -> ByteBufferMut {
        ByteBufferMut {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Consumes this buffer and returns the underlying backing store. Use this
    /// to get the data out when you're done writing to the buffer.
    pub fn data(self) -> Vec<u8> {
        self.data
    }

    /// Returns the bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Returns the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write the leading item count using the smallest header class.
    pub fn write_array_header(&mut self, count: u32) {
        if count <= 15 {
            self.data.push(TAG_FIXARRAY | count as u8);
        } else if count <= u16::MAX as u32 {
            self.data.push(TAG_ARRAY16);
            self.data.extend_from_slice(&(count as u16).to_be_bytes());
        } else {
            self.data.push(TAG_ARRAY32);
            self.data.extend_from_slice(&count.to_be_bytes());
        }
    }

    pub fn write_bool(&mut self, value: bool) {
        self.data.push(if value { TAG_TRUE } else { TAG_FALSE });
    }

    pub fn write_uint8(&mut self, value: u8) {
        self.data.push(TAG_UINT8);
        self.data.push(value);
    }

    pub fn write_uint16(&mut self, value: u16) {
        self.data.push(TAG_UINT16);
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_uint32(&mut self, value: u32) {
        self.data.push(TAG_UINT32);
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_uint64(&mut self, value: u64) {
        self.data.push(TAG_UINT64);
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_float32(&mut self, value: f32) {
        self.data.push(TAG_FLOAT32);
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_float64(&mut self, value: f64) {
        self.data.push(TAG_FLOAT64);
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    /// Write a dynamic value. Arrays are written element by element with no
    /// header of their own.
    pub fn write_scalar(&mut self, value: &Value) {
        match *value {
            Value::Bool(v) => self.write_bool(v),
            Value::UInt8(v) => self.write_uint8(v),
            Value::UInt16(v) => self.write_uint16(v),
            Value::UInt32(v) => self.write_uint32(v),
            Value::UInt64(v) => self.write_uint64(v),
            Value::Float32(v) => self.write_float32(v),
            Value::Float64(v) => self.write_float64(v),
            Value::Array(ref values) => {
                for v in values {
                    self.write_scalar(v);
                }
            }
        }
    }

    /// Append the checksum of everything written so far as a `uint16` item.
    pub fn write_checksum(&mut self) {
        let crc = crc16_aug_ccitt(&self.data);
        self.write_uint16(crc);
    }
}

#[cfg(test)]
fn write_once(cb: fn(&mut ByteBufferMut)) -> Vec<u8> {
    let mut bb = ByteBufferMut::new();
    cb(&mut bb);
    bb.data()
}

#[test]
fn write_array_header() {
    assert_eq!(write_once(|bb| bb.write_array_header(0)), [0x90]);
    assert_eq!(write_once(|bb| bb.write_array_header(1)), [0x91]);
    assert_eq!(write_once(|bb| bb.write_array_header(15)), [0x9f]);
    assert_eq!(write_once(|bb| bb.write_array_header(16)), [0xdc, 0x00, 0x10]);
    assert_eq!(write_once(|bb| bb.write_array_header(42000)), [0xdc, 0xa4, 0x10]);
    assert_eq!(write_once(|bb| bb.write_array_header(65535)), [0xdc, 0xff, 0xff]);
    assert_eq!(write_once(|bb| bb.write_array_header(65536)), [0xdd, 0x00, 0x01, 0x00, 0x00]);
    assert_eq!(write_once(|bb| bb.write_array_header(420000)), [0xdd, 0x00, 0x06, 0x68, 0xa0]);
}

#[test]
fn write_bool() {
    assert_eq!(write_once(|bb| bb.write_bool(false)), [0xc2]);
    assert_eq!(write_once(|bb| bb.write_bool(true)), [0xc3]);
}

#[test]
fn write_unsigned() {
    assert_eq!(write_once(|bb| bb.write_uint8(1)), [0xcc, 0x01]);
    assert_eq!(write_once(|bb| bb.write_uint8(255)), [0xcc, 0xff]);
    assert_eq!(write_once(|bb| bb.write_uint16(256)), [0xcd, 0x01, 0x00]);
    assert_eq!(write_once(|bb| bb.write_uint32(65536)), [0xce, 0x00, 0x01, 0x00, 0x00]);
    assert_eq!(
        write_once(|bb| bb.write_uint64(4294967296)),
        [0xcf, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]
    );
}

#[test]
fn write_floats() {
    assert_eq!(write_once(|bb| bb.write_float32(1.23)), [0xca, 0x3f, 0x9d, 0x70, 0xa4]);
    assert_eq!(
        write_once(|bb| bb.write_float64(4.56)),
        [0xcb, 0x40, 0x12, 0x3d, 0x70, 0xa3, 0xd7, 0x0a, 0x3d]
    );
}

#[test]
fn write_checksum() {
    let mut bb = ByteBufferMut::new();
    bb.write_array_header(1);
    bb.write_uint64(1234567890123456789);
    bb.write_checksum();
    assert_eq!(
        bb.data(),
        [0x91, 0xcf, 0x11, 0x22, 0x10, 0xf4, 0x7d, 0xe9, 0x81, 0x15, 0xcd, 0x14, 0xe9]
    );
}

#[test]
fn write_then_read_sequence() {
    let mut bb = ByteBufferMut::with_capacity(16);
    bb.write_array_header(3);
    bb.write_scalar(&Value::Bool(true));
    bb.write_scalar(&Value::Array(vec![Value::UInt8(7), Value::UInt8(9)]));
    bb.write_checksum();
    let data = bb.data();
    assert_eq!(data.len(), 1 + 1 + 2 * 2 + 3);

    let mut bb = ByteBuffer::new(&data);
    assert_eq!(bb.read_array_header(3), Ok(()));
    assert_eq!(bb.read_scalar(ScalarType::Bool), Ok(Value::Bool(true)));
    assert_eq!(bb.read_scalar(ScalarType::Uint8), Ok(Value::UInt8(7)));
    assert_eq!(bb.read_scalar(ScalarType::Uint8), Ok(Value::UInt8(9)));
    assert_eq!(bb.verify_checksum(), Ok(()));
    assert_eq!(bb.index(), data.len());
}
