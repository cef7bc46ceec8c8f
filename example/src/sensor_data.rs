// Generated by microbuf from message SensorData (version 1). Do not edit.
//
// Layout: array16 header (3 bytes), 21 plain fields, 108 bytes total.

use microbuf::{ByteBuffer, ByteBufferMut, DecodeError, MicrobufMessage};

#[derive(Debug, Clone, PartialEq)]
pub struct SensorData {
    pub distance: [f32; 10],
    pub angle: [f32; 10],
    pub robot_id: u8,
}

impl Default for SensorData {
    fn default() -> Self {
        SensorData {
            distance: [0.0; 10],
            angle: [0.0; 10],
            robot_id: 0,
        }
    }
}

impl SensorData {
    pub const VERSION: i64 = 1;
    pub const SIZE: usize = 108;
    pub const FIELD_COUNT: u32 = 21;

    /// Encodes the message into its fixed-size wire form.
    pub fn as_bytes(&self) -> [u8; 108] {
        let mut bb = ByteBufferMut::with_capacity(Self::SIZE);
        bb.write_array_header(Self::FIELD_COUNT);
        // distance: float32[10] @ 3
        for value in &self.distance {
            bb.write_float32(*value);
        }
        // angle: float32[10] @ 53
        for value in &self.angle {
            bb.write_float32(*value);
        }
        // robot_id: uint8 @ 103
        bb.write_uint8(self.robot_id);
        // checksum @ 105
        bb.write_checksum();

        let mut bytes = [0u8; 108];
        bytes.copy_from_slice(bb.as_slice());
        bytes
    }

    /// Decodes a message, stopping at the first structural mismatch.
    pub fn from_bytes(bytes: &[u8; 108]) -> Result<Self, DecodeError> {
        let mut bb = ByteBuffer::new(bytes);
        bb.read_array_header(Self::FIELD_COUNT as u64)?;
        let mut message = Self::default();
        for value in message.distance.iter_mut() {
            *value = bb.read_float32()?;
        }
        for value in message.angle.iter_mut() {
            *value = bb.read_float32()?;
        }
        message.robot_id = bb.read_uint8()?;
        bb.verify_checksum()?;
        Ok(message)
    }
}

impl MicrobufMessage for SensorData {
    const NAME: &'static str = "SensorData";
    const VERSION: i64 = 1;
    const SIZE: usize = 108;

    fn encode(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let bytes: &[u8; 108] = bytes.try_into().map_err(|_| DecodeError::InvalidLength {
            expected: 108,
            found: bytes.len(),
        })?;
        Self::from_bytes(bytes)
    }
}
