// example/src/main.rs

mod sensor_data;

use microbuf::{DecodeError, MicrobufMessage};

// Generated from example/SensorData.mmsg with `microbuf gen --target rust`
use sensor_data::SensorData;

fn main() -> Result<(), DecodeError> {
    let mut reading = SensorData::default();
    for i in 0..10 {
        reading.distance[i] = 0.5 * i as f32;
        reading.angle[i] = -10.0 + 2.0 * i as f32;
    }
    reading.robot_id = 7;

    let bytes = reading.as_bytes();
    println!("{} v{} encodes to {} bytes", SensorData::NAME, SensorData::VERSION, bytes.len());

    let decoded = SensorData::from_bytes(&bytes)?;
    println!("robot_id = {}", decoded.robot_id);
    println!("distance = {:?}", decoded.distance);
    println!("angle    = {:?}", decoded.angle);

    // A single corrupted byte is caught by the checksum
    let mut corrupted = bytes;
    corrupted[10] ^= 0x01;
    match SensorData::decode(&corrupted) {
        Ok(_) => println!("corruption went unnoticed"),
        Err(err) => println!("corrupted copy rejected: {}", err),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading() -> SensorData {
        SensorData {
            distance: [1.5; 10],
            angle:    [0.25; 10],
            robot_id: 42,
        }
    }

    #[test]
    fn round_trip() {
        let msg = reading();
        let bytes = msg.as_bytes();
        assert_eq!(bytes.len(), SensorData::SIZE);
        assert_eq!(&bytes[..3], &[0xdc, 0x00, 21]);
        assert_eq!(&bytes[3..8], &[0xca, 0x3f, 0xc0, 0x00, 0x00]);
        assert_eq!(&bytes[103..105], &[0xcc, 42]);
        assert_eq!(bytes[105], 0xcd);
        assert_eq!(SensorData::from_bytes(&bytes), Ok(msg));
    }

    #[test]
    fn trait_round_trip() {
        let msg = reading();
        let bytes = msg.encode();
        assert_eq!(SensorData::decode(&bytes), Ok(msg));
        assert_eq!(
            SensorData::decode(&bytes[..100]),
            Err(DecodeError::InvalidLength { expected: 108, found: 100 })
        );
    }

    #[test]
    fn corrupted_payload_is_rejected() {
        let mut bytes = reading().as_bytes();
        bytes[5] = 0xf0;
        assert!(matches!(SensorData::from_bytes(&bytes), Err(DecodeError::ChecksumMismatch { .. })));
    }

    #[test]
    fn wrong_tag_is_rejected() {
        let mut bytes = reading().as_bytes();
        bytes[103] = 0xcd;
        assert!(matches!(
            SensorData::from_bytes(&bytes),
            Err(DecodeError::UnexpectedTag { offset: 103, .. })
        ));
    }
}
