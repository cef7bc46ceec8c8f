#![cfg(test)]

use microbuf::{
    compile_schema, decode_message, decode_to_json, encode_message, values_from_json, DecodeError, LayoutPlan,
    MessageSpec, MicrobufError, Value,
};

fn schema(name: &str, text: &str) -> (MessageSpec, LayoutPlan) {
    compile_schema(name, text).expect("compile_schema failed")
}

fn test_message1() -> (MessageSpec, LayoutPlan) {
    schema(
        "TestMessage1",
        r#"{
            "version": 1,
            "append_checksum": true,
            "content": {
                "bool_val": "bool",
                "uint8_val": "uint8",
                "uint16_val": "uint16",
                "uint32_val": "uint32",
                "uint64_val": "uint64",
                "float32_arr_val": "float32[10]",
                "float64_arr_val": "float64[10]"
            }
        }"#,
    )
}

fn test_message1_values() -> Vec<Value> {
    vec![
        Value::Bool(true),
        Value::UInt8(123),
        Value::UInt16(123),
        Value::UInt32(123),
        Value::UInt64(123),
        Value::Array((0..10).map(|i| Value::Float32(i as f32)).collect()),
        Value::Array((0..10).map(|i| Value::Float64(i as f64)).collect()),
    ]
}

#[test]
fn test_small_message_bytes() {
    let (message, plan) = schema(
        "Small",
        r#"{"version": 1, "append_checksum": true, "content": {"a": "uint8", "b": "uint16"}}"#,
    );
    let bytes = encode_message(&message, &plan, &[Value::UInt8(1), Value::UInt16(0x1234)]).unwrap();
    assert_eq!(bytes, vec![0x92, 0xcc, 0x01, 0xcd, 0x12, 0x34, 0xcd, 0xcd, 0x9d]);
}

#[test]
fn test_mixed_message_bytes() {
    let (message, plan) = schema(
        "Mixed",
        r#"{"version": 2, "content": {"flag": "bool", "x": "float32", "y": "float64"}}"#,
    );
    let bytes = encode_message(
        &message,
        &plan,
        &[Value::Bool(true), Value::Float32(1.5), Value::Float64(-2.0)],
    )
    .unwrap();
    assert_eq!(
        bytes,
        vec![
            0x93, 0xc3, 0xca, 0x3f, 0xc0, 0x00, 0x00, 0xcb, 0xc0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ]
    );
}

#[test]
fn test_serialize_then_deserialize() {
    let (message, plan) = test_message1();
    assert_eq!(plan.total_size(), 166);

    let values = test_message1_values();
    let bytes = encode_message(&message, &plan, &values).unwrap();
    assert_eq!(bytes.len(), 166);
    assert_eq!(&bytes[..3], &[0xdc, 0x00, 25]);

    let decoded = decode_message(&message, &plan, &bytes).unwrap();
    let names: Vec<&str> = decoded.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        vec!["bool_val", "uint8_val", "uint16_val", "uint32_val", "uint64_val", "float32_arr_val", "float64_arr_val"]
    );
    let decoded_values: Vec<Value> = decoded.into_iter().map(|(_, value)| value).collect();
    assert_eq!(decoded_values, values);
}

#[test]
fn test_corrupted_byte_fails_checksum() {
    let (message, plan) = test_message1();
    let mut bytes = encode_message(&message, &plan, &test_message1_values()).unwrap();
    bytes[5] = 0xf0;
    assert!(matches!(
        decode_message(&message, &plan, &bytes),
        Err(MicrobufError::Decode(DecodeError::ChecksumMismatch { .. }))
    ));
}

#[test]
fn test_every_single_bit_flip_is_rejected() {
    let (message, plan) = schema(
        "Flip",
        r#"{"version": 1, "append_checksum": true, "content": {"a": "uint16", "b": "float32[2]", "c": "bool"}}"#,
    );
    let values = vec![
        Value::UInt16(0xbeef),
        Value::Array(vec![Value::Float32(0.25), Value::Float32(-8.0)]),
        Value::Bool(false),
    ];
    let bytes = encode_message(&message, &plan, &values).unwrap();
    assert!(decode_message(&message, &plan, &bytes).is_ok());

    for index in 0..bytes.len() {
        for bit in 0..8 {
            let mut corrupted = bytes.clone();
            corrupted[index] ^= 1 << bit;
            assert!(
                decode_message(&message, &plan, &corrupted).is_err(),
                "flip of bit {} in byte {} went unnoticed",
                bit,
                index
            );
        }
    }
}

#[test]
fn test_decode_stops_at_wrong_tag() {
    let (message, plan) = schema("Tags", r#"{"version": 1, "content": {"a": "uint8", "b": "uint8"}}"#);
    let err = decode_message(&message, &plan, &[0x92, 0xcc, 0x01, 0xcd, 0x02]).unwrap_err();
    assert!(matches!(
        err,
        MicrobufError::Decode(DecodeError::UnexpectedTag { offset: 3, found: 0xcd, .. })
    ));

    let err = decode_message(&message, &plan, &[0x93, 0xcc, 0x01, 0xcc, 0x02]).unwrap_err();
    assert!(matches!(err, MicrobufError::Decode(DecodeError::CountMismatch { expected: 2, found: 3 })));
}

#[test]
fn test_json_round_trip() {
    let (message, plan) = test_message1();
    let json: serde_json::Value = serde_json::json!({
        "bool_val": true,
        "uint8_val": 123,
        "uint16_val": 123,
        "uint32_val": 123,
        "uint64_val": 123,
        "float32_arr_val": [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
        "float64_arr_val": [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]
    });
    let values = values_from_json(&message, &json).unwrap();
    assert_eq!(values, test_message1_values());

    let bytes = encode_message(&message, &plan, &values).unwrap();
    let rendered: serde_json::Value = serde_json::from_str(&decode_to_json(&message, &plan, &bytes).unwrap()).unwrap();
    assert_eq!(rendered["uint64_val"], 123);
    assert_eq!(rendered["float32_arr_val"][9], 9.0);
    assert_eq!(rendered["bool_val"], true);
}
