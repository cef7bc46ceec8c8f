#![cfg(test)]

use microbuf_compiler::{
    compile_schema,
    gen_cpp::CPP_RUNTIME_HEADER,
    generate_sources,
    parser::parse_message,
    HeaderClass, MicrobufError, Target,
};

const SENSOR_DATA: &str = include_str!("../../example/SensorData.mmsg");

#[test]
fn test_compile_sensor_data() {
    let (message, plan) = compile_schema("SensorData", SENSOR_DATA).expect("compile_schema failed");

    assert_eq!(message.name(), "SensorData");
    assert_eq!(message.version(), 1);
    assert!(message.append_checksum());
    assert_eq!(message.fields().len(), 3);

    assert_eq!(plan.header_class(), HeaderClass::Array16);
    assert_eq!(plan.plain_field_count(), 21);
    let offsets: Vec<u64> = plan.slots().iter().map(|slot| slot.start_offset()).collect();
    assert_eq!(offsets, vec![3, 53, 103]);
    assert_eq!(plan.payload_size(), 105);
    assert_eq!(plan.checksum_offset(), Some(105));
    assert_eq!(plan.total_size(), 108);
}

#[test]
fn test_generated_rust_matches_checked_in_example() {
    let (message, plan) = compile_schema("SensorData", SENSOR_DATA).unwrap();
    let files = generate_sources(&message, &plan, &[Target::Rust]).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].filename, "sensor_data.rs");
    assert_eq!(files[0].contents, include_str!("../../example/src/sensor_data.rs"));
}

#[test]
fn test_generate_all_targets() {
    let (message, plan) = compile_schema("SensorData", SENSOR_DATA).unwrap();
    let files = generate_sources(&message, &plan, &Target::ALL).unwrap();
    let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(names, vec!["sensor_data.rs", "SensorData.h", "deserialize_SensorData.m"]);
    assert!(files[1].contents.contains("#include \"microbuf.h\""));
    assert!(CPP_RUNTIME_HEADER.contains("namespace microbuf"));
}

#[test]
fn test_same_layout_for_every_target() {
    // Both emitters place the checksum and the last field at the planned offsets.
    let (message, plan) = compile_schema(
        "Mixed",
        r#"{"version": 4, "append_checksum": true, "content": {"on": "bool", "ticks": "uint64", "gain": "float64[3]"}}"#,
    )
    .unwrap();
    assert_eq!(plan.slots()[2].start_offset(), 1 + 1 + 9);
    assert_eq!(plan.checksum_offset(), Some(11 + 27));

    let files = generate_sources(&message, &plan, &Target::ALL).unwrap();
    assert!(files[0].contents.contains("        // gain: float64[3] @ 11"));
    assert!(files[0].contents.contains("        // checksum @ 38"));
    assert!(files[1].contents.contains("microbuf::write_float64(bytes, 11 + i * 9, this->gain[i]);"));
    assert!(files[1].contents.contains("microbuf::append_crc(bytes, 38);"));
    assert!(files[2].contents.contains("[msg.gain(k + 1), ok] = mb_read_float64(bytes, 11 + k * 9);"));
    assert!(files[2].contents.contains("mb_crc16(bytes(1:38)) ~= stored"));
}

#[test]
fn test_errors_surface_from_pipeline() {
    assert!(matches!(
        compile_schema("Bad", r#"{"version": 1, "content": {"x": "int8"}}"#),
        Err(MicrobufError::UnsupportedType { .. })
    ));
    assert!(matches!(
        parse_message("Bad", r#"{"version": 1, "content": {"x": "float32[0]"}}"#),
        Err(MicrobufError::InvalidArrayLength { .. })
    ));
    assert!(matches!(
        compile_schema("Bad", "version: 1\ncontent: {x: uint8\n"),
        Err(MicrobufError::ParseError { .. })
    ));
    assert!(matches!(
        compile_schema("Bad", "just a string"),
        Err(MicrobufError::ParseError { .. })
    ));
}
