//! Encode and decode messages directly from a [`MessageSpec`] and its
//! [`LayoutPlan`], with no generated code involved. Produces exactly the bytes
//! a generated encoder would.

use microbuf_compiler::{
    emitter::unique_identifiers,
    error::MicrobufError,
    layout::{LayoutPlan, Slot},
    types::MessageSpec,
    utils::quote,
};
use microbuf_schema::{ByteBuffer, ByteBufferMut, DecodeError, ScalarType, Value};
use serde_json::{Map, Number, Value as Json};

fn mismatch(field: &str, reason: String) -> MicrobufError {
    MicrobufError::ValueMismatch {
        field: quote(field),
        reason,
    }
}

fn check_value(slot: &Slot, value: &Value) -> Result<(), MicrobufError> {
    let expected = slot.type_();
    if slot.repeat() > 1 {
        let elements = match value {
            Value::Array(elements) => elements,
            other => {
                return Err(mismatch(
                    slot.field_name(),
                    format!("expected {} values of type {}, got {:?}", slot.repeat(), expected, other),
                ))
            }
        };
        if elements.len() != slot.repeat() as usize {
            return Err(mismatch(
                slot.field_name(),
                format!("expected {} values, got {}", slot.repeat(), elements.len()),
            ));
        }
        if let Some(bad) = elements.iter().find(|v| v.scalar_type() != Some(expected)) {
            return Err(mismatch(
                slot.field_name(),
                format!("expected elements of type {}, got {:?}", expected, bad),
            ));
        }
    } else if value.scalar_type() != Some(expected) {
        return Err(mismatch(
            slot.field_name(),
            format!("expected a value of type {}, got {:?}", expected, value),
        ));
    }
    Ok(())
}

/// Encode one value per field, in field order. Repeated fields take a
/// [`Value::Array`] holding exactly `repeat` elements.
pub fn encode_message(message: &MessageSpec, plan: &LayoutPlan, values: &[Value]) -> Result<Vec<u8>, MicrobufError> {
    if values.len() != plan.slots().len() {
        return Err(mismatch(
            message.name(),
            format!("expected {} field values, got {}", plan.slots().len(), values.len()),
        ));
    }

    let mut bb = ByteBufferMut::with_capacity(plan.total_size() as usize);
    bb.write_array_header(plan.plain_field_count() as u32);
    for (slot, value) in plan.slots().iter().zip(values) {
        check_value(slot, value)?;
        debug_assert_eq!(bb.len() as u64, slot.start_offset());
        bb.write_scalar(value);
    }
    if plan.checksum_enabled() {
        debug_assert_eq!(Some(bb.len() as u64), plan.checksum_offset());
        bb.write_checksum();
    }
    debug_assert_eq!(bb.len() as u64, plan.total_size());
    Ok(bb.data())
}

/// Decode a buffer of exactly `total_size` bytes into `(field name, value)`
/// pairs in field order. Stops at the first structural mismatch; the checksum
/// is verified after every field decoded.
pub fn decode_message(
    message: &MessageSpec,
    plan: &LayoutPlan,
    bytes: &[u8],
) -> Result<Vec<(String, Value)>, MicrobufError> {
    if bytes.len() as u64 != plan.total_size() {
        return Err(DecodeError::InvalidLength {
            expected: plan.total_size() as usize,
            found:    bytes.len(),
        }
        .into());
    }

    let mut bb = ByteBuffer::new(bytes);
    bb.read_array_header(plan.plain_field_count())?;
    let mut fields = Vec::with_capacity(plan.slots().len());
    for (field, slot) in message.fields().iter().zip(plan.slots()) {
        let value = if slot.repeat() > 1 {
            let mut elements = Vec::with_capacity(slot.repeat() as usize);
            for _ in 0..slot.repeat() {
                elements.push(bb.read_scalar(slot.type_())?);
            }
            Value::Array(elements)
        } else {
            bb.read_scalar(slot.type_())?
        };
        fields.push((field.name().to_string(), value));
    }
    if plan.checksum_enabled() {
        bb.verify_checksum()?;
    }
    Ok(fields)
}

fn scalar_from_json(field: &str, ty: ScalarType, json: &Json) -> Result<Value, MicrobufError> {
    let unsigned = |max: u64| {
        json.as_u64()
            .filter(|v| *v <= max)
            .ok_or_else(|| mismatch(field, format!("{} is not a valid {}", json, ty)))
    };
    Ok(match ty {
        ScalarType::Bool => Value::Bool(
            json.as_bool()
                .ok_or_else(|| mismatch(field, format!("{} is not a bool", json)))?,
        ),
        ScalarType::Uint8 => Value::UInt8(unsigned(u8::MAX as u64)? as u8),
        ScalarType::Uint16 => Value::UInt16(unsigned(u16::MAX as u64)? as u16),
        ScalarType::Uint32 => Value::UInt32(unsigned(u32::MAX as u64)? as u32),
        ScalarType::Uint64 => Value::UInt64(unsigned(u64::MAX)?),
        ScalarType::Float32 | ScalarType::Float64 => {
            let v = json
                .as_f64()
                .ok_or_else(|| mismatch(field, format!("{} is not a number", json)))?;
            if ty == ScalarType::Float32 {
                Value::Float32(v as f32)
            } else {
                Value::Float64(v)
            }
        }
    })
}

/// Convert JSON field values into [`Value`]s ready for [`encode_message`].
///
/// `json` is either an object keyed by field name or an array holding one
/// entry per field in order. Repeated fields take a JSON array. When several
/// fields share a name, later ones are keyed `name_2`, `name_3`, ... as in
/// [`decode_to_json`].
pub fn values_from_json(message: &MessageSpec, json: &Json) -> Result<Vec<Value>, MicrobufError> {
    let keys = json_keys(message);
    let mut values = Vec::with_capacity(message.fields().len());
    for (index, field) in message.fields().iter().enumerate() {
        let entry = match json {
            Json::Object(map) => map.get(&keys[index]),
            Json::Array(items) => items.get(index),
            _ => {
                return Err(mismatch(
                    message.name(),
                    "expected a JSON object or array of field values".to_string(),
                ))
            }
        }
        .ok_or_else(|| mismatch(&keys[index], "no value given".to_string()))?;

        let value = if field.is_array() {
            let items = entry
                .as_array()
                .ok_or_else(|| mismatch(field.name(), format!("{} is not an array", entry)))?;
            Value::Array(
                items
                    .iter()
                    .map(|item| scalar_from_json(field.name(), field.type_(), item))
                    .collect::<Result<Vec<_>, _>>()?,
            )
        } else {
            scalar_from_json(field.name(), field.type_(), entry)?
        };
        values.push(value);
    }
    Ok(values)
}

/// JSON object keys of the fields, unique the same way generated identifiers
/// are.
fn json_keys(message: &MessageSpec) -> Vec<String> {
    unique_identifiers(message.fields().iter().map(|field| field.name()))
}

fn value_to_json(value: &Value) -> Json {
    match *value {
        Value::Bool(v) => Json::Bool(v),
        Value::UInt8(_) | Value::UInt16(_) | Value::UInt32(_) | Value::UInt64(_) => Json::from(value.as_u64()),
        Value::Float32(v) => Number::from_f64(v as f64).map_or(Json::Null, Json::Number),
        Value::Float64(v) => Number::from_f64(v).map_or(Json::Null, Json::Number),
        Value::Array(ref values) => Json::Array(values.iter().map(value_to_json).collect()),
    }
}

/// Decode a message buffer into a pretty-printed JSON object keyed by field
/// name. Fields sharing a name keep one key each (`name`, `name_2`, ...).
pub fn decode_to_json(message: &MessageSpec, plan: &LayoutPlan, bytes: &[u8]) -> Result<String, MicrobufError> {
    let fields = decode_message(message, plan, bytes)?;
    let mut object = Map::new();
    for (key, (_, value)) in json_keys(message).into_iter().zip(&fields) {
        object.insert(key, value_to_json(value));
    }
    Ok(format!("{:#}", Json::Object(object)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use microbuf_compiler::compile_layout;

    fn sample() -> (MessageSpec, LayoutPlan) {
        let message = MessageSpec::new("Sample", 1, true)
            .and_then(|m| m.with_field("a", "uint8", 1))
            .and_then(|m| m.with_field("b", "float32", 3))
            .unwrap();
        let plan = compile_layout(&message).unwrap();
        (message, plan)
    }

    #[test]
    fn rejects_shape_mismatches() {
        let (message, plan) = sample();
        let err = encode_message(&message, &plan, &[Value::UInt8(1)]).unwrap_err();
        assert!(matches!(err, MicrobufError::ValueMismatch { .. }));

        let short = Value::Array(vec![Value::Float32(1.0); 2]);
        let err = encode_message(&message, &plan, &[Value::UInt8(1), short]).unwrap_err();
        assert!(matches!(err, MicrobufError::ValueMismatch { .. }));

        let wrong = Value::Array(vec![Value::Float64(1.0); 3]);
        let err = encode_message(&message, &plan, &[Value::UInt8(1), wrong]).unwrap_err();
        assert!(matches!(err, MicrobufError::ValueMismatch { .. }));

        let floats = Value::Array(vec![Value::Float32(1.0); 3]);
        let err = encode_message(&message, &plan, &[Value::UInt16(1), floats]).unwrap_err();
        assert!(matches!(err, MicrobufError::ValueMismatch { .. }));
    }

    #[test]
    fn json_values() {
        let (message, plan) = sample();
        let by_name = values_from_json(&message, &serde_json::json!({"a": 7, "b": [0.5, 1.5, -2.0]})).unwrap();
        let by_index = values_from_json(&message, &serde_json::json!([7, [0.5, 1.5, -2.0]])).unwrap();
        assert_eq!(by_name, by_index);

        let bytes = encode_message(&message, &plan, &by_name).unwrap();
        let json: Json = serde_json::from_str(&decode_to_json(&message, &plan, &bytes).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"a": 7, "b": [0.5, 1.5, -2.0]}));
    }

    #[test]
    fn duplicate_names_keep_separate_json_keys() {
        let message = MessageSpec::new("Twice", 1, false)
            .and_then(|m| m.with_field("x", "uint8", 1))
            .and_then(|m| m.with_field("x", "uint8", 1))
            .unwrap();
        let plan = compile_layout(&message).unwrap();
        let bytes = encode_message(&message, &plan, &[Value::UInt8(1), Value::UInt8(2)]).unwrap();

        let decoded = decode_message(&message, &plan, &bytes).unwrap();
        assert_eq!(decoded, vec![("x".to_string(), Value::UInt8(1)), ("x".to_string(), Value::UInt8(2))]);

        let json: Json = serde_json::from_str(&decode_to_json(&message, &plan, &bytes).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"x": 1, "x_2": 2}));

        let values = values_from_json(&message, &json).unwrap();
        assert_eq!(values, vec![Value::UInt8(1), Value::UInt8(2)]);
        assert_eq!(encode_message(&message, &plan, &values).unwrap(), bytes);
    }

    #[test]
    fn json_range_checks() {
        let (message, _) = sample();
        let err = values_from_json(&message, &serde_json::json!({"a": 256, "b": [0, 0, 0]})).unwrap_err();
        assert!(matches!(err, MicrobufError::ValueMismatch { .. }));
        let err = values_from_json(&message, &serde_json::json!({"a": 1})).unwrap_err();
        assert!(matches!(err, MicrobufError::ValueMismatch { .. }));
        let err = values_from_json(&message, &serde_json::json!({"a": -1, "b": [0, 0, 0]})).unwrap_err();
        assert!(matches!(err, MicrobufError::ValueMismatch { .. }));
    }

    #[test]
    fn wrong_length_is_rejected_before_reading() {
        let (message, plan) = sample();
        let err = decode_message(&message, &plan, &[0x92]).unwrap_err();
        assert!(matches!(
            err,
            MicrobufError::Decode(DecodeError::InvalidLength { expected: 21, found: 1 })
        ));
    }
}
