use crate::scalar::ScalarType;

use std::fmt;

/// This type holds dynamic Microbuf data.
///
/// A message field decodes to one scalar variant, or to an
/// [Array](#variant.Array) of them when the field repeats. The value carries
/// no field names; those live in the message schema it was decoded with.
#[derive(Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Array(Vec<Value>),
}

impl Value {
    /// The zero value of a scalar type, as generated structs initialize it.
    pub fn default_for(ty: ScalarType) -> Value {
        match ty {
            ScalarType::Bool => Value::Bool(false),
            ScalarType::Uint8 => Value::UInt8(0),
            ScalarType::Uint16 => Value::UInt16(0),
            ScalarType::Uint32 => Value::UInt32(0),
            ScalarType::Uint64 => Value::UInt64(0),
            ScalarType::Float32 => Value::Float32(0.0),
            ScalarType::Float64 => Value::Float64(0.0),
        }
    }

    /// The scalar type of this value, or `None` for arrays.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        Some(match *self {
            Value::Bool(_) => ScalarType::Bool,
            Value::UInt8(_) => ScalarType::Uint8,
            Value::UInt16(_) => ScalarType::Uint16,
            Value::UInt32(_) => ScalarType::Uint32,
            Value::UInt64(_) => ScalarType::Uint64,
            Value::Float32(_) => ScalarType::Float32,
            Value::Float64(_) => ScalarType::Float64,
            Value::Array(_) => return None,
        })
    }

    /// A convenience method to extract the value out of a [Bool](#variant.Bool).
    /// Returns `false` for other value kinds.
    pub fn as_bool(&self) -> bool {
        match *self {
            Value::Bool(value) => value,
            _ => false,
        }
    }

    /// Widens any unsigned variant to `u64`. Returns `0` for other value kinds.
    pub fn as_u64(&self) -> u64 {
        match *self {
            Value::UInt8(value) => value as u64,
            Value::UInt16(value) => value as u64,
            Value::UInt32(value) => value as u64,
            Value::UInt64(value) => value,
            _ => 0,
        }
    }

    /// Widens either float variant to `f64`. Returns `0.0` for other value kinds.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Float32(value) => value as f64,
            Value::Float64(value) => value,
            _ => 0.0,
        }
    }

    /// A convenience method to get an array of values out of an [Array](#variant.Array).
    /// Returns an empty array for other value kinds.
    pub fn as_array(&self) -> &[Value] {
        match *self {
            Value::Array(ref values) => values.as_slice(),
            _ => &[],
        }
    }

    /// Number of scalars this value puts on the wire.
    pub fn len(&self) -> usize {
        match *self {
            Value::Array(ref values) => values.iter().map(Value::len).sum(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Value::Bool(value) => write!(f, "{}", value),
            Value::UInt8(value) => write!(f, "{}u8", value),
            Value::UInt16(value) => write!(f, "{}u16", value),
            Value::UInt32(value) => write!(f, "{}u32", value),
            Value::UInt64(value) => write!(f, "{}u64", value),
            Value::Float32(value) => write!(f, "{:?}f32", value),
            Value::Float64(value) => write!(f, "{:?}f64", value),
            Value::Array(ref values) => f.debug_list().entries(values).finish(),
        }
    }
}

#[test]
fn value_accessors() {
    assert!(Value::Bool(true).as_bool());
    assert!(!Value::UInt8(1).as_bool());
    assert_eq!(Value::UInt16(300).as_u64(), 300);
    assert_eq!(Value::Float32(0.5).as_f64(), 0.5);
    assert_eq!(Value::Float32(0.5).as_u64(), 0);
    assert!(Value::UInt8(3).as_array().is_empty());
    assert_eq!(
        Value::Array(vec![Value::UInt8(1), Value::UInt8(2)]).as_array(),
        &[Value::UInt8(1), Value::UInt8(2)]
    );
}

#[test]
fn value_types_and_defaults() {
    for ty in ScalarType::ALL {
        assert_eq!(Value::default_for(ty).scalar_type(), Some(ty));
    }
    assert_eq!(Value::Array(vec![]).scalar_type(), None);
    assert_eq!(Value::Array(vec![Value::Bool(true); 4]).len(), 4);
    assert!(Value::Array(vec![]).is_empty());
}

#[test]
fn value_debug() {
    let value = Value::Array(vec![Value::UInt8(1), Value::Float32(1.5), Value::Bool(false)]);
    assert_eq!(format!("{:?}", value), "[1u8, 1.5f32, false]");
}
