use microbuf_schema::ScalarType;
use serde::Serialize;

use crate::{
    catalog,
    error::MicrobufError,
    utils::quote,
    verifier::{verify_field_name, verify_message_name},
};

/// One field of a message: a scalar type repeated `repeat` times.
/// `repeat == 1` is a plain scalar, anything larger a fixed-length array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    name:   String,
    #[serde(rename = "type")]
    type_:  ScalarType,
    repeat: u32,
}

impl FieldSpec {
    pub fn new(name: &str, type_: ScalarType, repeat: u32) -> Result<FieldSpec, MicrobufError> {
        verify_field_name(name)?;
        if repeat < 1 {
            return Err(MicrobufError::InvalidArrayLength {
                field:  quote(name),
                repeat: repeat as u64,
            });
        }
        Ok(FieldSpec {
            name: name.to_string(),
            type_,
            repeat,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_(&self) -> ScalarType {
        self.type_
    }

    pub fn repeat(&self) -> u32 {
        self.repeat
    }

    pub fn is_array(&self) -> bool {
        self.repeat > 1
    }
}

/// A message schema: name, version, checksum flag and fields in wire order.
///
/// Field names are not required to be unique. Adding the same name twice
/// keeps both entries, each with its own wire slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageSpec {
    name:            String,
    version:         i64,
    append_checksum: bool,
    fields:          Vec<FieldSpec>,
}

impl MessageSpec {
    pub fn new(name: &str, version: i64, append_checksum: bool) -> Result<MessageSpec, MicrobufError> {
        verify_message_name(name)?;
        Ok(MessageSpec {
            name: name.to_string(),
            version,
            append_checksum,
            fields: Vec::new(),
        })
    }

    /// Validate and append a field. `type_token` is a scalar type name such
    /// as `"uint16"`. Nothing is appended when validation fails.
    pub fn add_field(&mut self, name: &str, type_token: &str, repeat: u32) -> Result<(), MicrobufError> {
        verify_field_name(name)?;
        let type_ = catalog::lookup(type_token).map_err(|_| MicrobufError::UnsupportedType {
            field:      quote(name),
            type_token: quote(type_token),
        })?;
        let field = FieldSpec::new(name, type_, repeat)?;
        self.fields.push(field);
        Ok(())
    }

    /// Append an already validated field.
    pub fn push_field(&mut self, field: FieldSpec) {
        self.fields.push(field);
    }

    /// Builder form of [`add_field`](Self::add_field).
    pub fn with_field(mut self, name: &str, type_token: &str, repeat: u32) -> Result<MessageSpec, MicrobufError> {
        self.add_field(name, type_token, repeat)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn append_checksum(&self) -> bool {
        self.append_checksum
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }
}
