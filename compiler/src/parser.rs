use crate::{
    error::MicrobufError,
    types::MessageSpec,
    utils::quote,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

lazy_static! {
    static ref PLAIN_TYPE: Regex = Regex::new(r"^[A-Za-z0-9]+$").unwrap();
    static ref ARRAY_TYPE: Regex = Regex::new(r"^([a-z0-9]+)\[([0-9]+)\]$").unwrap();
}

/// Raw shape of a `.mmsg` document before validation.
#[derive(Debug, Deserialize)]
struct MessageDocument {
    version:         Option<Value>,
    content:         Option<Value>,
    append_checksum: Option<Value>,
}

/// Splits a type token into the scalar type name and its repeat count:
/// `"uint8"` is `("uint8", 1)`, `"float32[10]"` is `("float32", 10)`.
pub fn parse_type_token(token: &str) -> Option<(&str, u32)> {
    if PLAIN_TYPE.is_match(token) {
        return Some((token, 1));
    }
    let caps = ARRAY_TYPE.captures(token)?;
    let length = caps.get(2)?.as_str().parse::<u32>().ok()?;
    Some((caps.get(1)?.as_str(), length))
}

/// Parse a `.mmsg` schema document into a validated [`MessageSpec`].
///
/// `name` is the message name, normally the file stem. The document is YAML,
/// so the JSON form is accepted too:
///
/// ```yaml
/// version: 1
/// append_checksum: true
/// content:
///   distance: float32[10]
///   robot_id: uint8
/// ```
///
/// Field order follows the order of keys in `content`. A key given twice
/// keeps its first position and its last type.
pub fn parse_message(name: &str, text: &str) -> Result<MessageSpec, MicrobufError> {
    let document: MessageDocument = serde_yaml::from_str(text).map_err(|e| {
        let (line, column) = e.location().map_or((0, 0), |loc| (loc.line(), loc.column()));
        MicrobufError::ParseError {
            msg: e.to_string(),
            line,
            column,
        }
    })?;

    let version = match document.version {
        None => {
            return Err(MicrobufError::InvalidDocument(format!(
                "No version specified for message {}",
                quote(name)
            )))
        }
        Some(ref v) => v.as_i64().ok_or_else(|| {
            MicrobufError::InvalidDocument(format!(
                "Version {} of message {} is not an integer",
                v,
                quote(name)
            ))
        })?,
    };

    let content = match document.content {
        Some(Value::Object(map)) if !map.is_empty() => map,
        Some(Value::Object(_)) | Some(Value::Null) | None => {
            return Err(MicrobufError::InvalidDocument(format!(
                "Message {} does not have content fields",
                quote(name)
            )))
        }
        Some(_) => {
            return Err(MicrobufError::InvalidDocument(format!(
                "Message {} has malformed content fields",
                quote(name)
            )))
        }
    };

    let append_checksum = matches!(document.append_checksum, Some(Value::Bool(true)));

    let mut message = MessageSpec::new(name, version, append_checksum)?;
    for (field_name, field_type) in &content {
        let token = field_type.as_str().ok_or_else(|| {
            MicrobufError::InvalidDocument(format!(
                "Field {} has invalid type {}",
                quote(field_name),
                field_type
            ))
        })?;
        let (type_name, repeat) = parse_type_token(token).ok_or_else(|| {
            MicrobufError::InvalidDocument(format!(
                "Field {} has invalid type {}",
                quote(field_name),
                quote(token)
            ))
        })?;
        message.add_field(field_name, type_name, repeat)?;
    }

    Ok(message)
}
