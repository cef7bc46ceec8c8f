use crate::{error::MicrobufError, utils::quote};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER:    Regex = Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
    static ref LEADING_ALPHA: Regex = Regex::new(r"^[A-Za-z]").unwrap();
}

/// Field names that collide with identifiers emitted into generated decoders.
pub const RESERVED_FIELD_NAMES: [&str; 1] = ["err"];

fn check_identifier(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name is empty".to_string());
    }
    if !IDENTIFIER.is_match(name) {
        return Err("only A-Z, a-z, 0-9 and '_' are allowed".to_string());
    }
    if !LEADING_ALPHA.is_match(name) {
        return Err("name must begin with a letter".to_string());
    }
    Ok(())
}

/// Returns `Ok(())` if `name` may be used as a field name, or
/// `Err(MicrobufError::InvalidFieldName)` naming the first rule it breaks.
pub fn verify_field_name(name: &str) -> Result<(), MicrobufError> {
    check_identifier(name).map_err(|reason| MicrobufError::InvalidFieldName {
        name: quote(name),
        reason,
    })?;
    if RESERVED_FIELD_NAMES.contains(&name) {
        return Err(MicrobufError::InvalidFieldName {
            name:   quote(name),
            reason: "the name is reserved".to_string(),
        });
    }
    Ok(())
}

/// Message names become type and file names in every target, so they follow
/// the same identifier rules as fields.
pub fn verify_message_name(name: &str) -> Result<(), MicrobufError> {
    check_identifier(name).map_err(|reason| MicrobufError::InvalidMessageName {
        name: quote(name),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(result: Result<(), MicrobufError>) -> String {
        match result {
            Err(MicrobufError::InvalidFieldName { reason, .. }) => reason,
            other => panic!("expected InvalidFieldName, got {:?}", other),
        }
    }

    #[test]
    fn accepts_identifiers() {
        for name in ["ok_2", "a", "Z9", "robot_id", "errors", "Err"] {
            assert!(verify_field_name(name).is_ok(), "{} should be accepted", name);
        }
    }

    #[test]
    fn rejects_leading_non_letter() {
        assert_eq!(reason(verify_field_name("1abc")), "name must begin with a letter");
        assert_eq!(reason(verify_field_name("_abc")), "name must begin with a letter");
    }

    #[test]
    fn rejects_bad_characters() {
        for name in ["a-b", "a b", "ä", "a.b", ""] {
            assert!(
                matches!(verify_field_name(name), Err(MicrobufError::InvalidFieldName { .. })),
                "{:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn rejects_reserved_name() {
        assert_eq!(reason(verify_field_name("err")), "the name is reserved");
    }

    #[test]
    fn message_names() {
        assert!(verify_message_name("SensorData").is_ok());
        assert!(matches!(
            verify_message_name("sensor-data"),
            Err(MicrobufError::InvalidMessageName { .. })
        ));
    }
}
