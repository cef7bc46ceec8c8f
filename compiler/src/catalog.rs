//! Type catalog lookups by type token, for schema input.

use microbuf_schema::ScalarType;

use crate::{error::MicrobufError, utils::quote};

/// The scalar type named `token`, or `UnknownType` when the catalog has no
/// such entry.
pub fn lookup(token: &str) -> Result<ScalarType, MicrobufError> {
    ScalarType::from_token(token).ok_or_else(|| MicrobufError::UnknownType(quote(token)))
}
