use microbuf_schema::DecodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MicrobufError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}, column {column}: {msg}")]
    ParseError {
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("Invalid schema document: {0}")]
    InvalidDocument(String),

    #[error("Invalid message name {name}: {reason}")]
    InvalidMessageName { name: String, reason: String },

    #[error("Invalid field name {name}: {reason}")]
    InvalidFieldName { name: String, reason: String },

    #[error("Field {field} has unsupported type {type_token}")]
    UnsupportedType { field: String, type_token: String },

    #[error("Field {field} has invalid array length {repeat}; it must be at least 1")]
    InvalidArrayLength { field: String, repeat: u64 },

    #[error("Message {message} flattens to {count} fields, more than the {max} an array32 header can hold")]
    TooManyFields { message: String, count: u64, max: u64 },

    #[error("Unknown type {0}")]
    UnknownType(String),

    #[error("Value for field {field} does not match the schema: {reason}")]
    ValueMismatch { field: String, reason: String },

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input file {0}: expected a .mmsg schema")]
    InvalidInput(String),

    #[error("{failed} of {total} schema files failed")]
    BatchFailed { failed: usize, total: usize },
}

pub type MicrobufResult<T> = Result<T, MicrobufError>;
