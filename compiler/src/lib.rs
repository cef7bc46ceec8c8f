//! microbuf-compiler
//!
//! This crate implements:
//!  1) The message model (`MessageSpec`, `FieldSpec`) with eager validation,
//!  2) A parser for `.mmsg` schema documents,
//!  3) The layout compiler (`compile_layout` → `LayoutPlan`), which fixes the
//!     byte offset of every field, the header size class and the checksum slot,
//!  4) The emitter contract and the Rust, C++ and MATLAB code generators,
//!  5) Error types (`MicrobufError`), and the `MicrobufMessage` trait.

pub mod error;
pub mod types;
pub mod utils;
pub mod catalog;
pub mod verifier;
pub mod parser;
pub mod layout;
pub mod emitter;
pub mod compiler;
pub mod gen_rust;
pub mod gen_cpp;
pub mod gen_matlab;
pub mod traits;

pub use compiler::compile_schema;
pub use compiler::generate_sources;
pub use emitter::{emitter_for, CapabilityTable, Emitter, GeneratedFile, Target, TypeRendering};
pub use error::{MicrobufError, MicrobufResult};
pub use layout::{compile_layout, LayoutPlan, Slot};
pub use parser::parse_message;
pub use types::{FieldSpec, MessageSpec};
pub use microbuf_schema::{HeaderClass, ScalarType};
