//! The contract between the layout compiler and per-language code generators.
//!
//! An emitter turns a [`MessageSpec`] and its [`LayoutPlan`] into one source
//! file. It owns a [`CapabilityTable`] describing how each scalar type is
//! spelled in its target language; the layout itself is never decided by an
//! emitter.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use microbuf_schema::ScalarType;
use serde::Serialize;

use crate::{
    error::MicrobufError,
    gen_cpp::CppEmitter,
    gen_matlab::MatlabEmitter,
    gen_rust::RustEmitter,
    layout::LayoutPlan,
    types::MessageSpec,
};

/// How one scalar type is rendered in a target language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRendering {
    /// Primitive type name, e.g. `u16` or `uint16_t`.
    pub primitive:    &'static str,
    /// Function or method writing one value.
    pub encode_call:  &'static str,
    /// Function or method reading one value.
    pub decode_call:  &'static str,
    /// Literal the generated structure is initialized with.
    pub init_literal: &'static str,
}

/// A target's mapping from every scalar type to its rendering.
#[derive(Debug, Clone, Default)]
pub struct CapabilityTable {
    entries: HashMap<ScalarType, TypeRendering>,
}

impl CapabilityTable {
    pub fn new() -> CapabilityTable {
        CapabilityTable::default()
    }

    pub fn with(mut self, ty: ScalarType, rendering: TypeRendering) -> CapabilityTable {
        self.entries.insert(ty, rendering);
        self
    }

    /// Looks up the rendering of `ty`, failing with `UnknownType` when the
    /// table has no entry for it.
    pub fn get(&self, ty: ScalarType) -> Result<&TypeRendering, MicrobufError> {
        self.entries
            .get(&ty)
            .ok_or_else(|| MicrobufError::UnknownType(ty.token().to_string()))
    }

    /// True when every scalar type of the catalog has an entry.
    pub fn is_complete(&self) -> bool {
        ScalarType::ALL.iter().all(|ty| self.entries.contains_key(ty))
    }
}

/// A generated source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub filename: String,
    pub contents: String,
}

/// Implemented by every code generator.
///
/// A generated encoder writes the header, then every slot in order at its
/// planned offset, then the checksum over all preceding bytes. A generated
/// decoder checks the header count, reads the slots in the same order and stops at
/// the first mismatch, and verifies the checksum last.
pub trait Emitter {
    /// Short name of the target language, as accepted on the command line.
    fn target(&self) -> Target;

    fn capabilities(&self) -> &CapabilityTable;

    /// File name the generated source for `message` is stored under.
    fn filename(&self, message: &MessageSpec) -> String;

    /// Render the source text. Must not depend on anything but its inputs.
    fn emit(&self, message: &MessageSpec, plan: &LayoutPlan) -> Result<String, MicrobufError>;

    fn generate(&self, message: &MessageSpec, plan: &LayoutPlan) -> Result<GeneratedFile, MicrobufError> {
        Ok(GeneratedFile {
            filename: self.filename(message),
            contents: self.emit(message, plan)?,
        })
    }
}

/// Languages with a built-in emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Rust,
    Cpp,
    Matlab,
}

impl Target {
    pub const ALL: [Target; 3] = [Target::Rust, Target::Cpp, Target::Matlab];
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Target::Rust => "rust",
            Target::Cpp => "cpp",
            Target::Matlab => "matlab",
        })
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rust" | "rs" => Ok(Target::Rust),
            "cpp" | "c++" => Ok(Target::Cpp),
            "matlab" | "m" => Ok(Target::Matlab),
            other => Err(format!("unknown target {:?}", other)),
        }
    }
}

/// The default emitter for `target`.
pub fn emitter_for(target: Target) -> Box<dyn Emitter> {
    match target {
        Target::Rust => Box::new(RustEmitter::new()),
        Target::Cpp => Box::new(CppEmitter::new()),
        Target::Matlab => Box::new(MatlabEmitter::new()),
    }
}

/// Maps field names to identifiers that are unique within one generated
/// structure. The first occurrence keeps its name; repeats get `_2`, `_3`, ...
pub fn unique_identifiers<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for name in names {
        let base: String = name.into();
        let mut candidate = base.clone();
        if taken.contains(&candidate) {
            let counter = next_suffix.entry(base.clone()).or_insert(1);
            while taken.contains(&candidate) {
                *counter += 1;
                candidate = format!("{}_{}", base, counter);
            }
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}
