use microbuf_schema::ScalarType;

use crate::{
    emitter::{unique_identifiers, CapabilityTable, Emitter, Target, TypeRendering},
    error::MicrobufError,
    layout::LayoutPlan,
    types::MessageSpec,
    utils::{to_pascal_case, to_snake_case},
};

/// Escapes Rust reserved keywords by suffixing with an underscore.
fn escape_rust_keyword(s: &str) -> String {
    let keywords = [
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else",
        "enum", "extern", "false", "fn", "for", "if", "impl",
        "in", "let", "loop", "match", "mod", "move", "mut",
        "pub", "ref", "return", "self", "Self", "static",
        "struct", "super", "trait", "true", "type", "unsafe",
        "use", "where", "while", "abstract", "become", "box", "do",
        "final", "macro", "override", "priv", "typeof", "unsized",
        "virtual", "yield", "try",
    ];
    if keywords.contains(&s) {
        format!("{}_", s)
    } else {
        s.to_string()
    }
}

/// Struct name for a message. Keywords and names the generated code refers to
/// get a `_` suffix.
fn rust_type_name(message_name: &str) -> String {
    let taken = [
        "ByteBuffer", "ByteBufferMut", "DecodeError", "MicrobufMessage",
        "Self", "Default", "Result", "Ok", "Err", "Option", "Some", "None",
        "Vec", "String", "Box", "Sized", "Clone", "Debug", "PartialEq",
    ];
    let name = to_pascal_case(message_name);
    if taken.contains(&name.as_str()) {
        format!("{}_", name)
    } else {
        name
    }
}

/// The Rust spelling of every scalar type, targeting the `microbuf` runtime
/// buffers.
pub fn rust_capabilities() -> CapabilityTable {
    let entry = |primitive, encode_call, decode_call, init_literal| TypeRendering {
        primitive,
        encode_call,
        decode_call,
        init_literal,
    };
    CapabilityTable::new()
        .with(ScalarType::Bool, entry("bool", "write_bool", "read_bool", "false"))
        .with(ScalarType::Uint8, entry("u8", "write_uint8", "read_uint8", "0"))
        .with(ScalarType::Uint16, entry("u16", "write_uint16", "read_uint16", "0"))
        .with(ScalarType::Uint32, entry("u32", "write_uint32", "read_uint32", "0"))
        .with(ScalarType::Uint64, entry("u64", "write_uint64", "read_uint64", "0"))
        .with(ScalarType::Float32, entry("f32", "write_float32", "read_float32", "0.0"))
        .with(ScalarType::Float64, entry("f64", "write_float64", "read_float64", "0.0"))
}

/// Generates a Rust module with one struct per message, encoding to and
/// decoding from a fixed-size byte array.
pub struct RustEmitter {
    capabilities: CapabilityTable,
}

impl Default for RustEmitter {
    fn default() -> Self {
        RustEmitter::new()
    }
}

impl RustEmitter {
    pub fn new() -> RustEmitter {
        RustEmitter::with_capabilities(rust_capabilities())
    }

    pub fn with_capabilities(capabilities: CapabilityTable) -> RustEmitter {
        RustEmitter { capabilities }
    }
}

impl Emitter for RustEmitter {
    fn target(&self) -> Target {
        Target::Rust
    }

    fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    fn filename(&self, message: &MessageSpec) -> String {
        format!("{}.rs", escape_rust_keyword(&to_snake_case(message.name())))
    }

    fn emit(&self, message: &MessageSpec, plan: &LayoutPlan) -> Result<String, MicrobufError> {
        compile_message_to_rust(message, plan, &self.capabilities)
    }
}

/// Compiles one message into Rust source: the struct, a `Default` impl, the
/// fixed-size `as_bytes`/`from_bytes` pair and a `MicrobufMessage` impl.
pub fn compile_message_to_rust(
    message: &MessageSpec,
    plan: &LayoutPlan,
    capabilities: &CapabilityTable,
) -> Result<String, MicrobufError> {
    let struct_name = rust_type_name(message.name());
    let field_names = unique_identifiers(
        plan.slots()
            .iter()
            .map(|slot| escape_rust_keyword(&to_snake_case(slot.field_name()))),
    );
    let size = plan.total_size();
    let mut rust_code: Vec<String> = Vec::new();

    rust_code.push(format!(
        "// Generated by microbuf from message {} (version {}). Do not edit.",
        message.name(),
        message.version()
    ));
    rust_code.push("//".to_string());
    rust_code.push(format!(
        "// Layout: {} header ({} bytes), {} plain fields, {} bytes total.",
        plan.header_class(),
        plan.header_size(),
        plan.plain_field_count(),
        size
    ));
    rust_code.push("".to_string());
    rust_code.push("use microbuf::{ByteBuffer, ByteBufferMut, DecodeError, MicrobufMessage};".to_string());
    rust_code.push("".to_string());

    // Struct
    rust_code.push("#[derive(Debug, Clone, PartialEq)]".to_string());
    rust_code.push(format!("pub struct {} {{", struct_name));
    for (slot, name) in plan.slots().iter().zip(&field_names) {
        let rendering = capabilities.get(slot.type_())?;
        if slot.repeat() > 1 {
            rust_code.push(format!("    pub {}: [{}; {}],", name, rendering.primitive, slot.repeat()));
        } else {
            rust_code.push(format!("    pub {}: {},", name, rendering.primitive));
        }
    }
    rust_code.push("}".to_string());
    rust_code.push("".to_string());

    // Default, written out because arrays longer than 32 have no derived one
    rust_code.push(format!("impl Default for {} {{", struct_name));
    rust_code.push("    fn default() -> Self {".to_string());
    rust_code.push(format!("        {} {{", struct_name));
    for (slot, name) in plan.slots().iter().zip(&field_names) {
        let rendering = capabilities.get(slot.type_())?;
        if slot.repeat() > 1 {
            rust_code.push(format!("            {}: [{}; {}],", name, rendering.init_literal, slot.repeat()));
        } else {
            rust_code.push(format!("            {}: {},", name, rendering.init_literal));
        }
    }
    rust_code.push("        }".to_string());
    rust_code.push("    }".to_string());
    rust_code.push("}".to_string());
    rust_code.push("".to_string());

    rust_code.push(format!("impl {} {{", struct_name));
    rust_code.push(format!("    pub const VERSION: i64 = {};", message.version()));
    rust_code.push(format!("    pub const SIZE: usize = {};", size));
    rust_code.push(format!("    pub const FIELD_COUNT: u32 = {};", plan.plain_field_count()));
    rust_code.push("".to_string());

    // Encoder
    rust_code.push("    /// Encodes the message into its fixed-size wire form.".to_string());
    rust_code.push(format!("    pub fn as_bytes(&self) -> [u8; {}] {{", size));
    rust_code.push("        let mut bb = ByteBufferMut::with_capacity(Self::SIZE);".to_string());
    rust_code.push("        bb.write_array_header(Self::FIELD_COUNT);".to_string());
    for (slot, name) in plan.slots().iter().zip(&field_names) {
        let rendering = capabilities.get(slot.type_())?;
        rust_code.push(slot_comment(slot.field_name(), slot.type_(), slot.repeat(), slot.start_offset()));
        if slot.repeat() > 1 {
            rust_code.push(format!("        for value in &self.{} {{", name));
            rust_code.push(format!("            bb.{}(*value);", rendering.encode_call));
            rust_code.push("        }".to_string());
        } else {
            rust_code.push(format!("        bb.{}(self.{});", rendering.encode_call, name));
        }
    }
    if let Some(offset) = plan.checksum_offset() {
        rust_code.push(format!("        // checksum @ {}", offset));
        rust_code.push("        bb.write_checksum();".to_string());
    }
    rust_code.push("".to_string());
    rust_code.push(format!("        let mut bytes = [0u8; {}];", size));
    rust_code.push("        bytes.copy_from_slice(bb.as_slice());".to_string());
    rust_code.push("        bytes".to_string());
    rust_code.push("    }".to_string());
    rust_code.push("".to_string());

    // Decoder
    rust_code.push("    /// Decodes a message, stopping at the first structural mismatch.".to_string());
    rust_code.push(format!(
        "    pub fn from_bytes(bytes: &[u8; {}]) -> Result<Self, DecodeError> {{",
        size
    ));
    rust_code.push("        let mut bb = ByteBuffer::new(bytes);".to_string());
    rust_code.push("        bb.read_array_header(Self::FIELD_COUNT as u64)?;".to_string());
    if plan.slots().is_empty() {
        rust_code.push("        let message = Self::default();".to_string());
    } else {
        rust_code.push("        let mut message = Self::default();".to_string());
    }
    for (slot, name) in plan.slots().iter().zip(&field_names) {
        let rendering = capabilities.get(slot.type_())?;
        if slot.repeat() > 1 {
            rust_code.push(format!("        for value in message.{}.iter_mut() {{", name));
            rust_code.push(format!("            *value = bb.{}()?;", rendering.decode_call));
            rust_code.push("        }".to_string());
        } else {
            rust_code.push(format!("        message.{} = bb.{}()?;", name, rendering.decode_call));
        }
    }
    if plan.checksum_enabled() {
        rust_code.push("        bb.verify_checksum()?;".to_string());
    }
    rust_code.push("        Ok(message)".to_string());
    rust_code.push("    }".to_string());
    rust_code.push("}".to_string());
    rust_code.push("".to_string());

    // Trait impl
    rust_code.push(format!("impl MicrobufMessage for {} {{", struct_name));
    rust_code.push(format!("    const NAME: &'static str = \"{}\";", message.name()));
    rust_code.push(format!("    const VERSION: i64 = {};", message.version()));
    rust_code.push(format!("    const SIZE: usize = {};", size));
    rust_code.push("".to_string());
    rust_code.push("    fn encode(&self) -> Vec<u8> {".to_string());
    rust_code.push("        self.as_bytes().to_vec()".to_string());
    rust_code.push("    }".to_string());
    rust_code.push("".to_string());
    rust_code.push("    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {".to_string());
    rust_code.push(format!(
        "        let bytes: &[u8; {}] = bytes.try_into().map_err(|_| DecodeError::InvalidLength {{",
        size
    ));
    rust_code.push(format!("            expected: {},", size));
    rust_code.push("            found: bytes.len(),".to_string());
    rust_code.push("        })?;".to_string());
    rust_code.push("        Self::from_bytes(bytes)".to_string());
    rust_code.push("    }".to_string());
    rust_code.push("}".to_string());

    let mut source = rust_code.join("\n");
    source.push('\n');
    Ok(source)
}

fn slot_comment(field_name: &str, ty: ScalarType, repeat: u32, offset: u64) -> String {
    if repeat > 1 {
        format!("        // {}: {}[{}] @ {}", field_name, ty, repeat, offset)
    } else {
        format!("        // {}: {} @ {}", field_name, ty, offset)
    }
}
