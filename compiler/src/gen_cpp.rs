use microbuf_schema::{HeaderClass, ScalarType};

use crate::{
    emitter::{unique_identifiers, CapabilityTable, Emitter, Target, TypeRendering},
    error::MicrobufError,
    layout::LayoutPlan,
    types::MessageSpec,
};

/// The `microbuf.h` runtime every generated header includes. Ship it next to
/// the generated files.
pub const CPP_RUNTIME_HEADER: &str = include_str!("../runtime/microbuf.h");

/// File name of [`CPP_RUNTIME_HEADER`].
pub const CPP_RUNTIME_FILENAME: &str = "microbuf.h";

fn escape_cpp_keyword(s: &str) -> String {
    let keywords = [
        "alignas", "alignof", "and", "asm", "auto", "bool", "break", "case", "catch",
        "char", "class", "const", "constexpr", "continue", "decltype", "default",
        "delete", "do", "double", "else", "enum", "explicit", "export", "extern",
        "false", "float", "for", "friend", "goto", "if", "inline", "int", "long",
        "mutable", "namespace", "new", "noexcept", "not", "nullptr", "operator",
        "or", "private", "protected", "public", "register", "return", "short",
        "signed", "sizeof", "static", "struct", "switch", "template", "this",
        "throw", "true", "try", "typedef", "typename", "union", "unsigned",
        "using", "virtual", "void", "volatile", "while", "xor",
        // members of the generated struct
        "as_bytes", "from_bytes", "size", "version", "field_count", "bytes", "decoded",
    ];
    if keywords.contains(&s) {
        format!("{}_", s)
    } else {
        s.to_string()
    }
}

/// The C++ spelling of every scalar type, targeting `microbuf.h`.
pub fn cpp_capabilities() -> CapabilityTable {
    let entry = |primitive, encode_call, decode_call, init_literal| TypeRendering {
        primitive,
        encode_call,
        decode_call,
        init_literal,
    };
    CapabilityTable::new()
        .with(ScalarType::Bool, entry("bool", "microbuf::write_bool", "microbuf::parse_bool", "false"))
        .with(ScalarType::Uint8, entry("uint8_t", "microbuf::write_uint8", "microbuf::parse_uint8", "0"))
        .with(ScalarType::Uint16, entry("uint16_t", "microbuf::write_uint16", "microbuf::parse_uint16", "0"))
        .with(ScalarType::Uint32, entry("uint32_t", "microbuf::write_uint32", "microbuf::parse_uint32", "0"))
        .with(ScalarType::Uint64, entry("uint64_t", "microbuf::write_uint64", "microbuf::parse_uint64", "0"))
        .with(ScalarType::Float32, entry("float", "microbuf::write_float32", "microbuf::parse_float32", "0.0f"))
        .with(ScalarType::Float64, entry("double", "microbuf::write_float64", "microbuf::parse_float64", "0.0"))
}

/// Generates a header-only C++ struct per message.
pub struct CppEmitter {
    capabilities: CapabilityTable,
}

impl Default for CppEmitter {
    fn default() -> Self {
        CppEmitter::new()
    }
}

impl CppEmitter {
    pub fn new() -> CppEmitter {
        CppEmitter::with_capabilities(cpp_capabilities())
    }

    pub fn with_capabilities(capabilities: CapabilityTable) -> CppEmitter {
        CppEmitter { capabilities }
    }
}

impl Emitter for CppEmitter {
    fn target(&self) -> Target {
        Target::Cpp
    }

    fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    fn filename(&self, message: &MessageSpec) -> String {
        format!("{}.h", message.name())
    }

    fn emit(&self, message: &MessageSpec, plan: &LayoutPlan) -> Result<String, MicrobufError> {
        let name = message.name();
        let struct_name = format!("{}_struct_t", name);
        let guard = format!("MICROBUF_{}_H", name.to_uppercase());
        let field_names = unique_identifiers(plan.slots().iter().map(|slot| escape_cpp_keyword(slot.field_name())));
        let size = plan.total_size();
        let (write_header, check_header) = match plan.header_class() {
            HeaderClass::Fixarray => ("microbuf::write_fixarray", "microbuf::check_fixarray"),
            HeaderClass::Array16 => ("microbuf::write_array16", "microbuf::check_array16"),
            HeaderClass::Array32 => ("microbuf::write_array32", "microbuf::check_array32"),
        };
        let mut code: Vec<String> = Vec::new();

        code.push(format!(
            "// Generated by microbuf from message {} (version {}). Do not edit.",
            name,
            message.version()
        ));
        code.push("//".to_string());
        code.push(format!(
            "// Layout: {} header ({} bytes), {} plain fields, {} bytes total.",
            plan.header_class(),
            plan.header_size(),
            plan.plain_field_count(),
            size
        ));
        code.push("".to_string());
        code.push(format!("#ifndef {}", guard));
        code.push(format!("#define {}", guard));
        code.push("".to_string());
        code.push("#include \"microbuf.h\"".to_string());
        code.push("".to_string());
        code.push(format!("struct {} {{", struct_name));
        code.push(format!("    static constexpr int64_t version = {};", message.version()));
        code.push(format!("    static constexpr std::size_t size = {};", size));
        code.push(format!("    static constexpr uint32_t field_count = {};", plan.plain_field_count()));
        code.push("".to_string());

        for (slot, field) in plan.slots().iter().zip(&field_names) {
            let rendering = self.capabilities.get(slot.type_())?;
            if slot.repeat() > 1 {
                code.push(format!(
                    "    microbuf::array<{}, {}> {} {{}};",
                    rendering.primitive,
                    slot.repeat(),
                    field
                ));
            } else {
                code.push(format!("    {} {} {{{}}};", rendering.primitive, field, rendering.init_literal));
            }
        }
        code.push("".to_string());

        // Encoder
        code.push(format!("    microbuf::array<uint8_t, {}> as_bytes() const {{", size));
        code.push(format!("        microbuf::array<uint8_t, {}> bytes {{}};", size));
        code.push(format!("        {}(bytes, 0, field_count);", write_header));
        for (slot, field) in plan.slots().iter().zip(&field_names) {
            let rendering = self.capabilities.get(slot.type_())?;
            if slot.repeat() > 1 {
                code.push(format!("        for (std::size_t i = 0; i < {}; ++i) {{", slot.repeat()));
                code.push(format!(
                    "            {}(bytes, {} + i * {}, this->{}[i]);",
                    rendering.encode_call,
                    slot.start_offset(),
                    slot.element_width(),
                    field
                ));
                code.push("        }".to_string());
            } else {
                code.push(format!(
                    "        {}(bytes, {}, this->{});",
                    rendering.encode_call,
                    slot.start_offset(),
                    field
                ));
            }
        }
        if let Some(offset) = plan.checksum_offset() {
            code.push(format!("        microbuf::append_crc(bytes, {});", offset));
        }
        code.push("        return bytes;".to_string());
        code.push("    }".to_string());
        code.push("".to_string());

        // Decoder; fields are only assigned once everything has been verified
        code.push(format!(
            "    bool from_bytes(const microbuf::array<uint8_t, {}>& bytes) {{",
            size
        ));
        code.push(format!("        if (!{}(bytes, 0, field_count)) return false;", check_header));
        code.push(format!("        {} decoded {{}};", struct_name));
        for (slot, field) in plan.slots().iter().zip(&field_names) {
            let rendering = self.capabilities.get(slot.type_())?;
            if slot.repeat() > 1 {
                code.push(format!("        for (std::size_t i = 0; i < {}; ++i) {{", slot.repeat()));
                code.push(format!(
                    "            if (!{}(bytes, {} + i * {}, decoded.{}[i])) return false;",
                    rendering.decode_call,
                    slot.start_offset(),
                    slot.element_width(),
                    field
                ));
                code.push("        }".to_string());
            } else {
                code.push(format!(
                    "        if (!{}(bytes, {}, decoded.{})) return false;",
                    rendering.decode_call,
                    slot.start_offset(),
                    field
                ));
            }
        }
        if let Some(offset) = plan.checksum_offset() {
            code.push(format!("        if (!microbuf::verify_crc(bytes, {})) return false;", offset));
        }
        code.push("        *this = decoded;".to_string());
        code.push("        return true;".to_string());
        code.push("    }".to_string());
        code.push("};".to_string());
        code.push("".to_string());
        code.push(format!("#endif // {}", guard));

        let mut source = code.join("\n");
        source.push('\n');
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compile_layout;

    fn sensor_data() -> MessageSpec {
        MessageSpec::new("SensorData", 1, true)
            .and_then(|m| m.with_field("distance", "float32", 10))
            .and_then(|m| m.with_field("angle", "float32", 10))
            .and_then(|m| m.with_field("robot_id", "uint8", 1))
            .unwrap()
    }

    #[test]
    fn header_uses_planned_offsets() {
        let msg = sensor_data();
        let plan = compile_layout(&msg).unwrap();
        let code = CppEmitter::new().emit(&msg, &plan).unwrap();

        assert!(code.contains("#ifndef MICROBUF_SENSORDATA_H"));
        assert!(code.contains("struct SensorData_struct_t {"));
        assert!(code.contains("    static constexpr std::size_t size = 108;"));
        assert!(code.contains("    microbuf::array<float, 10> distance {};"));
        assert!(code.contains("    uint8_t robot_id {0};"));
        assert!(code.contains("        microbuf::write_array16(bytes, 0, field_count);"));
        assert!(code.contains("            microbuf::write_float32(bytes, 3 + i * 5, this->distance[i]);"));
        assert!(code.contains("            microbuf::write_float32(bytes, 53 + i * 5, this->angle[i]);"));
        assert!(code.contains("        microbuf::write_uint8(bytes, 103, this->robot_id);"));
        assert!(code.contains("        microbuf::append_crc(bytes, 105);"));
        assert!(code.contains("        if (!microbuf::check_array16(bytes, 0, field_count)) return false;"));
        assert!(code.contains("        if (!microbuf::verify_crc(bytes, 105)) return false;"));
        assert_eq!(CppEmitter::new().filename(&msg), "SensorData.h");
    }

    #[test]
    fn fixarray_without_checksum() {
        let msg = MessageSpec::new("A", 1, false)
            .and_then(|m| m.with_field("foo", "float32", 1))
            .and_then(|m| m.with_field("bar", "float64", 1))
            .unwrap();
        let plan = compile_layout(&msg).unwrap();
        let code = CppEmitter::new().emit(&msg, &plan).unwrap();
        assert!(code.contains("        microbuf::write_fixarray(bytes, 0, field_count);"));
        assert!(code.contains("        microbuf::write_float64(bytes, 6, this->bar);"));
        assert!(code.contains("    double bar {0.0};"));
        assert!(!code.contains("crc"));
    }

    #[test]
    fn member_collisions_are_renamed() {
        let msg = MessageSpec::new("B", 1, false)
            .and_then(|m| m.with_field("size", "uint8", 1))
            .and_then(|m| m.with_field("int", "uint8", 1))
            .unwrap();
        let plan = compile_layout(&msg).unwrap();
        let code = CppEmitter::new().emit(&msg, &plan).unwrap();
        assert!(code.contains("    uint8_t size_ {0};"));
        assert!(code.contains("    uint8_t int_ {0};"));
    }

    #[test]
    fn loop_index_never_shadows_a_member() {
        let msg = MessageSpec::new("P", 1, false)
            .and_then(|m| m.with_field("i", "uint8", 2))
            .and_then(|m| m.with_field("bytes", "uint8", 1))
            .unwrap();
        let plan = compile_layout(&msg).unwrap();
        let code = CppEmitter::new().emit(&msg, &plan).unwrap();
        assert!(code.contains("    microbuf::array<uint8_t, 2> i {};"));
        assert!(code.contains("            microbuf::write_uint8(bytes, 1 + i * 2, this->i[i]);"));
        assert!(code.contains("            if (!microbuf::parse_uint8(bytes, 1 + i * 2, decoded.i[i])) return false;"));
        assert!(code.contains("        microbuf::write_uint8(bytes, 5, this->bytes_);"));
        assert!(!code.contains(", i[i]"));
    }

    #[test]
    fn runtime_header_is_bundled() {
        assert!(CPP_RUNTIME_HEADER.contains("crc16_aug_ccitt"));
        assert!(CPP_RUNTIME_HEADER.contains("0x1D0F"));
    }
}
