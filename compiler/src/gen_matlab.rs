use microbuf_schema::{ByteBufferMut, ScalarType};

use crate::{
    emitter::{unique_identifiers, CapabilityTable, Emitter, Target, TypeRendering},
    error::MicrobufError,
    layout::LayoutPlan,
    types::MessageSpec,
};

/// Reader functions appended to every generated deserializer. Each takes the
/// zero-based offset of an item's tag byte and returns the value plus whether
/// the tag matched.
const MATLAB_READERS: &str = r#"function [value, ok] = mb_read_bool(bytes, offset)
    tag = bytes(offset + 1);
    ok = tag == 194 || tag == 195;
    value = tag == 195;
end

function [value, ok] = mb_read_uint8(bytes, offset)
    ok = bytes(offset + 1) == 204;
    value = bytes(offset + 2);
end

function [value, ok] = mb_read_uint16(bytes, offset)
    ok = bytes(offset + 1) == 205;
    value = typecast(fliplr(bytes(offset + 2:offset + 3)), 'uint16');
end

function [value, ok] = mb_read_uint32(bytes, offset)
    ok = bytes(offset + 1) == 206;
    value = typecast(fliplr(bytes(offset + 2:offset + 5)), 'uint32');
end

function [value, ok] = mb_read_uint64(bytes, offset)
    ok = bytes(offset + 1) == 207;
    value = typecast(fliplr(bytes(offset + 2:offset + 9)), 'uint64');
end

function [value, ok] = mb_read_float32(bytes, offset)
    ok = bytes(offset + 1) == 202;
    value = typecast(fliplr(bytes(offset + 2:offset + 5)), 'single');
end

function [value, ok] = mb_read_float64(bytes, offset)
    ok = bytes(offset + 1) == 203;
    value = typecast(fliplr(bytes(offset + 2:offset + 9)), 'double');
end

% CRC-16/AUG-CCITT: polynomial 0x1021, register preloaded with 0x1D0F.
function crc = mb_crc16(data)
    crc = uint16(7439);
    for k = 1:numel(data)
        crc = bitxor(crc, bitshift(uint16(data(k)), 8));
        for b = 1:8
            if bitand(crc, uint16(32768))
                crc = bitxor(bitshift(crc, 1), uint16(4129));
            else
                crc = bitshift(crc, 1);
            end
        end
    end
end
"#;

fn escape_matlab_keyword(s: &str) -> String {
    let keywords = [
        "break", "case", "catch", "classdef", "continue", "else", "elseif", "end",
        "for", "function", "global", "if", "otherwise", "parfor", "persistent",
        "return", "spmd", "switch", "try", "while",
    ];
    if keywords.contains(&s) {
        format!("{}_", s)
    } else {
        s.to_string()
    }
}

/// The MATLAB spelling of every scalar type. MATLAB output only decodes, so
/// `encode_call` is left empty.
pub fn matlab_capabilities() -> CapabilityTable {
    let entry = |primitive, decode_call, init_literal| TypeRendering {
        primitive,
        encode_call: "",
        decode_call,
        init_literal,
    };
    CapabilityTable::new()
        .with(ScalarType::Bool, entry("logical", "mb_read_bool", "false"))
        .with(ScalarType::Uint8, entry("uint8", "mb_read_uint8", "uint8(0)"))
        .with(ScalarType::Uint16, entry("uint16", "mb_read_uint16", "uint16(0)"))
        .with(ScalarType::Uint32, entry("uint32", "mb_read_uint32", "uint32(0)"))
        .with(ScalarType::Uint64, entry("uint64", "mb_read_uint64", "uint64(0)"))
        .with(ScalarType::Float32, entry("single", "mb_read_float32", "single(0)"))
        .with(ScalarType::Float64, entry("double", "mb_read_float64", "0"))
}

/// Generates a MATLAB deserializer function per message, for receiving
/// messages sent by the C++ or Rust side.
pub struct MatlabEmitter {
    capabilities: CapabilityTable,
}

impl Default for MatlabEmitter {
    fn default() -> Self {
        MatlabEmitter::new()
    }
}

impl MatlabEmitter {
    pub fn new() -> MatlabEmitter {
        MatlabEmitter::with_capabilities(matlab_capabilities())
    }

    pub fn with_capabilities(capabilities: CapabilityTable) -> MatlabEmitter {
        MatlabEmitter { capabilities }
    }
}

fn function_name(message: &MessageSpec) -> String {
    format!("deserialize_{}", message.name())
}

fn matlab_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| b.to_string()).collect::<Vec<_>>().join(" ")
}

impl Emitter for MatlabEmitter {
    fn target(&self) -> Target {
        Target::Matlab
    }

    fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    fn filename(&self, message: &MessageSpec) -> String {
        format!("{}.m", function_name(message))
    }

    fn emit(&self, message: &MessageSpec, plan: &LayoutPlan) -> Result<String, MicrobufError> {
        let field_names = unique_identifiers(plan.slots().iter().map(|slot| escape_matlab_keyword(slot.field_name())));
        let size = plan.total_size();
        let mut header = ByteBufferMut::with_capacity(plan.header_size() as usize);
        header.write_array_header(plan.plain_field_count() as u32);
        let mut code: Vec<String> = Vec::new();

        code.push(format!("function [msg, err] = {}(bytes)", function_name(message)));
        code.push(format!(
            "% Generated by microbuf from message {} (version {}). Do not edit.",
            message.name(),
            message.version()
        ));
        code.push("%".to_string());
        code.push(format!(
            "% Layout: {} header ({} bytes), {} plain fields, {} bytes total.",
            plan.header_class(),
            plan.header_size(),
            plan.plain_field_count(),
            size
        ));
        code.push("% err is true when bytes do not hold a valid message; msg is then incomplete.".to_string());
        code.push("    msg = struct();".to_string());
        code.push("    err = true;".to_string());
        code.push("    bytes = reshape(uint8(bytes), 1, []);".to_string());
        code.push(format!("    if numel(bytes) ~= {}", size));
        code.push("        return;".to_string());
        code.push("    end".to_string());
        code.push(format!(
            "    if ~isequal(bytes(1:{}), uint8([{}]))",
            plan.header_size(),
            matlab_bytes(header.as_slice())
        ));
        code.push("        return;".to_string());
        code.push("    end".to_string());

        for (slot, field) in plan.slots().iter().zip(&field_names) {
            let rendering = self.capabilities.get(slot.type_())?;
            code.push(format!(
                "    % {}: {}{} @ {}",
                slot.field_name(),
                slot.type_(),
                if slot.repeat() > 1 { format!("[{}]", slot.repeat()) } else { String::new() },
                slot.start_offset()
            ));
            if slot.repeat() > 1 {
                let init = if slot.type_() == ScalarType::Bool {
                    format!("false(1, {})", slot.repeat())
                } else {
                    format!("zeros(1, {}, '{}')", slot.repeat(), rendering.primitive)
                };
                code.push(format!("    msg.{} = {};", field, init));
                code.push(format!("    for k = 0:{}", slot.repeat() - 1));
                code.push(format!(
                    "        [msg.{}(k + 1), ok] = {}(bytes, {} + k * {});",
                    field,
                    rendering.decode_call,
                    slot.start_offset(),
                    slot.element_width()
                ));
                code.push("        if ~ok".to_string());
                code.push("            return;".to_string());
                code.push("        end".to_string());
                code.push("    end".to_string());
            } else {
                code.push(format!(
                    "    [msg.{}, ok] = {}(bytes, {});",
                    field,
                    rendering.decode_call,
                    slot.start_offset()
                ));
                code.push("    if ~ok".to_string());
                code.push("        return;".to_string());
                code.push("    end".to_string());
            }
        }

        if let Some(offset) = plan.checksum_offset() {
            code.push(format!("    % checksum @ {}", offset));
            code.push(format!("    [stored, ok] = mb_read_uint16(bytes, {});", offset));
            code.push(format!("    if ~ok || mb_crc16(bytes(1:{})) ~= stored", offset));
            code.push("        return;".to_string());
            code.push("    end".to_string());
        }
        code.push("    err = false;".to_string());
        code.push("end".to_string());
        code.push("".to_string());

        let mut source = code.join("\n");
        source.push('\n');
        source.push_str(MATLAB_READERS);
        Ok(source)
    }
}
