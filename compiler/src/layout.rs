//! Layout compiler: maps a [`MessageSpec`] to the byte-exact [`LayoutPlan`]
//! every emitter reproduces.
//!
//! A message is laid out as one array. The count header comes first, sized by
//! the number of scalars after arrays are flattened, then every field in
//! declaration order with each element carrying its own tag, then the
//! optional checksum item.

use microbuf_schema::{HeaderClass, ScalarType, CHECKSUM_WIDTH};
use serde::Serialize;
use tracing::debug;

use crate::{error::MicrobufError, types::MessageSpec, utils::quote};

/// The byte range reserved for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    field_name:    String,
    #[serde(rename = "type")]
    type_:         ScalarType,
    repeat:        u32,
    start_offset:  u64,
    element_width: u64,
}

impl Slot {
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn type_(&self) -> ScalarType {
        self.type_
    }

    pub fn repeat(&self) -> u32 {
        self.repeat
    }

    /// Offset of the first element's tag byte.
    pub fn start_offset(&self) -> u64 {
        self.start_offset
    }

    /// Wire width of a single element.
    pub fn element_width(&self) -> u64 {
        self.element_width
    }

    /// Offset of element `index` within an array slot.
    pub fn element_offset(&self, index: u32) -> u64 {
        self.start_offset + index as u64 * self.element_width
    }

    /// One past the last byte of the slot.
    pub fn end_offset(&self) -> u64 {
        self.element_offset(self.repeat)
    }
}

/// Fully resolved wire layout of one message.
///
/// Only [`compile_layout`] builds plans; recompile instead of editing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutPlan {
    header_class:      HeaderClass,
    header_size:       u64,
    plain_field_count: u64,
    slots:             Vec<Slot>,
    payload_size:      u64,
    checksum_enabled:  bool,
    checksum_offset:   Option<u64>,
    total_size:        u64,
}

impl LayoutPlan {
    pub fn header_class(&self) -> HeaderClass {
        self.header_class
    }

    pub fn header_size(&self) -> u64 {
        self.header_size
    }

    /// Number of scalars the header announces; arrays count once per element.
    pub fn plain_field_count(&self) -> u64 {
        self.plain_field_count
    }

    /// Slots in field order, one per field of the message.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Bytes up to and excluding the checksum.
    pub fn payload_size(&self) -> u64 {
        self.payload_size
    }

    pub fn checksum_enabled(&self) -> bool {
        self.checksum_enabled
    }

    pub fn checksum_offset(&self) -> Option<u64> {
        self.checksum_offset
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }
}

/// Compute the layout of `message`.
///
/// Fails only with `TooManyFields`, when the flattened field count does not
/// fit an `array32` header.
pub fn compile_layout(message: &MessageSpec) -> Result<LayoutPlan, MicrobufError> {
    let plain_field_count = message
        .fields()
        .iter()
        .fold(0u64, |count, field| count.saturating_add(field.repeat() as u64));

    let header_class = HeaderClass::for_count(plain_field_count).ok_or_else(|| {
        MicrobufError::TooManyFields {
            message: quote(message.name()),
            count:   plain_field_count,
            max:     HeaderClass::Array32.max_count(),
        }
    })?;
    let header_size = header_class.header_size();

    let mut cursor = header_size;
    let mut slots = Vec::with_capacity(message.fields().len());
    for field in message.fields() {
        let element_width = field.type_().wire_width();
        slots.push(Slot {
            field_name: field.name().to_string(),
            type_: field.type_(),
            repeat: field.repeat(),
            start_offset: cursor,
            element_width,
        });
        cursor += field.repeat() as u64 * element_width;
    }

    let payload_size = cursor;
    let (checksum_offset, total_size) = if message.append_checksum() {
        (Some(payload_size), payload_size + CHECKSUM_WIDTH)
    } else {
        (None, payload_size)
    };

    debug!(
        msg = message.name(),
        %header_class,
        plain_field_count,
        payload_size,
        total_size,
        "compiled layout"
    );

    Ok(LayoutPlan {
        header_class,
        header_size,
        plain_field_count,
        slots,
        payload_size,
        checksum_enabled: message.append_checksum(),
        checksum_offset,
        total_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(append_checksum: bool) -> MessageSpec {
        MessageSpec::new("Sample", 1, append_checksum)
            .and_then(|m| m.with_field("a", "uint8", 1))
            .and_then(|m| m.with_field("b", "float32", 3))
            .unwrap()
    }

    fn with_count(count: u64) -> MessageSpec {
        let mut msg = MessageSpec::new("Wide", 1, false).unwrap();
        let mut remaining = count;
        while remaining > 0 {
            let repeat = remaining.min(u32::MAX as u64) as u32;
            msg.add_field("v", "bool", repeat).unwrap();
            remaining -= repeat as u64;
        }
        msg
    }

    #[test]
    fn offsets_without_checksum() {
        let plan = compile_layout(&sample(false)).unwrap();
        assert_eq!(plan.header_class(), HeaderClass::Fixarray);
        assert_eq!(plan.header_size(), 1);
        assert_eq!(plan.plain_field_count(), 4);

        let a = &plan.slots()[0];
        assert_eq!((a.field_name(), a.start_offset(), a.element_width()), ("a", 1, 2));
        let b = &plan.slots()[1];
        assert_eq!((b.field_name(), b.start_offset(), b.element_width()), ("b", 3, 5));
        assert_eq!(b.end_offset(), 18);
        assert_eq!(b.element_offset(2), 13);

        assert_eq!(plan.payload_size(), 18);
        assert!(!plan.checksum_enabled());
        assert_eq!(plan.checksum_offset(), None);
        assert_eq!(plan.total_size(), 18);
    }

    #[test]
    fn checksum_is_appended() {
        let plan = compile_layout(&sample(true)).unwrap();
        assert!(plan.checksum_enabled());
        assert_eq!(plan.payload_size(), 18);
        assert_eq!(plan.checksum_offset(), Some(18));
        assert_eq!(plan.total_size(), 21);
    }

    #[test]
    fn header_class_boundaries() {
        let class = |count| compile_layout(&with_count(count)).unwrap().header_class();
        assert_eq!(class(15), HeaderClass::Fixarray);
        assert_eq!(class(16), HeaderClass::Array16);
        assert_eq!(class(65_535), HeaderClass::Array16);
        assert_eq!(class(65_536), HeaderClass::Array32);
    }

    #[test]
    fn header_size_shifts_offsets() {
        let plan = compile_layout(&with_count(16)).unwrap();
        assert_eq!(plan.header_size(), 3);
        assert_eq!(plan.slots()[0].start_offset(), 3);
        assert_eq!(plan.payload_size(), 3 + 16);

        let plan = compile_layout(&with_count(65_536)).unwrap();
        assert_eq!(plan.header_size(), 5);
        assert_eq!(plan.payload_size(), 5 + 65_536);
    }

    #[test]
    fn too_many_fields() {
        let err = compile_layout(&with_count(4_294_967_296)).unwrap_err();
        match err {
            MicrobufError::TooManyFields { count, max, .. } => {
                assert_eq!(count, 4_294_967_296);
                assert_eq!(max, 4_294_967_295);
            }
            other => panic!("expected TooManyFields, got {:?}", other),
        }
        assert!(compile_layout(&with_count(4_294_967_295)).is_ok());
    }

    #[test]
    fn repeat_of_one_is_a_scalar() {
        let scalar = MessageSpec::new("M", 1, false).and_then(|m| m.with_field("x", "uint64", 1)).unwrap();
        let plan = compile_layout(&scalar).unwrap();
        assert_eq!(plan.slots()[0].end_offset() - plan.slots()[0].start_offset(), 9);
        assert_eq!(plan.plain_field_count(), 1);
        assert_eq!(plan.total_size(), 10);
    }

    #[test]
    fn duplicate_names_get_separate_slots() {
        let msg = MessageSpec::new("M", 1, true)
            .and_then(|m| m.with_field("x", "uint16", 1))
            .and_then(|m| m.with_field("x", "uint16", 1))
            .unwrap();
        let plan = compile_layout(&msg).unwrap();
        assert_eq!(plan.slots()[0].start_offset(), 1);
        assert_eq!(plan.slots()[1].start_offset(), 4);
        assert_eq!(plan.checksum_offset(), Some(7));
    }

    #[test]
    fn empty_message() {
        let plan = compile_layout(&MessageSpec::new("Empty", 0, true).unwrap()).unwrap();
        assert_eq!(plan.header_class(), HeaderClass::Fixarray);
        assert_eq!(plan.payload_size(), 1);
        assert_eq!(plan.total_size(), 4);
    }

    #[test]
    fn compilation_is_deterministic() {
        let msg = sample(true);
        assert_eq!(compile_layout(&msg).unwrap(), compile_layout(&msg).unwrap());
    }

    #[test]
    fn plan_serializes_to_json() {
        let plan = compile_layout(&sample(true)).unwrap();
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["header_class"], "fixarray");
        assert_eq!(json["slots"][1]["type"], "float32");
        assert_eq!(json["slots"][1]["start_offset"], 3);
        assert_eq!(json["checksum_offset"], 18);
        assert_eq!(json["total_size"], 21);
    }
}
