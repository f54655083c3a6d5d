//! ---
//! chimera_section: "01-wire-codec"
//! chimera_subsection: "module"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Record codec, field tables and sample streams."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
//! Field descriptor tables and the presence-tracking [`FieldSet`].

use std::fmt;

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, Result, SchemaError};
use crate::wire::{self, FieldKey, Reader, WireType, MAX_TAG};

/// Semantic type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    /// 32-bit IEEE-754, carried as fixed32.
    Float,
    /// 64-bit IEEE-754, carried as fixed64.
    Double,
}

impl ScalarType {
    /// Wire type used for fields of this type.
    pub const fn wire_type(self) -> WireType {
        match self {
            ScalarType::Float => WireType::Fixed32,
            ScalarType::Double => WireType::Fixed64,
        }
    }

    /// Payload size in bytes.
    pub const fn payload_len(self) -> usize {
        match self {
            ScalarType::Float => 4,
            ScalarType::Double => 8,
        }
    }

    /// Zero value, the default for fields that declare none.
    pub const fn zero(self) -> ScalarValue {
        match self {
            ScalarType::Float => ScalarValue::Float(0.0),
            ScalarType::Double => ScalarValue::Double(0.0),
        }
    }

    /// Schema keyword for the type.
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarType::Float => "float",
            ScalarType::Double => "double",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    /// Value of a `float` field.
    Float(f32),
    /// Value of a `double` field.
    Double(f64),
}

impl ScalarValue {
    /// Type of the carried value.
    pub const fn scalar_type(&self) -> ScalarType {
        match self {
            ScalarValue::Float(_) => ScalarType::Float,
            ScalarValue::Double(_) => ScalarType::Double,
        }
    }

    /// Widen to `f64`.
    pub fn as_f64(&self) -> f64 {
        match *self {
            ScalarValue::Float(value) => f64::from(value),
            ScalarValue::Double(value) => value,
        }
    }

    /// Narrow an `f64` to the given type.
    pub fn from_f64(ty: ScalarType, value: f64) -> Self {
        match ty {
            ScalarType::Float => ScalarValue::Float(value as f32),
            ScalarType::Double => ScalarValue::Double(value),
        }
    }

    fn put<B: BufMut>(&self, buf: &mut B) {
        match *self {
            ScalarValue::Float(value) => buf.put_f32_le(value),
            ScalarValue::Double(value) => buf.put_f64_le(value),
        }
    }

    fn read(reader: &mut Reader<'_>, ty: ScalarType) -> Result<Self> {
        Ok(match ty {
            ScalarType::Float => ScalarValue::Float(reader.read_f32()?),
            ScalarType::Double => ScalarValue::Double(reader.read_f64()?),
        })
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Float(value) => write!(f, "{value}"),
            ScalarValue::Double(value) => write!(f, "{value}"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Rust types that back a [`ScalarType`].
pub trait Scalar: sealed::Sealed + Copy + Default {
    /// Schema type backed by `Self`.
    const TYPE: ScalarType;

    /// Wrap into a [`ScalarValue`].
    fn into_value(self) -> ScalarValue;

    /// Unwrap a [`ScalarValue`] of the matching type.
    fn from_value(value: ScalarValue) -> Option<Self>;
}

impl Scalar for f32 {
    const TYPE: ScalarType = ScalarType::Float;

    fn into_value(self) -> ScalarValue {
        ScalarValue::Float(self)
    }

    fn from_value(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Float(value) => Some(value),
            ScalarValue::Double(_) => None,
        }
    }
}

impl Scalar for f64 {
    const TYPE: ScalarType = ScalarType::Double;

    fn into_value(self) -> ScalarValue {
        ScalarValue::Double(self)
    }

    fn from_value(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Double(value) => Some(value),
            ScalarValue::Float(_) => None,
        }
    }
}

/// Static description of one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    /// Wire identity of the field.
    pub tag: u32,
    /// snake_case name used in text and CSV output.
    pub name: &'static str,
    /// camelCase name used in JSON objects.
    pub json_name: &'static str,
    /// Semantic type.
    pub ty: ScalarType,
    /// Value reported while the field is absent.
    pub default: ScalarValue,
}

impl FieldDescriptor {
    /// Descriptor with the type's zero value as default.
    pub const fn new(
        tag: u32,
        name: &'static str,
        json_name: &'static str,
        ty: ScalarType,
    ) -> Self {
        Self {
            tag,
            name,
            json_name,
            ty,
            default: ty.zero(),
        }
    }

    /// Replace the default value.
    pub const fn with_default(mut self, default: ScalarValue) -> Self {
        self.default = default;
        self
    }

    /// Frame key emitted for this field.
    pub const fn key(&self) -> FieldKey {
        FieldKey::new(self.tag, self.ty.wire_type())
    }

    /// Size of one frame of this field.
    pub const fn frame_len(&self) -> usize {
        self.key().encoded_len() + self.ty.payload_len()
    }
}

/// Ordered field table of one record type.
///
/// Fields are listed in strictly ascending tag order; encoding walks the
/// table front to back, which yields the deterministic ascending-tag output.
#[derive(Debug, PartialEq)]
pub struct Schema {
    /// Fully qualified record name, e.g. `devices.Inverter`.
    pub name: &'static str,
    /// Field table.
    pub fields: &'static [FieldDescriptor],
}

impl Schema {
    /// Construct a schema. Run [`Schema::check`] in tests of every table.
    pub const fn new(name: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        Self { name, fields }
    }

    /// Descriptor for `tag`.
    pub fn field(&self, tag: u32) -> Option<&FieldDescriptor> {
        self.position(tag).map(|index| &self.fields[index])
    }

    /// Descriptor matching either the snake_case or the JSON name.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.name == name || field.json_name == name)
    }

    /// Index of `tag` in the table.
    pub fn position(&self, tag: u32) -> Option<usize> {
        self.fields.binary_search_by_key(&tag, |field| field.tag).ok()
    }

    /// Verify ordering, tag range, name uniqueness and default types.
    pub fn check(&self) -> std::result::Result<(), SchemaError> {
        let mut previous = 0u32;
        for (index, field) in self.fields.iter().enumerate() {
            if field.tag == 0 || field.tag > MAX_TAG {
                return Err(SchemaError::TagOutOfRange {
                    record: self.name,
                    field: field.name,
                    tag: field.tag,
                });
            }
            if field.tag <= previous {
                return Err(SchemaError::TagOrder {
                    record: self.name,
                    field: field.name,
                    tag: field.tag,
                });
            }
            previous = field.tag;
            if field.default.scalar_type() != field.ty {
                return Err(SchemaError::DefaultType {
                    record: self.name,
                    field: field.name,
                    expected: field.ty,
                });
            }
            if self.fields[..index]
                .iter()
                .any(|other| other.name == field.name || other.json_name == field.json_name)
            {
                return Err(SchemaError::DuplicateName {
                    record: self.name,
                    field: field.name,
                });
            }
        }
        Ok(())
    }

    fn unknown_tag(&self, tag: u32) -> FieldError {
        FieldError::UnknownTag {
            record: self.name,
            tag,
        }
    }
}

/// Values of one record with explicit per-field presence.
///
/// Slot `i` holds the value of `schema.fields[i]`; `None` means the field was
/// never set or has been cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSet {
    schema: &'static Schema,
    slots: Vec<Option<ScalarValue>>,
}

impl FieldSet {
    /// Empty set: every field absent.
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            slots: vec![None; schema.fields.len()],
        }
    }

    /// Decode a buffer into a fresh set.
    pub fn decode(schema: &'static Schema, bytes: &[u8]) -> Result<Self> {
        let mut fields = Self::new(schema);
        fields.merge_from(bytes)?;
        Ok(fields)
    }

    /// Schema of the set.
    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Current value of `tag`, or its default while absent. `None` only when
    /// the schema has no such field.
    pub fn value(&self, tag: u32) -> Option<ScalarValue> {
        let index = self.schema.position(tag)?;
        Some(self.slots[index].unwrap_or(self.schema.fields[index].default))
    }

    /// Raw slot of `tag`: `Some` only while present.
    pub fn present_value(&self, tag: u32) -> Option<ScalarValue> {
        self.schema.position(tag).and_then(|index| self.slots[index])
    }

    /// True iff `tag` was set and not cleared since.
    pub fn has(&self, tag: u32) -> bool {
        self.present_value(tag).is_some()
    }

    /// Mark `tag` present with `value`.
    pub fn set(&mut self, tag: u32, value: ScalarValue) -> std::result::Result<(), FieldError> {
        let index = self
            .schema
            .position(tag)
            .ok_or_else(|| self.schema.unknown_tag(tag))?;
        let field = &self.schema.fields[index];
        if value.scalar_type() != field.ty {
            return Err(FieldError::TypeMismatch {
                field: field.name,
                expected: field.ty,
                found: value.scalar_type(),
            });
        }
        self.slots[index] = Some(value);
        Ok(())
    }

    /// Mark `tag` absent.
    pub fn clear(&mut self, tag: u32) -> std::result::Result<(), FieldError> {
        let index = self
            .schema
            .position(tag)
            .ok_or_else(|| self.schema.unknown_tag(tag))?;
        self.slots[index] = None;
        Ok(())
    }

    /// Typed read used by generated accessors.
    pub fn get<T: Scalar>(&self, tag: u32) -> T {
        self.value(tag).and_then(T::from_value).unwrap_or_default()
    }

    /// Typed write used by generated accessors.
    pub fn put<T: Scalar>(&mut self, tag: u32, value: T) {
        let index = self.schema.position(tag);
        debug_assert!(
            index.is_some_and(|index| self.schema.fields[index].ty == T::TYPE),
            "{} has no {} field with tag {}",
            self.schema.name,
            T::TYPE,
            tag
        );
        if let Some(index) = index {
            self.slots[index] = Some(value.into_value());
        }
    }

    /// Typed clear used by generated accessors.
    pub fn remove(&mut self, tag: u32) {
        if let Some(index) = self.schema.position(tag) {
            self.slots[index] = None;
        }
    }

    /// Mark every field absent.
    pub fn clear_all(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Ascending tags of present fields.
    pub fn present_tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.present().map(|(field, _)| field.tag)
    }

    /// Present fields with their values, ascending by tag.
    pub fn present(&self) -> impl Iterator<Item = (&'static FieldDescriptor, ScalarValue)> + '_ {
        self.schema
            .fields
            .iter()
            .zip(&self.slots)
            .filter_map(|(field, slot)| slot.map(|value| (field, value)))
    }

    /// Every field with its presence slot, ascending by tag.
    pub fn iter(&self) -> impl Iterator<Item = (&'static FieldDescriptor, Option<ScalarValue>)> + '_ {
        self.schema.fields.iter().zip(self.slots.iter().copied())
    }

    /// Exact size of the encoded form.
    pub fn encoded_len(&self) -> usize {
        self.present().map(|(field, _)| field.frame_len()).sum()
    }

    /// Append one frame per present field, ascending by tag.
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        for (field, value) in self.present() {
            wire::put_key(buf, field.key());
            value.put(buf);
        }
    }

    /// Encode into a fresh vector.
    pub fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf
    }

    /// Apply every frame of `bytes` on top of the current values.
    ///
    /// Known tags with the expected wire type overwrite their slot, with the
    /// last occurrence winning. Anything else is skipped. On error the set is
    /// left exactly as it was.
    pub fn merge_from(&mut self, bytes: &[u8]) -> Result<()> {
        let mut staged = self.slots.clone();
        let mut reader = Reader::new(bytes);
        while !reader.is_empty() {
            let key = reader.read_key()?;
            match self.schema.position(key.tag) {
                Some(index) if self.schema.fields[index].ty.wire_type() == key.wire_type => {
                    let ty = self.schema.fields[index].ty;
                    staged[index] = Some(ScalarValue::read(&mut reader, ty)?);
                }
                _ => reader.skip(key)?,
            }
        }
        self.slots = staged;
        Ok(())
    }
}
