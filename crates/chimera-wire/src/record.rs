//! ---
//! chimera_section: "01-wire-codec"
//! chimera_subsection: "module"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Record codec, field tables and sample streams."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
use bytes::BufMut;

use crate::error::{FieldError, Result};
use crate::field::{FieldSet, ScalarValue, Schema};

/// A concrete record type backed by a [`FieldSet`].
///
/// Implementors only wire up the schema and the embedded field set; every
/// codec and accessor operation is provided.
pub trait Record: Sized + Clone {
    /// Field table of the record type.
    fn schema() -> &'static Schema;

    /// Wrap a field set. Callers guarantee `fields.schema()` is [`Record::schema`].
    fn from_fields(fields: FieldSet) -> Self;

    /// Borrow the embedded field set.
    fn fields(&self) -> &FieldSet;

    /// Mutably borrow the embedded field set.
    fn fields_mut(&mut self) -> &mut FieldSet;

    /// Record with every field absent.
    fn empty() -> Self {
        Self::from_fields(FieldSet::new(Self::schema()))
    }

    /// Decode a whole buffer. Nothing is returned unless every frame parses.
    fn decode(bytes: &[u8]) -> Result<Self> {
        FieldSet::decode(Self::schema(), bytes).map(Self::from_fields)
    }

    /// Decode `bytes` on top of the current values.
    fn merge_from(&mut self, bytes: &[u8]) -> Result<()> {
        self.fields_mut().merge_from(bytes)
    }

    /// Exact length of [`Record::encode`] output.
    fn encoded_len(&self) -> usize {
        self.fields().encoded_len()
    }

    /// Append the encoded record to `buf`.
    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.fields().encode(buf)
    }

    /// Encode into a fresh vector.
    fn encode_to_vec(&self) -> Vec<u8> {
        self.fields().encode_to_vec()
    }

    /// Value of `tag`, or its default while absent.
    fn get_field(&self, tag: u32) -> Option<ScalarValue> {
        self.fields().value(tag)
    }

    /// Mark `tag` present with `value`.
    fn set_field(&mut self, tag: u32, value: ScalarValue) -> std::result::Result<&mut Self, FieldError> {
        self.fields_mut().set(tag, value)?;
        Ok(self)
    }

    /// Mark `tag` absent.
    fn clear_field(&mut self, tag: u32) -> std::result::Result<&mut Self, FieldError> {
        self.fields_mut().clear(tag)?;
        Ok(self)
    }

    /// True iff `tag` was set and not cleared since.
    fn has_field(&self, tag: u32) -> bool {
        self.fields().has(tag)
    }

    /// Mark every field absent.
    fn clear(&mut self) -> &mut Self {
        self.fields_mut().clear_all();
        self
    }

    /// Ascending tags of present fields.
    fn present_tags(&self) -> Vec<u32> {
        self.fields().present_tags().collect()
    }
}
