//! ---
//! chimera_section: "01-wire-codec"
//! chimera_subsection: "module"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Record codec, field tables and sample streams."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
//! Binary codec for flat telemetry records.
//!
//! A record is described by a static [`Schema`]: an ascending table of
//! [`FieldDescriptor`]s mapping a wire tag to a name, a scalar type and a
//! default. Values live in a [`FieldSet`] which tracks presence explicitly,
//! so a field set to `0.0` is still emitted on the wire. Concrete record
//! types embed a `FieldSet` and implement [`Record`], usually through
//! [`define_record!`].
#![warn(missing_docs)]

pub mod error;
pub mod field;
pub mod macros;
pub mod record;
pub mod render;
pub mod stream;
pub mod wire;

pub use error::{FieldError, Malformed, RenderError, Result, SchemaError, StreamError, WireError};
pub use field::{FieldDescriptor, FieldSet, Scalar, ScalarType, ScalarValue, Schema};
pub use record::Record;
pub use stream::{SampleReader, SampleWriter, DEFAULT_MAX_FRAME_LEN};
pub use wire::{FieldKey, Reader, WireType, MAX_TAG};
