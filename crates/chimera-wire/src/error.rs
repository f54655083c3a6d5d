//! ---
//! chimera_section: "01-wire-codec"
//! chimera_subsection: "module"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Record codec, field tables and sample streams."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
use thiserror::Error;

use crate::field::ScalarType;

/// Shared result type for decode operations.
pub type Result<T> = std::result::Result<T, WireError>;

/// Failure raised while decoding a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WireError {
    /// The buffer ended inside a frame or carried an impossible frame header.
    #[error("malformed input at byte {offset}: {reason}")]
    MalformedInput {
        /// Byte offset where the offending frame element starts.
        offset: usize,
        /// What was wrong with the input.
        reason: Malformed,
    },
}

impl WireError {
    /// Build a [`WireError::MalformedInput`] at the given offset.
    pub fn malformed(offset: usize, reason: Malformed) -> Self {
        WireError::MalformedInput { offset, reason }
    }

    /// Offset of the offending element.
    pub fn offset(&self) -> usize {
        match self {
            WireError::MalformedInput { offset, .. } => *offset,
        }
    }

    /// Reason attached to the error.
    pub fn reason(&self) -> Malformed {
        match self {
            WireError::MalformedInput { reason, .. } => *reason,
        }
    }
}

/// Reasons a buffer is rejected as malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Malformed {
    /// A fixed-width payload is cut short.
    #[error("payload needs {needed} bytes but only {remaining} remain")]
    TruncatedPayload {
        /// Bytes required by the wire type.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },
    /// A varint has its continuation bit set on the last byte of input.
    #[error("varint ends before its final byte")]
    TruncatedVarint,
    /// A varint runs past ten bytes.
    #[error("varint longer than 10 bytes")]
    VarintOverflow,
    /// A length prefix points past the end of the buffer.
    #[error("length prefix {length} exceeds the {remaining} remaining bytes")]
    LengthOverrun {
        /// Declared length.
        length: u64,
        /// Bytes left after the prefix.
        remaining: usize,
    },
    /// Tag zero or a tag above [`crate::MAX_TAG`].
    #[error("invalid field tag {0}")]
    InvalidTag(u64),
    /// Wire types 6 and 7 are reserved.
    #[error("invalid wire type {0}")]
    InvalidWireType(u8),
    /// An end-group frame with no open group of that tag.
    #[error("end-group for tag {0} without a matching start-group")]
    UnexpectedEndGroup(u32),
    /// A start-group frame whose end-group never arrives.
    #[error("group {0} is not terminated")]
    UnterminatedGroup(u32),
    /// Groups nested deeper than the skipper allows.
    #[error("group nesting exceeds {0} levels")]
    GroupDepth(usize),
}

/// Misuse of the tag-keyed field API.
///
/// Never produced by decoding; these indicate a caller asked for a field the
/// schema does not define or supplied a value of the wrong scalar type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The schema has no field with this tag.
    #[error("record {record} has no field with tag {tag}")]
    UnknownTag {
        /// Schema name.
        record: &'static str,
        /// Requested tag.
        tag: u32,
    },
    /// The schema has no field with this name.
    #[error("record {record} has no field named {name:?}")]
    UnknownName {
        /// Schema name.
        record: &'static str,
        /// Requested name.
        name: String,
    },
    /// The supplied value does not match the field's scalar type.
    #[error("field {field} expects {expected}, got {found}")]
    TypeMismatch {
        /// Field name.
        field: &'static str,
        /// Declared type.
        expected: ScalarType,
        /// Type of the supplied value.
        found: ScalarType,
    },
}

/// Structural problems in a schema table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Tags must lie in `1..=MAX_TAG`.
    #[error("schema {record}: field {field} uses out-of-range tag {tag}")]
    TagOutOfRange {
        /// Schema name.
        record: &'static str,
        /// Field name.
        field: &'static str,
        /// Offending tag.
        tag: u32,
    },
    /// Tags must be strictly ascending, which also rules out duplicates.
    #[error("schema {record}: tag {tag} of field {field} is not above the previous tag")]
    TagOrder {
        /// Schema name.
        record: &'static str,
        /// Field name.
        field: &'static str,
        /// Offending tag.
        tag: u32,
    },
    /// Field names must be unique.
    #[error("schema {record}: duplicate field name {field}")]
    DuplicateName {
        /// Schema name.
        record: &'static str,
        /// Duplicated name.
        field: &'static str,
    },
    /// The default value has a different scalar type than the field.
    #[error("schema {record}: default of field {field} is not a {expected}")]
    DefaultType {
        /// Schema name.
        record: &'static str,
        /// Field name.
        field: &'static str,
        /// Declared type.
        expected: ScalarType,
    },
}

/// Failures converting records to and from their JSON form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// Input was not a JSON object.
    #[error("expected a JSON object of field values")]
    NotAnObject,
    /// Key did not name a field of the schema.
    #[error(transparent)]
    Field(#[from] FieldError),
    /// Value for a field was not a number.
    #[error("field {field} expects a number, got {found}")]
    NotANumber {
        /// Field name.
        field: &'static str,
        /// Rendered offending value.
        found: String,
    },
    /// Finite value that does not fit the field's type.
    #[error("field {field} cannot hold {value}: out of range for {ty}")]
    OutOfRange {
        /// Field name.
        field: &'static str,
        /// Declared type.
        ty: ScalarType,
        /// Offending value.
        value: f64,
    },
}

/// Failures reading or writing a stream of length-delimited samples.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Underlying reader or writer failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A frame decoded to a malformed record.
    #[error("frame {frame}: {source}")]
    Wire {
        /// Zero-based index of the frame in the stream.
        frame: u64,
        /// Decode failure.
        #[source]
        source: WireError,
    },
    /// Input ended inside a frame.
    #[error("stream truncated inside frame {frame}")]
    Truncated {
        /// Zero-based index of the frame in the stream.
        frame: u64,
    },
    /// A length prefix is not a valid varint.
    #[error("length prefix of frame {frame} is longer than 10 bytes")]
    LengthOverflow {
        /// Zero-based index of the frame in the stream.
        frame: u64,
    },
    /// A length prefix exceeds the configured maximum.
    #[error("frame {frame} declares {length} bytes, limit is {max}")]
    FrameTooLarge {
        /// Zero-based index of the frame in the stream.
        frame: u64,
        /// Declared length.
        length: u64,
        /// Configured maximum.
        max: usize,
    },
}
