//! ---
//! chimera_section: "01-wire-codec"
//! chimera_subsection: "module"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Record codec, field tables and sample streams."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
//! Length-delimited sample logs.
//!
//! Each frame is a varint byte count followed by one encoded record, the
//! same "delimited" framing protobuf runtimes use for message streams.

use std::io::{ErrorKind, Read, Write};
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::error::StreamError;
use crate::field::{FieldSet, Schema};
use crate::record::Record;
use crate::wire::{put_varint, MAX_VARINT_LEN};

/// Default ceiling on a single frame.
pub const DEFAULT_MAX_FRAME_LEN: usize = 64 * 1024;

/// Appends length-delimited records to a writer.
#[derive(Debug)]
pub struct SampleWriter<W: Write> {
    inner: W,
    scratch: Vec<u8>,
    frames: u64,
}

impl<W: Write> SampleWriter<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            scratch: Vec::new(),
            frames: 0,
        }
    }

    /// Append one record and return the bytes written including the prefix.
    pub fn write<R: Record>(&mut self, record: &R) -> Result<usize, StreamError> {
        self.write_fields(record.fields())
    }

    /// Append one field set and return the bytes written including the prefix.
    pub fn write_fields(&mut self, fields: &FieldSet) -> Result<usize, StreamError> {
        self.scratch.clear();
        put_varint(&mut self.scratch, fields.encoded_len() as u64);
        fields.encode(&mut self.scratch);
        self.inner.write_all(&self.scratch)?;
        self.frames += 1;
        trace!(
            record = fields.schema().name,
            bytes = self.scratch.len(),
            frame = self.frames,
            "sample appended"
        );
        Ok(self.scratch.len())
    }

    /// Frames written so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), StreamError> {
        self.inner.flush()?;
        Ok(())
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Reads length-delimited records from a reader.
#[derive(Debug)]
pub struct SampleReader<R: Read> {
    inner: R,
    max_frame_len: usize,
    frames: u64,
    buf: Vec<u8>,
}

impl<R: Read> SampleReader<R> {
    /// Wrap a reader using [`DEFAULT_MAX_FRAME_LEN`].
    pub fn new(inner: R) -> Self {
        Self::with_max_frame_len(inner, DEFAULT_MAX_FRAME_LEN)
    }

    /// Wrap a reader with an explicit frame size ceiling.
    pub fn with_max_frame_len(inner: R, max_frame_len: usize) -> Self {
        Self {
            inner,
            max_frame_len,
            frames: 0,
            buf: Vec::new(),
        }
    }

    /// Frames read so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Next record, or `Ok(None)` at a clean end of stream.
    pub fn read<T: Record>(&mut self) -> Result<Option<T>, StreamError> {
        Ok(self.read_fields(T::schema())?.map(T::from_fields))
    }

    /// Next field set of `schema`, or `Ok(None)` at a clean end of stream.
    pub fn read_fields(&mut self, schema: &'static Schema) -> Result<Option<FieldSet>, StreamError> {
        let frame = self.frames;
        let Some(length) = self.read_length()? else {
            debug!(record = schema.name, frames = frame, "sample stream exhausted");
            return Ok(None);
        };
        if length > self.max_frame_len as u64 {
            return Err(StreamError::FrameTooLarge {
                frame,
                length,
                max: self.max_frame_len,
            });
        }

        self.buf.resize(length as usize, 0);
        if let Err(err) = self.inner.read_exact(&mut self.buf) {
            return Err(match err.kind() {
                ErrorKind::UnexpectedEof => StreamError::Truncated { frame },
                _ => StreamError::Io(err),
            });
        }

        let fields = FieldSet::decode(schema, &self.buf)
            .map_err(|source| StreamError::Wire { frame, source })?;
        self.frames += 1;
        Ok(Some(fields))
    }

    /// Iterate the remaining records. Iteration stops after the first error.
    pub fn records<T: Record>(self) -> Records<R, T> {
        Records {
            reader: self,
            done: false,
            _record: PhantomData,
        }
    }

    fn read_length(&mut self) -> Result<Option<u64>, StreamError> {
        let frame = self.frames;
        let mut value = 0u64;
        for index in 0..MAX_VARINT_LEN {
            let mut byte = [0u8; 1];
            match self.inner.read_exact(&mut byte) {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                    return if index == 0 {
                        Ok(None)
                    } else {
                        Err(StreamError::Truncated { frame })
                    };
                }
                Err(err) => return Err(StreamError::Io(err)),
            }
            value |= u64::from(byte[0] & 0x7F) << (7 * index);
            if byte[0] & 0x80 == 0 {
                return Ok(Some(value));
            }
        }
        Err(StreamError::LengthOverflow { frame })
    }
}

/// Iterator returned by [`SampleReader::records`].
#[derive(Debug)]
pub struct Records<R: Read, T> {
    reader: SampleReader<R>,
    done: bool,
    _record: PhantomData<fn() -> T>,
}

impl<R: Read, T: Record> Iterator for Records<R, T> {
    type Item = Result<T, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read::<T>() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
