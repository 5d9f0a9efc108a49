//! Encoded Buffer
//!
//! An [`XmlStreamBuffer`] holds one encoded infoset as four parallel
//! streams. The buffer is frozen once the producer is done; decoding only
//! ever reads it, through a [`BufferReader`] that owns the cursors.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use super::fragment::{Cursor, FragmentedArray};
use crate::codec::tag::T_END;
use crate::error::{Error, Result};

/// Segment sizes used when a buffer is created without explicit capacities
pub mod capacity {
    pub const STRUCTURE: usize = 512;
    pub const STRUCTURE_STRINGS: usize = 512;
    pub const CONTENT_CHARACTERS: usize = 4096;
    pub const CONTENT_OBJECTS: usize = 128;
}

/// Opaque, shareable value carried through the content-object stream
///
/// Equality is identity: two `Opaque` values are equal when they share the
/// same allocation.
#[derive(Clone)]
pub struct Opaque(Arc<dyn Any + Send + Sync>);

impl Opaque {
    /// Wrap a value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Opaque(Arc::new(value))
    }

    /// Borrow the value as a concrete type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// True if both handles share the same allocation
    pub fn ptr_eq(&self, other: &Opaque) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({:p})", Arc::as_ptr(&self.0))
    }
}

/// Entry of the content-object stream
#[derive(Debug, Clone, PartialEq)]
pub enum ContentObject {
    /// Materialised characters or a string
    Text(Arc<str>),
    /// Non-textual content, passed through untouched
    Opaque(Opaque),
}

/// The four parallel streams of one encoded infoset
#[derive(Debug, Clone)]
pub struct XmlStreamBuffer {
    pub(crate) structure: FragmentedArray<u32>,
    pub(crate) structure_strings: FragmentedArray<Arc<str>>,
    pub(crate) content_characters: FragmentedArray<u8>,
    pub(crate) content_objects: FragmentedArray<ContentObject>,
}

impl XmlStreamBuffer {
    /// Create an empty buffer with default segment capacities
    pub fn new() -> Self {
        Self::with_capacities(
            capacity::STRUCTURE,
            capacity::STRUCTURE_STRINGS,
            capacity::CONTENT_CHARACTERS,
            capacity::CONTENT_OBJECTS,
        )
    }

    /// Create an empty buffer with explicit segment capacities per stream
    pub fn with_capacities(
        structure: usize,
        structure_strings: usize,
        content_characters: usize,
        content_objects: usize,
    ) -> Self {
        XmlStreamBuffer {
            structure: FragmentedArray::with_segment_capacity(structure),
            structure_strings: FragmentedArray::with_segment_capacity(structure_strings),
            content_characters: FragmentedArray::with_segment_capacity(content_characters),
            content_objects: FragmentedArray::with_segment_capacity(content_objects),
        }
    }

    /// Structure stream: tag words and inline lengths
    pub fn structure(&self) -> &FragmentedArray<u32> {
        &self.structure
    }

    /// Strings referenced by structure entries
    pub fn structure_strings(&self) -> &FragmentedArray<Arc<str>> {
        &self.structure_strings
    }

    /// Raw UTF-8 character content
    pub fn content_characters(&self) -> &FragmentedArray<u8> {
        &self.content_characters
    }

    /// Materialised text and opaque values
    pub fn content_objects(&self) -> &FragmentedArray<ContentObject> {
        &self.content_objects
    }

    /// True if no structure has been written
    pub fn is_empty(&self) -> bool {
        self.structure.is_empty()
    }

    /// Start a new read pass over this buffer
    pub fn reader(&self) -> BufferReader<'_> {
        BufferReader::new(self)
    }
}

impl Default for XmlStreamBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Read cursors for one decode pass over an [`XmlStreamBuffer`]
#[derive(Debug, Clone)]
pub struct BufferReader<'a> {
    buffer: &'a XmlStreamBuffer,
    structure: Cursor,
    structure_strings: Cursor,
    content_characters: Cursor,
    content_objects: Cursor,
}

impl<'a> BufferReader<'a> {
    /// Position a reader at the start of every stream
    pub fn new(buffer: &'a XmlStreamBuffer) -> Self {
        BufferReader {
            buffer,
            structure: Cursor::default(),
            structure_strings: Cursor::default(),
            content_characters: Cursor::default(),
            content_objects: Cursor::default(),
        }
    }

    /// Next structure word; an exhausted stream reads as END
    #[inline]
    pub fn read_structure(&mut self) -> u32 {
        self.buffer
            .structure
            .read_next(&mut self.structure)
            .copied()
            .unwrap_or(T_END)
    }

    /// Next structure word without consuming it
    #[inline]
    pub fn peek_structure(&self) -> u32 {
        self.buffer
            .structure
            .peek(&self.structure)
            .copied()
            .unwrap_or(T_END)
    }

    /// True once every structure word has been read
    #[inline]
    pub fn at_structure_end(&self) -> bool {
        self.buffer.structure.peek(&self.structure).is_none()
    }

    /// Next entry of the structure-string stream
    #[inline]
    pub fn read_structure_string(&mut self) -> Result<Arc<str>> {
        self.buffer
            .structure_strings
            .read_next(&mut self.structure_strings)
            .cloned()
            .ok_or(Error::MissingStructureString)
    }

    /// A raw run of `len` bytes from the content-character stream
    pub fn read_content_characters(&mut self, tag: u32, len: usize) -> Result<Cow<'a, str>> {
        let buffer: &'a XmlStreamBuffer = self.buffer;
        let run = buffer
            .content_characters
            .read_run(&mut self.content_characters, len)
            .ok_or(Error::MissingContent { tag })?;
        Ok(match run {
            Cow::Borrowed(bytes) => Cow::Borrowed(std::str::from_utf8(bytes)?),
            Cow::Owned(bytes) => {
                Cow::Owned(String::from_utf8(bytes).map_err(|e| e.utf8_error())?)
            }
        })
    }

    /// Next entry of the content-object stream
    #[inline]
    pub fn read_content_object(&mut self, tag: u32) -> Result<&'a ContentObject> {
        let buffer: &'a XmlStreamBuffer = self.buffer;
        buffer
            .content_objects
            .read_next(&mut self.content_objects)
            .ok_or(Error::MissingContent { tag })
    }

    /// Next content object, required to be text
    pub fn read_content_text(&mut self, tag: u32) -> Result<&'a Arc<str>> {
        match self.read_content_object(tag)? {
            ContentObject::Text(text) => Ok(text),
            ContentObject::Opaque(_) => Err(Error::MissingContent { tag }),
        }
    }

    /// Current position in the structure stream
    pub fn structure_cursor(&self) -> Cursor {
        self.structure
    }
}
