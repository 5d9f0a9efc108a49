//! xmlstreambuffer - Replayable in-memory encoding of XML infosets
//!
//! An [`XmlStreamBuffer`] stores one document as four parallel streams
//! (structure words, structure strings, raw characters, content objects).
//! It is written once and can then be replayed any number of times.
//!
//! Components:
//! - `buffer`: fragmented storage and the encoded buffer with its reader
//! - `codec`: tag-word layout and the child-state table
//! - `sax`: the replay engine, consumer traits, event collector
//! - `writer`: the buffer creator
//! - `strategy`: parallel replay (Rayon)
//!
//! ```
//! use xmlstreambuffer::{BufferCreator, SaxBufferProcessor, SaxEvent};
//!
//! let mut creator = BufferCreator::new();
//! creator.start_document()?;
//! creator.start_element("", "a", "a")?;
//! creator.end_element()?;
//! creator.end_document()?;
//! let buffer = creator.finish()?;
//!
//! let events = SaxBufferProcessor::new().collect(&buffer)?;
//! assert_eq!(events[1], SaxEvent::start_element("", "a", "a"));
//! # Ok::<(), xmlstreambuffer::Error>(())
//! ```

pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod memory;
pub mod sax;
pub mod strategy;
pub mod strings;
pub mod writer;

pub use buffer::{BufferReader, ContentObject, Opaque, XmlStreamBuffer};
pub use config::{features, CreatorConfig, ProcessorConfig};
pub use error::{DecodeContext, Error, FeatureError, HandlerError, Result};
pub use sax::{
    Attribute, AttributeValue, Attributes, ContentHandler, DefaultHandler, ErrorHandler,
    EventCollector, HandlerResult, LoggingErrorHandler, SaxBufferProcessor, SaxEvent,
};
pub use writer::BufferCreator;

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "memory_tracking")]
#[global_allocator]
static GLOBAL: memory::tracking::TrackingAllocator = memory::tracking::TrackingAllocator;

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;
