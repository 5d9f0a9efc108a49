//! Buffer Writing Module
//!
//! [`BufferCreator`] is the producer side of the format: it turns infoset
//! calls, or a captured replay, into an [`XmlStreamBuffer`].
//!
//! [`XmlStreamBuffer`]: crate::buffer::XmlStreamBuffer

pub mod creator;

pub use creator::BufferCreator;
