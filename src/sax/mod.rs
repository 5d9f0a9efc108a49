//! SAX (Simple API for XML) Module
//!
//! Replays an encoded buffer as push events.
//!
//! ## Architecture
//!
//! ```text
//! XmlStreamBuffer ---> SaxBufferProcessor ---> ContentHandler
//!                          |    |                  (EventCollector -> SaxEvent[])
//!                          |    +-- Attributes, NamespaceContext
//!                          v
//!                    ErrorHandler (fatal errors)
//! ```
//!
//! ## Event Types
//!
//! - `StartElement` - Element start with namespace URI, local name, qname and attributes
//! - `EndElement` - Element end
//! - `Characters` - Character data
//! - `Comment` - Comment content
//! - `ProcessingInstruction` - PI target and data
//! - `StartPrefixMapping` / `EndPrefixMapping` - Namespace scope changes
//! - `Object` - Opaque element content

pub mod attributes;
pub mod collector;
pub mod events;
pub mod handler;
pub mod namespace;
pub mod processor;

pub use attributes::{Attribute, AttributeValue, Attributes};
pub use collector::EventCollector;
pub use events::SaxEvent;
pub use handler::{ContentHandler, DefaultHandler, ErrorHandler, HandlerResult, LoggingErrorHandler};
pub use namespace::{NamespaceContext, NsBinding};
pub use processor::SaxBufferProcessor;
