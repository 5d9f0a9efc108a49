//! SAX Event Types
//!
//! Owned form of the events a replay emits. Used by [`EventCollector`] to
//! materialise a replay and by tests to compare replays.
//!
//! [`EventCollector`]: super::collector::EventCollector

use std::fmt;

use super::attributes::Attribute;
use crate::buffer::Opaque;

/// A replayed document event
#[derive(Debug, Clone, PartialEq)]
pub enum SaxEvent {
    StartDocument,

    EndDocument,

    /// Start of an element
    StartElement {
        uri: String,
        local_name: String,
        qname: String,
        /// Attributes in declaration order
        attributes: Vec<Attribute>,
    },

    /// End of an element
    EndElement {
        uri: String,
        local_name: String,
        qname: String,
    },

    /// Character data
    Characters(String),

    /// Comment content (excluding markers)
    Comment(String),

    /// Processing instruction
    ProcessingInstruction { target: String, data: String },

    /// A prefix binding comes into scope
    StartPrefixMapping { prefix: String, uri: String },

    /// A prefix binding goes out of scope
    EndPrefixMapping { prefix: String },

    /// Opaque element content
    Object(Opaque),
}

impl SaxEvent {
    /// Element start without attributes
    pub fn start_element(uri: &str, local_name: &str, qname: &str) -> Self {
        SaxEvent::StartElement {
            uri: uri.to_string(),
            local_name: local_name.to_string(),
            qname: qname.to_string(),
            attributes: Vec::new(),
        }
    }

    pub fn end_element(uri: &str, local_name: &str, qname: &str) -> Self {
        SaxEvent::EndElement {
            uri: uri.to_string(),
            local_name: local_name.to_string(),
            qname: qname.to_string(),
        }
    }

    pub fn start_prefix_mapping(prefix: &str, uri: &str) -> Self {
        SaxEvent::StartPrefixMapping {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
        }
    }

    pub fn end_prefix_mapping(prefix: &str) -> Self {
        SaxEvent::EndPrefixMapping {
            prefix: prefix.to_string(),
        }
    }

    /// Check if this is a start element event
    #[inline]
    pub fn is_start_element(&self) -> bool {
        matches!(self, SaxEvent::StartElement { .. })
    }

    /// Check if this is an end element event
    #[inline]
    pub fn is_end_element(&self) -> bool {
        matches!(self, SaxEvent::EndElement { .. })
    }

    /// Get the (uri, local name, qname) triple of an element event
    pub fn element_name(&self) -> Option<(&str, &str, &str)> {
        match self {
            SaxEvent::StartElement {
                uri,
                local_name,
                qname,
                ..
            }
            | SaxEvent::EndElement {
                uri,
                local_name,
                qname,
            } => Some((uri.as_str(), local_name.as_str(), qname.as_str())),
            _ => None,
        }
    }
}

impl fmt::Display for SaxEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaxEvent::StartDocument => write!(f, "startDocument"),
            SaxEvent::EndDocument => write!(f, "endDocument"),
            SaxEvent::StartElement {
                uri,
                local_name,
                qname,
                attributes,
            } => {
                write!(f, "startElement({uri:?}, {local_name:?}, {qname:?}")?;
                for attr in attributes {
                    write!(f, ", @{}={:?}", attr.qname, attr.value.as_str().unwrap_or("<object>"))?;
                }
                write!(f, ")")
            }
            SaxEvent::EndElement {
                uri,
                local_name,
                qname,
            } => write!(f, "endElement({uri:?}, {local_name:?}, {qname:?})"),
            SaxEvent::Characters(text) => write!(f, "characters({text:?})"),
            SaxEvent::Comment(text) => write!(f, "comment({text:?})"),
            SaxEvent::ProcessingInstruction { target, data } => {
                write!(f, "processingInstruction({target:?}, {data:?})")
            }
            SaxEvent::StartPrefixMapping { prefix, uri } => {
                write!(f, "startPrefixMapping({prefix:?}, {uri:?})")
            }
            SaxEvent::EndPrefixMapping { prefix } => write!(f, "endPrefixMapping({prefix:?})"),
            SaxEvent::Object(value) => write!(f, "object({value:?})"),
        }
    }
}
