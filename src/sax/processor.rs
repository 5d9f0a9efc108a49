//! Buffer Replay Engine
//!
//! Walks an [`XmlStreamBuffer`] and pushes its content to a
//! [`ContentHandler`] in document order.
//!
//! ## Shape of a replay
//!
//! ```text
//! DOCUMENT ─┬─ prolog: COMMENT | PI | (END before the root is skipped)
//!           ├─ ELEMENT ── attribute run ── children ... END
//!           └─ epilogue: COMMENT | PI ... END
//! ```
//!
//! Element replay is recursive. Inside an element every tag word goes through
//! the child-state table; at document level tag words are decoded directly.
//!
//! One processor owns the scratch state of a replay (attribute accumulator,
//! namespace stack, name interner) and can be reused for any number of
//! buffers, one at a time.

use std::borrow::Cow;
use std::sync::Arc;

use log::debug;

use super::attributes::{AttributeValue, Attributes};
use super::collector::EventCollector;
use super::events::SaxEvent;
use super::handler::{ContentHandler, ErrorHandler, HandlerResult, LoggingErrorHandler};
use super::namespace::{ns, NamespaceContext};
use crate::buffer::{BufferReader, ContentObject, XmlStreamBuffer};
use crate::codec::{
    child_state, major_kind, ChildState, ContentRepr, MajorKind, NameShape, Tag, ValueRepr,
};
use crate::config::ProcessorConfig;
use crate::error::{DecodeContext, Error, FeatureError, Result};
use crate::strings::NameInterner;

/// Attribute type given to synthesised namespace declarations
const CDATA: &str = "CDATA";

#[inline]
fn consumer(result: HandlerResult) -> Result<()> {
    result.map_err(Error::ConsumerFailure)
}

#[inline]
fn malformed(context: DecodeContext, tag: u32) -> Error {
    Error::MalformedStructure { context, tag }
}

/// Names shared by every replay
#[derive(Debug)]
struct WellKnown {
    empty: Arc<str>,
    xmlns_prefix: Arc<str>,
    xmlns_uri: Arc<str>,
    cdata: Arc<str>,
}

impl WellKnown {
    fn new() -> Self {
        WellKnown {
            empty: Arc::from(""),
            xmlns_prefix: Arc::from(ns::XMLNS_PREFIX),
            xmlns_uri: Arc::from(ns::XMLNS),
            cdata: Arc::from(CDATA),
        }
    }
}

/// Replays encoded buffers as SAX-style events
pub struct SaxBufferProcessor {
    config: ProcessorConfig,
    attributes: Attributes,
    namespaces: NamespaceContext,
    interner: NameInterner,
    names: WellKnown,
    error_handler: Box<dyn ErrorHandler>,
}

impl SaxBufferProcessor {
    /// Processor with default configuration
    pub fn new() -> Self {
        Self::with_config(ProcessorConfig::default())
    }

    pub fn with_config(config: ProcessorConfig) -> Self {
        let interner = NameInterner::new(config.interner_capacity);
        SaxBufferProcessor {
            config,
            attributes: Attributes::with_capacity(16),
            namespaces: NamespaceContext::new(),
            interner,
            names: WellKnown::new(),
            error_handler: Box::new(LoggingErrorHandler),
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Current value of a SAX feature
    pub fn feature(&self, name: &str) -> std::result::Result<bool, FeatureError> {
        self.config.feature(name)
    }

    /// Set a SAX feature for subsequent replays
    pub fn set_feature(&mut self, name: &str, value: bool) -> std::result::Result<(), FeatureError> {
        self.config.set_feature(name, value)
    }

    /// Replace the receiver of fatal errors
    pub fn set_error_handler(&mut self, handler: Box<dyn ErrorHandler>) {
        self.error_handler = handler;
    }

    /// Replay `buffer` into `handler`
    ///
    /// A buffer holding only END produces no events. Any error aborts the
    /// replay; it is reported to the error handler and returned.
    pub fn process<H>(&mut self, buffer: &XmlStreamBuffer, handler: &mut H) -> Result<()>
    where
        H: ContentHandler + ?Sized,
    {
        debug!(
            "replaying buffer: {} structure words, {} strings",
            buffer.structure().len(),
            buffer.structure_strings().len()
        );

        self.attributes.clear();
        self.namespaces.reset();

        let mut replay = Replay {
            reader: buffer.reader(),
            handler,
            attributes: &mut self.attributes,
            namespaces: &mut self.namespaces,
            interner: if self.config.string_interning {
                Some(&mut self.interner)
            } else {
                None
            },
            names: &self.names,
            namespace_prefixes: self.config.namespace_prefixes,
            max_depth: self.config.max_depth,
            depth: 0,
        };

        match replay.run() {
            Ok(()) => {
                debug!("replay finished");
                Ok(())
            }
            Err(err) => {
                self.error_handler.fatal_error(&err);
                Err(err)
            }
        }
    }

    /// Replay `buffer` and return the events as a list
    pub fn collect(&mut self, buffer: &XmlStreamBuffer) -> Result<Vec<SaxEvent>> {
        let mut collector = EventCollector::new();
        self.process(buffer, &mut collector)?;
        Ok(collector.take_events())
    }
}

impl Default for SaxBufferProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SaxBufferProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaxBufferProcessor")
            .field("config", &self.config)
            .field("interned", &self.interner.len())
            .finish_non_exhaustive()
    }
}

/// Resolved names of an element or attribute
struct Names {
    uri: Arc<str>,
    local_name: Arc<str>,
    qname: Arc<str>,
}

/// State of one replay pass
struct Replay<'p, 'b, H: ?Sized> {
    reader: BufferReader<'b>,
    handler: &'p mut H,
    attributes: &'p mut Attributes,
    namespaces: &'p mut NamespaceContext,
    interner: Option<&'p mut NameInterner>,
    names: &'p WellKnown,
    namespace_prefixes: bool,
    max_depth: Option<usize>,
    depth: usize,
}

impl<'p, 'b, H: ContentHandler + ?Sized> Replay<'p, 'b, H> {
    fn run(&mut self) -> Result<()> {
        let word = self.reader.read_structure();
        match Tag::decode(word) {
            Some(Tag::Document { fragment: false }) => self.document(),
            Some(Tag::Document { fragment: true }) => Err(Error::UnsupportedFragment),
            Some(Tag::End) => Ok(()),
            _ => Err(malformed(DecodeContext::Entry, word)),
        }
    }

    fn document(&mut self) -> Result<()> {
        consumer(self.handler.start_document())?;

        // prolog, up to and including the root element
        loop {
            let word = self.reader.read_structure();
            match Tag::decode(word) {
                Some(Tag::Element(shape)) => {
                    let names = self.read_names(shape)?;
                    self.element(names)?;
                    break;
                }
                Some(Tag::Comment(repr)) => self.comment(word, repr)?,
                Some(Tag::ProcessingInstruction) => self.processing_instruction()?,
                // END before the root element does not end the document,
                // unless nothing is left to read
                Some(Tag::End) if !self.reader.at_structure_end() => {}
                _ => return Err(malformed(DecodeContext::Document, word)),
            }
        }

        // epilogue
        loop {
            let word = self.reader.read_structure();
            match Tag::decode(word) {
                Some(Tag::Comment(repr)) => self.comment(word, repr)?,
                Some(Tag::ProcessingInstruction) => self.processing_instruction()?,
                Some(Tag::End) => break,
                _ => return Err(malformed(DecodeContext::Epilogue, word)),
            }
        }

        consumer(self.handler.end_document())
    }

    fn element(&mut self, names: Names) -> Result<()> {
        self.depth += 1;
        if let Some(limit) = self.max_depth {
            if self.depth > limit {
                return Err(Error::DepthLimitExceeded { limit });
            }
        }

        let mut has_namespace_attributes = false;
        if matches!(
            major_kind(self.reader.peek_structure()),
            Some(MajorKind::Attribute | MajorKind::NamespaceAttribute)
        ) {
            has_namespace_attributes = self.attribute_run()?;
        }

        consumer(self.handler.start_element(
            &names.uri,
            &names.local_name,
            &names.qname,
            &*self.attributes,
        ))?;
        self.attributes.clear();

        loop {
            let word = self.reader.read_structure();
            match child_state(word) {
                ChildState::ElementUriLocalNameQualifiedName => {
                    let child = self.read_names(NameShape::UriLocalNameQualifiedName)?;
                    self.element(child)?;
                }
                ChildState::ElementPrefixUriLocalName => {
                    let child = self.read_names(NameShape::PrefixUriLocalName)?;
                    self.element(child)?;
                }
                ChildState::ElementUriLocalName => {
                    let child = self.read_names(NameShape::UriLocalName)?;
                    self.element(child)?;
                }
                ChildState::ElementLocalName => {
                    let child = self.read_names(NameShape::LocalName)?;
                    self.element(child)?;
                }
                ChildState::TextAsCharArray => {
                    let text = self.read_text(word, ContentRepr::CharArray)?;
                    consumer(self.handler.characters(&text))?;
                }
                ChildState::TextAsCharArrayCopy => {
                    let text = self.read_text(word, ContentRepr::CharArrayCopy)?;
                    consumer(self.handler.characters(&text))?;
                }
                ChildState::TextAsString => {
                    let text = self.read_text(word, ContentRepr::String)?;
                    consumer(self.handler.characters(&text))?;
                }
                ChildState::TextAsObject => match self.reader.read_content_object(word)? {
                    ContentObject::Opaque(value) => consumer(self.handler.object_content(value))?,
                    ContentObject::Text(text) => consumer(self.handler.characters(text))?,
                },
                ChildState::CommentAsCharArray => self.comment(word, ContentRepr::CharArray)?,
                ChildState::CommentAsCharArrayCopy => {
                    self.comment(word, ContentRepr::CharArrayCopy)?
                }
                ChildState::CommentAsString => self.comment(word, ContentRepr::String)?,
                ChildState::ProcessingInstruction => self.processing_instruction()?,
                ChildState::End => break,
                ChildState::Illegal => return Err(malformed(DecodeContext::Element, word)),
            }
        }

        consumer(
            self.handler
                .end_element(&names.uri, &names.local_name, &names.qname),
        )?;

        if has_namespace_attributes {
            for binding in self.namespaces.pop_scope() {
                consumer(self.handler.end_prefix_mapping(&binding.prefix))?;
            }
        }

        self.depth -= 1;
        Ok(())
    }

    /// Consume the attribute run following an element tag
    ///
    /// Returns true if it declared namespaces.
    fn attribute_run(&mut self) -> Result<bool> {
        let mark = self.namespaces.len();
        let mut has_namespace_attributes = false;

        loop {
            let word = self.reader.peek_structure();
            match Tag::decode(word) {
                Some(Tag::NamespaceAttribute { prefix, uri }) => {
                    self.reader.read_structure();
                    let prefix = if prefix {
                        self.read_string()?
                    } else {
                        Arc::clone(&self.names.empty)
                    };
                    let uri = if uri {
                        self.read_string()?
                    } else {
                        Arc::clone(&self.names.empty)
                    };
                    self.namespace_attribute(prefix, uri)?;
                    has_namespace_attributes = true;
                }
                Some(Tag::Attribute { shape, value }) => {
                    self.reader.read_structure();
                    let names = self.read_names(shape)?;
                    let attr_type = self.read_string()?;
                    let value = match value {
                        ValueRepr::String => {
                            AttributeValue::Text(Arc::clone(self.reader.read_content_text(word)?))
                        }
                        ValueRepr::Object => match self.reader.read_content_object(word)? {
                            ContentObject::Opaque(value) => AttributeValue::Object(value.clone()),
                            ContentObject::Text(text) => AttributeValue::Text(Arc::clone(text)),
                        },
                    };
                    self.attributes.add_attribute_with_qname(
                        names.uri,
                        names.local_name,
                        names.qname,
                        attr_type,
                        value,
                    );
                }
                _ => match major_kind(word) {
                    Some(MajorKind::Attribute | MajorKind::NamespaceAttribute) => {
                        self.reader.read_structure();
                        return Err(malformed(DecodeContext::AttributeRun, word));
                    }
                    _ => break,
                },
            }
        }

        if has_namespace_attributes {
            self.namespaces.push_boundary(mark);
        }
        Ok(has_namespace_attributes)
    }

    fn namespace_attribute(&mut self, prefix: Arc<str>, uri: Arc<str>) -> Result<()> {
        consumer(self.handler.start_prefix_mapping(&prefix, &uri))?;

        if self.namespace_prefixes {
            let (local_name, qname) = if prefix.is_empty() {
                (
                    Arc::clone(&self.names.xmlns_prefix),
                    Arc::clone(&self.names.xmlns_prefix),
                )
            } else {
                let qname = self.qualified_name(ns::XMLNS_PREFIX, &prefix);
                (Arc::clone(&prefix), qname)
            };
            self.attributes.add_attribute_with_qname(
                Arc::clone(&self.names.xmlns_uri),
                local_name,
                qname,
                Arc::clone(&self.names.cdata),
                AttributeValue::Text(Arc::clone(&uri)),
            );
        }

        self.namespaces.declare(prefix, uri);
        Ok(())
    }

    fn comment(&mut self, word: u32, repr: ContentRepr) -> Result<()> {
        let text = self.read_text(word, repr)?;
        consumer(self.handler.comment(&text))
    }

    fn processing_instruction(&mut self) -> Result<()> {
        let target = self.reader.read_structure_string()?;
        let data = self.reader.read_structure_string()?;
        consumer(self.handler.processing_instruction(&target, &data))
    }

    /// Character content of a text or comment tag
    fn read_text(&mut self, word: u32, repr: ContentRepr) -> Result<Cow<'b, str>> {
        match repr {
            ContentRepr::CharArray => {
                let len = self.reader.read_structure() as usize;
                self.reader.read_content_characters(word, len)
            }
            ContentRepr::CharArrayCopy | ContentRepr::String => {
                Ok(Cow::Borrowed(&**self.reader.read_content_text(word)?))
            }
            ContentRepr::Object => Err(malformed(DecodeContext::Element, word)),
        }
    }

    fn read_names(&mut self, shape: NameShape) -> Result<Names> {
        Ok(match shape {
            NameShape::LocalName => {
                let local_name = self.read_string()?;
                Names {
                    uri: Arc::clone(&self.names.empty),
                    qname: Arc::clone(&local_name),
                    local_name,
                }
            }
            NameShape::UriLocalName => {
                let uri = self.read_string()?;
                let local_name = self.read_string()?;
                Names {
                    uri,
                    qname: Arc::clone(&local_name),
                    local_name,
                }
            }
            NameShape::PrefixUriLocalName => {
                let prefix = self.reader.read_structure_string()?;
                let uri = self.read_string()?;
                let local_name = self.read_string()?;
                let qname = self.qualified_name(&prefix, &local_name);
                Names {
                    uri,
                    local_name,
                    qname,
                }
            }
            NameShape::UriLocalNameQualifiedName => Names {
                uri: self.read_string()?,
                local_name: self.read_string()?,
                qname: self.read_string()?,
            },
        })
    }

    /// Next structure string, interned when enabled
    fn read_string(&mut self) -> Result<Arc<str>> {
        let value = self.reader.read_structure_string()?;
        Ok(match self.interner.as_deref_mut() {
            Some(interner) => interner.intern(&value),
            None => value,
        })
    }

    /// `prefix:local`, or `local` alone when the prefix is empty
    fn qualified_name(&mut self, prefix: &str, local_name: &Arc<str>) -> Arc<str> {
        if prefix.is_empty() {
            return Arc::clone(local_name);
        }
        let qname = format!("{prefix}:{local_name}");
        match self.interner.as_deref_mut() {
            Some(interner) => interner.intern_str(&qname),
            None => Arc::from(qname),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Opaque;
    use crate::codec::tag::*;
    use crate::config::features;
    use crate::sax::attributes::Attribute;
    use std::sync::Mutex;

    /// Hand-assembled buffer
    fn buffer(words: &[u32], strings: &[&str], objects: Vec<ContentObject>, chars: &str) -> XmlStreamBuffer {
        let mut buffer = XmlStreamBuffer::new();
        buffer.structure.extend(words.iter().copied());
        buffer
            .structure_strings
            .extend(strings.iter().map(|s| Arc::<str>::from(*s)));
        buffer.content_objects.extend(objects);
        buffer.content_characters.extend(chars.bytes());
        buffer
    }

    fn text(s: &str) -> ContentObject {
        ContentObject::Text(Arc::from(s))
    }

    fn replay(buffer: &XmlStreamBuffer) -> Result<Vec<SaxEvent>> {
        SaxBufferProcessor::new().collect(buffer)
    }

    #[derive(Clone, Default)]
    struct RecordingErrors(Arc<Mutex<Vec<String>>>);

    impl ErrorHandler for RecordingErrors {
        fn fatal_error(&mut self, err: &Error) {
            self.0.lock().unwrap().push(err.to_string());
        }
    }

    #[test]
    fn test_empty_buffer_produces_no_events() {
        let events = replay(&XmlStreamBuffer::new()).unwrap();
        assert!(events.is_empty());

        let events = replay(&buffer(&[T_END], &[], vec![], "")).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_minimal_document() {
        let buffer = buffer(&[T_DOCUMENT, T_ELEMENT_LN, T_END, T_END], &["a"], vec![], "");
        assert_eq!(
            replay(&buffer).unwrap(),
            vec![
                SaxEvent::StartDocument,
                SaxEvent::start_element("", "a", "a"),
                SaxEvent::end_element("", "a", "a"),
                SaxEvent::EndDocument,
            ]
        );
    }

    #[test]
    fn test_default_namespace_declaration() {
        let buffer = buffer(
            &[T_DOCUMENT, T_ELEMENT_U_LN, T_NAMESPACE_ATTRIBUTE_U, T_END, T_END],
            &["urn:x", "a", "urn:x"],
            vec![],
            "",
        );
        assert_eq!(
            replay(&buffer).unwrap(),
            vec![
                SaxEvent::StartDocument,
                SaxEvent::start_prefix_mapping("", "urn:x"),
                SaxEvent::start_element("urn:x", "a", "a"),
                SaxEvent::end_element("urn:x", "a", "a"),
                SaxEvent::end_prefix_mapping(""),
                SaxEvent::EndDocument,
            ]
        );
    }

    #[test]
    fn test_attribute_with_explicit_qualified_name() {
        let buffer = buffer(
            &[T_DOCUMENT, T_ELEMENT_LN, T_ATTRIBUTE_U_LN_QN, T_END, T_END],
            &["e", "urn:x", "b", "p:b", "CDATA"],
            vec![text("v")],
            "",
        );
        let events = replay(&buffer).unwrap();
        let SaxEvent::StartElement { attributes, .. } = &events[1] else {
            panic!("expected element start, got {}", events[1]);
        };
        assert_eq!(attributes, &vec![Attribute::new("urn:x", "b", "p:b", "CDATA", "v")]);
    }

    #[test]
    fn test_attribute_shapes() {
        let buffer = buffer(
            &[
                T_DOCUMENT,
                T_ELEMENT_P_U_LN,
                T_ATTRIBUTE_LN,
                T_ATTRIBUTE_U_LN,
                T_ATTRIBUTE_P_U_LN,
                T_END,
                T_END,
            ],
            &[
                "p", "urn:p", "root", // element
                "id", "ID", // LN
                "urn:u", "u", "CDATA", // U_LN
                "q", "urn:q", "v", "CDATA", // P_U_LN
            ],
            vec![text("1"), text("2"), text("3")],
            "",
        );
        let events = replay(&buffer).unwrap();
        assert_eq!(
            events[1],
            SaxEvent::StartElement {
                uri: "urn:p".into(),
                local_name: "root".into(),
                qname: "p:root".into(),
                attributes: vec![
                    Attribute::new("", "id", "id", "ID", "1"),
                    Attribute::new("urn:u", "u", "u", "CDATA", "2"),
                    Attribute::new("urn:q", "v", "q:v", "CDATA", "3"),
                ],
            }
        );
        assert_eq!(events[2], SaxEvent::end_element("urn:p", "root", "p:root"));
    }

    #[test]
    fn test_empty_prefix_is_not_joined() {
        let buffer = buffer(&[T_DOCUMENT, T_ELEMENT_P_U_LN, T_END, T_END], &["", "urn:x", "a"], vec![], "");
        let events = replay(&buffer).unwrap();
        assert_eq!(events[1], SaxEvent::start_element("urn:x", "a", "a"));
    }

    #[test]
    fn test_comments_in_prolog_and_epilogue() {
        let buffer = buffer(
            &[
                T_DOCUMENT,
                T_COMMENT_AS_STRING,
                T_ELEMENT_LN,
                T_END,
                T_COMMENT_AS_CHAR_ARRAY,
                3,
                T_END,
            ],
            &["root"],
            vec![text("before")],
            "end",
        );
        assert_eq!(
            replay(&buffer).unwrap(),
            vec![
                SaxEvent::StartDocument,
                SaxEvent::Comment("before".into()),
                SaxEvent::start_element("", "root", "root"),
                SaxEvent::end_element("", "root", "root"),
                SaxEvent::Comment("end".into()),
                SaxEvent::EndDocument,
            ]
        );
    }

    #[test]
    fn test_children_content() {
        let answer = Opaque::new(42i64);
        let buffer = buffer(
            &[
                T_DOCUMENT,
                T_PROCESSING_INSTRUCTION,
                T_ELEMENT_LN,
                T_TEXT_AS_CHAR_ARRAY,
                "héllo".len() as u32,
                T_ELEMENT_U_LN,
                T_TEXT_AS_CHAR_ARRAY_COPY,
                T_END,
                T_TEXT_AS_STRING,
                T_COMMENT_AS_CHAR_ARRAY_COPY,
                T_PROCESSING_INSTRUCTION,
                T_TEXT_AS_OBJECT,
                T_END,
                T_END,
            ],
            &["xml-stylesheet", "href=\"a.xsl\"", "root", "urn:c", "child", "target", ""],
            vec![
                text("copied"),
                text("string"),
                text("note"),
                ContentObject::Opaque(answer.clone()),
            ],
            "héllo",
        );
        assert_eq!(
            replay(&buffer).unwrap(),
            vec![
                SaxEvent::StartDocument,
                SaxEvent::ProcessingInstruction {
                    target: "xml-stylesheet".into(),
                    data: "href=\"a.xsl\"".into(),
                },
                SaxEvent::start_element("", "root", "root"),
                SaxEvent::Characters("héllo".into()),
                SaxEvent::start_element("urn:c", "child", "child"),
                SaxEvent::Characters("copied".into()),
                SaxEvent::end_element("urn:c", "child", "child"),
                SaxEvent::Characters("string".into()),
                SaxEvent::Comment("note".into()),
                SaxEvent::ProcessingInstruction {
                    target: "target".into(),
                    data: "".into(),
                },
                SaxEvent::Object(answer),
                SaxEvent::end_element("", "root", "root"),
                SaxEvent::EndDocument,
            ]
        );
    }

    #[test]
    fn test_nested_prefix_mappings_end_in_reverse() {
        let buffer = buffer(
            &[
                T_DOCUMENT,
                T_ELEMENT_LN,
                T_NAMESPACE_ATTRIBUTE_P_U,
                T_NAMESPACE_ATTRIBUTE_P_U,
                T_ELEMENT_LN,
                T_NAMESPACE_ATTRIBUTE_P,
                T_NAMESPACE_ATTRIBUTE,
                T_END,
                T_END,
                T_END,
            ],
            &["outer", "a", "urn:a", "b", "urn:b", "inner", "a"],
            vec![],
            "",
        );
        assert_eq!(
            replay(&buffer).unwrap(),
            vec![
                SaxEvent::StartDocument,
                SaxEvent::start_prefix_mapping("a", "urn:a"),
                SaxEvent::start_prefix_mapping("b", "urn:b"),
                SaxEvent::start_element("", "outer", "outer"),
                SaxEvent::start_prefix_mapping("a", ""),
                SaxEvent::start_prefix_mapping("", ""),
                SaxEvent::start_element("", "inner", "inner"),
                SaxEvent::end_element("", "inner", "inner"),
                SaxEvent::end_prefix_mapping(""),
                SaxEvent::end_prefix_mapping("a"),
                SaxEvent::end_element("", "outer", "outer"),
                SaxEvent::end_prefix_mapping("b"),
                SaxEvent::end_prefix_mapping("a"),
                SaxEvent::EndDocument,
            ]
        );
    }

    #[test]
    fn test_sibling_without_declarations_keeps_parent_scope() {
        let buffer = buffer(
            &[
                T_DOCUMENT,
                T_ELEMENT_LN,
                T_NAMESPACE_ATTRIBUTE_P_U,
                T_ELEMENT_LN,
                T_END,
                T_ELEMENT_LN,
                T_NAMESPACE_ATTRIBUTE_P_U,
                T_END,
                T_END,
                T_END,
            ],
            &["root", "p", "urn:p", "first", "second", "q", "urn:q"],
            vec![],
            "",
        );
        let events = replay(&buffer).unwrap();
        let ends: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, SaxEvent::EndPrefixMapping { .. }))
            .cloned()
            .collect();
        assert_eq!(
            ends,
            vec![SaxEvent::end_prefix_mapping("q"), SaxEvent::end_prefix_mapping("p")]
        );
        assert_eq!(events[events.len() - 2], SaxEvent::end_prefix_mapping("p"));
    }

    #[test]
    fn test_namespace_prefixes_feature_adds_attributes() {
        let buffer = buffer(
            &[
                T_DOCUMENT,
                T_ELEMENT_LN,
                T_NAMESPACE_ATTRIBUTE_U,
                T_NAMESPACE_ATTRIBUTE_P_U,
                T_ATTRIBUTE_LN,
                T_END,
                T_END,
            ],
            &["root", "urn:d", "p", "urn:p", "id", "CDATA"],
            vec![text("1")],
            "",
        );
        let mut processor = SaxBufferProcessor::new();
        processor.set_feature(features::NAMESPACE_PREFIXES, true).unwrap();
        let events = processor.collect(&buffer).unwrap();

        let SaxEvent::StartElement { attributes, .. } = &events[3] else {
            panic!("expected element start, got {}", events[3]);
        };
        assert_eq!(
            attributes,
            &vec![
                Attribute::new(ns::XMLNS, "xmlns", "xmlns", "CDATA", "urn:d"),
                Attribute::new(ns::XMLNS, "p", "xmlns:p", "CDATA", "urn:p"),
                Attribute::new("", "id", "id", "CDATA", "1"),
            ]
        );
    }

    #[test]
    fn test_attributes_cleared_between_elements() {
        let buffer = buffer(
            &[T_DOCUMENT, T_ELEMENT_LN, T_ATTRIBUTE_LN, T_ELEMENT_LN, T_END, T_END, T_END],
            &["root", "id", "CDATA", "child"],
            vec![text("1")],
            "",
        );
        let events = replay(&buffer).unwrap();
        assert!(matches!(&events[1], SaxEvent::StartElement { attributes, .. } if attributes.len() == 1));
        assert_eq!(events[2], SaxEvent::start_element("", "child", "child"));
    }

    #[test]
    fn test_object_attribute_value() {
        let value = Opaque::new(vec![1u8, 2, 3]);
        let buffer = buffer(
            &[T_DOCUMENT, T_ELEMENT_LN, T_ATTRIBUTE_LN_OBJECT, T_END, T_END],
            &["root", "data", "CDATA"],
            vec![ContentObject::Opaque(value.clone())],
            "",
        );
        let events = replay(&buffer).unwrap();
        let SaxEvent::StartElement { attributes, .. } = &events[1] else {
            panic!("expected element start");
        };
        assert_eq!(attributes[0].value, AttributeValue::Object(value));
    }

    #[test]
    fn test_fragment_is_unsupported() {
        let errors = RecordingErrors::default();
        let mut processor = SaxBufferProcessor::new();
        processor.set_error_handler(Box::new(errors.clone()));

        let mut collector = EventCollector::new();
        let result = processor.process(&buffer(&[T_DOCUMENT_FRAGMENT, T_END], &[], vec![], ""), &mut collector);
        assert!(matches!(result, Err(Error::UnsupportedFragment)));
        assert_eq!(collector.event_count(), 0);
        assert_eq!(errors.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_illegal_entry_tag() {
        let result = replay(&buffer(&[T_TEXT_AS_STRING], &[], vec![text("x")], ""));
        assert!(matches!(
            result,
            Err(Error::MalformedStructure {
                context: DecodeContext::Entry,
                tag: T_TEXT_AS_STRING,
            })
        ));
    }

    #[test]
    fn test_illegal_child_reports_then_fails() {
        let errors = RecordingErrors::default();
        let mut processor = SaxBufferProcessor::new();
        processor.set_error_handler(Box::new(errors.clone()));

        // attribute after content
        let buffer = buffer(
            &[T_DOCUMENT, T_ELEMENT_LN, T_TEXT_AS_STRING, T_ATTRIBUTE_LN, T_END, T_END],
            &["root", "id", "CDATA"],
            vec![text("x"), text("1")],
            "",
        );
        let mut collector = EventCollector::new();
        let err = processor.process(&buffer, &mut collector).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedStructure {
                context: DecodeContext::Element,
                tag: T_ATTRIBUTE_LN,
            }
        ));
        assert_eq!(
            errors.0.lock().unwrap().as_slice(),
            &[err.to_string()]
        );
        // events before the error were delivered, nothing after
        assert_eq!(collector.events().last(), Some(&SaxEvent::Characters("x".into())));
    }

    #[test]
    fn test_entity_reference_is_illegal_child() {
        let buffer = buffer(
            &[T_DOCUMENT, T_ELEMENT_LN, T_UNEXPANDED_ENTITY_REFERENCE, T_END, T_END],
            &["root"],
            vec![],
            "",
        );
        assert!(matches!(replay(&buffer), Err(Error::MalformedStructure { .. })));
    }

    #[test]
    fn test_malformed_attribute_shape() {
        let buffer = buffer(
            &[T_DOCUMENT, T_ELEMENT_LN, T_ATTRIBUTE | FLAG_PREFIX, T_END, T_END],
            &["root", "p", "a", "CDATA"],
            vec![text("v")],
            "",
        );
        assert!(matches!(
            replay(&buffer),
            Err(Error::MalformedStructure {
                context: DecodeContext::AttributeRun,
                ..
            })
        ));
    }

    #[test]
    fn test_document_without_root_fails() {
        let result = replay(&buffer(&[T_DOCUMENT, T_END], &[], vec![], ""));
        assert!(matches!(
            result,
            Err(Error::MalformedStructure {
                context: DecodeContext::Document,
                ..
            })
        ));
    }

    #[test]
    fn test_end_before_root_is_skipped() {
        let buffer = buffer(&[T_DOCUMENT, T_END, T_ELEMENT_LN, T_END, T_END], &["a"], vec![], "");
        let events = replay(&buffer).unwrap();
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn test_second_root_is_rejected() {
        let buffer = buffer(
            &[T_DOCUMENT, T_ELEMENT_LN, T_END, T_ELEMENT_LN, T_END, T_END],
            &["a", "b"],
            vec![],
            "",
        );
        assert!(matches!(
            replay(&buffer),
            Err(Error::MalformedStructure {
                context: DecodeContext::Epilogue,
                tag: T_ELEMENT_LN,
            })
        ));
    }

    #[test]
    fn test_truncated_buffer_ends_document() {
        // a structure stream that stops after the root still replays
        let buffer = buffer(&[T_DOCUMENT, T_ELEMENT_LN], &["a"], vec![], "");
        let events = replay(&buffer).unwrap();
        assert_eq!(events.last(), Some(&SaxEvent::EndDocument));
    }

    #[test]
    fn test_missing_string_is_format_error() {
        let err = replay(&buffer(&[T_DOCUMENT, T_ELEMENT_U_LN, T_END, T_END], &["urn:x"], vec![], ""))
            .unwrap_err();
        assert!(matches!(err, Error::MissingStructureString));
        assert!(err.is_format_error());
    }

    struct FailOnCharacters {
        seen: Vec<String>,
    }

    impl ContentHandler for FailOnCharacters {
        fn start_element(&mut self, _: &str, local_name: &str, _: &str, _: &Attributes) -> HandlerResult {
            self.seen.push(local_name.to_string());
            Ok(())
        }

        fn characters(&mut self, text: &str) -> HandlerResult {
            Err(format!("cannot accept {text:?}").into())
        }

        fn end_document(&mut self) -> HandlerResult {
            self.seen.push("end".to_string());
            Ok(())
        }
    }

    #[test]
    fn test_consumer_failure_aborts() {
        let buffer = buffer(
            &[T_DOCUMENT, T_ELEMENT_LN, T_TEXT_AS_STRING, T_END, T_END],
            &["root"],
            vec![text("x")],
            "",
        );
        let errors = RecordingErrors::default();
        let mut processor = SaxBufferProcessor::new();
        processor.set_error_handler(Box::new(errors.clone()));

        let mut handler = FailOnCharacters { seen: Vec::new() };
        let err = processor.process(&buffer, &mut handler).unwrap_err();
        assert!(matches!(err, Error::ConsumerFailure(_)));
        assert_eq!(handler.seen, vec!["root"]);
        assert_eq!(errors.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_depth_limit() {
        let words = [
            T_DOCUMENT,
            T_ELEMENT_LN,
            T_ELEMENT_LN,
            T_ELEMENT_LN,
            T_END,
            T_END,
            T_END,
            T_END,
        ];
        let buffer = buffer(&words, &["a", "b", "c"], vec![], "");

        let mut limited = SaxBufferProcessor::with_config(ProcessorConfig::new().max_depth(Some(2)));
        assert!(matches!(
            limited.collect(&buffer),
            Err(Error::DepthLimitExceeded { limit: 2 })
        ));

        let mut enough = SaxBufferProcessor::with_config(ProcessorConfig::new().max_depth(Some(3)));
        assert_eq!(enough.collect(&buffer).unwrap().len(), 8);
    }

    #[test]
    fn test_processor_reusable_after_failure() {
        let bad = buffer(
            &[T_DOCUMENT, T_ELEMENT_LN, T_NAMESPACE_ATTRIBUTE_P_U, T_DOCUMENT],
            &["root", "p", "urn:p"],
            vec![],
            "",
        );
        let good = buffer(&[T_DOCUMENT, T_ELEMENT_LN, T_END, T_END], &["a"], vec![], "");

        let mut processor = SaxBufferProcessor::new();
        processor.set_error_handler(Box::new(crate::sax::DefaultHandler));
        assert!(processor.collect(&bad).is_err());

        let events = processor.collect(&good).unwrap();
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn test_string_interning_shares_names() {
        let buffer = buffer(
            &[
                T_DOCUMENT,
                T_ELEMENT_LN,
                T_ATTRIBUTE_LN,
                T_ELEMENT_LN,
                T_ATTRIBUTE_LN,
                T_END,
                T_END,
                T_END,
            ],
            &["root", "id", "CDATA", "child", "id", "CDATA"],
            vec![text("1"), text("2")],
            "",
        );

        let local_names = |interning: bool| {
            let mut processor =
                SaxBufferProcessor::with_config(ProcessorConfig::new().string_interning(interning));
            let events = processor.collect(&buffer).unwrap();
            events
                .iter()
                .filter_map(|e| match e {
                    SaxEvent::StartElement { attributes, .. } => {
                        Some(Arc::clone(&attributes[0].local_name))
                    }
                    _ => None,
                })
                .collect::<Vec<_>>()
        };

        let shared = local_names(true);
        assert!(Arc::ptr_eq(&shared[0], &shared[1]));
        let separate = local_names(false);
        assert!(!Arc::ptr_eq(&separate[0], &separate[1]));
    }

    #[test]
    fn test_default_handler_consumes_everything() {
        let buffer = buffer(
            &[T_DOCUMENT, T_ELEMENT_LN, T_TEXT_AS_STRING, T_END, T_END],
            &["root"],
            vec![text("x")],
            "",
        );
        let mut handler = crate::sax::DefaultHandler;
        assert!(SaxBufferProcessor::new().process(&buffer, &mut handler).is_ok());
    }
}
