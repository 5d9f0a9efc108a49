//! Buffer Creator
//!
//! Produces an [`XmlStreamBuffer`] from infoset calls. The creator checks
//! call order so that every buffer it finishes replays cleanly:
//!
//! ```text
//! start_document
//!   (comment | processing_instruction)*
//!   start_element (namespace_attribute | attribute)* content* end_element
//!   (comment | processing_instruction)*
//! end_document
//! ```
//!
//! It also implements [`ContentHandler`], so a replay can be captured into a
//! new buffer.

use std::sync::Arc;

use log::debug;
use memchr::memchr;

use crate::buffer::{ContentObject, Opaque, XmlStreamBuffer};
use crate::codec::{ContentRepr, NameShape, Tag, ValueRepr};
use crate::config::CreatorConfig;
use crate::error::{Error, Result};
use crate::sax::attributes::{AttributeValue, Attributes};
use crate::sax::handler::{ContentHandler, HandlerResult};
use crate::sax::namespace::ns;
use crate::strings::NameInterner;

/// Position of the creator in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Initial,
    Prolog,
    Content,
    Epilogue,
    Finished,
}

/// Name split into the parts its shape stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapedName<'a> {
    Local(&'a str),
    UriLocal(&'a str, &'a str),
    PrefixUriLocal(&'a str, &'a str, &'a str),
    UriLocalQualified(&'a str, &'a str, &'a str),
}

impl ShapedName<'_> {
    fn shape(&self) -> NameShape {
        match self {
            ShapedName::Local(_) => NameShape::LocalName,
            ShapedName::UriLocal(..) => NameShape::UriLocalName,
            ShapedName::PrefixUriLocal(..) => NameShape::PrefixUriLocalName,
            ShapedName::UriLocalQualified(..) => NameShape::UriLocalNameQualifiedName,
        }
    }
}

/// Smallest shape that reproduces `(uri, local_name, qname)` on replay
fn shape_name<'a>(uri: &'a str, local_name: &'a str, qname: &'a str) -> ShapedName<'a> {
    if qname == local_name {
        return if uri.is_empty() {
            ShapedName::Local(local_name)
        } else {
            ShapedName::UriLocal(uri, local_name)
        };
    }
    if let Some(colon) = memchr(b':', qname.as_bytes()) {
        let (prefix, rest) = (&qname[..colon], &qname[colon + 1..]);
        if !prefix.is_empty() && rest == local_name {
            return ShapedName::PrefixUriLocal(prefix, uri, local_name);
        }
    }
    ShapedName::UriLocalQualified(uri, local_name, qname)
}

/// Writes infoset calls into a new buffer
#[derive(Debug)]
pub struct BufferCreator {
    buffer: XmlStreamBuffer,
    copy_characters: bool,
    names: NameInterner,
    phase: Phase,
    depth: usize,
    /// Attributes may still be added to the open element
    in_start_tag: bool,
    /// Prefix mappings received as events, written with the next element
    pending_namespaces: Vec<(Arc<str>, Arc<str>)>,
}

impl BufferCreator {
    pub fn new() -> Self {
        Self::with_config(CreatorConfig::default())
    }

    pub fn with_config(config: CreatorConfig) -> Self {
        BufferCreator {
            buffer: XmlStreamBuffer::with_capacities(
                config.structure_capacity,
                config.structure_string_capacity,
                config.content_character_capacity,
                config.content_object_capacity,
            ),
            copy_characters: config.copy_characters,
            names: NameInterner::default(),
            phase: Phase::Initial,
            depth: 0,
            in_start_tag: false,
            pending_namespaces: Vec::new(),
        }
    }

    /// Depth of the innermost open element
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn start_document(&mut self) -> Result<()> {
        if self.phase != Phase::Initial {
            return Err(Error::CreatorState("document already started"));
        }
        self.write_tag(Tag::Document { fragment: false });
        self.phase = Phase::Prolog;
        Ok(())
    }

    pub fn end_document(&mut self) -> Result<()> {
        match self.phase {
            Phase::Epilogue => {
                self.write_tag(Tag::End);
                self.phase = Phase::Finished;
                Ok(())
            }
            Phase::Initial => Err(Error::CreatorState("document not started")),
            Phase::Prolog => Err(Error::CreatorState("document has no root element")),
            Phase::Content => Err(Error::CreatorState("elements left open")),
            Phase::Finished => Err(Error::CreatorState("document already ended")),
        }
    }

    pub fn start_element(&mut self, uri: &str, local_name: &str, qname: &str) -> Result<()> {
        match self.phase {
            Phase::Prolog => self.phase = Phase::Content,
            Phase::Content => {}
            Phase::Epilogue => return Err(Error::CreatorState("document already has a root element")),
            Phase::Initial | Phase::Finished => {
                return Err(Error::CreatorState("element outside a document"))
            }
        }
        let name = shape_name(uri, local_name, qname);
        self.write_tag(Tag::Element(name.shape()));
        self.write_name(name);
        self.depth += 1;
        self.in_start_tag = true;
        Ok(())
    }

    /// Namespace declaration on the element just started
    ///
    /// An empty `prefix` declares the default namespace; an empty `uri`
    /// undeclares.
    pub fn namespace_attribute(&mut self, prefix: &str, uri: &str) -> Result<()> {
        self.check_start_tag()?;
        self.write_tag(Tag::NamespaceAttribute {
            prefix: !prefix.is_empty(),
            uri: !uri.is_empty(),
        });
        if !prefix.is_empty() {
            self.write_string(prefix);
        }
        if !uri.is_empty() {
            self.write_string(uri);
        }
        Ok(())
    }

    /// Textual attribute of the element just started
    pub fn attribute(
        &mut self,
        uri: &str,
        local_name: &str,
        qname: &str,
        attr_type: &str,
        value: &str,
    ) -> Result<()> {
        self.write_attribute(uri, local_name, qname, attr_type, ContentObject::Text(Arc::from(value)))
    }

    /// Attribute whose value is an opaque object
    pub fn attribute_object(
        &mut self,
        uri: &str,
        local_name: &str,
        qname: &str,
        attr_type: &str,
        value: Opaque,
    ) -> Result<()> {
        self.write_attribute(uri, local_name, qname, attr_type, ContentObject::Opaque(value))
    }

    pub fn end_element(&mut self) -> Result<()> {
        if self.depth == 0 {
            return Err(Error::CreatorState("end of element without a start"));
        }
        self.write_tag(Tag::End);
        self.depth -= 1;
        self.in_start_tag = false;
        if self.depth == 0 {
            self.phase = Phase::Epilogue;
        }
        Ok(())
    }

    pub fn characters(&mut self, text: &str) -> Result<()> {
        self.check_content("character content outside an element")?;
        self.write_text(Tag::Text, text);
        Ok(())
    }

    /// Opaque element content
    pub fn characters_object(&mut self, value: Opaque) -> Result<()> {
        self.check_content("object content outside an element")?;
        self.write_tag(Tag::Text(ContentRepr::Object));
        self.buffer.content_objects.append(ContentObject::Opaque(value));
        Ok(())
    }

    pub fn comment(&mut self, text: &str) -> Result<()> {
        self.check_misc("comment outside a document")?;
        self.write_text(Tag::Comment, text);
        Ok(())
    }

    pub fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()> {
        self.check_misc("processing instruction outside a document")?;
        self.write_tag(Tag::ProcessingInstruction);
        self.write_string(target);
        self.write_string(data);
        Ok(())
    }

    /// Hand over the buffer
    ///
    /// A creator that never started a document yields an empty buffer.
    pub fn finish(self) -> Result<XmlStreamBuffer> {
        match self.phase {
            Phase::Initial | Phase::Finished => {
                debug!(
                    "buffer created: {} structure words, {} strings, {} content bytes, {} objects",
                    self.buffer.structure.len(),
                    self.buffer.structure_strings.len(),
                    self.buffer.content_characters.len(),
                    self.buffer.content_objects.len()
                );
                Ok(self.buffer)
            }
            _ => Err(Error::CreatorState("document not ended")),
        }
    }

    fn check_start_tag(&self) -> Result<()> {
        if self.in_start_tag {
            Ok(())
        } else {
            Err(Error::CreatorState("attribute without an open start tag"))
        }
    }

    fn check_content(&mut self, message: &'static str) -> Result<()> {
        if self.phase != Phase::Content {
            return Err(Error::CreatorState(message));
        }
        self.in_start_tag = false;
        Ok(())
    }

    fn check_misc(&mut self, message: &'static str) -> Result<()> {
        match self.phase {
            Phase::Prolog | Phase::Epilogue => Ok(()),
            Phase::Content => {
                self.in_start_tag = false;
                Ok(())
            }
            Phase::Initial | Phase::Finished => Err(Error::CreatorState(message)),
        }
    }

    fn write_attribute(
        &mut self,
        uri: &str,
        local_name: &str,
        qname: &str,
        attr_type: &str,
        value: ContentObject,
    ) -> Result<()> {
        self.check_start_tag()?;
        let name = shape_name(uri, local_name, qname);
        let repr = match value {
            ContentObject::Text(_) => ValueRepr::String,
            ContentObject::Opaque(_) => ValueRepr::Object,
        };
        self.write_tag(Tag::Attribute {
            shape: name.shape(),
            value: repr,
        });
        self.write_name(name);
        self.write_string(attr_type);
        self.buffer.content_objects.append(value);
        Ok(())
    }

    /// Character content of a text or comment
    ///
    /// Runs that fit a segment go to the character stream; everything else,
    /// or everything when copying is configured, is stored as a copy.
    fn write_text(&mut self, tag: fn(ContentRepr) -> Tag, text: &str) {
        if !self.copy_characters {
            if let Ok(len) = u32::try_from(text.len()) {
                if self.buffer.content_characters.append_run(text.as_bytes()) {
                    self.write_tag(tag(ContentRepr::CharArray));
                    self.buffer.structure.append(len);
                    return;
                }
            }
        }
        self.write_tag(tag(ContentRepr::CharArrayCopy));
        self.buffer
            .content_objects
            .append(ContentObject::Text(Arc::from(text)));
    }

    fn write_name(&mut self, name: ShapedName<'_>) {
        match name {
            ShapedName::Local(local_name) => self.write_string(local_name),
            ShapedName::UriLocal(uri, local_name) => {
                self.write_string(uri);
                self.write_string(local_name);
            }
            ShapedName::PrefixUriLocal(prefix, uri, local_name) => {
                self.write_string(prefix);
                self.write_string(uri);
                self.write_string(local_name);
            }
            ShapedName::UriLocalQualified(uri, local_name, qname) => {
                self.write_string(uri);
                self.write_string(local_name);
                self.write_string(qname);
            }
        }
    }

    #[inline]
    fn write_tag(&mut self, tag: Tag) {
        self.buffer.structure.append(tag.encode());
    }

    #[inline]
    fn write_string(&mut self, value: &str) {
        let value = self.names.intern_str(value);
        self.buffer.structure_strings.append(value);
    }
}

impl Default for BufferCreator {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHandler for BufferCreator {
    fn start_document(&mut self) -> HandlerResult {
        Ok(BufferCreator::start_document(self)?)
    }

    fn end_document(&mut self) -> HandlerResult {
        Ok(BufferCreator::end_document(self)?)
    }

    fn start_element(
        &mut self,
        uri: &str,
        local_name: &str,
        qname: &str,
        attributes: &Attributes,
    ) -> HandlerResult {
        BufferCreator::start_element(self, uri, local_name, qname)?;

        for (prefix, uri) in std::mem::take(&mut self.pending_namespaces) {
            self.namespace_attribute(&prefix, &uri)?;
        }

        // xmlns attributes repeat the prefix mappings already written
        for attr in attributes.iter().filter(|a| &*a.uri != ns::XMLNS) {
            match &attr.value {
                AttributeValue::Text(value) => self.attribute(
                    &attr.uri,
                    &attr.local_name,
                    &attr.qname,
                    &attr.attr_type,
                    value,
                )?,
                AttributeValue::Object(value) => self.attribute_object(
                    &attr.uri,
                    &attr.local_name,
                    &attr.qname,
                    &attr.attr_type,
                    value.clone(),
                )?,
            }
        }
        Ok(())
    }

    fn end_element(&mut self, _uri: &str, _local_name: &str, _qname: &str) -> HandlerResult {
        Ok(BufferCreator::end_element(self)?)
    }

    fn characters(&mut self, text: &str) -> HandlerResult {
        Ok(BufferCreator::characters(self, text)?)
    }

    fn comment(&mut self, text: &str) -> HandlerResult {
        Ok(BufferCreator::comment(self, text)?)
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> HandlerResult {
        Ok(BufferCreator::processing_instruction(self, target, data)?)
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> HandlerResult {
        self.pending_namespaces
            .push((Arc::from(prefix), Arc::from(uri)));
        Ok(())
    }

    fn object_content(&mut self, value: &Opaque) -> HandlerResult {
        Ok(self.characters_object(value.clone())?)
    }
}
