//! Tag Words
//!
//! Every structural item starts with a 32-bit tag word. The high nibble of
//! the low byte selects the major kind, the low nibble carries flags whose
//! meaning depends on the kind:
//!
//! ```text
//!   bit   7 6 5 4 | 3 | 2  | 1   | 0
//!         kind    |obj| QN | URI | prefix        (element, attribute, ns attribute)
//!         kind    | content repr  (2 bits)       (text, comment)
//!         kind    |            fragment          (document)
//! ```
//!
//! The raw constants are what producer and consumer agree on. Inside the
//! crate the [`Tag`] enum is used instead; the bit layout only matters at
//! [`Tag::decode`] and [`Tag::encode`].

/// Mask selecting the major kind
pub const TYPE_MASK: u32 = 0xF0;

pub const T_END: u32 = 0x00;
pub const T_DOCUMENT: u32 = 0x10;
pub const T_ELEMENT: u32 = 0x20;
pub const T_ATTRIBUTE: u32 = 0x30;
pub const T_NAMESPACE_ATTRIBUTE: u32 = 0x40;
pub const T_TEXT: u32 = 0x50;
pub const T_COMMENT: u32 = 0x60;
pub const T_PROCESSING_INSTRUCTION: u32 = 0x70;
pub const T_UNEXPANDED_ENTITY_REFERENCE: u32 = 0x80;

/// Document flag: buffer holds a fragment
pub const FLAG_DOCUMENT_FRAGMENT: u32 = 1 << 0;

/// Name component flags for elements, attributes and namespace attributes
pub const FLAG_PREFIX: u32 = 1 << 0;
pub const FLAG_URI: u32 = 1 << 1;
pub const FLAG_QUALIFIED_NAME: u32 = 1 << 2;
const NAME_MASK: u32 = FLAG_PREFIX | FLAG_URI | FLAG_QUALIFIED_NAME;

/// Content representations for text and comments
pub const CONTENT_TYPE_CHAR_ARRAY: u32 = 0;
pub const CONTENT_TYPE_CHAR_ARRAY_COPY: u32 = 1;
pub const CONTENT_TYPE_STRING: u32 = 2;
pub const CONTENT_TYPE_OBJECT: u32 = 3;
const CONTENT_MASK: u32 = 0x03;

/// Attribute value representations
pub const VALUE_TYPE_STRING: u32 = 0;
pub const VALUE_TYPE_OBJECT: u32 = 1 << 3;

pub const T_DOCUMENT_FRAGMENT: u32 = T_DOCUMENT | FLAG_DOCUMENT_FRAGMENT;

pub const T_ELEMENT_U_LN_QN: u32 = T_ELEMENT | FLAG_URI | FLAG_QUALIFIED_NAME;
pub const T_ELEMENT_P_U_LN: u32 = T_ELEMENT | FLAG_PREFIX | FLAG_URI;
pub const T_ELEMENT_U_LN: u32 = T_ELEMENT | FLAG_URI;
pub const T_ELEMENT_LN: u32 = T_ELEMENT;

pub const T_NAMESPACE_ATTRIBUTE_P: u32 = T_NAMESPACE_ATTRIBUTE | FLAG_PREFIX;
pub const T_NAMESPACE_ATTRIBUTE_P_U: u32 = T_NAMESPACE_ATTRIBUTE | FLAG_PREFIX | FLAG_URI;
pub const T_NAMESPACE_ATTRIBUTE_U: u32 = T_NAMESPACE_ATTRIBUTE | FLAG_URI;

pub const T_ATTRIBUTE_U_LN_QN: u32 = T_ATTRIBUTE | FLAG_URI | FLAG_QUALIFIED_NAME;
pub const T_ATTRIBUTE_P_U_LN: u32 = T_ATTRIBUTE | FLAG_PREFIX | FLAG_URI;
pub const T_ATTRIBUTE_U_LN: u32 = T_ATTRIBUTE | FLAG_URI;
pub const T_ATTRIBUTE_LN: u32 = T_ATTRIBUTE;
pub const T_ATTRIBUTE_U_LN_QN_OBJECT: u32 = T_ATTRIBUTE_U_LN_QN | VALUE_TYPE_OBJECT;
pub const T_ATTRIBUTE_P_U_LN_OBJECT: u32 = T_ATTRIBUTE_P_U_LN | VALUE_TYPE_OBJECT;
pub const T_ATTRIBUTE_U_LN_OBJECT: u32 = T_ATTRIBUTE_U_LN | VALUE_TYPE_OBJECT;
pub const T_ATTRIBUTE_LN_OBJECT: u32 = T_ATTRIBUTE_LN | VALUE_TYPE_OBJECT;

pub const T_TEXT_AS_CHAR_ARRAY: u32 = T_TEXT | CONTENT_TYPE_CHAR_ARRAY;
pub const T_TEXT_AS_CHAR_ARRAY_COPY: u32 = T_TEXT | CONTENT_TYPE_CHAR_ARRAY_COPY;
pub const T_TEXT_AS_STRING: u32 = T_TEXT | CONTENT_TYPE_STRING;
pub const T_TEXT_AS_OBJECT: u32 = T_TEXT | CONTENT_TYPE_OBJECT;

pub const T_COMMENT_AS_CHAR_ARRAY: u32 = T_COMMENT | CONTENT_TYPE_CHAR_ARRAY;
pub const T_COMMENT_AS_CHAR_ARRAY_COPY: u32 = T_COMMENT | CONTENT_TYPE_CHAR_ARRAY_COPY;
pub const T_COMMENT_AS_STRING: u32 = T_COMMENT | CONTENT_TYPE_STRING;

/// Major kind of a tag word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MajorKind {
    End,
    Document,
    Element,
    Attribute,
    NamespaceAttribute,
    Text,
    Comment,
    ProcessingInstruction,
    UnexpandedEntityReference,
}

/// Major kind of a tag word, `None` for unknown kinds
#[inline]
pub const fn major_kind(word: u32) -> Option<MajorKind> {
    if word > 0xFF {
        return None;
    }
    match word & TYPE_MASK {
        T_END => Some(MajorKind::End),
        T_DOCUMENT => Some(MajorKind::Document),
        T_ELEMENT => Some(MajorKind::Element),
        T_ATTRIBUTE => Some(MajorKind::Attribute),
        T_NAMESPACE_ATTRIBUTE => Some(MajorKind::NamespaceAttribute),
        T_TEXT => Some(MajorKind::Text),
        T_COMMENT => Some(MajorKind::Comment),
        T_PROCESSING_INSTRUCTION => Some(MajorKind::ProcessingInstruction),
        T_UNEXPANDED_ENTITY_REFERENCE => Some(MajorKind::UnexpandedEntityReference),
        _ => None,
    }
}

#[inline]
pub const fn has_prefix(word: u32) -> bool {
    word & FLAG_PREFIX != 0
}

#[inline]
pub const fn has_uri(word: u32) -> bool {
    word & FLAG_URI != 0
}

#[inline]
pub const fn has_qualified_name(word: u32) -> bool {
    word & FLAG_QUALIFIED_NAME != 0
}

/// Which name components follow an element or attribute tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameShape {
    /// local name only, no namespace
    LocalName,
    /// uri, local name
    UriLocalName,
    /// prefix, uri, local name
    PrefixUriLocalName,
    /// uri, local name, explicit qualified name
    UriLocalNameQualifiedName,
}

impl NameShape {
    /// Shape encoded by the name flags, `None` for combinations not in the format
    #[inline]
    pub const fn from_flags(word: u32) -> Option<NameShape> {
        match word & NAME_MASK {
            0 => Some(NameShape::LocalName),
            FLAG_URI => Some(NameShape::UriLocalName),
            f if f == FLAG_PREFIX | FLAG_URI => Some(NameShape::PrefixUriLocalName),
            f if f == FLAG_URI | FLAG_QUALIFIED_NAME => Some(NameShape::UriLocalNameQualifiedName),
            _ => None,
        }
    }

    #[inline]
    pub const fn flags(self) -> u32 {
        match self {
            NameShape::LocalName => 0,
            NameShape::UriLocalName => FLAG_URI,
            NameShape::PrefixUriLocalName => FLAG_PREFIX | FLAG_URI,
            NameShape::UriLocalNameQualifiedName => FLAG_URI | FLAG_QUALIFIED_NAME,
        }
    }
}

/// How text or comment content is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentRepr {
    /// Run in the content-character stream, preceded by a length word
    CharArray,
    /// Materialised copy in the content-object stream
    CharArrayCopy,
    /// String in the content-object stream
    String,
    /// Opaque value in the content-object stream (text only)
    Object,
}

impl ContentRepr {
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            ContentRepr::CharArray => CONTENT_TYPE_CHAR_ARRAY,
            ContentRepr::CharArrayCopy => CONTENT_TYPE_CHAR_ARRAY_COPY,
            ContentRepr::String => CONTENT_TYPE_STRING,
            ContentRepr::Object => CONTENT_TYPE_OBJECT,
        }
    }
}

/// Content representation of a text or comment tag word
#[inline]
pub const fn content_representation(word: u32) -> ContentRepr {
    match word & CONTENT_MASK {
        CONTENT_TYPE_CHAR_ARRAY => ContentRepr::CharArray,
        CONTENT_TYPE_CHAR_ARRAY_COPY => ContentRepr::CharArrayCopy,
        CONTENT_TYPE_STRING => ContentRepr::String,
        _ => ContentRepr::Object,
    }
}

/// How an attribute value is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueRepr {
    String,
    Object,
}

/// Value representation of an attribute tag word
#[inline]
pub const fn value_representation(word: u32) -> ValueRepr {
    if word & VALUE_TYPE_OBJECT != 0 {
        ValueRepr::Object
    } else {
        ValueRepr::String
    }
}

/// Decoded tag word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    End,
    Document { fragment: bool },
    Element(NameShape),
    Attribute { shape: NameShape, value: ValueRepr },
    NamespaceAttribute { prefix: bool, uri: bool },
    Text(ContentRepr),
    Comment(ContentRepr),
    ProcessingInstruction,
    UnexpandedEntityReference,
}

impl Tag {
    /// Decode a tag word; `None` if it is not part of the format
    pub const fn decode(word: u32) -> Option<Tag> {
        let kind = match major_kind(word) {
            Some(kind) => kind,
            None => return None,
        };
        let flags = word & !TYPE_MASK;
        match kind {
            MajorKind::End if flags == 0 => Some(Tag::End),
            MajorKind::Document if flags & !FLAG_DOCUMENT_FRAGMENT == 0 => Some(Tag::Document {
                fragment: flags & FLAG_DOCUMENT_FRAGMENT != 0,
            }),
            MajorKind::Element if flags & VALUE_TYPE_OBJECT == 0 => match NameShape::from_flags(word) {
                Some(shape) => Some(Tag::Element(shape)),
                None => None,
            },
            MajorKind::Attribute => match NameShape::from_flags(word) {
                Some(shape) => Some(Tag::Attribute {
                    shape,
                    value: value_representation(word),
                }),
                None => None,
            },
            MajorKind::NamespaceAttribute if flags & !(FLAG_PREFIX | FLAG_URI) == 0 => {
                Some(Tag::NamespaceAttribute {
                    prefix: has_prefix(word),
                    uri: has_uri(word),
                })
            }
            MajorKind::Text if flags & !CONTENT_MASK == 0 => {
                Some(Tag::Text(content_representation(word)))
            }
            MajorKind::Comment if flags & !CONTENT_MASK == 0 => match content_representation(word) {
                ContentRepr::Object => None,
                repr => Some(Tag::Comment(repr)),
            },
            MajorKind::ProcessingInstruction if flags == 0 => Some(Tag::ProcessingInstruction),
            MajorKind::UnexpandedEntityReference if flags == 0 => {
                Some(Tag::UnexpandedEntityReference)
            }
            _ => None,
        }
    }

    /// Encode back to the wire word
    pub const fn encode(self) -> u32 {
        match self {
            Tag::End => T_END,
            Tag::Document { fragment } => {
                if fragment {
                    T_DOCUMENT_FRAGMENT
                } else {
                    T_DOCUMENT
                }
            }
            Tag::Element(shape) => T_ELEMENT | shape.flags(),
            Tag::Attribute { shape, value } => {
                let value_bits = match value {
                    ValueRepr::String => VALUE_TYPE_STRING,
                    ValueRepr::Object => VALUE_TYPE_OBJECT,
                };
                T_ATTRIBUTE | shape.flags() | value_bits
            }
            Tag::NamespaceAttribute { prefix, uri } => {
                let mut word = T_NAMESPACE_ATTRIBUTE;
                if prefix {
                    word |= FLAG_PREFIX;
                }
                if uri {
                    word |= FLAG_URI;
                }
                word
            }
            Tag::Text(repr) => T_TEXT | repr.bits(),
            Tag::Comment(repr) => T_COMMENT | repr.bits(),
            Tag::ProcessingInstruction => T_PROCESSING_INSTRUCTION,
            Tag::UnexpandedEntityReference => T_UNEXPANDED_ENTITY_REFERENCE,
        }
    }

    /// Major kind of this tag
    pub const fn kind(self) -> MajorKind {
        match self {
            Tag::End => MajorKind::End,
            Tag::Document { .. } => MajorKind::Document,
            Tag::Element(_) => MajorKind::Element,
            Tag::Attribute { .. } => MajorKind::Attribute,
            Tag::NamespaceAttribute { .. } => MajorKind::NamespaceAttribute,
            Tag::Text(_) => MajorKind::Text,
            Tag::Comment(_) => MajorKind::Comment,
            Tag::ProcessingInstruction => MajorKind::ProcessingInstruction,
            Tag::UnexpandedEntityReference => MajorKind::UnexpandedEntityReference,
        }
    }
}
